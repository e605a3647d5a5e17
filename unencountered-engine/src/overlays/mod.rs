//! Built-in overlays: inventory, notebook, phone, travel map and two puzzles.

pub mod inventory;
pub mod location;
pub mod maze;
pub mod notebook;
pub mod phone;
pub mod ring;

pub use inventory::{INVENTORY, InventoryOverlay, ItemEntry};
pub use location::{LOCATION, LocationEntry, LocationOverlay};
pub use maze::{SEWER_MAZE, MazeConfig, MazeError, MazeOverlay, MazeStage};
pub use notebook::{NOTEBOOK, NOTES_KEY, Note, NotebookOverlay};
pub use phone::{PHONE, PhoneMessage, PhoneOverlay, PhonePage};
pub use ring::{Ring, RingError, RingPuzzleConfig, RingPuzzleOverlay, SWITCHBOARD};
