pub mod config;
pub mod scenario;
pub mod util;

pub use config::FileConfigLoader;
pub use util::split_csv;
