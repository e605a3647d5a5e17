//! Staged fog-of-war maze puzzle.
//!
//! The player starts in the top-left corner of each stage and sees only the
//! cells next to where they have stood. Reaching the exit pauses briefly,
//! then loads the next stage. Clearing the last stage sets the completion
//! flag, announces the puzzle and closes the overlay.

use crate::context::GameContext;
use crate::events::GameEvent;
use crate::key::Key;
use crate::overlay::Overlay;
use crate::surface::{Rect, Surface};
use crate::ui::{self, colors};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SEWER_MAZE: &str = "SewerMaze";

/// Pause between reaching an exit and the next stage, in milliseconds.
pub const STAGE_TRANSITION_MS: f64 = 700.0;

const WALL: u8 = b'#';
const FLOOR: u8 = b'.';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MazeError {
    #[error("maze has no stages")]
    Empty,
    #[error("stage {stage}: row {row} has width {width}, expected {expected}")]
    Ragged {
        stage: usize,
        row: usize,
        width: usize,
        expected: usize,
    },
    #[error("stage {stage}: unexpected cell `{cell}` (use `#` and `.`)")]
    BadCell { stage: usize, cell: char },
    #[error("stage {stage}: start or exit is not a floor cell")]
    Blocked { stage: usize },
}

/// One grid. Rows use `#` for walls and `.` for floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeStage {
    pub layout: Vec<String>,
    /// `(row, column)` of the exit.
    pub exit: (usize, usize),
    /// Line shown when the stage starts.
    pub message: String,
}

impl MazeStage {
    fn rows(&self) -> usize {
        self.layout.len()
    }

    fn cols(&self) -> usize {
        self.layout.first().map_or(0, String::len)
    }

    fn is_floor(&self, row: usize, col: usize) -> bool {
        self.layout
            .get(row)
            .and_then(|line| line.as_bytes().get(col))
            .is_some_and(|cell| *cell == FLOOR)
    }

    fn validate(&self, stage: usize) -> Result<(), MazeError> {
        let expected = self.cols();
        for (row, line) in self.layout.iter().enumerate() {
            if line.len() != expected {
                return Err(MazeError::Ragged {
                    stage,
                    row,
                    width: line.len(),
                    expected,
                });
            }
            if let Some(cell) = line.bytes().find(|cell| *cell != WALL && *cell != FLOOR) {
                return Err(MazeError::BadCell {
                    stage,
                    cell: char::from(cell),
                });
            }
        }
        if !self.is_floor(0, 0) || !self.is_floor(self.exit.0, self.exit.1) {
            return Err(MazeError::Blocked { stage });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeConfig {
    pub name: String,
    pub stages: Vec<MazeStage>,
    /// Flag set to `"true"` once every stage is cleared.
    pub completion_flag: String,
    /// Id published in [`GameEvent::PuzzleCompleted`].
    pub puzzle: String,
    /// The final descent cannot be abandoned.
    #[serde(default)]
    pub allow_escape: bool,
}

impl MazeConfig {
    /// The three-stage sewer descent.
    #[must_use]
    pub fn sewer() -> Self {
        let stage = |rows: &[&str], exit: (usize, usize), message: &str| MazeStage {
            layout: rows.iter().map(|row| (*row).to_string()).collect(),
            exit,
            message: message.to_string(),
        };
        Self {
            name: SEWER_MAZE.to_string(),
            stages: vec![
                stage(
                    &["..#..", "..#.#", "#...#", "###..", "....."],
                    (4, 2),
                    "The sewer branches ahead.",
                ),
                stage(
                    &[
                        ".#...#.", ".#.#.#.", "...#...", "##.###.", ".....#.", ".###.#.",
                        "...#...",
                    ],
                    (6, 5),
                    "The tunnels no longer feel consistent.",
                ),
                stage(
                    &[
                        ".#...#...",
                        ".#.#.#.#.",
                        "...#...#.",
                        "##.###.#.",
                        ".......#.",
                        ".#####.#.",
                        ".........",
                        ".#######.",
                        ".........",
                    ],
                    (8, 4),
                    "You are certain that you've seen this place before.",
                ),
            ],
            completion_flag: "finalMazeSolved".to_string(),
            puzzle: "sewer_maze".to_string(),
            allow_escape: false,
        }
    }
}

#[derive(Debug)]
pub struct MazeOverlay {
    config: MazeConfig,
    stage: usize,
    fog: Vec<Vec<bool>>,
    player: (usize, usize),
    message: String,
    transition_ms: f64,
    stage_cleared: bool,
}

impl MazeOverlay {
    /// # Errors
    ///
    /// Returns an error if a stage grid is malformed or its start or exit is walled in.
    pub fn new(config: MazeConfig) -> Result<Self, MazeError> {
        if config.stages.is_empty() {
            return Err(MazeError::Empty);
        }
        for (index, stage) in config.stages.iter().enumerate() {
            stage.validate(index)?;
        }
        let mut maze = Self {
            config,
            stage: 0,
            fog: Vec::new(),
            player: (0, 0),
            message: String::new(),
            transition_ms: 0.0,
            stage_cleared: false,
        };
        maze.start_stage(0);
        Ok(maze)
    }

    #[must_use]
    pub const fn stage(&self) -> usize {
        self.stage
    }

    #[must_use]
    pub const fn player(&self) -> (usize, usize) {
        self.player
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn is_revealed(&self, row: usize, col: usize) -> bool {
        self.fog
            .get(row)
            .and_then(|line| line.get(col))
            .is_some_and(|fogged| !fogged)
    }

    fn current(&self) -> &MazeStage {
        &self.config.stages[self.stage]
    }

    fn start_stage(&mut self, stage: usize) {
        self.stage = stage;
        let (rows, cols) = (self.current().rows(), self.current().cols());
        self.fog = vec![vec![true; cols]; rows];
        self.player = (0, 0);
        self.message = self.current().message.clone();
        self.transition_ms = 0.0;
        self.stage_cleared = false;
        self.reveal();
    }

    fn reveal(&mut self) {
        let (row, col) = self.player;
        let around = [
            Some((row, col)),
            row.checked_sub(1).map(|r| (r, col)),
            Some((row + 1, col)),
            col.checked_sub(1).map(|c| (row, c)),
            Some((row, col + 1)),
        ];
        for (r, c) in around.into_iter().flatten() {
            if let Some(cell) = self.fog.get_mut(r).and_then(|line| line.get_mut(c)) {
                *cell = false;
            }
        }
    }

    fn step(&mut self, key: &Key) {
        let (row, col) = self.player;
        let target = if key.is_up() {
            row.checked_sub(1).map(|r| (r, col))
        } else if key.is_down() {
            Some((row + 1, col))
        } else if key.is_left() {
            col.checked_sub(1).map(|c| (row, c))
        } else if key.is_right() {
            Some((row, col + 1))
        } else {
            None
        };
        let Some((r, c)) = target else {
            return;
        };
        if !self.current().is_floor(r, c) {
            return;
        }
        self.player = (r, c);
        self.reveal();
        if self.player == self.current().exit {
            self.message = "You found a way forward.".to_string();
            self.transition_ms = STAGE_TRANSITION_MS;
            self.stage_cleared = true;
        }
    }

    fn finish(&mut self, ctx: &mut GameContext<'_>) {
        log::info!("maze `{}` solved", self.config.name);
        self.message = "There is no turning back now.".to_string();
        ctx.set_flag(&self.config.completion_flag, true);
        ctx.publish(GameEvent::PuzzleCompleted {
            puzzle: self.config.puzzle.clone(),
        });
        ctx.hide_overlay();
    }
}

impl Overlay for MazeOverlay {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn init(&mut self, _ctx: &mut GameContext<'_>) {
        self.start_stage(0);
    }

    fn update(&mut self, dt_ms: f64, ctx: &mut GameContext<'_>) {
        if self.transition_ms <= 0.0 {
            return;
        }
        self.transition_ms -= dt_ms;
        if self.transition_ms > 0.0 || !self.stage_cleared {
            return;
        }
        self.stage_cleared = false;
        if self.stage + 1 < self.config.stages.len() {
            self.start_stage(self.stage + 1);
        } else {
            self.finish(ctx);
        }
    }

    fn handle_input(&mut self, key: &Key, ctx: &mut GameContext<'_>) -> bool {
        if self.transition_ms > 0.0 {
            return true;
        }
        if key.is_cancel() {
            if self.config.allow_escape {
                ctx.hide_overlay();
            }
            return true;
        }
        self.step(key);
        true
    }

    #[allow(clippy::cast_precision_loss)]
    fn render(&mut self, surface: &mut dyn Surface) {
        let panel = ui::overlay_panel(surface);
        ui::draw_box(surface, panel, colors::SOLID, colors::WHITE);
        ui::draw_text_centered(
            surface,
            &format!("STAGE {}", self.stage + 1),
            panel.y + 60.0,
            colors::WHITE,
            32.0,
        );

        let stage = self.current();
        let size = stage.rows().max(stage.cols()).max(1) as f64;
        let cell = panel.w.min(panel.h) * 0.55 / size;
        let grid_x = panel.center_x() - cell * stage.cols() as f64 / 2.0;
        let grid_y = panel.y + panel.h / 2.0 - cell * stage.rows() as f64 / 2.0 + 20.0;
        for row in 0..stage.rows() {
            for col in 0..stage.cols() {
                let rect = Rect::new(
                    grid_x + col as f64 * cell,
                    grid_y + row as f64 * cell,
                    cell,
                    cell,
                );
                if !self.is_revealed(row, col) {
                    surface.fill_rect(rect, colors::FOG);
                } else if !stage.is_floor(row, col) {
                    surface.fill_rect(rect, colors::WALL);
                } else {
                    surface.fill_rect(rect, colors::FLOOR);
                    if (row, col) == stage.exit {
                        surface.stroke_rect(rect.inset(2.0), colors::EXIT, 2.0);
                    }
                    if (row, col) == self.player {
                        surface.fill_rect(rect.inset(6.0), colors::PLAYER);
                    }
                }
            }
        }
        ui::draw_text_centered(
            surface,
            &self.message,
            panel.y + panel.h - 110.0,
            colors::MUTED,
            20.0,
        );
        ui::draw_text_centered(
            surface,
            "Arrows: move",
            panel.y + panel.h - 70.0,
            colors::FAINT,
            18.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Command, World};
    use crate::flags::MemoryFlagStore;

    fn tiny() -> MazeConfig {
        MazeConfig {
            name: "Drain".to_string(),
            stages: vec![
                MazeStage {
                    layout: vec!["..".to_string(), "#.".to_string()],
                    exit: (1, 1),
                    message: "Drip.".to_string(),
                },
                MazeStage {
                    layout: vec![".#".to_string(), "..".to_string()],
                    exit: (1, 1),
                    message: "Drop.".to_string(),
                },
            ],
            completion_flag: "drain_done".to_string(),
            puzzle: "drain".to_string(),
            allow_escape: false,
        }
    }

    #[test]
    fn sewer_stages_are_valid() {
        let maze = MazeOverlay::new(MazeConfig::sewer()).unwrap();
        assert_eq!(maze.message(), "The sewer branches ahead.");
        assert!(maze.is_revealed(1, 0));
        assert!(!maze.is_revealed(2, 2));
    }

    #[test]
    fn walls_block_and_fog_lifts_around_player() {
        let mut world = World::new(Box::new(MemoryFlagStore::new()));
        let mut maze = MazeOverlay::new(tiny()).unwrap();
        let mut ctx = world.context(true);
        maze.handle_input(&Key::Down, &mut ctx);
        assert_eq!(maze.player(), (0, 0));
        maze.handle_input(&Key::Right, &mut ctx);
        assert_eq!(maze.player(), (0, 1));
        assert!(maze.is_revealed(1, 1));
    }

    #[test]
    fn clearing_every_stage_sets_flag_and_closes() {
        let mut world = World::new(Box::new(MemoryFlagStore::new()));
        let mut maze = MazeOverlay::new(tiny()).unwrap();
        {
            let mut ctx = world.context(true);
            maze.handle_input(&Key::Right, &mut ctx);
            maze.handle_input(&Key::Down, &mut ctx);
            assert_eq!(maze.message(), "You found a way forward.");
            maze.handle_input(&Key::Up, &mut ctx);
            assert_eq!(maze.player(), (1, 1), "input ignored during transition");
            maze.update(STAGE_TRANSITION_MS, &mut ctx);
            assert_eq!(maze.stage(), 1);
            assert_eq!(maze.message(), "Drop.");

            maze.handle_input(&Key::Down, &mut ctx);
            maze.handle_input(&Key::Right, &mut ctx);
            maze.update(STAGE_TRANSITION_MS + 1.0, &mut ctx);
            assert!(ctx.flag("drain_done"));
        }
        assert_eq!(world.take_commands(), vec![Command::HideOverlay]);
        assert_eq!(
            world.take_events(),
            vec![GameEvent::PuzzleCompleted {
                puzzle: "drain".to_string()
            }]
        );
    }

    #[test]
    fn escape_is_swallowed_when_disallowed() {
        let mut world = World::new(Box::new(MemoryFlagStore::new()));
        let mut maze = MazeOverlay::new(tiny()).unwrap();
        assert!(maze.handle_input(&Key::Escape, &mut world.context(true)));
        assert!(world.commands().is_empty());
    }

    #[test]
    fn malformed_grids_are_rejected() {
        let mut config = tiny();
        config.stages[0].layout[1] = "#".to_string();
        assert!(matches!(
            MazeOverlay::new(config),
            Err(MazeError::Ragged { stage: 0, row: 1, .. })
        ));
        let mut config = tiny();
        config.stages[1].exit = (0, 1);
        assert_eq!(
            MazeOverlay::new(config).unwrap_err(),
            MazeError::Blocked { stage: 1 }
        );
    }
}
