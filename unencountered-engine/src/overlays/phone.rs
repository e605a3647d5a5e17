//! Phone inbox that follows the narrative phase.
//!
//! Each configured phase has its own page of messages. Opening the phone
//! shows the page for the current phase, marks that phase started and
//! clears the unread markers.

use crate::context::{Command, GameContext};
use crate::events::GameEvent;
use crate::flags::FlagStore;
use crate::key::Key;
use crate::overlay::Overlay;
use crate::surface::{Surface, TextStyle};
use crate::ui::{self, colors};
use serde::{Deserialize, Serialize};

pub const PHONE: &str = "Phone";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneMessage {
    pub from: String,
    pub subject: String,
    pub text: String,
    /// Listed only once this flag is true. `None` is always listed.
    #[serde(default)]
    pub unlock_flag: Option<String>,
}

impl PhoneMessage {
    #[must_use]
    pub fn new(from: &str, subject: &str, text: &str) -> Self {
        Self {
            from: from.to_string(),
            subject: subject.to_string(),
            text: text.to_string(),
            unlock_flag: None,
        }
    }

    #[must_use]
    pub fn unlocked_by(mut self, flag: &str) -> Self {
        self.unlock_flag = Some(flag.to_string());
        self
    }
}

/// Messages the phone shows while `phase` is current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhonePage {
    pub phase: String,
    /// Line under the title, e.g. signal strength.
    #[serde(default)]
    pub status: String,
    pub messages: Vec<PhoneMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Inbox,
    Reading,
}

#[derive(Debug)]
pub struct PhoneOverlay {
    pages: Vec<PhonePage>,
    page: Option<usize>,
    inbox: Vec<PhoneMessage>,
    cursor: usize,
    mode: Mode,
}

impl PhoneOverlay {
    #[must_use]
    pub const fn new(pages: Vec<PhonePage>) -> Self {
        Self {
            pages,
            page: None,
            inbox: Vec::new(),
            cursor: 0,
            mode: Mode::Inbox,
        }
    }

    /// Phase whose page is on screen.
    #[must_use]
    pub fn phase(&self) -> Option<&str> {
        self.current_page().map(|page| page.phase.as_str())
    }

    #[must_use]
    pub fn inbox(&self) -> &[PhoneMessage] {
        &self.inbox
    }

    #[must_use]
    pub fn is_reading(&self) -> bool {
        self.mode == Mode::Reading
    }

    fn current_page(&self) -> Option<&PhonePage> {
        self.page.and_then(|index| self.pages.get(index))
    }

    fn load(&mut self, phase: Option<&str>, flags: &dyn FlagStore) {
        self.page = phase.and_then(|phase| self.pages.iter().position(|page| page.phase == phase));
        if self.page.is_none() {
            log::debug!("no phone page for phase {phase:?}");
        }
        self.inbox = self
            .current_page()
            .map(|page| {
                page.messages
                    .iter()
                    .filter(|message| {
                        message
                            .unlock_flag
                            .as_deref()
                            .is_none_or(|flag| flags.get_bool(flag))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        self.cursor = 0;
        self.mode = Mode::Inbox;
    }
}

impl Overlay for PhoneOverlay {
    fn name(&self) -> &str {
        PHONE
    }

    fn init(&mut self, ctx: &mut GameContext<'_>) {
        let phase = ctx.current_phase();
        self.load(phase, ctx.flags());
        if let Some(phase) = phase {
            let phases = ctx.phases();
            if let Err(err) = phases.start(ctx.flags_mut(), phase) {
                log::warn!("could not start phase `{phase}`: {err}");
            }
        }
        ctx.push(Command::ClearMessageAlert);
        ctx.push(Command::ClearCallAlert);
    }

    fn handle_input(&mut self, key: &Key, ctx: &mut GameContext<'_>) -> bool {
        let len = self.inbox.len();
        match self.mode {
            Mode::Inbox => {
                if key.is_cancel() {
                    ctx.hide_overlay();
                } else if len > 0 && key.is_up() {
                    self.cursor = (self.cursor + len - 1) % len;
                } else if len > 0 && key.is_down() {
                    self.cursor = (self.cursor + 1) % len;
                } else if len > 0 && key.is_confirm() {
                    self.mode = Mode::Reading;
                }
            }
            Mode::Reading => {
                if key.is_cancel() || key.is_confirm() {
                    self.mode = Mode::Inbox;
                }
            }
        }
        true
    }

    fn on_event(&mut self, event: &GameEvent, ctx: &mut GameContext<'_>) {
        if let GameEvent::PhaseReady { phase } = event {
            log::debug!("phone switching to `{phase}`");
            let current = ctx.current_phase();
            self.load(current, ctx.flags());
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn render(&mut self, surface: &mut dyn Surface) {
        let panel = ui::overlay_panel(surface);
        ui::draw_box(surface, panel, colors::SOLID, colors::WHITE);
        ui::draw_text_centered(surface, PHONE, panel.y + 50.0, colors::WHITE, 32.0);
        if let Some(page) = self.current_page() {
            ui::draw_text_centered(surface, &page.status, panel.y + 85.0, colors::FAINT, 18.0);
        }

        if self.inbox.is_empty() {
            ui::draw_text_centered(
                surface,
                "No messages.",
                panel.y + panel.h / 2.0,
                colors::MUTED,
                22.0,
            );
            return;
        }

        if let (Mode::Reading, Some(message)) = (self.mode, self.inbox.get(self.cursor)) {
            let left = panel.x + 40.0;
            surface.fill_text(
                &format!("From: {}", message.from),
                left,
                panel.y + 130.0,
                &TextStyle::new(20.0, colors::MUTED),
            );
            surface.fill_text(
                &message.subject,
                left,
                panel.y + 165.0,
                &TextStyle::new(24.0, colors::WHITE),
            );
            ui::draw_wrapped(
                surface,
                &message.text,
                left,
                panel.y + 210.0,
                panel.w - 80.0,
                &TextStyle::new(20.0, colors::MUTED),
            );
            return;
        }

        for (index, message) in self.inbox.iter().enumerate() {
            let selected = index == self.cursor;
            let color = if selected { colors::WHITE } else { colors::MUTED };
            let marker = if selected { "> " } else { "  " };
            surface.fill_text(
                &format!("{marker}{}: {}", message.from, message.subject),
                panel.x + 40.0,
                panel.y + 130.0 + index as f64 * 34.0,
                &TextStyle::new(22.0, color),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::World;
    use crate::flags::MemoryFlagStore;
    use crate::phases::{PhaseTracker, started_key};
    use crate::surface::RecordingSurface;

    fn phone() -> PhoneOverlay {
        PhoneOverlay::new(vec![
            PhonePage {
                phase: "phase1".to_string(),
                status: "One bar.".to_string(),
                messages: vec![
                    PhoneMessage::new("Dave", "Got a minute?", "Call me back."),
                    PhoneMessage::new("Sophie", "The diner", "I left something there.")
                        .unlocked_by("sophie_unlocked"),
                ],
            },
            PhonePage {
                phase: "phase2".to_string(),
                status: "No signal.".to_string(),
                messages: vec![PhoneMessage::new("Unknown", "...", "Static.")],
            },
        ])
    }

    fn world() -> World {
        World::new(Box::new(MemoryFlagStore::new()))
            .with_phases(PhaseTracker::new(["phase1", "phase2"]))
    }

    #[test]
    fn opens_on_the_first_phase_and_starts_it() {
        let mut world = world();
        let mut overlay = phone();
        overlay.init(&mut world.context(true));
        assert_eq!(overlay.phase(), Some("phase1"));
        assert_eq!(overlay.inbox().len(), 1);
        assert!(world.flags().get_bool(&started_key("phase1")));
        assert_eq!(
            world.take_commands(),
            vec![Command::ClearMessageAlert, Command::ClearCallAlert]
        );
    }

    #[test]
    fn follows_the_latest_ready_phase() {
        let mut world = world();
        let mut overlay = phone();
        assert!(world.context(false).arm_phase("phase2"));
        for event in world.take_events() {
            overlay.on_event(&event, &mut world.context(false));
        }
        assert_eq!(overlay.phase(), Some("phase2"));
        assert!(!world.flags().get_bool(&started_key("phase2")));

        overlay.init(&mut world.context(true));
        assert!(world.flags().get_bool(&started_key("phase2")));
        let mut surface = RecordingSurface::default();
        overlay.render(&mut surface);
        assert!(surface.contains_text("No signal."));
        assert!(surface.contains_text("Unknown: ..."));
    }

    #[test]
    fn unlocked_messages_appear_on_the_next_open() {
        let mut world = world();
        let mut overlay = phone();
        world.context(false).set_flag("sophie_unlocked", true);
        overlay.init(&mut world.context(true));
        assert_eq!(overlay.inbox().len(), 2);

        let mut ctx = world.context(true);
        overlay.handle_input(&Key::Down, &mut ctx);
        overlay.handle_input(&Key::Enter, &mut ctx);
        assert!(overlay.is_reading());
        overlay.handle_input(&Key::Escape, &mut ctx);
        assert!(!overlay.is_reading());
        assert!(ctx.pending_commands().is_empty());
    }
}
