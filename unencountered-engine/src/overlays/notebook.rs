use crate::context::GameContext;
use crate::events::GameEvent;
use crate::flags::FlagStore;
use crate::key::Key;
use crate::overlay::Overlay;
use crate::surface::{Surface, TextStyle};
use crate::ui::{self, colors};
use serde::{Deserialize, Serialize};

pub const NOTEBOOK: &str = "Notebook";

/// Flag key holding the JSON-encoded list of notes.
pub const NOTES_KEY: &str = "notebook_entries";

pub const PAGE_SIZE: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    pub text: String,
}

/// Read stored notes. A missing or corrupt entry yields an empty notebook.
#[must_use]
pub fn load_notes(flags: &dyn FlagStore) -> Vec<Note> {
    let Some(raw) = flags.get(NOTES_KEY) else {
        return Vec::new();
    };
    serde_json::from_str(&raw).unwrap_or_else(|err| {
        log::warn!("discarding unreadable notebook: {err}");
        Vec::new()
    })
}

/// Paged list of clues, persisted under [`NOTES_KEY`].
#[derive(Debug, Default)]
pub struct NotebookOverlay {
    notes: Vec<Note>,
    page: usize,
}

impl NotebookOverlay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.notes.len().div_ceil(PAGE_SIZE).max(1)
    }

    fn record(&mut self, title: &str, text: &str, ctx: &mut GameContext<'_>) {
        self.notes = load_notes(ctx.flags());
        if self.notes.iter().any(|note| note.title == title) {
            return;
        }
        self.notes.push(Note {
            title: title.to_string(),
            text: text.to_string(),
        });
        match serde_json::to_string(&self.notes) {
            Ok(encoded) => ctx.set_flag_value(NOTES_KEY, &encoded),
            Err(err) => log::warn!("could not encode notebook: {err}"),
        }
    }
}

impl Overlay for NotebookOverlay {
    fn name(&self) -> &str {
        NOTEBOOK
    }

    fn init(&mut self, ctx: &mut GameContext<'_>) {
        self.notes = load_notes(ctx.flags());
        self.page = 0;
    }

    fn handle_input(&mut self, key: &Key, ctx: &mut GameContext<'_>) -> bool {
        if key.is_cancel() || key.is_confirm() {
            ctx.hide_overlay();
        } else if key.is_right() || key.is_down() {
            self.page = (self.page + 1).min(self.page_count() - 1);
        } else if key.is_left() || key.is_up() {
            self.page = self.page.saturating_sub(1);
        }
        true
    }

    fn on_event(&mut self, event: &GameEvent, ctx: &mut GameContext<'_>) {
        if let GameEvent::NoteAdded { title, text } = event {
            self.record(title, text, ctx);
        }
    }

    fn render(&mut self, surface: &mut dyn Surface) {
        let panel = ui::overlay_panel(surface);
        ui::draw_box(surface, panel, colors::SOLID, colors::WHITE);
        ui::draw_text_centered(surface, NOTEBOOK, panel.y + 50.0, colors::WHITE, 32.0);
        if self.notes.is_empty() {
            ui::draw_text_centered(
                surface,
                "Nothing written down yet.",
                panel.y + panel.h / 2.0,
                colors::MUTED,
                22.0,
            );
            return;
        }
        let left = panel.x + 40.0;
        let width = panel.w - 80.0;
        let mut y = panel.y + 100.0;
        for note in self.notes.iter().skip(self.page * PAGE_SIZE).take(PAGE_SIZE) {
            surface.fill_text(&note.title, left, y, &TextStyle::new(22.0, colors::WHITE));
            y = ui::draw_wrapped(
                surface,
                &note.text,
                left + 20.0,
                y + 28.0,
                width - 20.0,
                &TextStyle::new(18.0, colors::MUTED),
            ) + 10.0;
        }
        ui::draw_text_centered(
            surface,
            &format!("Page {}/{}", self.page + 1, self.page_count()),
            panel.y + panel.h - 30.0,
            colors::FAINT,
            16.0,
        );
    }
}
