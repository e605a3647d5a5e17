use crate::descriptor::ObjectDescriptor;
use crate::surface::{Rect, Surface, TextStyle};
use crate::ui::{self, KEY_BAR_HEIGHT, colors};
use crate::verb::Verb;

const BAR_HEIGHT: f64 = 56.0;
const MARGIN: f64 = 20.0;

fn bar_rect(surface: &dyn Surface) -> Rect {
    let (width, height) = surface.size();
    Rect::new(
        MARGIN,
        height - KEY_BAR_HEIGHT - BAR_HEIGHT - MARGIN / 2.0,
        width - MARGIN * 2.0,
        BAR_HEIGHT,
    )
}

#[allow(clippy::cast_precision_loss)]
pub(super) fn draw_verb_bar(surface: &mut dyn Surface, verbs: &[Verb], current: Verb) {
    let bar = bar_rect(surface);
    ui::draw_box(surface, bar, colors::PANEL, colors::FAINT);
    if verbs.is_empty() {
        return;
    }
    let slot = bar.w / verbs.len() as f64;
    for (index, verb) in verbs.iter().enumerate() {
        let x = bar.x + slot * index as f64;
        let selected = *verb == current;
        if selected {
            surface.fill_rect(
                Rect::new(x + 4.0, bar.y + 6.0, slot - 8.0, bar.h - 12.0),
                colors::HIGHLIGHT,
            );
        }
        let color = if selected { colors::WHITE } else { colors::MUTED };
        surface.fill_text(
            verb.label(),
            x + slot / 2.0,
            bar.y + bar.h / 2.0,
            &TextStyle::new(22.0, color).centered(),
        );
    }
}

#[allow(clippy::cast_precision_loss)]
pub(super) fn draw_object_menu(
    surface: &mut dyn Surface,
    prompt: &str,
    candidates: &[ObjectDescriptor],
    selected: usize,
) {
    let (width, _) = surface.size();
    let row = 32.0;
    let bar = bar_rect(surface);
    let height = row * (candidates.len() as f64 + 1.0) + MARGIN;
    let panel = Rect::new(
        width * 0.55,
        bar.y - height - MARGIN / 2.0,
        width * 0.45 - MARGIN,
        height,
    );
    ui::draw_box(surface, panel, colors::PANEL, colors::FAINT);
    surface.fill_text(
        prompt,
        panel.x + MARGIN,
        panel.y + row / 2.0 + MARGIN / 2.0,
        &TextStyle::new(20.0, colors::MUTED),
    );
    for (index, object) in candidates.iter().enumerate() {
        let y = panel.y + row * (index as f64 + 1.5) + MARGIN / 2.0;
        let (marker, color) = if index == selected {
            ("> ", colors::WHITE)
        } else {
            ("  ", colors::MUTED)
        };
        surface.fill_text(
            &format!("{marker}{}", object.name),
            panel.x + MARGIN,
            y,
            &TextStyle::new(22.0, color),
        );
    }
}

pub(super) fn draw_dialogue(surface: &mut dyn Surface, line: &str) {
    let bar = bar_rect(surface);
    let panel = Rect::new(
        bar.x,
        bar.y - BAR_HEIGHT * 1.5,
        bar.w,
        bar.h + BAR_HEIGHT * 1.5,
    );
    ui::draw_box(surface, panel, colors::SOLID, colors::WHITE);
    let style = TextStyle::new(22.0, colors::WHITE);
    ui::draw_wrapped(
        surface,
        line,
        panel.x + MARGIN,
        panel.y + MARGIN * 1.5,
        panel.w - MARGIN * 2.0,
        &style,
    );
    surface.fill_text(
        "[Enter]",
        panel.x + panel.w - MARGIN,
        panel.y + panel.h - MARGIN,
        &TextStyle::new(16.0, colors::FAINT).right(),
    );
}
