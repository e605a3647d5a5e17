//! Shared drawing helpers for scenes and overlays.

use crate::config::Hotkey;
use crate::overlay::Alerts;
use crate::surface::{Rect, Surface, TextStyle};

pub mod colors {
    pub const WHITE: &str = "#fff";
    pub const MUTED: &str = "#aaa";
    pub const FAINT: &str = "#666";
    pub const PANEL: &str = "rgba(0,0,0,0.75)";
    pub const SHADE: &str = "rgba(0,0,0,0.55)";
    pub const SOLID: &str = "rgba(0,0,0,0.92)";
    pub const HIGHLIGHT: &str = "rgba(255,255,255,0.15)";
    pub const WALL: &str = "rgba(80,80,80,0.9)";
    pub const FLOOR: &str = "rgba(255,255,255,0.08)";
    pub const FOG: &str = "#000";
    pub const EXIT: &str = "rgba(0,255,170,0.6)";
    pub const PLAYER: &str = "#ffff66";
    pub const ALERT: &str = "#ff5a5a";
}

pub const KEY_BAR_HEIGHT: f64 = 44.0;

pub fn draw_box(surface: &mut dyn Surface, rect: Rect, fill: &str, stroke: &str) {
    surface.fill_rect(rect, fill);
    surface.stroke_rect(rect, stroke, 2.0);
}

/// Draw `text` centered horizontally on the surface.
pub fn draw_text_centered(
    surface: &mut dyn Surface,
    text: &str,
    y: f64,
    color: &'static str,
    size: f64,
) {
    let (width, _) = surface.size();
    surface.fill_text(text, width / 2.0, y, &TextStyle::new(size, color).centered());
}

/// The standard overlay panel: 90% wide, 80% tall, centered.
#[must_use]
pub fn overlay_panel(surface: &dyn Surface) -> Rect {
    let (width, height) = surface.size();
    let w = width * 0.9;
    let h = height * 0.8;
    Rect::new((width - w) / 2.0, (height - h) / 2.0, w, h)
}

/// Greedy word wrap against measured text width.
pub fn wrap_text(
    surface: &mut dyn Surface,
    text: &str,
    max_width: f64,
    style: &TextStyle,
) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if !current.is_empty() && surface.measure_text(&candidate, style) > max_width {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }
    lines
}

/// Draw wrapped text starting at `y`. Returns the y below the last line.
pub fn draw_wrapped(
    surface: &mut dyn Surface,
    text: &str,
    x: f64,
    y: f64,
    max_width: f64,
    style: &TextStyle,
) -> f64 {
    let line_height = style.size * 1.35;
    let mut cursor = y;
    for line in wrap_text(surface, text, max_width, style) {
        surface.fill_text(&line, x, cursor, style);
        cursor += line_height;
    }
    cursor
}

/// Bottom strip listing overlay hotkeys.
#[allow(clippy::cast_precision_loss)]
pub fn draw_key_bar(surface: &mut dyn Surface, hotkeys: &[Hotkey]) {
    if hotkeys.is_empty() {
        return;
    }
    let (width, height) = surface.size();
    let bar = Rect::new(0.0, height - KEY_BAR_HEIGHT, width, KEY_BAR_HEIGHT);
    surface.fill_rect(bar, colors::PANEL);
    let slot = width / hotkeys.len() as f64;
    let style = TextStyle::new(18.0, colors::MUTED).centered();
    for (index, hotkey) in hotkeys.iter().enumerate() {
        let x = slot * index as f64 + slot / 2.0;
        let label = format!("[{}] {}", hotkey.key, hotkey.label);
        surface.fill_text(&label, x, bar.y + KEY_BAR_HEIGHT / 2.0, &style);
    }
}

/// Unread markers in the top-right corner.
pub fn draw_alerts(surface: &mut dyn Surface, alerts: Alerts) {
    let (width, _) = surface.size();
    let style = TextStyle::new(18.0, colors::ALERT).right();
    let mut y = 28.0;
    if alerts.message_unread {
        surface.fill_text("New message", width - 24.0, y, &style);
        y += 26.0;
    }
    if alerts.call_unread {
        surface.fill_text("Missed call", width - 24.0, y, &style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    #[test]
    fn wrap_breaks_on_measured_width() {
        let mut surface = RecordingSurface::default();
        let style = TextStyle::new(10.0, colors::WHITE);
        // 6px per char: "alpha beta" is 60px, "alpha beta gamma" is 96px.
        let lines = wrap_text(&mut surface, "alpha beta gamma", 70.0, &style);
        assert_eq!(lines, vec!["alpha beta".to_string(), "gamma".to_string()]);
    }

    #[test]
    fn wrap_keeps_explicit_newlines() {
        let mut surface = RecordingSurface::default();
        let style = TextStyle::new(10.0, colors::WHITE);
        let lines = wrap_text(&mut surface, "one\ntwo", 500.0, &style);
        assert_eq!(lines, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn key_bar_lists_every_hotkey() {
        let mut surface = RecordingSurface::default();
        let hotkeys = crate::config::EngineConfig::default_config().hotkeys;
        draw_key_bar(&mut surface, &hotkeys);
        assert!(surface.contains_text("[1] Phone"));
        assert!(surface.contains_text("[3] Map"));
    }
}
