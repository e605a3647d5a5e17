//! Drawing target abstraction.
//!
//! The browser implements [`Surface`] over a 2D canvas. Native code and tests
//! use [`RecordingSurface`], which keeps every draw call for inspection.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Shrink by `margin` on every side.
    #[must_use]
    pub fn inset(self, margin: f64) -> Self {
        Self::new(
            self.x + margin,
            self.y + margin,
            (self.w - margin * 2.0).max(0.0),
            (self.h - margin * 2.0).max(0.0),
        )
    }

    #[must_use]
    pub fn center_x(self) -> f64 {
        self.x + self.w / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub color: &'static str,
    pub align: TextAlign,
}

impl TextStyle {
    #[must_use]
    pub const fn new(size: f64, color: &'static str) -> Self {
        Self {
            size,
            color,
            align: TextAlign::Left,
        }
    }

    #[must_use]
    pub const fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }

    #[must_use]
    pub const fn right(mut self) -> Self {
        self.align = TextAlign::Right;
        self
    }
}

/// A 2D drawing target.
pub trait Surface {
    /// Drawable width and height in pixels.
    fn size(&self) -> (f64, f64);

    fn fill_rect(&mut self, rect: Rect, color: &str);

    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f64);

    /// Draw `text` with its vertical middle at `y`.
    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle);

    fn measure_text(&mut self, text: &str, style: &TextStyle) -> f64;

    fn bounds(&self) -> Rect {
        let (w, h) = self.size();
        Rect::new(0.0, 0.0, w, h)
    }
}

/// A draw call captured by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCall {
    FillRect { rect: Rect, color: String },
    StrokeRect { rect: Rect, color: String },
    Text { text: String, x: f64, y: f64, size: f64, color: String },
}

/// Headless surface that records instead of painting.
///
/// Text width is approximated as `0.6 * size` per character.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    calls: Vec<DrawCall>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

impl RecordingSurface {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    #[must_use]
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Every string drawn so far, in order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|text| text.contains(needle))
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.calls.is_empty()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.calls.push(DrawCall::FillRect {
            rect,
            color: color.to_string(),
        });
    }

    fn stroke_rect(&mut self, rect: Rect, color: &str, _line_width: f64) {
        self.calls.push(DrawCall::StrokeRect {
            rect,
            color: color.to_string(),
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            x,
            y,
            size: style.size,
            color: style.color.to_string(),
        });
    }

    #[allow(clippy::cast_precision_loss)]
    fn measure_text(&mut self, text: &str, style: &TextStyle) -> f64 {
        text.chars().count() as f64 * style.size * 0.6
    }
}
