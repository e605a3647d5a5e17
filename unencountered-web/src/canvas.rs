//! 2D canvas implementation of the engine's drawing surface.

use unencountered_engine::TextAlign;

/// CSS font shorthand for a pixel size and family.
#[must_use]
pub fn font_spec(size: f64, family: &str) -> String {
    format!("{size}px {family}")
}

#[must_use]
pub const fn text_align_name(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Left => "left",
        TextAlign::Center => "center",
        TextAlign::Right => "right",
    }
}

/// Width guess used when the context cannot measure.
#[must_use]
pub fn estimate_width(text: &str, size: f64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let chars = text.chars().count() as f64;
    chars * size * 0.6
}

#[cfg(target_arch = "wasm32")]
pub use browser::CanvasSurface;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::{estimate_width, font_spec, text_align_name};
    use crate::dom;
    use unencountered_engine::{Rect, Surface, TextStyle};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

    pub struct CanvasSurface {
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        font_family: String,
    }

    impl CanvasSurface {
        /// # Errors
        ///
        /// Returns an error if the element is missing, is not a canvas, or has no 2D context.
        pub fn from_element_id(id: &str, font_family: &str) -> Result<Self, JsValue> {
            let canvas = dom::document()?
                .get_element_by_id(id)
                .ok_or_else(|| JsValue::from_str(&format!("missing #{id} canvas")))?
                .dyn_into::<HtmlCanvasElement>()
                .map_err(|_| JsValue::from_str(&format!("#{id} is not a canvas")))?;
            let ctx = canvas
                .get_context("2d")?
                .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
                .dyn_into::<CanvasRenderingContext2d>()
                .map_err(|_| JsValue::from_str("unexpected context type"))?;
            ctx.set_text_baseline("middle");
            Ok(Self {
                canvas,
                ctx,
                font_family: font_family.to_string(),
            })
        }

        pub fn clear(&mut self) {
            let (w, h) = self.size();
            self.ctx.clear_rect(0.0, 0.0, w, h);
        }

        fn apply_font(&self, style: &TextStyle) {
            self.ctx.set_font(&font_spec(style.size, &self.font_family));
            self.ctx.set_text_align(text_align_name(style.align));
        }
    }

    impl Surface for CanvasSurface {
        fn size(&self) -> (f64, f64) {
            (
                f64::from(self.canvas.width()),
                f64::from(self.canvas.height()),
            )
        }

        fn fill_rect(&mut self, rect: Rect, color: &str) {
            self.ctx.set_fill_style_str(color);
            self.ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
        }

        fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f64) {
            self.ctx.set_stroke_style_str(color);
            self.ctx.set_line_width(line_width);
            self.ctx.stroke_rect(rect.x, rect.y, rect.w, rect.h);
        }

        fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
            self.apply_font(style);
            self.ctx.set_fill_style_str(style.color);
            if let Err(err) = self.ctx.fill_text(text, x, y) {
                log::warn!("fill_text failed: {}", dom::js_error_message(&err));
            }
        }

        fn measure_text(&mut self, text: &str, style: &TextStyle) -> f64 {
            self.apply_font(style);
            self.ctx
                .measure_text(text)
                .map_or_else(|_| estimate_width(text, style.size), |m| m.width())
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn fonts_and_alignment_use_css_names() {
        assert_eq!(font_spec(18.0, "monospace"), "18px monospace");
        assert_eq!(text_align_name(TextAlign::Center), "center");
        assert_eq!(text_align_name(TextAlign::default()), "left");
    }

    #[test]
    fn width_estimate_counts_characters() {
        assert!((estimate_width("Look", 10.0) - 24.0).abs() < f64::EPSILON);
        assert!(estimate_width("", 10.0).abs() < f64::EPSILON);
    }
}
