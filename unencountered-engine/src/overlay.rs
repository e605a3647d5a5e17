//! Modal panels drawn over the scene, at most one at a time.

use crate::context::GameContext;
use crate::events::GameEvent;
use crate::key::Key;
use crate::surface::Surface;
use crate::ui::{self, colors};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A modal panel. While one is active it receives every key press.
pub trait Overlay {
    /// Registry name, also used by hotkeys and commands.
    fn name(&self) -> &str;

    /// Called each time the overlay becomes active.
    fn init(&mut self, _ctx: &mut GameContext<'_>) {}

    fn on_close(&mut self, _ctx: &mut GameContext<'_>) {}

    fn update(&mut self, _dt_ms: f64, _ctx: &mut GameContext<'_>) {}

    fn render(&mut self, surface: &mut dyn Surface);

    fn handle_input(&mut self, key: &Key, ctx: &mut GameContext<'_>) -> bool;

    /// Delivered to every registered overlay, open or not.
    fn on_event(&mut self, _event: &GameEvent, _ctx: &mut GameContext<'_>) {}
}

/// Unread markers drawn over every frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alerts {
    pub message_unread: bool,
    pub call_unread: bool,
}

/// Owns every overlay and tracks which one, if any, is active.
#[derive(Default)]
pub struct OverlayManager {
    overlays: BTreeMap<String, Box<dyn Overlay>>,
    active: Option<String>,
    alerts: Alerts,
}

impl OverlayManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an overlay under its own name.
    ///
    /// Replacing the active overlay closes the old instance and opens the new one.
    pub fn add(&mut self, overlay: Box<dyn Overlay>, ctx: &mut GameContext<'_>) {
        let name = overlay.name().to_string();
        let replacing_active = self.active.as_deref() == Some(name.as_str());
        if replacing_active {
            self.close_active(ctx);
        }
        if self.overlays.insert(name.clone(), overlay).is_some() {
            log::debug!("overlay `{name}` replaced");
        }
        if replacing_active {
            self.show(&name, ctx);
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.overlays.contains_key(name)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.overlays.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Open `name`, closing whatever was open first.
    ///
    /// Returns `false` for unknown names and when `name` is already open.
    pub fn show(&mut self, name: &str, ctx: &mut GameContext<'_>) -> bool {
        if !self.overlays.contains_key(name) {
            log::warn!("show requested for unknown overlay `{name}`");
            return false;
        }
        if self.active.as_deref() == Some(name) {
            return false;
        }
        self.close_active(ctx);
        self.active = Some(name.to_string());
        ctx.set_overlay_active(true);
        if let Some(overlay) = self.overlays.get_mut(name) {
            log::debug!("overlay `{name}` opened");
            overlay.init(ctx);
        }
        true
    }

    /// Close the active overlay, if any.
    pub fn hide(&mut self, ctx: &mut GameContext<'_>) -> bool {
        self.close_active(ctx)
    }

    /// Close `name` if it is active, otherwise open it.
    pub fn toggle(&mut self, name: &str, ctx: &mut GameContext<'_>) {
        if self.active.as_deref() == Some(name) {
            self.close_active(ctx);
        } else {
            self.show(name, ctx);
        }
    }

    pub fn update(&mut self, dt_ms: f64, ctx: &mut GameContext<'_>) {
        if let Some(overlay) = self.active_mut() {
            overlay.update(dt_ms, ctx);
        }
    }

    /// Dim the scene, draw the active overlay, then the alert markers.
    pub fn render(&mut self, surface: &mut dyn Surface) {
        if let Some(overlay) = self.active_mut() {
            let bounds = surface.bounds();
            surface.fill_rect(bounds, colors::SHADE);
            overlay.render(surface);
        }
        ui::draw_alerts(surface, self.alerts);
    }

    /// Forward a key to the active overlay. `false` when nothing is open.
    pub fn handle_input(&mut self, key: &Key, ctx: &mut GameContext<'_>) -> bool {
        match self.active_mut() {
            Some(overlay) => {
                overlay.handle_input(key, ctx);
                true
            }
            None => false,
        }
    }

    /// Deliver an event to every registered overlay.
    pub fn broadcast(&mut self, event: &GameEvent, ctx: &mut GameContext<'_>) {
        for overlay in self.overlays.values_mut() {
            overlay.on_event(event, ctx);
        }
    }

    #[must_use]
    pub const fn alerts(&self) -> Alerts {
        self.alerts
    }

    pub const fn alerts_mut(&mut self) -> &mut Alerts {
        &mut self.alerts
    }

    fn active_mut(&mut self) -> Option<&mut Box<dyn Overlay>> {
        let name = self.active.as_deref()?;
        self.overlays.get_mut(name)
    }

    fn close_active(&mut self, ctx: &mut GameContext<'_>) -> bool {
        let Some(name) = self.active.take() else {
            return false;
        };
        ctx.set_overlay_active(false);
        if let Some(overlay) = self.overlays.get_mut(&name) {
            log::debug!("overlay `{name}` closed");
            overlay.on_close(ctx);
        }
        true
    }
}

impl std::fmt::Debug for OverlayManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayManager")
            .field("overlays", &self.names())
            .field("active", &self.active)
            .field("alerts", &self.alerts)
            .finish()
    }
}
