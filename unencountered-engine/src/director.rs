//! Top-level arbiter of scene, overlays and input.
//!
//! Input priority, highest first:
//! 1. an active overlay receives every key;
//! 2. non-gameplay scenes receive raw keys with no hotkeys;
//! 3. overlay hotkeys toggle their overlay;
//! 4. the scene.
//!
//! Scenes and overlays never call back into the director. They queue
//! [`Command`]s and [`GameEvent`]s on their context, which the director
//! applies after the call that produced them returns.

use crate::config::EngineConfig;
use crate::context::{Command, World};
use crate::events::{EventHandler, EventKind, GameEvent, ListenerId};
use crate::flags::FlagStore;
use crate::interaction::InteractionSnapshot;
use crate::key::Key;
use crate::overlay::{Alerts, Overlay, OverlayManager};
use crate::phases::PhaseTracker;
use crate::registry::SceneRegistry;
use crate::scene::{RenderContext, Scene, SceneId, SceneKind};
use crate::surface::Surface;
use crate::timers::Timers;
use crate::ui;
use serde::Serialize;
use thiserror::Error;

/// Upper bound on command/event rounds applied per flush.
const MAX_FLUSH_ROUNDS: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectorError {
    #[error("no scene registered under `{0}`")]
    UnknownScene(SceneId),
}

/// Observable director state for harnesses and the browser test bridge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectorSnapshot {
    pub scene: Option<SceneId>,
    pub scene_kind: Option<SceneKind>,
    pub overlay: Option<String>,
    pub alerts: Alerts,
    pub interaction: Option<InteractionSnapshot>,
    pub generation: u64,
    pub pending_timers: usize,
}

pub struct Director {
    world: World,
    scene: Option<Box<dyn Scene>>,
    scene_id: Option<SceneId>,
    overlays: OverlayManager,
    registry: SceneRegistry,
    timers: Timers,
    config: EngineConfig,
    generation: u64,
}

impl Director {
    #[must_use]
    pub fn new(flags: Box<dyn FlagStore>, registry: SceneRegistry, config: EngineConfig) -> Self {
        let phases = PhaseTracker::new(config.phases.iter().cloned());
        Self {
            world: World::new(flags).with_phases(phases),
            scene: None,
            scene_id: None,
            overlays: OverlayManager::new(),
            registry,
            timers: Timers::new(),
            config,
            generation: 0,
        }
    }

    pub fn add_overlay(&mut self, overlay: Box<dyn Overlay>) {
        let mut ctx = self.world.context(self.overlays.is_active());
        self.overlays.add(overlay, &mut ctx);
        drop(ctx);
        self.flush();
    }

    #[must_use]
    pub fn with_overlay(mut self, overlay: Box<dyn Overlay>) -> Self {
        self.add_overlay(overlay);
        self
    }

    pub fn subscribe(&mut self, filter: Option<EventKind>, handler: EventHandler) -> ListenerId {
        self.world.events_mut().subscribe(filter, handler)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.world.events_mut().unsubscribe(id)
    }

    /// Replace the current scene with one built from the registry.
    ///
    /// # Errors
    ///
    /// Returns [`DirectorError::UnknownScene`] if `id` is not registered. The
    /// current scene is left untouched in that case.
    pub fn goto(&mut self, id: impl Into<SceneId>) -> Result<(), DirectorError> {
        let id = id.into();
        self.switch_to(&id)?;
        self.flush();
        Ok(())
    }

    /// Install a scene that is not in the registry.
    pub fn set_scene(&mut self, scene: Box<dyn Scene>) {
        self.install(scene, None);
        self.flush();
    }

    /// Route one key press. Returns whether anything consumed it.
    pub fn handle_key(&mut self, key: &Key) -> bool {
        let consumed = if self.overlays.is_active() {
            let mut ctx = self.world.context(true);
            self.overlays.handle_input(key, &mut ctx);
            true
        } else if let Some(scene) = self.scene.as_mut() {
            let mut ctx = self.world.context(false);
            if !scene.is_gameplay() {
                scene.handle_input(key, &mut ctx)
            } else if let Some(overlay) = self.config.hotkey_for(key) {
                self.overlays.toggle(overlay, &mut ctx);
                true
            } else {
                scene.handle_input(key, &mut ctx)
            }
        } else {
            false
        };
        self.flush();
        consumed
    }

    /// Advance scene, overlay and timers by `dt_ms` of game time.
    pub fn update(&mut self, dt_ms: f64) {
        let mut ctx = self.world.context(self.overlays.is_active());
        if let Some(scene) = self.scene.as_mut() {
            scene.update(dt_ms, &mut ctx);
        }
        self.overlays.update(dt_ms, &mut ctx);
        drop(ctx);
        for command in self.timers.advance(dt_ms, self.generation) {
            self.world.push(command);
        }
        self.flush();
    }

    /// Draw scene, then overlay and alerts, then the key bar.
    pub fn render(&mut self, surface: &mut dyn Surface) {
        let overlay_active = self.overlays.is_active();
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        let frame = RenderContext {
            flags: self.world.flags(),
            overlay_active,
        };
        scene.render(surface, &frame);
        let shows_key_bar = scene.shows_key_bar();
        self.overlays.render(surface);
        if shows_key_bar && !overlay_active {
            ui::draw_key_bar(surface, &self.config.hotkeys);
        }
    }

    pub fn frame(&mut self, dt_ms: f64, surface: &mut dyn Surface) {
        self.update(dt_ms);
        self.render(surface);
    }

    pub fn show_overlay(&mut self, name: &str) {
        self.world.push(Command::ShowOverlay {
            name: name.to_string(),
        });
        self.flush();
    }

    pub fn toggle_overlay(&mut self, name: &str) {
        self.world.push(Command::ToggleOverlay {
            name: name.to_string(),
        });
        self.flush();
    }

    pub fn hide_overlay(&mut self) {
        self.world.push(Command::HideOverlay);
        self.flush();
    }

    /// Publish an event from outside any scene and deliver it immediately.
    pub fn publish(&mut self, event: GameEvent) {
        self.world.events_mut().publish(event);
        self.flush();
    }

    #[must_use]
    pub fn scene(&self) -> Option<&dyn Scene> {
        self.scene.as_deref()
    }

    #[must_use]
    pub const fn scene_id(&self) -> Option<&SceneId> {
        self.scene_id.as_ref()
    }

    #[must_use]
    pub fn active_overlay(&self) -> Option<&str> {
        self.overlays.active_name()
    }

    #[must_use]
    pub const fn overlays(&self) -> &OverlayManager {
        &self.overlays
    }

    #[must_use]
    pub fn flags(&self) -> &dyn FlagStore {
        self.world.flags()
    }

    pub fn flags_mut(&mut self) -> &mut dyn FlagStore {
        self.world.flags_mut()
    }

    #[must_use]
    pub const fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    /// Story phases, as configured.
    #[must_use]
    pub const fn phases(&self) -> &PhaseTracker {
        self.world.phases()
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Incremented on every scene change.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn snapshot(&self) -> DirectorSnapshot {
        DirectorSnapshot {
            scene: self.scene_id.clone(),
            scene_kind: self.scene.as_ref().map(|scene| scene.kind()),
            overlay: self.overlays.active_name().map(str::to_string),
            alerts: self.overlays.alerts(),
            interaction: self.scene.as_ref().and_then(|scene| scene.interaction()),
            generation: self.generation,
            pending_timers: self.timers.len(),
        }
    }

    fn switch_to(&mut self, id: &SceneId) -> Result<(), DirectorError> {
        let scene = self
            .registry
            .create(id)
            .ok_or_else(|| DirectorError::UnknownScene(id.clone()))?;
        self.install(scene, Some(id.clone()));
        Ok(())
    }

    fn install(&mut self, mut scene: Box<dyn Scene>, id: Option<SceneId>) {
        let overlay_active = self.overlays.is_active();
        if let Some(mut previous) = self.scene.take() {
            let mut ctx = self.world.context(overlay_active);
            previous.destroy(&mut ctx);
        }
        self.generation += 1;
        let dropped = self.timers.cancel_before(self.generation);
        if dropped > 0 {
            log::debug!("cancelled {dropped} timer(s) from the previous scene");
        }
        log::info!(
            "scene -> {} ({:?})",
            id.as_ref().map_or("<unregistered>", SceneId::as_str),
            scene.kind()
        );
        let mut ctx = self.world.context(overlay_active);
        scene.init(&mut ctx);
        self.scene = Some(scene);
        self.scene_id = id;
    }

    /// Apply queued commands and deliver queued events until both queues are empty.
    fn flush(&mut self) {
        for _ in 0..MAX_FLUSH_ROUNDS {
            let issued_in = self.generation;
            let commands = self.world.take_commands();
            let events = self.world.take_events();
            if commands.is_empty() && events.is_empty() {
                return;
            }
            for command in commands {
                self.apply(command, issued_in);
            }
            for event in &events {
                self.dispatch(event);
            }
        }
        log::warn!("command queue still busy after {MAX_FLUSH_ROUNDS} rounds; deferring the rest");
    }

    fn apply(&mut self, command: Command, issued_in: u64) {
        log::trace!("apply {command:?}");
        match command {
            Command::Navigate { scene } => {
                if let Err(err) = self.switch_to(&scene) {
                    log::warn!("navigation failed: {err}");
                }
            }
            Command::NavigateAfter { scene, delay_ms } => {
                self.timers
                    .schedule(delay_ms, Command::Navigate { scene }, issued_in);
            }
            Command::ShowOverlay { name } => {
                let mut ctx = self.world.context(self.overlays.is_active());
                self.overlays.show(&name, &mut ctx);
            }
            Command::ToggleOverlay { name } => {
                let mut ctx = self.world.context(self.overlays.is_active());
                self.overlays.toggle(&name, &mut ctx);
            }
            Command::HideOverlay => {
                let mut ctx = self.world.context(self.overlays.is_active());
                self.overlays.hide(&mut ctx);
            }
            Command::NotifyMessage => self.overlays.alerts_mut().message_unread = true,
            Command::NotifyCall => self.overlays.alerts_mut().call_unread = true,
            Command::ClearMessageAlert => self.overlays.alerts_mut().message_unread = false,
            Command::ClearCallAlert => self.overlays.alerts_mut().call_unread = false,
        }
    }

    fn dispatch(&mut self, event: &GameEvent) {
        self.world.events_mut().notify(event);
        let mut ctx = self.world.context(self.overlays.is_active());
        self.overlays.broadcast(event, &mut ctx);
    }
}

impl std::fmt::Debug for Director {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Director")
            .field("scene", &self.scene_id)
            .field("overlays", &self.overlays)
            .field("registry", &self.registry)
            .field("timers", &self.timers)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
