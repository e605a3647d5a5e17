//! Scripted key sequences run against the sandbox world.

mod catalog;
pub mod script;

pub use catalog::{get_scenario, list_scenarios};

use serde::{Deserialize, Serialize};
use unencountered_engine::{EngineState, EventKind};

/// One scripted action or mid-run check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// DOM key names, pressed in order.
    Keys { keys: Vec<String> },
    /// WASD-style walk: every character is one key press.
    Walk { path: String },
    /// Advance game time.
    Tick { ms: f64 },
    Goto { scene: String },
    Check { expect: Expectation },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expectation {
    Scene { scene: String },
    Overlay { overlay: Option<String> },
    Flag { name: String, value: Option<String> },
    Holding { item: String },
    Dialogue { contains: String },
    State { state: EngineState },
    Events { event: EventKind, count: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestScenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub expectations: Vec<Expectation>,
}

impl TestScenario {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            steps: Vec::new(),
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub fn keys(mut self, keys: &[&str]) -> Self {
        self.steps.push(Step::Keys {
            keys: keys.iter().map(ToString::to_string).collect(),
        });
        self
    }

    #[must_use]
    pub fn walk(mut self, path: &str) -> Self {
        self.steps.push(Step::Walk {
            path: path.to_string(),
        });
        self
    }

    #[must_use]
    pub fn tick(mut self, ms: f64) -> Self {
        self.steps.push(Step::Tick { ms });
        self
    }

    #[must_use]
    pub fn check(mut self, expect: Expectation) -> Self {
        self.steps.push(Step::Check { expect });
        self
    }

    #[must_use]
    pub fn expect(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }
}

impl Expectation {
    pub fn scene(scene: &str) -> Self {
        Self::Scene {
            scene: scene.to_string(),
        }
    }

    pub fn overlay(overlay: Option<&str>) -> Self {
        Self::Overlay {
            overlay: overlay.map(str::to_string),
        }
    }

    pub fn flag(name: &str, value: &str) -> Self {
        Self::Flag {
            name: name.to_string(),
            value: Some(value.to_string()),
        }
    }

    pub fn dialogue(contains: &str) -> Self {
        Self::Dialogue {
            contains: contains.to_string(),
        }
    }
}
