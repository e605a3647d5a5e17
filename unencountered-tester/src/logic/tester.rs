use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;
use unencountered_engine::{
    Director, EngineConfig, EventKind, Key, MemoryFlagStore, SceneId, inventory_key, sandbox,
};

use crate::common::scenario::{Expectation, Step, TestScenario};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
}

type EventCounts = Rc<RefCell<HashMap<EventKind, usize>>>;

/// A sandbox director plus a tally of every event it delivered.
struct Run {
    director: Director,
    events: EventCounts,
}

impl Run {
    fn start(config: &EngineConfig) -> Result<Self> {
        let mut director = sandbox::director(Box::new(MemoryFlagStore::new()), config.clone())?;
        let events = EventCounts::default();
        let sink = Rc::clone(&events);
        director.subscribe(
            None,
            Box::new(move |event| {
                *sink.borrow_mut().entry(event.kind()).or_default() += 1;
            }),
        );
        Ok(Self { director, events })
    }

    fn step(&mut self, step: &Step) -> Result<(), String> {
        match step {
            Step::Keys { keys } => {
                for name in keys {
                    self.director.handle_key(&Key::from_dom(name));
                }
            }
            Step::Walk { path } => {
                for c in path.chars() {
                    self.director.handle_key(&Key::Char(c));
                }
            }
            Step::Tick { ms } => self.director.update(*ms),
            Step::Goto { scene } => self
                .director
                .goto(scene.as_str())
                .map_err(|err| err.to_string())?,
            Step::Check { expect } => self.check(expect)?,
        }
        Ok(())
    }

    fn check(&self, expectation: &Expectation) -> Result<(), String> {
        let snapshot = self.director.snapshot();
        let flags = self.director.flags();
        match expectation {
            Expectation::Scene { scene } => {
                let actual = snapshot.scene.as_ref().map(SceneId::as_str);
                expect_eq("scene", actual, Some(scene.as_str()))
            }
            Expectation::Overlay { overlay } => {
                expect_eq("overlay", snapshot.overlay.as_deref(), overlay.as_deref())
            }
            Expectation::Flag { name, value } => expect_eq(
                &format!("flag `{name}`"),
                flags.get(name).as_deref(),
                value.as_deref(),
            ),
            Expectation::Holding { item } => {
                if flags.get_bool(&inventory_key(item)) {
                    Ok(())
                } else {
                    Err(format!("expected to hold `{item}`"))
                }
            }
            Expectation::Dialogue { contains } => {
                let line = snapshot
                    .interaction
                    .and_then(|interaction| interaction.dialogue_line);
                match line {
                    Some(line) if line.contains(contains.as_str()) => Ok(()),
                    other => Err(format!("dialogue {other:?} does not contain `{contains}`")),
                }
            }
            Expectation::State { state } => expect_eq(
                "engine state",
                snapshot.interaction.map(|interaction| interaction.state),
                Some(*state),
            ),
            Expectation::Events { event, count } => {
                let seen = self.events.borrow().get(event).copied().unwrap_or(0);
                expect_eq(&format!("{event:?} events"), seen, *count)
            }
        }
    }
}

fn expect_eq<T>(what: &str, actual: T, expected: T) -> Result<(), String>
where
    T: PartialEq + std::fmt::Debug,
{
    if actual == expected {
        Ok(())
    } else {
        Err(format!("{what}: expected {expected:?}, got {actual:?}"))
    }
}

/// Execute `scenario` on a fresh sandbox.
///
/// # Errors
///
/// Returns a description of the first failed step or expectation.
pub fn run_once(scenario: &TestScenario, config: &EngineConfig) -> Result<(), String> {
    let mut run = Run::start(config).map_err(|err| format!("{err:#}"))?;
    for (index, step) in scenario.steps.iter().enumerate() {
        run.step(step)
            .map_err(|err| format!("step {}: {err}", index + 1))?;
    }
    for expectation in &scenario.expectations {
        run.check(expectation)?;
    }
    Ok(())
}

pub struct LogicTester {
    config: EngineConfig,
    verbose: bool,
}

impl LogicTester {
    pub const fn new(config: EngineConfig, verbose: bool) -> Self {
        Self { config, verbose }
    }

    pub fn run_scenario(&self, scenario: &TestScenario, iterations: usize) -> ScenarioResult {
        if self.verbose {
            println!("🧪 Testing scenario: {}", scenario.name.bright_white());
        }

        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            match run_once(scenario, &self.config) {
                Ok(()) => successes += 1,
                Err(err) => {
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            err.clone().red()
                        );
                    }
                    log::debug!("{} iteration {} failed: {err}", scenario.name, i + 1);
                    failures.push(format!("Iteration {}: {err}", i + 1));
                }
            }
            performance_data.push(start_time.elapsed());
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            passed: failures.is_empty() && iterations > 0,
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}
