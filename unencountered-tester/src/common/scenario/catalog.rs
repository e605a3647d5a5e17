use unencountered_engine::overlays::maze::STAGE_TRANSITION_MS;
use unencountered_engine::overlays::{INVENTORY, SEWER_MAZE};
use unencountered_engine::sandbox::{RUSTY_KEY, TITLE_HOLD_MS, ids, progress};
use unencountered_engine::{EngineState, EventKind};

use super::{Expectation, TestScenario};

const SCENARIOS: &[(&str, &str)] = &[
    ("smoke", "Title card hands over to the lobby and the intro plays"),
    ("title-timeout", "Title card moves on by itself after its hold"),
    ("title-hotkeys", "Overlay hotkeys do nothing on the title card"),
    ("receptionist", "Conversation queues three lines and arms the next phase"),
    ("take-key", "Taking the key moves it into the inventory"),
    ("locked-door", "The door stays shut without the key"),
    ("inventory-overlay", "Inventory hotkey opens and closes the overlay"),
    ("full-run", "Title to ending through the sewer maze"),
];

/// `(name, description)` for every built-in scenario.
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    SCENARIOS.to_vec()
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let description = SCENARIOS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, description)| *description)?;
    let scenario = TestScenario::new(name, description);
    let built = match name {
        "smoke" => smoke(scenario),
        "title-timeout" => scenario
            .tick(TITLE_HOLD_MS + 1.0)
            .expect(Expectation::scene(ids::LOBBY)),
        "title-hotkeys" => scenario
            .keys(&["4", "1"])
            .expect(Expectation::scene(ids::TITLE))
            .expect(Expectation::overlay(None)),
        "receptionist" => receptionist(scenario),
        "take-key" => take_key(scenario),
        "locked-door" => enter_lobby(scenario)
            .keys(&["ArrowDown", "ArrowDown", "Enter"])
            .keys(&["ArrowDown", "ArrowDown", "ArrowDown", "Enter"])
            .expect(Expectation::dialogue("locked tight"))
            .expect(Expectation::Flag {
                name: progress::DOOR_UNLOCKED.to_string(),
                value: None,
            }),
        "inventory-overlay" => enter_lobby(scenario)
            .keys(&["4"])
            .check(Expectation::overlay(Some(INVENTORY)))
            .keys(&["Escape"])
            .expect(Expectation::overlay(None))
            .expect(Expectation::State {
                state: EngineState::Explore,
            }),
        "full-run" => full_run(scenario),
        _ => return None,
    };
    Some(built)
}

/// Title card, then both intro lines.
fn enter_lobby(scenario: TestScenario) -> TestScenario {
    scenario.keys(&["Enter", "Enter", "Enter"])
}

fn smoke(scenario: TestScenario) -> TestScenario {
    scenario
        .keys(&["Enter"])
        .check(Expectation::scene(ids::LOBBY))
        .check(Expectation::State {
            state: EngineState::Dialogue,
        })
        .keys(&["Enter", "Enter"])
        .expect(Expectation::State {
            state: EngineState::Explore,
        })
        .expect(Expectation::flag(progress::LOBBY_VISITED, "true"))
}

fn receptionist(scenario: TestScenario) -> TestScenario {
    enter_lobby(scenario)
        .keys(&["ArrowDown", "Enter", "ArrowDown", "Enter"])
        .check(Expectation::dialogue("Nobody comes here"))
        .keys(&["Enter", "Enter", "Enter"])
        .expect(Expectation::flag(progress::MET_RECEPTIONIST, "true"))
        .expect(Expectation::Events {
            event: EventKind::PhaseReady,
            count: 1,
        })
        .expect(Expectation::Events {
            event: EventKind::NoteAdded,
            count: 1,
        })
}

fn take_key(scenario: TestScenario) -> TestScenario {
    enter_lobby(scenario)
        .keys(&["ArrowDown", "ArrowDown", "ArrowDown", "Enter"])
        .keys(&["ArrowDown", "ArrowDown", "Enter"])
        .check(Expectation::dialogue("rusty key"))
        .keys(&["Enter"])
        .expect(Expectation::Holding {
            item: RUSTY_KEY.to_string(),
        })
        .expect(Expectation::Events {
            event: EventKind::ItemAcquired,
            count: 1,
        })
}

fn full_run(scenario: TestScenario) -> TestScenario {
    let mut scenario = take_key(scenario)
        .keys(&["ArrowUp", "Enter", "ArrowDown", "ArrowDown", "Enter"])
        .check(Expectation::flag(progress::DOOR_UNLOCKED, "true"))
        .keys(&["Enter"])
        .keys(&["ArrowDown", "ArrowDown", "Enter", "ArrowDown", "Enter"])
        .check(Expectation::scene(ids::STREET))
        .keys(&["ArrowDown", "Enter"])
        .check(Expectation::overlay(Some(SEWER_MAZE)));
    for path in ["sdsddssa", "ssddssddssd", "ssddssaassssdddd"] {
        scenario = scenario.walk(path).tick(STAGE_TRANSITION_MS + 1.0);
    }
    scenario
        .check(Expectation::flag(progress::MAZE_SOLVED, "true"))
        .tick(16.0)
        .expect(Expectation::scene(ids::ENDING))
        .expect(Expectation::Events {
            event: EventKind::PuzzleCompleted,
            count: 1,
        })
}
