//! Typed game events delivered to subscribers and overlays.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Something that happened in the world that other parts may react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    ItemAcquired { item: String },
    ItemUsed { item: String },
    NoteAdded { title: String, text: String },
    PhaseReady { phase: String },
    PuzzleCompleted { puzzle: String },
}

/// Event discriminant used to filter subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ItemAcquired,
    ItemUsed,
    NoteAdded,
    PhaseReady,
    PuzzleCompleted,
}

impl GameEvent {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ItemAcquired { .. } => EventKind::ItemAcquired,
            Self::ItemUsed { .. } => EventKind::ItemUsed,
            Self::NoteAdded { .. } => EventKind::NoteAdded,
            Self::PhaseReady { .. } => EventKind::PhaseReady,
            Self::PuzzleCompleted { .. } => EventKind::PuzzleCompleted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type EventHandler = Box<dyn FnMut(&GameEvent)>;

struct Listener {
    id: ListenerId,
    filter: Option<EventKind>,
    handler: EventHandler,
}

/// Queue of published events plus the subscribers that observe them.
///
/// Publishing only enqueues. Delivery happens when the owner drains the queue
/// and calls [`EventBus::notify`], so handlers never run re-entrantly.
#[derive(Default)]
pub struct EventBus {
    pending: VecDeque<GameEvent>,
    listeners: Vec<Listener>,
    next_id: u64,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, event: GameEvent) {
        log::debug!("event queued: {event:?}");
        self.pending.push_back(event);
    }

    /// Take every queued event in publish order.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        self.pending.drain(..).collect()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Subscribe to one kind of event, or to everything when `filter` is `None`.
    pub fn subscribe(&mut self, filter: Option<EventKind>, handler: EventHandler) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push(Listener {
            id,
            filter,
            handler,
        });
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|listener| listener.id != id);
        before != self.listeners.len()
    }

    /// Deliver one event to every matching subscriber.
    pub fn notify(&mut self, event: &GameEvent) {
        let kind = event.kind();
        for listener in &mut self.listeners {
            if listener.filter.is_none_or(|filter| filter == kind) {
                (listener.handler)(event);
            }
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.pending)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn filtered_listeners_see_matching_events() {
        let items = Rc::new(RefCell::new(Vec::new()));
        let all = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let sink = Rc::clone(&items);
        bus.subscribe(
            Some(EventKind::ItemAcquired),
            Box::new(move |event| {
                if let GameEvent::ItemAcquired { item } = event {
                    sink.borrow_mut().push(item.clone());
                }
            }),
        );
        let counter = Rc::clone(&all);
        bus.subscribe(None, Box::new(move |_| *counter.borrow_mut() += 1));

        bus.publish(GameEvent::ItemAcquired {
            item: "Key".to_string(),
        });
        bus.publish(GameEvent::PhaseReady {
            phase: "phase2".to_string(),
        });
        assert_eq!(bus.pending(), 2);
        for event in bus.drain() {
            bus.notify(&event);
        }
        assert_eq!(*items.borrow(), vec!["Key".to_string()]);
        assert_eq!(*all.borrow(), 2);
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(GameEvent::NoteAdded {
            title: "Receipt".to_string(),
            text: "Paid in cash.".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "note_added");
        assert_eq!(json["title"], "Receipt");
    }
}
