//! Change notifications
//!
//! Observers are called synchronously, in subscription order, on the thread
//! that mutated the registry. A scaled parameter has already recomputed its
//! output by the time its [`FxEvent::ValueChanged`] is delivered.

use std::fmt;
use std::sync::mpsc;

use crate::groups::GroupPreset;
use crate::params::{Affector, ParameterValue};
use crate::scenes::{Scene, TagConfiguration};

/// Everything observable about the registry and the managers built on it
#[derive(Debug, Clone, PartialEq)]
pub enum FxEvent {
    ItemAdded { address: String },
    ItemRemoved { address: String },
    ValueChanged {
        address: String,
        value: ParameterValue,
        scaled: Option<ParameterValue>,
    },
    ScaleChanged {
        address: String,
        affector: Affector,
        invert: bool,
        scaled: ParameterValue,
    },
    PaletteIndexChanged { address: String, index: i32 },
    UseGlobalPaletteChanged { address: String, enabled: bool },
    GroupChanged(GroupPreset),
    GroupEnabledChanged { address: String, enabled: bool },
    GroupListChanged(Vec<String>),
    SceneLoaded { name: String },
    SceneListUpdated(Vec<Scene>),
    CurrentSceneChanged(Scene),
    CurrentSceneNameChanged { name: String },
    TagConfigurationsUpdated(Vec<TagConfiguration>),
    TempoChanged { bpm: f32 },
    Beat { beat: u64 },
}

pub type SubscriptionId = u64;

type Observer = Box<dyn FnMut(&FxEvent)>;

/// Ordered observer list
#[derive(Default)]
pub struct EventBus {
    observers: Vec<(SubscriptionId, Observer)>,
    next_id: SubscriptionId,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&FxEvent) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Forward every event into a channel, for consumers that drain on their own schedule
    pub fn channel(&mut self) -> (SubscriptionId, mpsc::Receiver<FxEvent>) {
        let (tx, rx) = mpsc::channel();
        let id = self.subscribe(move |event| {
            let _ = tx.send(event.clone());
        });
        (id, rx)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn emit(&mut self, event: FxEvent) {
        tracing::trace!(?event, "fx event");
        for (_, observer) in &mut self.observers {
            observer(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_delivery_order() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(move |_| seen.borrow_mut().push(tag));
        }
        bus.emit(FxEvent::ItemAdded { address: "/a".into() });
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let id = bus.subscribe(|_| {});
        assert_eq!(bus.len(), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert!(bus.is_empty());
    }

    #[test]
    fn test_channel_receives_clones() {
        let mut bus = EventBus::new();
        let (_, rx) = bus.channel();
        bus.emit(FxEvent::Beat { beat: 4 });
        assert_eq!(rx.try_recv(), Ok(FxEvent::Beat { beat: 4 }));
    }
}
