//! Change Notification
//!
//! Callback registries that let panels and render bindings observe objects
//! and managers without the core knowing about them. Everything runs on the
//! caller's thread; callbacks fire synchronously inside the mutator.

use std::fmt;

use bitflags::bitflags;

/// Handle returned by [`Listeners::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Ordered list of callbacks for one event type
pub struct Listeners<E> {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Box<dyn FnMut(&E)>)>,
}

impl<E> Listeners<E> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            next_id: 0,
            callbacks: Vec::new(),
        }
    }

    /// Register a callback; it is invoked for every emitted event
    pub fn subscribe(&mut self, callback: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns false if the id is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sub, _)| *sub != id);
        self.callbacks.len() != before
    }

    /// Deliver an event to all callbacks in subscription order
    pub fn emit(&mut self, event: &E) {
        for (_, callback) in &mut self.callbacks {
            callback(event);
        }
    }

    /// Number of registered callbacks
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// True if nobody is listening
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("subscribers", &self.callbacks.len())
            .finish()
    }
}

bitflags! {
    /// Accumulated change categories since the last poll
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangeFlags: u8 {
        const TRANSFORM = 1 << 0;
        const PROPERTIES = 1 << 1;
        const SELECTION = 1 << 2;
        const GEOMETRY = 1 << 3;
    }
}

/// Notification raised by a scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectEvent {
    /// Location, rotation, scale or dimensions changed
    TransformChanged,
    /// Name, visibility, lock or material changed
    PropertiesChanged,
    /// Selection highlight toggled
    SelectionChanged(bool),
    /// Fresh render buffers were pushed to the geometry binding
    GeometryUpdated { revision: u64 },
}

impl ObjectEvent {
    /// Change category this event belongs to
    pub fn flag(&self) -> ChangeFlags {
        match self {
            Self::TransformChanged => ChangeFlags::TRANSFORM,
            Self::PropertiesChanged => ChangeFlags::PROPERTIES,
            Self::SelectionChanged(_) => ChangeFlags::SELECTION,
            Self::GeometryUpdated { .. } => ChangeFlags::GEOMETRY,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_emit_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::<u32>::new();

        let first = Rc::clone(&log);
        listeners.subscribe(move |e| first.borrow_mut().push(("first", *e)));
        let second = Rc::clone(&log);
        listeners.subscribe(move |e| second.borrow_mut().push(("second", *e)));

        listeners.emit(&7);
        assert_eq!(*log.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut listeners = Listeners::<()>::new();
        let counter = Rc::clone(&count);
        let id = listeners.subscribe(move |_| *counter.borrow_mut() += 1);

        listeners.emit(&());
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        listeners.emit(&());

        assert_eq!(*count.borrow(), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_event_flags() {
        assert_eq!(ObjectEvent::TransformChanged.flag(), ChangeFlags::TRANSFORM);
        assert_eq!(ObjectEvent::SelectionChanged(true).flag(), ChangeFlags::SELECTION);
        assert_eq!(
            ObjectEvent::GeometryUpdated { revision: 3 }.flag(),
            ChangeFlags::GEOMETRY
        );
    }
}
