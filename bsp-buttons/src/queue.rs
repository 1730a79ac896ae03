//! Outbound event queue.

use heapless::Deque;

use crate::error::QueueError;
use crate::event::Event;

/// Anything that accepts posted events.
pub trait EventSink {
    fn post(&mut self, event: Event) -> Result<(), QueueError>;
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn post(&mut self, event: Event) -> Result<(), QueueError> {
        (**self).post(event)
    }
}

/// Sink used before a queue has been assigned; rejects everything.
pub struct Unassigned;

impl EventSink for Unassigned {
    fn post(&mut self, _event: Event) -> Result<(), QueueError> {
        Err(QueueError::NotConfigured)
    }
}

/// Fixed-capacity FIFO of events.
pub struct EventQueue<const CAP: usize> {
    events: Deque<Event, CAP>,
}

impl<const CAP: usize> EventQueue<CAP> {
    pub const fn new() -> Self {
        Self {
            events: Deque::new(),
        }
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        core::iter::from_fn(move || self.events.pop_front())
    }
}

impl<const CAP: usize> Default for EventQueue<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> EventSink for EventQueue<CAP> {
    fn post(&mut self, event: Event) -> Result<(), QueueError> {
        self.events.push_back(event).map_err(|_| QueueError::Full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventId;

    #[test]
    fn fifo_order() {
        let mut queue = EventQueue::<4>::new();
        queue.post(Event::new(EventId::ButtonPressed, 1)).unwrap();
        queue.post(Event::new(EventId::ButtonReleased, 1)).unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().unwrap().id, EventId::ButtonPressed);
        assert_eq!(queue.pop().unwrap().id, EventId::ButtonReleased);
        assert!(queue.is_empty());
    }

    #[test]
    fn full_queue_rejects_post() {
        let mut queue = EventQueue::<1>::new();
        queue.post(Event::new(EventId::ButtonPressed, 0)).unwrap();
        assert_eq!(
            queue.post(Event::new(EventId::ButtonStuck, 0)),
            Err(QueueError::Full)
        );
        assert_eq!(queue.drain().count(), 1);
    }

    #[test]
    fn unassigned_sink_rejects_post() {
        assert_eq!(
            Unassigned.post(Event::task()),
            Err(QueueError::NotConfigured)
        );
    }
}
