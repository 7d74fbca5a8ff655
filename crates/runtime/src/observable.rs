//! Host-agnostic reactive values.
//!
//! The host pushes new values in with [`Signal::set`]; subscribers see every
//! change as an old/new pair. Setting an equal value is not a change.

#[derive(Debug, Clone, PartialEq)]
pub struct Change<T> {
    pub old: T,
    pub new: T,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

pub trait Observable<T> {
    fn get(&self) -> &T;

    fn subscribe(&mut self, on_change: Box<dyn FnMut(&Change<T>)>) -> SubscriptionId;

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

pub struct Signal<T> {
    value: T,
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Box<dyn FnMut(&Change<T>)>)>,
}

impl<T: Clone + PartialEq> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            next_id: 0,
            subscribers: Vec::new(),
        }
    }

    /// Stores `value` and notifies subscribers in subscription order.
    ///
    /// Returns `true` if the value changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        let change = Change {
            old: std::mem::replace(&mut self.value, value.clone()),
            new: value,
        };
        for (_, on_change) in &mut self.subscribers {
            on_change(&change);
        }
        true
    }
}

impl<T: Clone + PartialEq> Observable<T> for Signal<T> {
    fn get(&self) -> &T {
        &self.value
    }

    fn subscribe(&mut self, on_change: Box<dyn FnMut(&Change<T>)>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.subscribers.push((id, on_change));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Change, Observable, Signal};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn notifies_old_and_new() {
        let seen: Rc<RefCell<Vec<Change<String>>>> = Rc::default();
        let mut s = Signal::new(String::from("EXPLORE"));
        let sink = Rc::clone(&seen);
        s.subscribe(Box::new(move |c: &Change<String>| sink.borrow_mut().push(c.clone())));

        assert!(s.set("GAME_START".to_string()));
        assert_eq!(
            *seen.borrow(),
            vec![Change {
                old: "EXPLORE".to_string(),
                new: "GAME_START".to_string()
            }]
        );
        assert_eq!(s.get(), "GAME_START");
    }

    #[test]
    fn equal_value_is_not_a_change() {
        let count = Rc::new(RefCell::new(0));
        let mut s = Signal::new(1.0_f64);
        let c = Rc::clone(&count);
        s.subscribe(Box::new(move |_: &Change<f64>| *c.borrow_mut() += 1));

        assert!(!s.set(1.0));
        assert!(s.set(2.0));
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let count = Rc::new(RefCell::new(0));
        let mut s = Signal::new(0u32);
        let c = Rc::clone(&count);
        let id = s.subscribe(Box::new(move |_: &Change<u32>| *c.borrow_mut() += 1));

        assert!(s.unsubscribe(id));
        assert!(!s.unsubscribe(id));
        s.set(5);
        assert_eq!(*count.borrow(), 0);
    }
}
