// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

pub type FlagListener = Box<dyn FnMut(&str, bool)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlagListenerId(u64);

/// Feature flags owned by whoever constructs the store and passed down
/// explicitly. Listeners hear about a flag only when its value changes.
#[derive(Default)]
pub struct FlagStore {
    flags: BTreeMap<String, bool>,
    listeners: Vec<(FlagListenerId, FlagListener)>,
    next_listener: u64,
}

impl fmt::Debug for FlagStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagStore")
            .field("flags", &self.flags)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl FlagStore {
    pub fn new(defaults: impl IntoIterator<Item = (String, bool)>) -> Self {
        Self {
            flags: defaults.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Unknown flags read as off.
    pub fn get(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Returns whether the stored value changed.
    pub fn set(&mut self, name: &str, value: bool) -> bool {
        let previous = self.flags.insert(name.to_owned(), value);
        if previous == Some(value) {
            return false;
        }
        info!(flag = name, value, "feature flag changed");
        for (_, listener) in &mut self.listeners {
            listener(name, value);
        }
        true
    }

    pub fn toggle(&mut self, name: &str) -> bool {
        let next = !self.get(name);
        self.set(name, next);
        next
    }

    pub fn subscribe(&mut self, listener: FlagListener) -> FlagListenerId {
        let id = FlagListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: FlagListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::FlagStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store() -> FlagStore {
        FlagStore::new([
            ("bulk_actions".to_owned(), false),
            ("new_scorecard".to_owned(), true),
        ])
    }

    #[test]
    fn unknown_flags_read_as_off() {
        let store = store();
        assert!(!store.get("missing"));
        assert!(store.get("new_scorecard"));
    }

    #[test]
    fn listeners_fire_only_on_change() {
        let mut store = store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(Box::new(move |name, value| {
            sink.borrow_mut().push((name.to_owned(), value));
        }));

        assert!(!store.set("new_scorecard", true));
        assert!(store.toggle("bulk_actions"));
        assert!(!store.toggle("bulk_actions"));

        assert_eq!(
            *seen.borrow(),
            vec![
                ("bulk_actions".to_owned(), true),
                ("bulk_actions".to_owned(), false),
            ]
        );
    }

    #[test]
    fn unsubscribed_listeners_stay_quiet() {
        let mut store = store();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = store.subscribe(Box::new(move |_, _| *sink.borrow_mut() += 1));
        store.toggle("bulk_actions");
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.toggle("bulk_actions");
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn entries_are_sorted_by_name() {
        let mut store = store();
        store.set("alpha", true);
        let names: Vec<&str> = store.entries().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["alpha", "bulk_actions", "new_scorecard"]);
    }
}
