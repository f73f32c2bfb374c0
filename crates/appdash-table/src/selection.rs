// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::HashSet;
use std::fmt;

pub type SelectionListener = Box<dyn FnMut(&HashSet<String>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Selected row ids, keyed by record id rather than position so membership
/// survives sorting, filtering and paging. Listeners only hear about
/// mutations that change the member set.
#[derive(Default)]
pub struct SelectionTracker {
    selected: HashSet<String>,
    listeners: Vec<(ListenerId, SelectionListener)>,
    next_listener: u64,
}

impl fmt::Debug for SelectionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionTracker")
            .field("selected", &self.selected)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl SelectionTracker {
    pub fn subscribe(&mut self, listener: SelectionListener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ids(&self) -> &HashSet<String> {
        &self.selected
    }

    /// Selected ids in lexical order, for stable output.
    pub fn sorted_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.selected.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Flips membership and reports whether `id` is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        let selected = if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_owned());
            true
        };
        self.notify();
        selected
    }

    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) -> bool {
        let mut changed = false;
        for id in ids {
            changed |= self.selected.insert(id.to_owned());
        }
        if changed {
            self.notify();
        }
        changed
    }

    pub fn clear(&mut self) -> bool {
        if self.selected.is_empty() {
            return false;
        }
        self.selected.clear();
        self.notify();
        true
    }

    /// Drops ids that are no longer present.
    pub fn retain(&mut self, keep: impl Fn(&str) -> bool) -> bool {
        let before = self.selected.len();
        self.selected.retain(|id| keep(id));
        let changed = self.selected.len() != before;
        if changed {
            self.notify();
        }
        changed
    }

    fn notify(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener(&self.selected);
        }
    }
}
