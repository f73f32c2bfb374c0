// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Copy-on-write list updates. Each helper returns a new vector and leaves
//! the input untouched.

pub fn replaced_at<T: Clone>(items: &[T], index: usize, item: T) -> Vec<T> {
    let mut next = items.to_vec();
    if let Some(slot) = next.get_mut(index) {
        *slot = item;
    }
    next
}

pub fn replaced_by<T: Clone>(items: &[T], item: T, same: impl Fn(&T, &T) -> bool) -> Vec<T> {
    match items.iter().position(|existing| same(existing, &item)) {
        Some(index) => replaced_at(items, index, item),
        None => items.to_vec(),
    }
}

pub fn removed_where<T: Clone>(items: &[T], matches: impl Fn(&T) -> bool) -> Vec<T> {
    items.iter().filter(|item| !matches(item)).cloned().collect()
}

pub fn removed_at<T: Clone>(items: &[T], index: usize) -> Vec<T> {
    items
        .iter()
        .enumerate()
        .filter(|(position, _)| *position != index)
        .map(|(_, item)| item.clone())
        .collect()
}

pub fn appended<T: Clone>(items: &[T], item: T) -> Vec<T> {
    let mut next = Vec::with_capacity(items.len() + 1);
    next.extend_from_slice(items);
    next.push(item);
    next
}

/// Appends `item` unless an existing entry has the same key. Returns `None`
/// for a duplicate.
pub fn appended_unique<T: Clone, K: PartialEq>(
    items: &[T],
    item: T,
    key: impl Fn(&T) -> K,
) -> Option<Vec<T>> {
    let candidate = key(&item);
    if items.iter().any(|existing| key(existing) == candidate) {
        return None;
    }
    Some(appended(items, item))
}
