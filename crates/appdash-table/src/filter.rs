// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::column::ColumnDescriptor;
use crate::store::TableRecord;
use std::collections::BTreeMap;

/// Per-column substring filters plus one optional global filter. Needles are
/// stored trimmed and lowercased; an empty value means "no filter".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    columns: BTreeMap<String, String>,
    global: Option<String>,
}

fn normalize(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

impl FilterState {
    /// Returns `true` when the effective filter changed.
    pub fn set_column(&mut self, key: &str, value: &str) -> bool {
        match normalize(value) {
            Some(needle) => self.columns.insert(key.to_owned(), needle.clone()) != Some(needle),
            None => self.columns.remove(key).is_some(),
        }
    }

    pub fn set_global(&mut self, value: &str) -> bool {
        let next = normalize(value);
        if next == self.global {
            return false;
        }
        self.global = next;
        true
    }

    pub fn clear(&mut self) -> bool {
        let changed = self.is_active();
        self.columns.clear();
        self.global = None;
        changed
    }

    pub fn column(&self, key: &str) -> Option<&str> {
        self.columns.get(key).map(String::as_str)
    }

    pub fn global(&self) -> Option<&str> {
        self.global.as_deref()
    }

    pub fn active_columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(|(key, needle)| (key.as_str(), needle.as_str()))
    }

    pub fn is_active(&self) -> bool {
        !self.columns.is_empty() || self.global.is_some()
    }

    pub fn matches<R: TableRecord>(&self, record: &R, columns: &[ColumnDescriptor]) -> bool {
        let column_match = self
            .columns
            .iter()
            .all(|(key, needle)| record.cell(key).contains_ci(needle));
        if !column_match {
            return false;
        }

        match &self.global {
            Some(needle) => columns
                .iter()
                .filter(|column| column.filterable)
                .any(|column| record.cell(column.key).contains_ci(needle)),
            None => true,
        }
    }

    /// Indices of matching rows, in their original order.
    pub fn apply<R: TableRecord>(&self, rows: &[R], columns: &[ColumnDescriptor]) -> Vec<usize> {
        rows.iter()
            .enumerate()
            .filter(|(_, row)| self.matches(*row, columns))
            .map(|(index, _)| index)
            .collect()
    }
}
