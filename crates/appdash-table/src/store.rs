// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::cell::CellValue;
use crate::list;

/// A row the table pipeline can read. The id must be unique within a store
/// and stable across re-sorts and filters.
pub trait TableRecord: Clone {
    fn row_id(&self) -> &str;
    fn cell(&self, key: &str) -> CellValue;
}

/// Ordered in-memory rows, the single source of truth for a view.
#[derive(Debug, Clone, PartialEq)]
pub struct RowStore<R> {
    rows: Vec<R>,
}

impl<R> Default for RowStore<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R: TableRecord> RowStore<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.rows.iter().find(|row| row.row_id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.row_id() == id)
    }

    pub fn replace_all(&mut self, rows: Vec<R>) {
        self.rows = rows;
    }

    /// Swaps in a new version of an existing record. Unknown ids are ignored.
    pub fn replace(&mut self, record: R) -> bool {
        let Some(index) = self.position(record.row_id()) else {
            return false;
        };
        self.rows = list::replaced_at(&self.rows, index, record);
        true
    }

    pub fn insert(&mut self, record: R) -> bool {
        if self.contains(record.row_id()) {
            return false;
        }
        self.rows = list::appended(&self.rows, record);
        true
    }

    pub fn upsert(&mut self, record: R) {
        if !self.replace(record.clone()) {
            self.rows = list::appended(&self.rows, record);
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<R> {
        let index = self.position(id)?;
        let removed = self.rows.get(index).cloned();
        self.rows = list::removed_at(&self.rows, index);
        removed
    }
}
