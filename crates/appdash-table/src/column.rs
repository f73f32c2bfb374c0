// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

pub const DEFAULT_COLUMN_WIDTH: u16 = 16;
pub const DEFAULT_MIN_WIDTH: u16 = 4;
pub const DEFAULT_MAX_WIDTH: u16 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub sortable: bool,
    pub filterable: bool,
    pub default_width: u16,
    pub min_width: u16,
    pub max_width: u16,
}

impl ColumnDescriptor {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            sortable: true,
            filterable: true,
            default_width: DEFAULT_COLUMN_WIDTH,
            min_width: DEFAULT_MIN_WIDTH,
            max_width: DEFAULT_MAX_WIDTH,
        }
    }

    pub const fn width(mut self, default_width: u16) -> Self {
        self.default_width = default_width;
        self
    }

    pub const fn bounds(mut self, min_width: u16, max_width: u16) -> Self {
        self.min_width = min_width;
        self.max_width = max_width;
        self
    }

    pub const fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub const fn unfilterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    pub fn clamp_width(&self, width: u16) -> u16 {
        width.clamp(self.min_width, self.max_width.max(self.min_width))
    }
}

pub fn find_column<'a>(
    columns: &'a [ColumnDescriptor],
    key: &str,
) -> Option<&'a ColumnDescriptor> {
    columns.iter().find(|column| column.key == key)
}

/// Read straight from `[table].resize_mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    #[default]
    #[serde(alias = "onChange")]
    OnChange,
    #[serde(alias = "onEnd")]
    OnEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnState {
    pub visible: bool,
    pub width: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResizeSession {
    key: &'static str,
    pending: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnChange {
    Unchanged,
    Hidden,
    Shown,
    Resized(u16),
    KeepOneVisible,
    UnknownColumn,
}

/// Per-column visibility flags and widths. Purely presentational.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnController {
    columns: Vec<ColumnDescriptor>,
    states: BTreeMap<&'static str, ColumnState>,
    mode: ResizeMode,
    session: Option<ResizeSession>,
}

impl ColumnController {
    pub fn new(columns: &[ColumnDescriptor], mode: ResizeMode) -> Self {
        let states = columns
            .iter()
            .map(|column| {
                (
                    column.key,
                    ColumnState {
                        visible: true,
                        width: column.clamp_width(column.default_width),
                    },
                )
            })
            .collect();
        Self {
            columns: columns.to_vec(),
            states,
            mode,
            session: None,
        }
    }

    pub fn mode(&self) -> ResizeMode {
        self.mode
    }

    pub fn state(&self, key: &str) -> Option<ColumnState> {
        self.states.get(key).copied()
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.states.get(key).is_some_and(|state| state.visible)
    }

    pub fn width(&self, key: &str) -> Option<u16> {
        self.states.get(key).map(|state| state.width)
    }

    /// Visible columns in descriptor order.
    pub fn visible_columns(&self) -> Vec<&ColumnDescriptor> {
        self.columns
            .iter()
            .filter(|column| self.is_visible(column.key))
            .collect()
    }

    pub fn hide(&mut self, key: &str) -> ColumnChange {
        let visible_count = self.visible_columns().len();
        let Some(state) = self.states.get_mut(key) else {
            return ColumnChange::UnknownColumn;
        };
        if !state.visible {
            return ColumnChange::Unchanged;
        }
        if visible_count <= 1 {
            return ColumnChange::KeepOneVisible;
        }
        state.visible = false;
        debug!(column = key, "column hidden");
        ColumnChange::Hidden
    }

    pub fn show(&mut self, key: &str) -> ColumnChange {
        let Some(state) = self.states.get_mut(key) else {
            return ColumnChange::UnknownColumn;
        };
        if state.visible {
            return ColumnChange::Unchanged;
        }
        state.visible = true;
        ColumnChange::Shown
    }

    pub fn toggle_visibility(&mut self, key: &str) -> ColumnChange {
        if self.is_visible(key) {
            self.hide(key)
        } else {
            self.show(key)
        }
    }

    pub fn show_all(&mut self) {
        for state in self.states.values_mut() {
            state.visible = true;
        }
    }

    pub fn resize(&mut self, key: &str, width: u16) -> ColumnChange {
        let Some(column) = find_column(&self.columns, key) else {
            return ColumnChange::UnknownColumn;
        };
        let clamped = column.clamp_width(width);
        let Some(state) = self.states.get_mut(key) else {
            return ColumnChange::UnknownColumn;
        };
        if state.width == clamped {
            return ColumnChange::Unchanged;
        }
        state.width = clamped;
        ColumnChange::Resized(clamped)
    }

    pub fn resize_by(&mut self, key: &str, delta: i32) -> ColumnChange {
        let Some(current) = self.width(key) else {
            return ColumnChange::UnknownColumn;
        };
        let next = (i32::from(current) + delta).clamp(0, i32::from(u16::MAX));
        self.resize(key, next as u16)
    }

    pub fn begin_resize(&mut self, key: &str) -> bool {
        let Some(column) = find_column(&self.columns, key) else {
            return false;
        };
        let Some(state) = self.states.get(key) else {
            return false;
        };
        self.session = Some(ResizeSession {
            key: column.key,
            pending: state.width,
        });
        true
    }

    /// Moves the drag handle. In `OnChange` mode the width applies immediately.
    pub fn drag_to(&mut self, width: u16) -> ColumnChange {
        let Some(session) = self.session else {
            return ColumnChange::Unchanged;
        };
        let clamped = find_column(&self.columns, session.key)
            .map(|column| column.clamp_width(width))
            .unwrap_or(width);
        self.session = Some(ResizeSession {
            pending: clamped,
            ..session
        });
        match self.mode {
            ResizeMode::OnChange => self.resize(session.key, clamped),
            ResizeMode::OnEnd => ColumnChange::Unchanged,
        }
    }

    pub fn end_resize(&mut self) -> ColumnChange {
        let Some(session) = self.session.take() else {
            return ColumnChange::Unchanged;
        };
        self.resize(session.key, session.pending)
    }

    pub fn is_resizing(&self) -> bool {
        self.session.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{ColumnChange, ColumnController, ColumnDescriptor, ResizeMode};

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("id", "ID").width(8).bounds(4, 12),
            ColumnDescriptor::new("name", "Name").width(20).bounds(10, 40),
        ]
    }

    #[test]
    fn resize_clamps_into_bounds() {
        let mut controller = ColumnController::new(&columns(), ResizeMode::OnChange);
        assert_eq!(controller.resize("id", 100), ColumnChange::Resized(12));
        assert_eq!(controller.resize("id", 1), ColumnChange::Resized(4));
        assert_eq!(controller.resize("missing", 10), ColumnChange::UnknownColumn);
    }

    #[test]
    fn hidden_column_keeps_width_when_shown_again() {
        let mut controller = ColumnController::new(&columns(), ResizeMode::OnChange);
        controller.resize("name", 30);
        assert_eq!(controller.hide("name"), ColumnChange::Hidden);
        assert_eq!(controller.visible_columns().len(), 1);
        assert_eq!(controller.show("name"), ColumnChange::Shown);
        assert_eq!(controller.width("name"), Some(30));
    }

    #[test]
    fn last_visible_column_cannot_be_hidden() {
        let mut controller = ColumnController::new(&columns(), ResizeMode::OnChange);
        controller.hide("id");
        assert_eq!(controller.hide("name"), ColumnChange::KeepOneVisible);
        assert!(controller.is_visible("name"));
    }

    #[test]
    fn drag_applies_live_in_on_change_mode() {
        let mut controller = ColumnController::new(&columns(), ResizeMode::OnChange);
        assert!(controller.begin_resize("name"));
        assert_eq!(controller.drag_to(25), ColumnChange::Resized(25));
        assert_eq!(controller.width("name"), Some(25));
        assert_eq!(controller.drag_to(28), ColumnChange::Resized(28));
        assert_eq!(controller.end_resize(), ColumnChange::Unchanged);
        assert!(!controller.is_resizing());
    }

    #[test]
    fn drag_waits_for_release_in_on_end_mode() {
        let mut controller = ColumnController::new(&columns(), ResizeMode::OnEnd);
        controller.begin_resize("name");
        controller.drag_to(35);
        assert_eq!(controller.width("name"), Some(20));
        assert_eq!(controller.end_resize(), ColumnChange::Resized(35));
        assert_eq!(controller.width("name"), Some(35));
    }
}
