// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;
use time::Date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Neutral,
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeIcon {
    Circle,
    Clock,
    Check,
    Cross,
    Alert,
    Person,
}

impl BadgeIcon {
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Circle => "○",
            Self::Clock => "◷",
            Self::Check => "✓",
            Self::Cross => "✗",
            Self::Alert => "!",
            Self::Person => "@",
        }
    }
}

/// Status tuple rendered as a colored label with an icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: String,
    pub tone: BadgeTone,
    pub icon: BadgeIcon,
}

impl StatusBadge {
    pub fn new(label: impl Into<String>, tone: BadgeTone, icon: BadgeIcon) -> Self {
        Self {
            label: label.into(),
            tone,
            icon,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Decimal(Option<f64>),
    Date(Option<Date>),
    Bool(bool),
    Status(StatusBadge),
    Empty,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn display(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Decimal(Some(value)) => format!("{value:.1}"),
            Self::Decimal(None) => String::new(),
            Self::Date(Some(value)) => value.to_string(),
            Self::Date(None) => String::new(),
            Self::Bool(true) => "yes".to_owned(),
            Self::Bool(false) => "no".to_owned(),
            Self::Status(badge) => badge.label.clone(),
            Self::Empty => String::new(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Decimal(None) | Self::Date(None) | Self::Empty)
    }

    /// Case-insensitive substring match against the displayed value.
    /// `needle` must already be lowercased.
    pub fn contains_ci(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.display().to_lowercase().contains(needle)
    }

    /// Ordering used by the sort stage. Missing values order first, so a
    /// descending sort is the exact reverse of an ascending one.
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }

        match (self, other) {
            (Self::Integer(left), Self::Integer(right)) => left.cmp(right),
            (Self::Decimal(Some(left)), Self::Decimal(Some(right))) => left.total_cmp(right),
            (Self::Date(left), Self::Date(right)) => left.cmp(right),
            (Self::Bool(left), Self::Bool(right)) => left.cmp(right),
            (Self::Status(left), Self::Status(right)) => left
                .label
                .to_ascii_lowercase()
                .cmp(&right.label.to_ascii_lowercase()),
            (Self::Text(left), Self::Text(right)) => {
                left.to_ascii_lowercase().cmp(&right.to_ascii_lowercase())
            }
            _ => self
                .display()
                .to_ascii_lowercase()
                .cmp(&other.display().to_ascii_lowercase()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Date> for CellValue {
    fn from(value: Date) -> Self {
        Self::Date(Some(value))
    }
}
