// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::error::Error;
use std::fmt;

pub const NAME_ALREADY_EXISTS: &str = "name_already_exists";

const GENERIC_FAILURE: &str = "Something went wrong while saving. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationVariant {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Success,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Error,
        }
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Info,
        }
    }

    pub fn summary(&self) -> String {
        if self.description.is_empty() {
            self.title.clone()
        } else {
            format!("{}: {}", self.title, self.description)
        }
    }
}

/// Fire-and-forget destination for user-facing notifications.
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    Conflict { code: String, message: String },
    Failed(String),
}

impl SaveError {
    pub fn name_exists(name: &str) -> Self {
        Self::Conflict {
            code: NAME_ALREADY_EXISTS.to_owned(),
            message: format!("{name:?} already exists"),
        }
    }

    /// Known codes get a specific message; anything else stays generic.
    pub fn user_message(&self) -> String {
        match self {
            Self::Conflict { code, .. } if code == NAME_ALREADY_EXISTS => {
                "A record with this name already exists. Choose a different name.".to_owned()
            }
            Self::Conflict { .. } | Self::Failed(_) => GENERIC_FAILURE.to_owned(),
        }
    }

    pub fn notification(&self) -> Notification {
        Notification::error("Save failed", self.user_message())
    }
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict { code, message } => write!(f, "conflict ({code}): {message}"),
            Self::Failed(message) => write!(f, "save failed: {message}"),
        }
    }
}

impl Error for SaveError {}

impl From<anyhow::Error> for SaveError {
    fn from(error: anyhow::Error) -> Self {
        Self::Failed(format!("{error:#}"))
    }
}

/// The persistence call. Whether it reaches a network or a file is up to
/// the implementation.
pub trait RecordSink<R> {
    fn save(&mut self, record: &R) -> Result<(), SaveError>;
}

#[cfg(test)]
mod tests {
    use super::{NAME_ALREADY_EXISTS, NotificationVariant, SaveError};

    #[test]
    fn known_conflict_code_gets_specific_message() {
        let error = SaveError::name_exists("Ledger");
        let notification = error.notification();
        assert_eq!(notification.variant, NotificationVariant::Error);
        assert!(notification.description.contains("already exists"));
    }

    #[test]
    fn unknown_codes_fall_back_to_generic_message() {
        let conflict = SaveError::Conflict {
            code: "quota_exceeded".to_owned(),
            message: "too many".to_owned(),
        };
        let failed = SaveError::Failed("disk full".to_owned());
        assert_eq!(conflict.user_message(), failed.user_message());
        assert!(!failed.user_message().contains("disk"));
        assert_ne!(
            SaveError::name_exists("x").user_message(),
            failed.user_message()
        );
        assert_eq!(NAME_ALREADY_EXISTS, "name_already_exists");
    }
}
