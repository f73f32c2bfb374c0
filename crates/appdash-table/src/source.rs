// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    Loading,
    Failed(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str("data is still loading"),
            Self::Failed(message) => write!(f, "data source failed: {message}"),
        }
    }
}

impl Error for SourceError {}

/// The `{data, is_loading, error}` shape a fetch layer hands to a view.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult<T> {
    pub data: Option<Vec<T>>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl<T> FetchResult<T> {
    pub fn ready(data: Vec<T>) -> Self {
        Self {
            data: Some(data),
            is_loading: false,
            error: None,
        }
    }

    pub fn loading() -> Self {
        Self {
            data: None,
            is_loading: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            data: None,
            is_loading: false,
            error: Some(error.into()),
        }
    }

    /// An error wins over loading, and loading wins over data. A finished
    /// fetch with no data yields no rows.
    pub fn into_rows(self) -> Result<Vec<T>, SourceError> {
        if let Some(error) = self.error {
            return Err(SourceError::Failed(error));
        }
        if self.is_loading {
            return Err(SourceError::Loading);
        }
        Ok(self.data.unwrap_or_default())
    }
}
