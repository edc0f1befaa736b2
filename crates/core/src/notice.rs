//! User-visible outcome messages.
//!
//! Front ends render a [`Notice`] after every operation instead of inspecting
//! errors themselves.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::registry::ServiceError;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl NoticeLevel {
    /// Short label shown before the message.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "ok",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "error",
        }
    }
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A message for the user plus its severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Danger, message)
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.level, NoticeLevel::Success)
    }

    /// Turn a service result into a notice, using `success` to describe the
    /// value on the happy path.
    pub fn from_result<T>(
        result: &Result<T, ServiceError>,
        success: impl FnOnce(&T) -> String,
    ) -> Self {
        match result {
            Ok(value) => Self::success(success(value)),
            Err(err) => Self::from(err),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

impl From<&ServiceError> for Notice {
    fn from(err: &ServiceError) -> Self {
        // Missing records are usually stale ids from a previous listing.
        let level = if err.is_not_found() {
            NoticeLevel::Warning
        } else {
            NoticeLevel::Danger
        };
        Self::new(level, err.to_string())
    }
}

impl From<ServiceError> for Notice {
    fn from(err: ServiceError) -> Self {
        Self::from(&err)
    }
}
