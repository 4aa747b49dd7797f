//! Todo record model
//!
//! A todo is the single unit of work: a bounded title and description,
//! a priority, a completion status, and creation/update timestamps.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum title length in bytes (the persisted field holds this plus a NUL).
pub const MAX_TITLE_BYTES: usize = 99;

/// Maximum description length in bytes.
pub const MAX_DESC_BYTES: usize = 499;

/// Priority level of a todo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Error, PartialEq)]
#[error("invalid priority '{0}' (expected low, medium, or high)")]
pub struct ParsePriorityError(String);

impl Priority {
    /// Returns a display label for the priority
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Value used in the binary data file
    pub fn wire(&self) -> u32 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    /// Converts a data-file value back to a priority
    pub fn from_wire(value: u32) -> Option<Self> {
        match value {
            1 => Some(Priority::Low),
            2 => Some(Priority::Medium),
            3 => Some(Priority::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ParsePriorityError(s.to_string())),
        }
    }
}

/// Completion status of a todo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pending,
    Completed,
}

impl Status {
    /// Returns true if this status represents completion
    pub fn is_completed(&self) -> bool {
        matches!(self, Status::Completed)
    }

    /// Returns a display label for the status
    pub fn label(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Completed => "Completed",
        }
    }

    /// Value used in the binary data file
    pub fn wire(&self) -> u32 {
        match self {
            Status::Pending => 0,
            Status::Completed => 1,
        }
    }

    /// Converts a data-file value back to a status
    pub fn from_wire(value: u32) -> Option<Self> {
        match value {
            0 => Some(Status::Pending),
            1 => Some(Status::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returns the current time truncated to whole seconds, the resolution the
/// data file stores. Keeps in-memory and persisted timestamps identical.
pub(crate) fn now_secs() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
}

/// A single todo record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier, assigned by the store and never reused
    pub id: u32,

    /// Human-readable title (1 to [`MAX_TITLE_BYTES`] bytes)
    pub title: String,

    /// Optional description (empty string when absent)
    pub description: String,

    /// Priority level
    pub priority: Priority,

    /// Completion status
    pub status: Status,

    /// When the todo was created
    pub created_at: DateTime<Utc>,

    /// When the todo was last modified
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Creates a new pending todo with both timestamps set to now
    pub fn new(id: u32, title: impl Into<String>, description: impl Into<String>, priority: Priority) -> Self {
        let now = now_secs();
        Self {
            id,
            title: title.into(),
            description: description.into(),
            priority,
            status: Status::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes the update timestamp
    pub fn touch(&mut self) {
        self.updated_at = now_secs();
    }

    /// Returns true if the todo has a non-empty description
    pub fn has_description(&self) -> bool {
        !self.description.is_empty()
    }
}
