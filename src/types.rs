//! Core types for the task board.

use serde::{Deserialize, Serialize};

/// A persisted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub text: Option<String>,
    /// `true` once the task has been marked done.
    pub status: bool,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.status
    }
}

/// Input for creating a task. Has no id until the store assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub text: Option<String>,
    #[serde(default)]
    pub status: bool,
}

impl NewTask {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: Some(text.into()),
            status: false,
        }
    }

    pub fn with_status(mut self, status: bool) -> Self {
        self.status = status;
        self
    }
}
