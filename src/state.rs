//! UI-agnostic chat state types
//!
//! Data structures shared by the widget core and the terminal front end.
//! Nothing in here depends on ratatui or crossterm.

use serde::{Deserialize, Serialize};

/// A rendered line of conversation in the chat log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn new(text: impl Into<String>, role: Role) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Role::User)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Role::Bot)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, Role::Error)
    }
}

/// Who a message is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
    Error,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "You:",
            Role::Bot => "MZU:",
            Role::Error => "!",
        }
    }
}
