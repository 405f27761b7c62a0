//! Busy/idle status indicator shared by every command

use std::fmt;
use std::sync::{Arc, Mutex};

/// Process-wide command state, rendered as a status label.
///
/// Not persisted across restarts. Every command handler sets `Running` on
/// entry and must restore `Idle` on every exit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandState {
    #[default]
    Idle,
    Thinking,
    Running,
}

impl fmt::Display for CommandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandState::Idle => write!(f, "Idle"),
            CommandState::Thinking => write!(f, "Thinking ..."),
            CommandState::Running => write!(f, "Running ..."),
        }
    }
}

/// Shared status indicator.
///
/// A single value for the whole process. Transitions are guarded by a mutex
/// so concurrent commands serialize their updates; two commands running at
/// once still race at the command level (last writer wins), which is a known
/// limitation of the single shared indicator.
#[derive(Clone, Default)]
pub struct StatusIndicator {
    state: Arc<Mutex<CommandState>>,
}

impl StatusIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, state: CommandState) {
        let mut current = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *current != state {
            tracing::debug!("status: {:?} -> {:?}", *current, state);
            *current = state;
        }
    }

    pub fn get(&self) -> CommandState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Label shown to the user, e.g. in a status line.
    pub fn label(&self) -> String {
        format!("Wingman's {}", self.get())
    }
}
