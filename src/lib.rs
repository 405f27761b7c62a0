//! wingman: AI debugging sidekick
//!
//! This library provides:
//! - Command orchestration for code walkthroughs, test case generation,
//!   error explanations and fix suggestions
//! - Credential resolution against a durable secret store with interactive
//!   fallback
//! - A code runner that executes the active file with a timeout and
//!   classifies the outcome
//! - An HTTP client for the Wingman backend service

pub mod backend;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod editor;
pub mod interaction;
pub mod presenter;
pub mod runner;
pub mod secrets;
pub mod status;

pub use commands::Wingman;
pub use config::Config;
pub use status::{CommandState, StatusIndicator};
