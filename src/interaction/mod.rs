//! User interaction surface: prompts and notifications
//!
//! Every prompt is cancellable; cancellation is modeled as `None` and
//! callers must short-circuit the rest of their command when they see it.

use anyhow::Result;
use async_trait::async_trait;
use std::io::{BufRead, Write};

/// Prompts and notifications presented to the user.
#[async_trait]
pub trait Interaction: Send + Sync {
    /// Pick one item from a fixed list. `None` on cancel.
    async fn quick_pick(&self, title: &str, items: &[String]) -> Result<Option<String>>;

    /// Free-text input. `None` on cancel.
    async fn input_box(&self, prompt: &str) -> Result<Option<String>>;

    /// Masked input for secrets. `None` on cancel.
    async fn masked_input(&self, prompt: &str) -> Result<Option<String>>;

    /// Yes/no confirmation. `None` on cancel.
    async fn confirm(&self, prompt: &str) -> Result<Option<bool>>;

    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
}

/// Terminal prompt loop reading from stdin.
///
/// An empty line cancels a prompt, matching the "no value returned"
/// cancellation model.
pub struct TerminalInteraction;

impl TerminalInteraction {
    pub fn new() -> Self {
        Self
    }

    fn read_line(prompt: &str) -> Result<Option<String>> {
        print!("{}: ", prompt);
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().lock().read_line(&mut input)?;
        let input = input.trim();

        if input.is_empty() {
            Ok(None)
        } else {
            Ok(Some(input.to_string()))
        }
    }
}

impl Default for TerminalInteraction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Interaction for TerminalInteraction {
    async fn quick_pick(&self, title: &str, items: &[String]) -> Result<Option<String>> {
        println!("{}", title);
        for (index, item) in items.iter().enumerate() {
            println!("  {}. {}", index + 1, item);
        }

        let Some(answer) = Self::read_line("Choice (empty to cancel)")? else {
            return Ok(None);
        };

        // Accept either the number or the literal item text
        if let Ok(n) = answer.parse::<usize>() {
            if n >= 1 && n <= items.len() {
                return Ok(Some(items[n - 1].clone()));
            }
        }
        Ok(items.iter().find(|i| **i == answer).cloned())
    }

    async fn input_box(&self, prompt: &str) -> Result<Option<String>> {
        Self::read_line(prompt)
    }

    async fn masked_input(&self, prompt: &str) -> Result<Option<String>> {
        let value = rpassword::prompt_password(format!("{}: ", prompt))?;
        let value = value.trim();
        if value.is_empty() {
            Ok(None)
        } else {
            Ok(Some(value.to_string()))
        }
    }

    async fn confirm(&self, prompt: &str) -> Result<Option<bool>> {
        let Some(answer) = Self::read_line(&format!("{} [y/n]", prompt))? else {
            return Ok(None);
        };
        match answer.to_lowercase().as_str() {
            "y" | "yes" => Ok(Some(true)),
            "n" | "no" => Ok(Some(false)),
            _ => Ok(None),
        }
    }

    fn info(&self, message: &str) {
        println!("{}", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("warning: {}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("error: {}", message);
    }
}
