//! Editor surface the commands operate on
//!
//! Commands never touch the filesystem directly; they go through
//! `EditorContext` so the same orchestration works against any host. The
//! default implementation wraps a file named on the command line.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// The active document: full text plus the current selection.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub text: String,
    pub selection: String,
    pub language_id: String,
}

/// Host-editor operations consumed by the command handlers.
pub trait EditorContext: Send + Sync {
    /// The currently active document, `None` when no editor is focused.
    fn active_document(&self) -> Result<Option<Document>>;

    /// Replace the whole document with `new_text` (used when the user
    /// accepts a suggested fix).
    fn replace_document(&self, new_text: &str) -> Result<()>;
}

/// Language tag for a path, matching what the backend expects.
pub fn language_id_for(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some("py") => "python".to_string(),
        Some("cpp") => "cpp".to_string(),
        Some(other) => other.to_string(),
        None => "plaintext".to_string(),
    }
}

/// File-backed editor context for the CLI.
///
/// The "selection" is an optional 1-indexed inclusive line range; without
/// one the whole file is the selection.
pub struct FileEditor {
    path: PathBuf,
    line_range: Option<(usize, usize)>,
}

impl FileEditor {
    pub fn new(path: PathBuf, line_range: Option<(usize, usize)>) -> Self {
        Self { path, line_range }
    }
}

impl EditorContext for FileEditor {
    fn active_document(&self) -> Result<Option<Document>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        let selection = match self.line_range {
            Some((from, to)) if from >= 1 && from <= to => text
                .lines()
                .skip(from - 1)
                .take(to - from + 1)
                .collect::<Vec<_>>()
                .join("\n"),
            Some(_) => String::new(),
            None => text.clone(),
        };

        Ok(Some(Document {
            language_id: language_id_for(&self.path),
            path: self.path.clone(),
            text,
            selection,
        }))
    }

    fn replace_document(&self, new_text: &str) -> Result<()> {
        std::fs::write(&self.path, new_text)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        tracing::info!("Replaced contents of {}", self.path.display());
        Ok(())
    }
}
