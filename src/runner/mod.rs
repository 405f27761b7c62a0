//! Executes the active source file as a subprocess and classifies the outcome
//!
//! The runner never errors across its boundary: timeouts, non-zero exits and
//! spawn failures are all folded into `ExecutionResult::fatal_error`, with
//! whatever output the process managed to produce.

use crate::interaction::Interaction;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

/// Outcome of one run of the user's file.
///
/// `fatal_error` is non-empty exactly when the process could not be
/// launched, exceeded the timeout, or exited non-zero. Both streams are
/// returned verbatim regardless of content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub fatal_error: String,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when an error signal is present: a fatal error or anything on
    /// stderr. Plain stdout alone does not count as an error.
    pub fn has_error(&self) -> bool {
        !self.fatal_error.trim().is_empty() || !self.stderr.trim().is_empty()
    }

    /// The diagnostic forwarded to the backend: fatal error first, then
    /// stderr, then stdout. Empty when nothing was produced.
    pub fn diagnostic_message(&self) -> &str {
        if !self.fatal_error.trim().is_empty() {
            &self.fatal_error
        } else if !self.stderr.trim().is_empty() {
            &self.stderr
        } else {
            &self.stdout
        }
    }
}

/// File kinds the runner can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageKind {
    Python,
    Cpp,
}

impl LanguageKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "py" => Some(Self::Python),
            "cpp" => Some(Self::Cpp),
            _ => None,
        }
    }

    /// Language tag sent to the backend.
    pub fn language_id(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Cpp => "cpp",
        }
    }
}

/// Build the shell command for a file kind on the current OS.
///
/// This is the only OS-sensitive code path: the interpreter name and the
/// compiled binary invocation differ between Windows and everything else.
pub fn build_command(kind: LanguageKind, source: &Path) -> String {
    build_command_for(kind, source, cfg!(windows))
}

fn build_command_for(kind: LanguageKind, source: &Path, windows: bool) -> String {
    let src = source.display();
    match kind {
        LanguageKind::Python => {
            let interpreter = if windows { "python" } else { "python3" };
            format!("{} \"{}\"", interpreter, src)
        }
        LanguageKind::Cpp => {
            // Fixed binary name next to the source; each compile overwrites
            // the previous binary. Compilation and execution are paired.
            let dir = source.parent().unwrap_or_else(|| Path::new("."));
            let binary = if windows {
                dir.join("wingman_run.exe")
            } else {
                dir.join("wingman_run")
            };
            format!("g++ \"{}\" -o \"{}\" && \"{}\"", src, binary.display(), binary.display())
        }
    }
}

/// Runs a source file with a wall-clock timeout.
pub struct CodeRunner {
    timeout: Duration,
    interaction: Arc<dyn Interaction>,
}

impl CodeRunner {
    pub fn new(timeout: Duration, interaction: Arc<dyn Interaction>) -> Self {
        Self {
            timeout,
            interaction,
        }
    }

    /// Execute `source`. Never fails; see `ExecutionResult`.
    pub async fn run(&self, source: &Path) -> ExecutionResult {
        let Some(kind) = LanguageKind::from_path(source) else {
            self.interaction.warning(&format!(
                "Unsupported file type '{}'; only .py and .cpp files can be run.",
                source
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| format!(".{}", e))
                    .unwrap_or_default()
            ));
            return ExecutionResult::empty();
        };

        let command = build_command(kind, source);
        tracing::debug!("running: {}", command);

        let (shell, shell_arg) = if cfg!(windows) {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };

        let result = tokio::time::timeout(
            self.timeout,
            Command::new(shell)
                .arg(shell_arg)
                .arg(&command)
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();

                if output.status.success() {
                    ExecutionResult {
                        fatal_error: String::new(),
                        stdout,
                        stderr,
                    }
                } else {
                    let code = output
                        .status
                        .code()
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    ExecutionResult {
                        fatal_error: format!("Process exited with code {}", code),
                        stdout,
                        stderr,
                    }
                }
            }
            Ok(Err(e)) => ExecutionResult {
                fatal_error: format!("Failed to launch process: {}", e),
                stdout: String::new(),
                stderr: String::new(),
            },
            Err(_) => ExecutionResult {
                fatal_error: format!(
                    "Process timed out after {} seconds",
                    self.timeout.as_secs()
                ),
                stdout: String::new(),
                stderr: String::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::testing::ScriptedInteraction;
    use std::io::Write;

    fn runner(interaction: Arc<ScriptedInteraction>) -> CodeRunner {
        CodeRunner::new(Duration::from_secs(10), interaction)
    }

    fn write_script(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn kind_from_extension() {
        assert_eq!(
            LanguageKind::from_path(Path::new("a.py")),
            Some(LanguageKind::Python)
        );
        assert_eq!(
            LanguageKind::from_path(Path::new("a.cpp")),
            Some(LanguageKind::Cpp)
        );
        assert_eq!(LanguageKind::from_path(Path::new("a.rs")), None);
        assert_eq!(LanguageKind::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn python_command_per_os() {
        let path = Path::new("/tmp/demo.py");
        assert_eq!(
            build_command_for(LanguageKind::Python, path, false),
            "python3 \"/tmp/demo.py\""
        );
        assert_eq!(
            build_command_for(LanguageKind::Python, path, true),
            "python \"/tmp/demo.py\""
        );
    }

    #[test]
    fn cpp_command_compiles_then_runs_platform_binary() {
        let path = Path::new("/tmp/demo.cpp");
        let unix = build_command_for(LanguageKind::Cpp, path, false);
        assert_eq!(
            unix,
            "g++ \"/tmp/demo.cpp\" -o \"/tmp/wingman_run\" && \"/tmp/wingman_run\""
        );
        let windows = build_command_for(LanguageKind::Cpp, path, true);
        assert!(windows.contains("wingman_run.exe"));
    }

    #[tokio::test]
    async fn unsupported_extension_warns_and_returns_empty() {
        let interaction = Arc::new(ScriptedInteraction::new());
        let result = runner(interaction.clone())
            .run(Path::new("main.rs"))
            .await;

        assert_eq!(result, ExecutionResult::empty());
        assert_eq!(interaction.warnings().len(), 1);
        assert!(interaction.warnings()[0].contains(".rs"));
    }

    #[tokio::test]
    async fn successful_run_returns_streams_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(&dir, "ok.py", "print('hello')\n");

        let interaction = Arc::new(ScriptedInteraction::new());
        let result = runner(interaction).run(&path).await;

        assert_eq!(result.fatal_error, "");
        assert_eq!(result.stdout, "hello\n");
        assert_eq!(result.stderr, "");
        assert!(!result.has_error());
    }

    #[tokio::test]
    async fn nonzero_exit_sets_fatal_error_and_keeps_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(
            &dir,
            "boom.py",
            "import sys\nsys.stderr.write('NameError: x undefined')\nsys.exit(1)\n",
        );

        let interaction = Arc::new(ScriptedInteraction::new());
        let result = runner(interaction).run(&path).await;

        assert!(result.fatal_error.contains("exited with code 1"));
        assert_eq!(result.stdout, "");
        assert_eq!(result.stderr, "NameError: x undefined");
        assert!(result.has_error());
    }

    #[tokio::test]
    async fn timeout_is_folded_into_fatal_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(&dir, "slow.py", "import time\ntime.sleep(30)\n");

        let interaction = Arc::new(ScriptedInteraction::new());
        let runner = CodeRunner::new(Duration::from_secs(1), interaction);
        let result = runner.run(&path).await;

        assert!(result.fatal_error.contains("timed out after 1 seconds"));
    }

    #[test]
    fn diagnostic_message_prefers_fatal_then_stderr_then_stdout() {
        let all = ExecutionResult {
            fatal_error: "fatal".to_string(),
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert_eq!(all.diagnostic_message(), "fatal");

        let no_fatal = ExecutionResult {
            fatal_error: String::new(),
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert_eq!(no_fatal.diagnostic_message(), "err");

        let only_stdout = ExecutionResult {
            fatal_error: String::new(),
            stdout: "out".to_string(),
            stderr: String::new(),
        };
        assert_eq!(only_stdout.diagnostic_message(), "out");

        assert_eq!(ExecutionResult::empty().diagnostic_message(), "");
    }

    #[test]
    fn blank_streams_are_not_an_error_signal() {
        let result = ExecutionResult {
            fatal_error: "  ".to_string(),
            stdout: "output".to_string(),
            stderr: "\n".to_string(),
        };
        assert!(!result.has_error());
        assert_eq!(result.diagnostic_message(), "output");
    }
}
