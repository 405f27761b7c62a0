//! Command orchestration
//!
//! One handler per user-invocable action. Every handler is a small state
//! machine: `Running` on entry, optionally `Thinking` once the backend is
//! involved, and `Idle` again on every exit path, including early returns,
//! cancellations and caught errors. Nothing escapes a handler uncaught.

use crate::backend::{
    Backend, CodeWalkthroughRequest, ExplainErrorsRequest, GenerateTestCasesRequest,
    SuggestFixesRequest,
};
use crate::credentials::{CredentialResolver, SetupActions};
use crate::editor::{Document, EditorContext};
use crate::interaction::Interaction;
use crate::presenter::Presenter;
use crate::runner::CodeRunner;
use crate::status::{CommandState, StatusIndicator};
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;

/// Holds every collaborator a command needs and sequences them.
pub struct Wingman {
    indicator: StatusIndicator,
    editor: Arc<dyn EditorContext>,
    interaction: Arc<dyn Interaction>,
    presenter: Arc<dyn Presenter>,
    resolver: CredentialResolver,
    runner: CodeRunner,
    backend: Arc<dyn Backend>,
    setup: Arc<dyn SetupActions>,
}

impl Wingman {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        indicator: StatusIndicator,
        editor: Arc<dyn EditorContext>,
        interaction: Arc<dyn Interaction>,
        presenter: Arc<dyn Presenter>,
        resolver: CredentialResolver,
        runner: CodeRunner,
        backend: Arc<dyn Backend>,
        setup: Arc<dyn SetupActions>,
    ) -> Self {
        Self {
            indicator,
            editor,
            interaction,
            presenter,
            resolver,
            runner,
            backend,
            setup,
        }
    }

    pub fn indicator(&self) -> &StatusIndicator {
        &self.indicator
    }

    /// Command boundary: indicator bracketing plus error reporting.
    ///
    /// The `Idle` reset runs regardless of the inner outcome; this is the
    /// invariant every handler relies on.
    async fn at_boundary<F>(&self, label: &str, command: F)
    where
        F: Future<Output = Result<()>>,
    {
        self.indicator.set(CommandState::Running);
        if let Err(e) = command.await {
            tracing::error!("{} failed: {:#}", label, e);
            self.interaction.error(&format!("{} failed: {:#}", label, e));
        }
        self.indicator.set(CommandState::Idle);
    }

    /// The active document, or `None` after notifying the user.
    fn require_document(&self) -> Result<Option<Document>> {
        match self.editor.active_document()? {
            Some(doc) => Ok(Some(doc)),
            None => {
                self.interaction.error("No active editor found");
                Ok(None)
            }
        }
    }

    // ----- code walkthrough -----

    pub async fn ask(&self) {
        self.at_boundary("Code walkthrough", self.ask_inner()).await;
    }

    async fn ask_inner(&self) -> Result<()> {
        let Some(doc) = self.require_document()? else {
            return Ok(());
        };
        if doc.selection.trim().is_empty() {
            self.interaction.warning("No text selected");
            return Ok(());
        }

        self.indicator.set(CommandState::Thinking);
        let config = self.resolver.resolve().await?;

        self.interaction.info("Sending your code to Wingman...");
        let response = self
            .backend
            .code_walkthrough(CodeWalkthroughRequest {
                code: doc.selection,
                language: doc.language_id,
                llm_request: config,
            })
            .await?;

        self.presenter.walkthrough(&response.walkthrough);
        Ok(())
    }

    // ----- test case generation -----

    pub async fn generate_testcases(&self) {
        self.at_boundary("Test case generation", self.generate_testcases_inner())
            .await;
    }

    async fn generate_testcases_inner(&self) -> Result<()> {
        let Some(doc) = self.require_document()? else {
            return Ok(());
        };
        if doc.selection.trim().is_empty() {
            self.interaction.warning("No text selected");
            return Ok(());
        }

        let choices: Vec<String> = (1..=5).map(|n| n.to_string()).collect();
        let Some(picked) = self
            .interaction
            .quick_pick("Select the number of test cases to generate (1-5)", &choices)
            .await?
        else {
            self.interaction.warning("Cancelled test case generation.");
            return Ok(());
        };
        let num_testcases: u32 = picked.parse()?;

        self.indicator.set(CommandState::Thinking);
        let config = self.resolver.resolve().await?;

        self.interaction.info("Sending your code to Wingman...");
        let response = self
            .backend
            .generate_testcases(GenerateTestCasesRequest {
                code: doc.selection,
                num_testcases,
                language: doc.language_id,
                llm_request: config,
            })
            .await?;

        self.presenter.testcases(&response.testcases);
        Ok(())
    }

    // ----- error explanation -----

    pub async fn explain_errors(&self) {
        self.at_boundary("Error explanation", self.explain_errors_inner())
            .await;
    }

    async fn explain_errors_inner(&self) -> Result<()> {
        let Some(doc) = self.require_document()? else {
            return Ok(());
        };
        if doc.text.trim().is_empty() {
            self.interaction.warning("The active file is empty");
            return Ok(());
        }

        // Running arbitrary user code is opt-in.
        let confirmed = self
            .interaction
            .confirm("Wingman needs to run your code to inspect its errors. Continue?")
            .await?;
        if confirmed != Some(true) {
            self.interaction.info("Cancelled error explanation.");
            return Ok(());
        }

        let result = self.runner.run(&doc.path).await;
        if !result.has_error() {
            // No error signal: report success and skip the backend entirely.
            self.interaction
                .info("No errors detected. Your code ran cleanly.");
            return Ok(());
        }

        self.indicator.set(CommandState::Thinking);
        let config = self.resolver.resolve().await?;

        self.interaction.info("Asking Wingman about the error...");
        let response = self
            .backend
            .explain_errors(ExplainErrorsRequest {
                code: doc.text,
                error_message: result.diagnostic_message().to_string(),
                language: doc.language_id,
                llm_request: config,
            })
            .await?;

        self.presenter.error_explanation(&response);
        Ok(())
    }

    // ----- fix suggestion -----

    pub async fn suggest_fixes(&self) {
        self.at_boundary("Fix suggestion", self.suggest_fixes_inner())
            .await;
    }

    async fn suggest_fixes_inner(&self) -> Result<()> {
        let Some(doc) = self.require_document()? else {
            return Ok(());
        };
        if doc.text.trim().is_empty() {
            self.interaction.warning("The active file is empty");
            return Ok(());
        }

        let confirmed = self
            .interaction
            .confirm("Wingman needs to run your code before suggesting fixes. Continue?")
            .await?;
        if confirmed != Some(true) {
            self.interaction.info("Cancelled fix suggestion.");
            return Ok(());
        }

        let result = self.runner.run(&doc.path).await;

        let Some(user_request) = self
            .interaction
            .input_box("Describe the problem you want fixed")
            .await?
        else {
            self.interaction
                .warning("No problem description provided; cancelled fix suggestion.");
            return Ok(());
        };

        self.indicator.set(CommandState::Thinking);
        let config = self.resolver.resolve().await?;

        self.interaction.info("Asking Wingman for a fix...");
        // Unlike error explanation, this always reaches the backend: the
        // free-text request is honored even when no error was detected.
        let response = self
            .backend
            .suggest_fixes(SuggestFixesRequest {
                code: doc.text,
                error_message: result.diagnostic_message().to_string(),
                user_request,
                language: doc.language_id,
                llm_request: config,
            })
            .await?;

        self.presenter.fix_suggestion(&response);

        let apply = self
            .interaction
            .confirm("Apply the suggested fix, replacing the whole file?")
            .await?;
        if apply == Some(true) {
            self.editor.replace_document(&response.fixed_code)?;
            self.interaction.info("Applied the suggested fix.");
        }
        Ok(())
    }

    // ----- setup commands -----

    pub async fn set_provider(&self) {
        self.at_boundary("Provider setup", self.setup.set_provider())
            .await;
    }

    pub async fn set_model(&self) {
        self.at_boundary("Model setup", self.setup.set_model()).await;
    }

    pub async fn set_api_key(&self) {
        self.at_boundary("API key setup", self.setup.set_api_key())
            .await;
    }

    pub async fn reset(&self) {
        self.at_boundary("Reset", self.setup.reset()).await;
    }
}
