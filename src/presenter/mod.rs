//! Rendering of backend results
//!
//! Presentation is a collaborator of the orchestrator; the terminal
//! implementation prints results as labeled blocks separated by a rule.

use crate::backend::{
    CodeSegmentExplanation, ExplainErrorsResponse, SuggestFixesResponse, TestCase,
};

const RULE: &str = "-----------------------------------------------------------------";

/// Renders the result of each command.
pub trait Presenter: Send + Sync {
    fn walkthrough(&self, segments: &[CodeSegmentExplanation]);
    fn testcases(&self, cases: &[TestCase]);
    fn error_explanation(&self, response: &ExplainErrorsResponse);
    fn fix_suggestion(&self, response: &SuggestFixesResponse);
}

/// Prints results to stdout.
pub struct TerminalPresenter;

impl TerminalPresenter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for TerminalPresenter {
    fn walkthrough(&self, segments: &[CodeSegmentExplanation]) {
        for CodeSegmentExplanation { segment, step } in segments {
            println!("Code segment:\n{}\n", segment);
            println!("Explanation:\n{}\n", step);
        }
        println!("{}", RULE);
    }

    fn testcases(&self, cases: &[TestCase]) {
        println!("Generated test cases:\n");
        for (index, case) in cases.iter().enumerate() {
            println!("Test case {}", index + 1);
            println!(
                "  Input: {}",
                serde_json::to_string_pretty(&case.input).unwrap_or_else(|_| "?".to_string())
            );
            println!("  Expected output: {}", case.expected_output);
            if let Some(explanation) = &case.explanation {
                println!("  Explanation: {}", explanation);
            }
            println!();
        }
        println!("{}", RULE);
    }

    fn error_explanation(&self, response: &ExplainErrorsResponse) {
        println!("Explanation:\n{}\n", response.explanation);
        if !response.possible_causes.is_empty() {
            println!("Possible causes:");
            for cause in &response.possible_causes {
                println!("  - {}", cause);
            }
        }
        println!("{}", RULE);
    }

    fn fix_suggestion(&self, response: &SuggestFixesResponse) {
        println!("Suggested fix:\n{}\n", response.fixed_code);
        if !response.fixes.is_empty() {
            println!("Fixes applied:");
            for fix in &response.fixes {
                println!("  - {}", fix);
            }
        }
        if !response.differences.is_empty() {
            println!("Differences:");
            for difference in &response.differences {
                println!("  - {}", difference);
            }
        }
        println!("{}", RULE);
    }
}
