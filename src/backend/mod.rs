//! HTTP client for the Wingman backend service
//!
//! One JSON POST per action. Requests embed the resolved credentials as
//! `llm_request`; the backend forwards them to the actual LLM provider.
//! Calls are never retried automatically and rely on the transport's
//! default timeout.

use crate::credentials::LlmConfiguration;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, Serialize)]
pub struct CodeWalkthroughRequest {
    pub code: String,
    pub language: String,
    pub llm_request: LlmConfiguration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodeSegmentExplanation {
    pub segment: String,
    pub step: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodeWalkthroughResponse {
    pub walkthrough: Vec<CodeSegmentExplanation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateTestCasesRequest {
    pub code: String,
    pub num_testcases: u32,
    pub language: String,
    pub llm_request: LlmConfiguration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    /// Arbitrary JSON: the backend returns either a string or a record of
    /// named inputs depending on the code under test.
    pub input: serde_json::Value,
    pub expected_output: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateTestCasesResponse {
    pub testcases: Vec<TestCase>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplainErrorsRequest {
    pub code: String,
    pub error_message: String,
    pub language: String,
    pub llm_request: LlmConfiguration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplainErrorsResponse {
    pub explanation: String,
    #[serde(default)]
    pub possible_causes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestFixesRequest {
    pub code: String,
    pub error_message: String,
    pub user_request: String,
    pub language: String,
    pub llm_request: LlmConfiguration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestFixesResponse {
    pub fixed_code: String,
    #[serde(default)]
    pub fixes: Vec<String>,
    #[serde(default)]
    pub differences: Vec<String>,
}

/// The remote LLM-backed service, one endpoint per action.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn code_walkthrough(
        &self,
        request: CodeWalkthroughRequest,
    ) -> Result<CodeWalkthroughResponse>;

    async fn generate_testcases(
        &self,
        request: GenerateTestCasesRequest,
    ) -> Result<GenerateTestCasesResponse>;

    async fn explain_errors(&self, request: ExplainErrorsRequest)
        -> Result<ExplainErrorsResponse>;

    async fn suggest_fixes(&self, request: SuggestFixesRequest) -> Result<SuggestFixesResponse>;
}

/// reqwest-based backend client.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn post<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Failed to reach the Wingman backend at {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Backend error ({}): {}", status, error_text);
        }

        response
            .json::<Resp>()
            .await
            .context("Failed to parse backend response")
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn code_walkthrough(
        &self,
        request: CodeWalkthroughRequest,
    ) -> Result<CodeWalkthroughResponse> {
        self.post("/code-walkthrough", &request).await
    }

    async fn generate_testcases(
        &self,
        request: GenerateTestCasesRequest,
    ) -> Result<GenerateTestCasesResponse> {
        self.post("/generate-testcases", &request).await
    }

    async fn explain_errors(
        &self,
        request: ExplainErrorsRequest,
    ) -> Result<ExplainErrorsResponse> {
        self.post("/explain-errors", &request).await
    }

    async fn suggest_fixes(&self, request: SuggestFixesRequest) -> Result<SuggestFixesResponse> {
        self.post("/suggest-fixes", &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LlmConfiguration {
        LlmConfiguration {
            provider: "google".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: "sk-test".to_string(),
        }
    }

    #[test]
    fn requests_serialize_snake_case_with_embedded_credentials() {
        let request = SuggestFixesRequest {
            code: "print(x)".to_string(),
            error_message: "NameError: x undefined".to_string(),
            user_request: "it crashes".to_string(),
            language: "python".to_string(),
            llm_request: config(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["error_message"], "NameError: x undefined");
        assert_eq!(json["user_request"], "it crashes");
        assert_eq!(json["llm_request"]["provider"], "google");
        assert_eq!(json["llm_request"]["api_key"], "sk-test");
    }

    #[test]
    fn testcases_request_carries_count() {
        let request = GenerateTestCasesRequest {
            code: "def add(a, b): return a + b".to_string(),
            num_testcases: 3,
            language: "python".to_string(),
            llm_request: config(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["num_testcases"], 3);
    }

    #[test]
    fn responses_tolerate_missing_optional_fields() {
        let explain: ExplainErrorsResponse =
            serde_json::from_str(r#"{"explanation": "x is undefined"}"#).unwrap();
        assert_eq!(explain.explanation, "x is undefined");
        assert!(explain.possible_causes.is_empty());

        let fixes: SuggestFixesResponse =
            serde_json::from_str(r#"{"fixed_code": "x = 1\nprint(x)"}"#).unwrap();
        assert!(fixes.fixes.is_empty());
        assert!(fixes.differences.is_empty());

        let tests: GenerateTestCasesResponse = serde_json::from_str(
            r#"{"testcases": [{"input": {"a": 1, "b": 2}, "expected_output": "3"}]}"#,
        )
        .unwrap();
        assert_eq!(tests.testcases.len(), 1);
        assert!(tests.testcases[0].explanation.is_none());
    }

    #[test]
    fn walkthrough_response_parses_segments() {
        let response: CodeWalkthroughResponse = serde_json::from_str(
            r#"{"walkthrough": [{"segment": "print(x)", "step": "Prints the value of x"}]}"#,
        )
        .unwrap();
        assert_eq!(response.walkthrough.len(), 1);
        assert_eq!(response.walkthrough[0].segment, "print(x)");
    }
}
