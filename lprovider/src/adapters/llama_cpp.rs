//! Endpoint settings for a llama.cpp-style local completion server.

use serde::{Deserialize, Serialize};

use crate::{CompletionApi, PromptRequest, ProviderError, TransportRequest};

pub const LLAMA_CPP_BASE_URL: &str = "http://localhost:8080";
pub const COMPLETION_PATH: &str = "/completion";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlamaCppEndpoint {
    pub base_url: String,
    pub path: String,
    pub api: CompletionApi,
}

impl Default for LlamaCppEndpoint {
    fn default() -> Self {
        Self {
            base_url: LLAMA_CPP_BASE_URL.to_string(),
            path: COMPLETION_PATH.to_string(),
            api: CompletionApi::default(),
        }
    }
}

impl LlamaCppEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_api(mut self, api: CompletionApi) -> Self {
        self.api = api;
        self
    }

    pub fn url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }

    pub fn build_request(&self, request: &PromptRequest) -> Result<TransportRequest, ProviderError> {
        request.validate()?;
        let body = request.to_body(self.api)?;
        Ok(TransportRequest::post_json(self.url(), body).with_header("Accept", "text/event-stream"))
    }
}

#[cfg(test)]
mod tests {
    use lcommon::SamplingParams;
    use serde_json::Value;

    use super::*;
    use crate::HttpMethod;

    #[test]
    fn default_endpoint_targets_local_completion_route() {
        let endpoint = LlamaCppEndpoint::new();
        assert_eq!(endpoint.url(), "http://localhost:8080/completion");
        assert_eq!(endpoint.api, CompletionApi::Legacy);

        let custom = endpoint.with_base_url("http://127.0.0.1:9000/").with_path("v2/completion");
        assert_eq!(custom.url(), "http://127.0.0.1:9000/v2/completion");
    }

    #[test]
    fn build_request_encodes_body_for_configured_api() {
        let endpoint = LlamaCppEndpoint::new().with_api(CompletionApi::Extended);
        let prompt = PromptRequest::new("user\nhi\n", SamplingParams::new(32, 0.5));

        let request = endpoint.build_request(&prompt).expect("request should build");
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "http://localhost:8080/completion");

        let body: Value = serde_json::from_str(&request.body).expect("json body");
        assert_eq!(body["n_predict"], 32);
        assert_eq!(body["stream"], true);
    }

    #[test]
    fn build_request_rejects_invalid_sampling() {
        let endpoint = LlamaCppEndpoint::new();
        let prompt = PromptRequest::new("user\nhi\n", SamplingParams::new(0, 0.5));
        assert!(endpoint.build_request(&prompt).is_err());
    }

    #[test]
    fn endpoint_deserializes_with_partial_fields() {
        let endpoint: LlamaCppEndpoint =
            serde_json::from_str(r#"{"api":"extended"}"#).expect("decode endpoint");
        assert_eq!(endpoint.api, CompletionApi::Extended);
        assert_eq!(endpoint.base_url, LLAMA_CPP_BASE_URL);
    }
}
