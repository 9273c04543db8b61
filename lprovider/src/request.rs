//! Prompt requests and the versioned `/completion` request bodies.
//!
//! Completion servers have shipped two request shapes: a legacy one using
//! `max_tokens`, and an extended one using `n_predict` plus explicit `stop`
//! sequences. Which one is sent is a [`CompletionApi`] setting.
//!
//! ```rust
//! use lcommon::SamplingParams;
//! use lprovider::{CompletionApi, PromptRequest};
//!
//! let request = PromptRequest::new("user\nhi\n", SamplingParams::new(64, 0.5));
//! let body = request.to_body(CompletionApi::Extended).expect("body should encode");
//! assert!(body.contains("\"n_predict\":64"));
//! ```

use std::fmt::{Display, Formatter};

use lcommon::SamplingParams;
use serde::{Deserialize, Serialize};

use crate::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionApi {
    #[default]
    Legacy,
    Extended,
}

impl Display for CompletionApi {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Legacy => "legacy",
            Self::Extended => "extended",
        };

        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub formatted_prompt: String,
    pub sampling: SamplingParams,
}

impl PromptRequest {
    pub fn new(formatted_prompt: impl Into<String>, sampling: SamplingParams) -> Self {
        Self {
            formatted_prompt: formatted_prompt.into(),
            sampling,
        }
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.formatted_prompt.is_empty() {
            return Err(ProviderError::invalid_request("prompt must not be empty"));
        }

        if self.sampling.max_tokens == 0 {
            return Err(ProviderError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        if !(0.0..=2.0).contains(&self.sampling.temperature) {
            return Err(ProviderError::invalid_request(
                "temperature must be in the inclusive range 0.0..=2.0",
            ));
        }

        Ok(())
    }

    /// Encodes the streaming request body for `api` as JSON text.
    pub fn to_body(&self, api: CompletionApi) -> Result<String, ProviderError> {
        let encoded = match api {
            CompletionApi::Legacy => serde_json::to_string(&LegacyCompletionBody {
                prompt: &self.formatted_prompt,
                stream: true,
                max_tokens: self.sampling.max_tokens,
                temperature: self.sampling.temperature,
            }),
            CompletionApi::Extended => serde_json::to_string(&ExtendedCompletionBody {
                prompt: &self.formatted_prompt,
                stream: true,
                n_predict: self.sampling.max_tokens,
                temperature: self.sampling.temperature,
                stop: (!self.sampling.stop_sequences.is_empty())
                    .then_some(self.sampling.stop_sequences.as_slice()),
            }),
        };

        encoded.map_err(|err| ProviderError::invalid_request(err.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct LegacyCompletionBody<'a> {
    prompt: &'a str,
    stream: bool,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ExtendedCompletionBody<'a> {
    prompt: &'a str,
    stream: bool,
    n_predict: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn sample_request() -> PromptRequest {
        PromptRequest::new(
            "system\nS\nuser\nhi\n",
            SamplingParams::new(256, 0.5).with_stop_sequence("<|im_end|>"),
        )
    }

    #[test]
    fn legacy_body_uses_max_tokens_and_omits_stop() {
        let body = sample_request()
            .to_body(CompletionApi::Legacy)
            .expect("legacy body");
        let parsed: Value = serde_json::from_str(&body).expect("valid json");

        assert_eq!(
            parsed,
            json!({
                "prompt": "system\nS\nuser\nhi\n",
                "stream": true,
                "max_tokens": 256,
                "temperature": 0.5,
            })
        );
    }

    #[test]
    fn extended_body_uses_n_predict_and_stop_sequences() {
        let body = sample_request()
            .to_body(CompletionApi::Extended)
            .expect("extended body");
        let parsed: Value = serde_json::from_str(&body).expect("valid json");

        assert_eq!(
            parsed,
            json!({
                "prompt": "system\nS\nuser\nhi\n",
                "stream": true,
                "n_predict": 256,
                "temperature": 0.5,
                "stop": ["<|im_end|>"],
            })
        );
    }

    #[test]
    fn extended_body_omits_empty_stop_list() {
        let request = PromptRequest::new("user\nhi\n", SamplingParams::new(8, 1.0));
        let body = request
            .to_body(CompletionApi::Extended)
            .expect("extended body");
        let parsed: Value = serde_json::from_str(&body).expect("valid json");
        assert!(parsed.get("stop").is_none());
    }

    #[test]
    fn validate_rejects_out_of_range_sampling() {
        let zero_tokens = PromptRequest::new("p", SamplingParams::new(0, 1.0));
        assert!(zero_tokens.validate().is_err());

        let hot = PromptRequest::new("p", SamplingParams::new(16, 2.5));
        assert!(hot.validate().is_err());

        let empty = PromptRequest::new("", SamplingParams::new(16, 1.0));
        assert!(empty.validate().is_err());

        assert!(sample_request().validate().is_ok());
    }

    #[test]
    fn completion_api_reads_lowercase_names() {
        let api: CompletionApi = serde_json::from_str("\"extended\"").expect("decode api");
        assert_eq!(api, CompletionApi::Extended);
        assert_eq!(CompletionApi::default().to_string(), "legacy");
    }
}
