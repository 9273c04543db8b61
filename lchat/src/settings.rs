//! Answer settings and the source the session loads them from per request.

use lcommon::SamplingParams;
use lprovider::{DEFAULT_TEMPLATE, PromptTemplate};
use serde::{Deserialize, Serialize};

use crate::{ChatError, ChatFuture};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful, creative, clever, and very friendly assistant. You are familiar with various languages in the world.";
/// Counted in turns, so the default keeps the last nine question/answer pairs.
pub const DEFAULT_MAX_CONVERSATION_CONTEXT_LENGTH: usize = 18;
pub const DEFAULT_MAX_RESPONSE_TOKEN_LENGTH: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerSettings {
    #[serde(alias = "maxConversationContextLength")]
    pub max_conversation_context_length: usize,
    #[serde(alias = "maxResponseTokenLength")]
    pub max_response_token_length: u32,
    pub temperature: f32,
    #[serde(alias = "systemPrompt")]
    pub system_prompt: String,
    #[serde(alias = "modelId")]
    pub model_id: String,
    /// Overrides the stop sequences of the selected prompt template.
    #[serde(alias = "stopSequences", skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

impl Default for AnswerSettings {
    fn default() -> Self {
        Self {
            max_conversation_context_length: DEFAULT_MAX_CONVERSATION_CONTEXT_LENGTH,
            max_response_token_length: DEFAULT_MAX_RESPONSE_TOKEN_LENGTH,
            temperature: DEFAULT_TEMPERATURE,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            model_id: DEFAULT_TEMPLATE.to_string(),
            stop_sequences: None,
        }
    }
}

impl AnswerSettings {
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_max_conversation_context_length(mut self, length: usize) -> Self {
        self.max_conversation_context_length = length;
        self
    }

    pub fn with_max_response_token_length(mut self, length: u32) -> Self {
        self.max_response_token_length = length;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_stop_sequences(mut self, stop_sequences: Vec<String>) -> Self {
        self.stop_sequences = Some(stop_sequences);
        self
    }

    pub fn validate(&self) -> Result<(), ChatError> {
        if self.max_response_token_length == 0 {
            return Err(ChatError::settings(
                "max_response_token_length must be greater than zero",
            ));
        }

        if !self.temperature.is_finite() || !(0.0..=2.0).contains(&self.temperature) {
            return Err(ChatError::settings(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }

        Ok(())
    }

    pub fn sampling_for(&self, template: &PromptTemplate) -> SamplingParams {
        let stop_sequences = self
            .stop_sequences
            .clone()
            .unwrap_or_else(|| template.stop_sequences.clone());

        SamplingParams::new(self.max_response_token_length, self.temperature)
            .with_stop_sequences(stop_sequences)
    }
}

/// Where a session reads its settings at the start of each request.
pub trait SettingsSource: Send + Sync {
    fn load<'a>(&'a self) -> ChatFuture<'a, Result<AnswerSettings, ChatError>>;
}

#[derive(Debug, Clone, Default)]
pub struct FixedSettings {
    settings: AnswerSettings,
}

impl FixedSettings {
    pub fn new(settings: AnswerSettings) -> Self {
        Self { settings }
    }
}

impl SettingsSource for FixedSettings {
    fn load<'a>(&'a self) -> ChatFuture<'a, Result<AnswerSettings, ChatError>> {
        Box::pin(async move { Ok(self.settings.clone()) })
    }
}

#[cfg(test)]
mod tests {
    use lprovider::PromptTemplate;

    use super::*;
    use crate::ChatErrorKind;

    #[test]
    fn defaults_match_documented_values() {
        let settings = AnswerSettings::default();
        assert_eq!(settings.max_conversation_context_length, 18);
        assert_eq!(settings.max_response_token_length, 1000);
        assert_eq!(settings.temperature, 1.0);
        assert_eq!(settings.model_id, "Default");
        assert!(settings.system_prompt.starts_with("You are a helpful"));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn default_window_keeps_whole_exchanges() {
        let mut session = crate::Session::new();
        for index in 0..12 {
            crate::store::commit(&mut session, &format!("q{index}"), &format!("a{index}"));
        }

        let window = session.windowed(AnswerSettings::default().max_conversation_context_length);
        assert_eq!(window.len(), 18);
        assert_eq!(window[0], lprovider::Turn::user("q3"));
        assert_eq!(window[17], lprovider::Turn::assistant("a11"));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let error = AnswerSettings::default()
            .with_temperature(3.5)
            .validate()
            .expect_err("temperature should be rejected");
        assert_eq!(error.kind, ChatErrorKind::Settings);

        let error = AnswerSettings::default()
            .with_max_response_token_length(0)
            .validate()
            .expect_err("zero tokens should be rejected");
        assert_eq!(error.kind, ChatErrorKind::Settings);
    }

    #[test]
    fn sampling_prefers_override_over_template_stops() {
        let template = PromptTemplate::chatml();
        let settings = AnswerSettings::default().with_max_response_token_length(64);
        let sampling = settings.sampling_for(&template);
        assert_eq!(sampling.max_tokens, 64);
        assert_eq!(sampling.stop_sequences, template.stop_sequences);

        let sampling = settings
            .with_stop_sequences(vec!["###".to_string()])
            .sampling_for(&template);
        assert_eq!(sampling.stop_sequences, vec!["###".to_string()]);
    }

    #[test]
    fn settings_accept_camel_case_keys() {
        let settings: AnswerSettings = serde_json::from_str(
            r#"{"maxConversationContextLength": 4, "modelId": "chatml", "temperature": 0.2}"#,
        )
        .expect("settings should decode");
        assert_eq!(settings.max_conversation_context_length, 4);
        assert_eq!(settings.model_id, "chatml");
        assert_eq!(settings.max_response_token_length, 1000);
    }

    #[tokio::test]
    async fn fixed_settings_returns_its_copy() {
        let source = FixedSettings::new(AnswerSettings::default().with_model_id("llama3"));
        let settings = source.load().await.expect("settings should load");
        assert_eq!(settings.model_id, "llama3");
    }
}
