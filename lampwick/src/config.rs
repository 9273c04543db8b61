//! Layered configuration for the answer session and its server endpoint.
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. `./lampwick.toml`
//! 3. An explicit file passed to [`ConfigLoader::with_file`]
//! 4. `LAMPWICK_`-prefixed environment variables, `__` separating sections
//!    (`LAMPWICK_ANSWER__MODEL_ID=chatml`)
//!
//! ```rust
//! use lampwick::config::LampwickConfig;
//!
//! let config = LampwickConfig::default();
//! assert_eq!(config.server.endpoint().url(), "http://localhost:8080/completion");
//! assert_eq!(config.answer.max_conversation_context_length, 18);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use lchat::{AnswerSettings, ChatError, ChatFuture, SettingsSource};
use lprovider::{COMPLETION_PATH, CompletionApi, LLAMA_CPP_BASE_URL, LlamaCppEndpoint};
use serde::{Deserialize, Serialize};

pub const PROJECT_CONFIG_FILE: &str = "lampwick.toml";
pub const ENV_PREFIX: &str = "LAMPWICK_";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    NotFound,
    Parse,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub message: String,
}

impl ConfigError {
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::NotFound, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Parse, message)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Invalid, message)
    }
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        ConfigError::parse(value.to_string())
    }
}

impl From<ConfigError> for ChatError {
    fn from(value: ConfigError) -> Self {
        ChatError::settings(value.message)
    }
}

/// Where the completion server lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub path: String,
    pub api: CompletionApi,
    pub connect_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: LLAMA_CPP_BASE_URL.to_string(),
            path: COMPLETION_PATH.to_string(),
            api: CompletionApi::default(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    pub fn endpoint(&self) -> LlamaCppEndpoint {
        LlamaCppEndpoint::new()
            .with_base_url(self.base_url.clone())
            .with_path(self.path.clone())
            .with_api(self.api)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LampwickConfig {
    pub server: ServerConfig,
    pub answer: AnswerSettings,
}

impl LampwickConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("server.base_url must not be empty"));
        }

        self.answer
            .validate()
            .map_err(|error| ConfigError::invalid(error.message))
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    project_file: PathBuf,
    explicit_file: Option<PathBuf>,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            project_file: PathBuf::from(PROJECT_CONFIG_FILE),
            explicit_file: None,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    pub fn with_project_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_file = path.into();
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn explicit_file(&self) -> Option<&Path> {
        self.explicit_file.as_deref()
    }

    pub fn figment(&self) -> Result<Figment, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(LampwickConfig::default()));

        if self.project_file.exists() {
            figment = figment.merge(Toml::file(&self.project_file));
        }

        if let Some(path) = &self.explicit_file {
            if !path.exists() {
                return Err(ConfigError::not_found(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }

        Ok(figment.merge(Env::prefixed(&self.env_prefix).split("__")))
    }

    pub fn load(&self) -> Result<LampwickConfig, ConfigError> {
        let config: LampwickConfig = self.figment()?.extract()?;
        config.validate()?;

        tracing::debug!(
            phase = "config",
            event = "loaded",
            base_url = %config.server.base_url,
            api = %config.server.api,
            model_id = %config.answer.model_id,
            explicit_file = ?self.explicit_file
        );
        Ok(config)
    }
}

/// Reads `[answer]` from the configuration sources on every request.
///
/// File reads run on tokio's blocking pool, so `load` must be awaited inside
/// a tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct FileSettingsSource {
    loader: ConfigLoader,
}

impl FileSettingsSource {
    pub fn new(loader: ConfigLoader) -> Self {
        Self { loader }
    }
}

impl SettingsSource for FileSettingsSource {
    fn load<'a>(&'a self) -> ChatFuture<'a, Result<AnswerSettings, ChatError>> {
        let loader = self.loader.clone();
        Box::pin(async move {
            let config = tokio::task::spawn_blocking(move || loader.load())
                .await
                .map_err(|error| ChatError::settings(format!("settings reload failed: {error}")))??;
            Ok(config.answer)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_llama_cpp() {
        let config = LampwickConfig::default();
        assert_eq!(config.server.base_url, "http://localhost:8080");
        assert_eq!(config.server.api, CompletionApi::Legacy);
        assert_eq!(config.server.connect_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_errors_become_settings_errors() {
        let error = ChatError::from(ConfigError::invalid("bad temperature"));
        assert_eq!(error.kind, lchat::ChatErrorKind::Settings);
        assert_eq!(error.message, "bad temperature");
    }

    #[tokio::test]
    async fn file_settings_reload_reports_missing_file_as_settings_error() {
        let source = FileSettingsSource::new(
            ConfigLoader::new()
                .with_project_file("does-not-exist/lampwick.toml")
                .with_file("does-not-exist/custom.toml"),
        );

        let error = source.load().await.expect_err("missing file should fail");
        assert_eq!(error.kind, lchat::ChatErrorKind::Settings);
        assert!(error.message.contains("custom.toml"));
    }

    #[test]
    fn missing_explicit_file_is_reported() {
        let error = ConfigLoader::new()
            .with_project_file("does-not-exist/lampwick.toml")
            .with_file("does-not-exist/custom.toml")
            .load()
            .expect_err("missing file should fail");
        assert_eq!(error.kind, ConfigErrorKind::NotFound);
    }
}
