//! Runtime wiring from configuration to a ready answer session.

use std::sync::Arc;

use lchat::{FixedSettings, SessionHooks, SettingsSource, StreamingAnswerSession};
use lobserve::{FanoutSessionHooks, MetricsSessionHooks, SafeSessionHooks, TracingSessionHooks};
use lprovider::{CompletionTransport, FormatterRegistry, HttpCompletionTransport, ProviderError};
use reqwest::Client;

use crate::config::{ConfigError, ConfigLoader, FileSettingsSource, LampwickConfig, ServerConfig};

/// Tracing and metrics hooks, each isolated from the session by `catch_unwind`.
pub fn default_hooks() -> Arc<dyn SessionHooks> {
    Arc::new(SafeSessionHooks::new(
        FanoutSessionHooks::new()
            .with(Arc::new(TracingSessionHooks))
            .with(Arc::new(MetricsSessionHooks)),
    ))
}

pub fn build_http_transport(
    server: &ServerConfig,
) -> Result<Arc<dyn CompletionTransport>, ProviderError> {
    let client = Client::builder()
        .connect_timeout(server.connect_timeout())
        .build()
        .map_err(|err| ProviderError::transport(err.to_string()))?;

    Ok(Arc::new(HttpCompletionTransport::new(client)))
}

/// Session with settings fixed to `config.answer`.
pub fn build_answer_session(
    config: &LampwickConfig,
) -> Result<StreamingAnswerSession, ProviderError> {
    let settings = Arc::new(FixedSettings::new(config.answer.clone()));
    build_answer_session_with(&config.server, settings, default_hooks())
}

/// Session that re-reads `[answer]` through `loader` at the start of every request.
pub fn build_reloading_answer_session(
    loader: ConfigLoader,
) -> Result<StreamingAnswerSession, ConfigError> {
    let config = loader.load()?;
    let settings = Arc::new(FileSettingsSource::new(loader));

    build_answer_session_with(&config.server, settings, default_hooks())
        .map_err(|error| ConfigError::invalid(error.message))
}

pub fn build_answer_session_with(
    server: &ServerConfig,
    settings: Arc<dyn SettingsSource>,
    hooks: Arc<dyn SessionHooks>,
) -> Result<StreamingAnswerSession, ProviderError> {
    let transport = build_http_transport(server)?;

    tracing::info!(
        phase = "runtime",
        event = "session_built",
        url = %server.endpoint().url(),
        api = %server.api
    );

    Ok(StreamingAnswerSession::builder(transport, settings)
        .endpoint(server.endpoint())
        .formatters(Arc::new(FormatterRegistry::with_builtin_templates()))
        .hooks(hooks)
        .build())
}
