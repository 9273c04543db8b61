//! Unified facade over the lampwick workspace crates.
//!
//! This crate is designed to be the single dependency for most applications.
//! It re-exports the lampwick crates, loads layered configuration, and wires a
//! ready-to-use streaming answer session for a local llama.cpp server.
//!
//! ```rust,no_run
//! use lampwick::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new().load()?;
//! let answers = build_answer_session(&config)?;
//!
//! let (channel, mut notifications) = AnswerChannel::new();
//! let mut session = Session::new();
//! answers.ask(&channel, &mut session, "Why is the sky blue?").await?;
//!
//! while let Ok(notification) = notifications.try_recv() {
//!     if let Some(answer) = notification.answer() {
//!         println!("{answer}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod macros;

pub mod config;
pub mod prelude;
pub mod runtime;
pub mod util;

pub use lchat;
pub use lcommon;
pub use lobserve;
pub use lprovider;

pub use config::{
    ConfigError, ConfigErrorKind, ConfigLoader, FileSettingsSource, LampwickConfig, ServerConfig,
};
pub use lchat::{
    AbortReason, AnswerChannel, AnswerNotification, AnswerSettings, ChatError, ChatErrorKind,
    FixedSettings, NoopSessionHooks, Session, SessionHooks, SessionOutcome, SessionState,
    SettingsSource, StreamingAnswerSession, StreamingAnswerSessionBuilder,
};
pub use lcommon::{BoxFuture, MetadataMap, RequestId, SamplingParams};
pub use lobserve::{
    FanoutSessionHooks, MetricsSessionHooks, SafeSessionHooks, TracingSessionHooks,
};
pub use lprovider::{
    BoxedMessageStream, CompletionApi, CompletionTransport, FormatterRegistry,
    HttpCompletionTransport, LlamaCppEndpoint, PromptRequest, PromptTemplate, ProviderError,
    ProviderErrorKind, ProviderFuture, Role, StreamEvent, TransportRequest, Turn,
    VecMessageStream, decode_event, format_prompt,
};

pub use runtime::{
    build_answer_session, build_answer_session_with, build_http_transport,
    build_reloading_answer_session, default_hooks,
};
pub use util::{assistant_turn, parse_completion_api, session, system_turn, user_turn};
