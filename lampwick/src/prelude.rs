//! Common imports for most lampwick applications.

pub use crate::config::{
    ConfigError, ConfigLoader, FileSettingsSource, LampwickConfig, ServerConfig,
};
pub use crate::{
    assistant_turn, build_answer_session, build_answer_session_with,
    build_reloading_answer_session, default_hooks, parse_completion_api, session, system_turn,
    user_turn,
};
pub use crate::{lw_session, lw_turn, lw_turns};
pub use crate::{
    AbortReason, AnswerChannel, AnswerNotification, AnswerSettings, ChatError, ChatErrorKind,
    CompletionApi, CompletionTransport, FixedSettings, FormatterRegistry, LlamaCppEndpoint,
    PromptTemplate, ProviderError, Role, Session, SessionHooks, SessionOutcome,
    SettingsSource, StreamingAnswerSession, Turn, format_prompt,
};
