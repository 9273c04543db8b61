//! Streaming answer sessions over a local completion server.
//!
//! ```rust
//! use lchat::{AnswerSettings, Session, store};
//! use lprovider::Turn;
//!
//! let mut session = Session::new();
//! store::commit(&mut session, "hi", "hello");
//!
//! let settings = AnswerSettings::default();
//! let turns = store::build_prompt_turns(
//!     session.windowed(settings.max_conversation_context_length),
//!     &settings.system_prompt,
//!     "how are you?",
//! );
//! assert_eq!(turns.len(), 4);
//! assert_eq!(turns[3], Turn::user("how are you?"));
//! ```

mod channel;
mod error;
mod hooks;
mod session;
mod settings;
pub mod store;
mod types;

pub mod prelude {
    pub use crate::{
        AbortReason, AnswerChannel, AnswerNotification, AnswerSettings, ChatError, ChatErrorKind,
        FixedSettings, NoopSessionHooks, Session, SessionHooks, SessionOutcome, SessionState,
        SettingsSource, StreamingAnswerSession, StreamingAnswerSessionBuilder,
    };
    pub use lcommon::RequestId;
}

pub use channel::AnswerChannel;
pub use error::{ChatError, ChatErrorKind};
pub use hooks::{NoopSessionHooks, SessionHooks};
pub use session::{StreamingAnswerSession, StreamingAnswerSessionBuilder};
pub use settings::{
    AnswerSettings, DEFAULT_MAX_CONVERSATION_CONTEXT_LENGTH, DEFAULT_MAX_RESPONSE_TOKEN_LENGTH,
    DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE, FixedSettings, SettingsSource,
};
pub use types::{
    AbortReason, AnswerNotification, ChatFuture, Session, SessionOutcome, SessionState,
};
pub use lcommon::RequestId;
