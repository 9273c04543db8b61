//! Small convenience constructors for common types.

use crate::{CompletionApi, Role, Session, Turn};

pub fn system_turn(content: impl Into<String>) -> Turn {
    Turn::new(Role::System, content)
}

pub fn user_turn(content: impl Into<String>) -> Turn {
    Turn::new(Role::User, content)
}

pub fn assistant_turn(content: impl Into<String>) -> Turn {
    Turn::new(Role::Assistant, content)
}

pub fn session(turns: impl IntoIterator<Item = Turn>) -> Session {
    Session::with_records(turns.into_iter().collect())
}

pub fn parse_completion_api(value: &str) -> Option<CompletionApi> {
    match value.trim().to_ascii_lowercase().as_str() {
        "legacy" | "max_tokens" => Some(CompletionApi::Legacy),
        "extended" | "n_predict" => Some(CompletionApi::Extended),
        _ => None,
    }
}
