//! Session record, caller notifications, and answer outcome types.

use std::fmt::{Display, Formatter};

use lprovider::Turn;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

pub type ChatFuture<'a, T> = lcommon::BoxFuture<'a, T>;

/// Caller-visible conversation state.
///
/// Only the completion step of an answer session appends to
/// `conversation_records`, one user turn and one assistant turn at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub conversation_records: Vec<Turn>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(conversation_records: Vec<Turn>) -> Self {
        Self {
            conversation_records,
        }
    }
}

/// Message posted to the caller's channel while an answer streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerNotification {
    Progress { answer: String },
    Completed { session: Session },
    StreamEnd,
}

impl AnswerNotification {
    pub fn is_done(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }

    pub fn answer(&self) -> Option<&str> {
        match self {
            Self::Progress { answer } => Some(answer),
            _ => None,
        }
    }
}

impl Serialize for AnswerNotification {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Progress { answer } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("answer", answer)?;
                map.serialize_entry("done", &false)?;
                map.serialize_entry("session", &None::<Session>)?;
                map.end()
            }
            Self::Completed { session } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("answer", &None::<String>)?;
                map.serialize_entry("done", &true)?;
                map.serialize_entry("session", session)?;
                map.end()
            }
            Self::StreamEnd => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("done", &true)?;
                map.end()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Requesting,
    Streaming,
    Completed,
    Aborted,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted | Self::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The caller asked the channel to stop, or a newer request replaced this one.
    Cancelled,
    /// The caller dropped its end of the channel.
    Disconnected,
    /// The server closed the stream before sending a stop event.
    StreamClosed,
}

impl Display for AbortReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::Cancelled => "cancelled",
            Self::Disconnected => "disconnected",
            Self::StreamClosed => "stream_closed",
        };

        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed {
        answer: String,
    },
    Aborted {
        reason: AbortReason,
        partial_answer: String,
    },
}

impl SessionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}
