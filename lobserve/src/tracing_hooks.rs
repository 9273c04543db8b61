//! Tracing-based observability hooks for answer session transitions.
//!
//! ```rust
//! use lchat::SessionHooks;
//! use lobserve::TracingSessionHooks;
//!
//! fn accepts_session_hooks(_hooks: &dyn SessionHooks) {}
//!
//! let hooks = TracingSessionHooks;
//! accepts_session_hooks(&hooks);
//! ```

use std::time::Duration;

use lchat::{AbortReason, ChatError, SessionHooks, SessionState};
use lcommon::RequestId;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSessionHooks;

impl SessionHooks for TracingSessionHooks {
    fn on_state_change(&self, request_id: &RequestId, state: SessionState) {
        tracing::debug!(
            phase = "session",
            event = "state_change",
            request_id = %request_id,
            state = ?state
        );
    }

    fn on_request_start(&self, request_id: &RequestId, model_id: &str) {
        tracing::info!(
            phase = "session",
            event = "request_start",
            request_id = %request_id,
            model_id
        );
    }

    fn on_stream_start(&self, request_id: &RequestId) {
        tracing::info!(
            phase = "session",
            event = "stream_start",
            request_id = %request_id
        );
    }

    fn on_malformed_payload(&self, request_id: &RequestId, payload: &str) {
        tracing::debug!(
            phase = "session",
            event = "malformed_payload",
            request_id = %request_id,
            payload
        );
    }

    fn on_completed(&self, request_id: &RequestId, deltas: usize, elapsed: Duration) {
        tracing::info!(
            phase = "session",
            event = "completed",
            request_id = %request_id,
            deltas,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_aborted(&self, request_id: &RequestId, reason: AbortReason, elapsed: Duration) {
        tracing::warn!(
            phase = "session",
            event = "aborted",
            request_id = %request_id,
            reason = %reason,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_failed(&self, request_id: &RequestId, error: &ChatError, elapsed: Duration) {
        tracing::error!(
            phase = "session",
            event = "failed",
            request_id = %request_id,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            error = %error
        );
    }
}
