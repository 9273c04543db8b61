use std::time::Duration;

use lcommon::RequestId;

use crate::{AbortReason, ChatError, SessionState};

/// Lifecycle callbacks for one answer request.
///
/// Every request that attaches a listener ends in exactly one of
/// `on_completed`, `on_aborted`, or `on_failed`.
pub trait SessionHooks: Send + Sync {
    fn on_state_change(&self, _request_id: &RequestId, _state: SessionState) {}

    fn on_request_start(&self, _request_id: &RequestId, _model_id: &str) {}

    fn on_stream_start(&self, _request_id: &RequestId) {}

    fn on_malformed_payload(&self, _request_id: &RequestId, _payload: &str) {}

    fn on_completed(&self, _request_id: &RequestId, _deltas: usize, _elapsed: Duration) {}

    fn on_aborted(&self, _request_id: &RequestId, _reason: AbortReason, _elapsed: Duration) {}

    fn on_failed(&self, _request_id: &RequestId, _error: &ChatError, _elapsed: Duration) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSessionHooks;

impl SessionHooks for NoopSessionHooks {}
