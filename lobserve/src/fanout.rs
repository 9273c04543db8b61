use std::sync::Arc;
use std::time::Duration;

use lchat::{AbortReason, ChatError, SessionHooks, SessionState};
use lcommon::RequestId;

/// Forwards every callback to each registered hook, in registration order.
#[derive(Clone, Default)]
pub struct FanoutSessionHooks {
    hooks: Vec<Arc<dyn SessionHooks>>,
}

impl FanoutSessionHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, hooks: Arc<dyn SessionHooks>) -> Self {
        self.hooks.push(hooks);
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl SessionHooks for FanoutSessionHooks {
    fn on_state_change(&self, request_id: &RequestId, state: SessionState) {
        for hooks in &self.hooks {
            hooks.on_state_change(request_id, state);
        }
    }

    fn on_request_start(&self, request_id: &RequestId, model_id: &str) {
        for hooks in &self.hooks {
            hooks.on_request_start(request_id, model_id);
        }
    }

    fn on_stream_start(&self, request_id: &RequestId) {
        for hooks in &self.hooks {
            hooks.on_stream_start(request_id);
        }
    }

    fn on_malformed_payload(&self, request_id: &RequestId, payload: &str) {
        for hooks in &self.hooks {
            hooks.on_malformed_payload(request_id, payload);
        }
    }

    fn on_completed(&self, request_id: &RequestId, deltas: usize, elapsed: Duration) {
        for hooks in &self.hooks {
            hooks.on_completed(request_id, deltas, elapsed);
        }
    }

    fn on_aborted(&self, request_id: &RequestId, reason: AbortReason, elapsed: Duration) {
        for hooks in &self.hooks {
            hooks.on_aborted(request_id, reason, elapsed);
        }
    }

    fn on_failed(&self, request_id: &RequestId, error: &ChatError, elapsed: Duration) {
        for hooks in &self.hooks {
            hooks.on_failed(request_id, error, elapsed);
        }
    }
}
