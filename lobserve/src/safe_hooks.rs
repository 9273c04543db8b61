use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use lchat::{AbortReason, ChatError, SessionHooks, SessionState};
use lcommon::RequestId;

/// Runs the wrapped hooks and discards any panic they raise.
pub struct SafeSessionHooks<H> {
    inner: H,
}

impl<H> SafeSessionHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> SessionHooks for SafeSessionHooks<H>
where
    H: SessionHooks,
{
    fn on_state_change(&self, request_id: &RequestId, state: SessionState) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_state_change(request_id, state)
        }));
    }

    fn on_request_start(&self, request_id: &RequestId, model_id: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_request_start(request_id, model_id)
        }));
    }

    fn on_stream_start(&self, request_id: &RequestId) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_stream_start(request_id)));
    }

    fn on_malformed_payload(&self, request_id: &RequestId, payload: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_malformed_payload(request_id, payload)
        }));
    }

    fn on_completed(&self, request_id: &RequestId, deltas: usize, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_completed(request_id, deltas, elapsed)
        }));
    }

    fn on_aborted(&self, request_id: &RequestId, reason: AbortReason, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_aborted(request_id, reason, elapsed)
        }));
    }

    fn on_failed(&self, request_id: &RequestId, error: &ChatError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_failed(request_id, error, elapsed)
        }));
    }
}
