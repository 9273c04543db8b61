//! Metrics-based observability hooks for answer sessions.
//!
//! ```rust
//! use lchat::SessionHooks;
//! use lobserve::MetricsSessionHooks;
//!
//! fn accepts_session_hooks(_hooks: &dyn SessionHooks) {}
//!
//! let hooks = MetricsSessionHooks;
//! accepts_session_hooks(&hooks);
//! ```

use std::time::Duration;

use lchat::{AbortReason, ChatError, SessionHooks};
use lcommon::RequestId;

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSessionHooks;

impl SessionHooks for MetricsSessionHooks {
    fn on_request_start(&self, _request_id: &RequestId, model_id: &str) {
        metrics::counter!(
            "lampwick_session_request_start_total",
            "model_id" => model_id.to_string()
        )
        .increment(1);
    }

    fn on_stream_start(&self, _request_id: &RequestId) {
        metrics::counter!("lampwick_session_stream_start_total").increment(1);
    }

    fn on_malformed_payload(&self, _request_id: &RequestId, _payload: &str) {
        metrics::counter!("lampwick_session_malformed_payload_total").increment(1);
    }

    fn on_completed(&self, _request_id: &RequestId, deltas: usize, elapsed: Duration) {
        metrics::counter!("lampwick_session_completed_total").increment(1);
        metrics::histogram!(
            "lampwick_session_duration_seconds",
            "status" => "completed"
        )
        .record(elapsed.as_secs_f64());
        metrics::histogram!("lampwick_session_deltas_per_answer").record(deltas as f64);
    }

    fn on_aborted(&self, _request_id: &RequestId, reason: AbortReason, elapsed: Duration) {
        metrics::counter!(
            "lampwick_session_aborted_total",
            "reason" => reason.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "lampwick_session_duration_seconds",
            "status" => "aborted"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_failed(&self, _request_id: &RequestId, error: &ChatError, elapsed: Duration) {
        metrics::counter!(
            "lampwick_session_failed_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "lampwick_session_duration_seconds",
            "status" => "failed"
        )
        .record(elapsed.as_secs_f64());
    }
}
