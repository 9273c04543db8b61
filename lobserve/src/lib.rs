//! Production-friendly observability hooks for answer session lifecycles.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use lchat::SessionHooks;
//! use lobserve::{MetricsSessionHooks, SafeSessionHooks, TracingSessionHooks};
//!
//! let _hooks: Arc<dyn SessionHooks> = Arc::new(SafeSessionHooks::new(TracingSessionHooks));
//! let _metrics = MetricsSessionHooks;
//! ```

mod fanout;
mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use fanout::FanoutSessionHooks;
pub use metrics_hooks::MetricsSessionHooks;
pub use safe_hooks::SafeSessionHooks;
pub use tracing_hooks::TracingSessionHooks;

pub mod prelude {
    pub use crate::{
        FanoutSessionHooks, MetricsSessionHooks, SafeSessionHooks, TracingSessionHooks,
    };
}
