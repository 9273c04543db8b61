//! Prompt formatting and streaming transport for local completion servers.
//!
//! ```rust
//! use lcommon::SamplingParams;
//! use lprovider::{LlamaCppEndpoint, PromptRequest, Turn, format_prompt};
//!
//! let prompt = format_prompt(&[Turn::system("Be brief."), Turn::user("hi")], "chatml");
//! let request = PromptRequest::new(prompt, SamplingParams::new(128, 0.7));
//!
//! let transport_request = LlamaCppEndpoint::new()
//!     .build_request(&request)
//!     .expect("request should build");
//! assert_eq!(transport_request.url, "http://localhost:8080/completion");
//! ```

pub mod adapters;
pub mod error;
pub mod model;
pub mod prelude;
pub mod prompt;
pub mod request;
pub mod stream;
pub mod transport;

pub use adapters::llama_cpp::{COMPLETION_PATH, LLAMA_CPP_BASE_URL, LlamaCppEndpoint};
#[cfg(feature = "http-transport")]
pub use adapters::http::HttpCompletionTransport;
pub use error::{ProviderError, ProviderErrorKind, error_body_message};
pub use model::{Role, Turn};
pub use prompt::{
    DEFAULT_TEMPLATE, FormatterRegistry, PromptTemplate, RenderTurn, builtin_registry,
    format_prompt,
};
pub use request::{CompletionApi, PromptRequest};
pub use stream::{
    BoxedMessageStream, LineDecoder, RawMessageStream, StreamEvent, VecMessageStream,
    decode_event, extract_payload,
};
pub use transport::{CompletionTransport, HttpMethod, TransportRequest};

pub type ProviderFuture<'a, T> = lcommon::BoxFuture<'a, T>;
