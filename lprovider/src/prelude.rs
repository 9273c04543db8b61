//! Common `lprovider` imports for downstream crates.

pub use crate::{
    BoxedMessageStream, CompletionApi, CompletionTransport, FormatterRegistry, HttpMethod,
    LlamaCppEndpoint, PromptRequest, PromptTemplate, ProviderError, ProviderErrorKind,
    ProviderFuture, RawMessageStream, Role, StreamEvent, TransportRequest, Turn,
    VecMessageStream, decode_event, format_prompt,
};
pub use lcommon::{BoxFuture, MetadataMap, SamplingParams};
