//! Transport contract between the answer session and the completion server.
//!
//! The lifecycle hooks of a streaming request map onto the returned stream:
//! `send` resolving to `Ok` is the start of the exchange, each `Ok` item is one
//! message in arrival order, the stream yielding `None` is the end (exactly
//! once, after the last message), and an `Err` from `send` or from the stream
//! replaces the end with an error.

use std::fmt::Debug;

use lcommon::MetadataMap;
use tokio_util::sync::CancellationToken;

use crate::{BoxedMessageStream, ProviderError, ProviderFuture};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: MetadataMap,
    pub body: String,
}

impl TransportRequest {
    pub fn post_json(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Post,
            headers: MetadataMap::new(),
            body: body.into(),
        }
        .with_header("Content-Type", "application/json")
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

pub trait CompletionTransport: Send + Sync + Debug {
    /// Issues `request` and returns its payload stream.
    ///
    /// Cancelling `cancellation` abandons the underlying request; an in-flight
    /// stream then ends without yielding further payloads.
    fn send<'a>(
        &'a self,
        request: TransportRequest,
        cancellation: CancellationToken,
    ) -> ProviderFuture<'a, Result<BoxedMessageStream<'a>, ProviderError>>;
}
