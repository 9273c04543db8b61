//! reqwest-based transport for streaming completion endpoints.

use async_stream::try_stream;
use futures_util::StreamExt;
use reqwest::{Client, Method, Response, StatusCode};
use tokio_util::sync::CancellationToken;

use crate::{
    BoxedMessageStream, CompletionTransport, HttpMethod, LineDecoder, ProviderError,
    ProviderFuture, TransportRequest, error_body_message,
};

#[derive(Debug, Clone, Default)]
pub struct HttpCompletionTransport {
    client: Client,
}

impl HttpCompletionTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = error_body_message(&body).unwrap_or_else(|| status_line(status));

        match status {
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                ProviderError::timeout(message)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY | StatusCode::NOT_FOUND => {
                ProviderError::invalid_request(message)
            }
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                ProviderError::unavailable(message)
            }
            _ => ProviderError::transport(message),
        }
    }
}

impl CompletionTransport for HttpCompletionTransport {
    fn send<'a>(
        &'a self,
        request: TransportRequest,
        cancellation: CancellationToken,
    ) -> ProviderFuture<'a, Result<BoxedMessageStream<'a>, ProviderError>> {
        Box::pin(async move {
            let method = match request.method {
                HttpMethod::Get => Method::GET,
                HttpMethod::Post => Method::POST,
            };

            let mut builder = self.client.request(method, &request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }

            tracing::debug!(
                phase = "transport",
                event = "request_start",
                url = %request.url,
                body_bytes = request.body.len()
            );

            let response = tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    return Err(ProviderError::cancelled("request cancelled before response"));
                }
                result = builder.body(request.body).send() => result.map_err(|err| {
                    if err.is_timeout() {
                        ProviderError::timeout(err.to_string())
                    } else {
                        ProviderError::transport(err.to_string())
                    }
                })?,
            };

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            tracing::debug!(
                phase = "transport",
                event = "response_start",
                status = response.status().as_u16()
            );

            let stream = try_stream! {
                let mut chunks = response.bytes_stream();
                let mut lines = LineDecoder::new();

                loop {
                    let next = tokio::select! {
                        biased;
                        _ = cancellation.cancelled() => None,
                        item = chunks.next() => item,
                    };

                    let Some(item) = next else {
                        break;
                    };

                    let bytes = item.map_err(|err| ProviderError::transport(err.to_string()))?;
                    for payload in lines.push(&bytes) {
                        yield payload;
                    }
                }

                if !cancellation.is_cancelled() {
                    if let Some(payload) = lines.finish() {
                        yield payload;
                    }
                }
            };

            Ok(Box::pin(stream) as BoxedMessageStream<'a>)
        })
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::status_line;

    #[test]
    fn status_line_includes_canonical_reason_when_known() {
        assert_eq!(
            status_line(StatusCode::INTERNAL_SERVER_ERROR),
            "500 Internal Server Error"
        );
        assert_eq!(
            status_line(StatusCode::from_u16(599).expect("valid status")),
            "599"
        );
    }
}
