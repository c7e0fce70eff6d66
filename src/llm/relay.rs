// src/llm/relay.rs
// Relay an upstream SSE body to the caller byte-for-byte

use axum::body::{Body, Bytes};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use std::io;
use tracing::{debug, error, info};

use super::ProviderId;

/// Wrap an upstream streaming response as a `text/event-stream` reply
///
/// Chunks are forwarded as they arrive without re-framing. An upstream read
/// error ends the relayed stream.
pub fn relay_event_stream(provider: ProviderId, upstream: reqwest::Response) -> Response {
    let upstream_bytes = upstream.bytes_stream();

    let body = async_stream::stream! {
        tokio::pin!(upstream_bytes);
        let mut chunks = 0usize;
        let mut total = 0usize;

        while let Some(chunk) = upstream_bytes.next().await {
            match chunk {
                Ok(bytes) => {
                    chunks += 1;
                    total += bytes.len();
                    yield Ok::<Bytes, io::Error>(bytes);
                }
                Err(e) => {
                    error!(provider = %provider, "Upstream stream error after {} bytes: {}", total, e);
                    yield Err(io::Error::other(e));
                    break;
                }
            }
        }

        debug!(provider = %provider, chunks, "Relay finished");
        info!(provider = %provider, bytes = total, "Stream relayed");
    };

    let mut response = (StatusCode::OK, Body::from_stream(body)).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}
