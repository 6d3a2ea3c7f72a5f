// Chunked frame streaming utilities
use crate::domain::fragment::Frame;
use crate::infrastructure::http_response::brotli;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;

pub const CONTENT_TYPE: &str = "application/x-monitor-frames";

/// Create a chunked response with one length-prefixed frame per item
pub fn chunked_frame_stream<S>(stream: S, compress: bool) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = Arc<Frame>> + Send + 'static,
{
    let byte_stream = stream.then(move |frame| async move { serialize_chunk(&frame, compress).await });

    let body = Body::from_stream(byte_stream);

    // Chunks are compressed individually, so no Content-Encoding on the
    // response itself
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, CONTENT_TYPE)
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize one frame: 4-byte big-endian length, then the JSON payload
async fn serialize_chunk(frame: &Frame, compress: bool) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(frame)?;

    let payload = if compress { brotli(json).await? } else { json };

    let length = u32::try_from(payload.len())
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidData, "frame too large"))?;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Stream the current frame, then every newly published one until the
/// publisher goes away
pub fn stream_from_watch(mut rx: watch::Receiver<Arc<Frame>>, compress: bool) -> impl IntoResponse {
    let stream = async_stream::stream! {
        let current = rx.borrow_and_update().clone();
        yield current;
        while rx.changed().await.is_ok() {
            let frame = rx.borrow_and_update().clone();
            yield frame;
        }
    };

    match chunked_frame_stream(stream, compress) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
