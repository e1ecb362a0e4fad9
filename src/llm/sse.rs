//! Minimal SSE decoder for provider response byte streams.
//!
//! Splits the incoming bytes on blank lines and collects `data:` field values
//! for each event. Comment lines (leading `:`) and unknown fields are
//! ignored, which is all the OpenAI-style streaming endpoints need.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;

/// A decoded SSE event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Concatenated `data:` payload for the event.
    pub data: String,
}

/// Adapter that turns a byte stream into a stream of SSE events.
pub struct SseEventStream<S> {
    inner: S,
    buffer: String,
    ended: bool,
}

impl<S> SseEventStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: String::new(),
            ended: false,
        }
    }

    /// Append a chunk, normalizing line endings to bare LF.
    ///
    /// A `\r\n` pair may arrive split across two chunks.
    fn push_chunk(&mut self, chunk: &str) {
        let mut chunk = chunk;
        if self.buffer.ends_with('\r') && chunk.starts_with('\n') {
            self.buffer.pop();
            self.buffer.push('\n');
            chunk = &chunk[1..];
        }
        self.buffer.push_str(&chunk.replace("\r\n", "\n"));
    }

    /// Pop the next complete event (terminated by a blank line) off the buffer.
    fn next_event(&mut self) -> Option<SseEvent> {
        // Events are delimited by an empty line; the buffer is LF-normalized.
        let boundary = self.buffer.find("\n\n")?;
        let raw: String = self.buffer.drain(..boundary + 2).collect();

        let mut data_lines = Vec::new();
        for line in raw.lines() {
            // A lone \r can survive normalization when the stream ends mid-pair
            let line = line.trim_end_matches('\r');
            if let Some(value) = line.strip_prefix("data:") {
                data_lines.push(value.strip_prefix(' ').unwrap_or(value));
            }
        }

        // Comment-only events decode to empty data; callers skip those.
        Some(SseEvent {
            data: data_lines.join("\n"),
        })
    }
}

impl<S> Stream for SseEventStream<S>
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Unpin,
{
    type Item = Result<SseEvent, reqwest::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(event) = self.next_event() {
                return Poll::Ready(Some(Ok(event)));
            }

            if self.ended {
                return Poll::Ready(None);
            }

            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    let chunk = String::from_utf8_lossy(&bytes).into_owned();
                    self.push_chunk(&chunk);
                }
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => {
                    self.ended = true;
                    // Flush a trailing unterminated event, if any
                    if !self.buffer.ends_with("\n\n") && !self.buffer.is_empty() {
                        self.buffer.push_str("\n\n");
                    }
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn byte_stream(
        chunks: Vec<&'static str>,
    ) -> impl Stream<Item = Result<Bytes, reqwest::Error>> + Unpin {
        futures::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(Bytes::from_static(c.as_bytes()))),
        )
    }

    #[tokio::test]
    async fn decodes_single_event() {
        let mut stream = SseEventStream::new(byte_stream(vec!["data: hello\n\n"]));
        let event = stream.next().await.unwrap().unwrap();
        assert_eq!(event.data, "hello");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn reassembles_events_split_across_chunks() {
        let mut stream =
            SseEventStream::new(byte_stream(vec!["data: par", "tial\n\ndata: [DONE]\n\n"]));
        assert_eq!(stream.next().await.unwrap().unwrap().data, "partial");
        assert_eq!(stream.next().await.unwrap().unwrap().data, "[DONE]");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn decodes_crlf_events() {
        let mut stream =
            SseEventStream::new(byte_stream(vec!["data: a\r\n\r\ndata: b\r\n\r\n"]));
        assert_eq!(stream.next().await.unwrap().unwrap().data, "a");
        assert_eq!(stream.next().await.unwrap().unwrap().data, "b");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn reassembles_crlf_pair_split_across_chunks() {
        let mut stream = SseEventStream::new(byte_stream(vec!["data: x\r\n\r", "\ndata: y\r\n\r\n"]));
        assert_eq!(stream.next().await.unwrap().unwrap().data, "x");
        assert_eq!(stream.next().await.unwrap().unwrap().data, "y");
    }

    #[tokio::test]
    async fn ignores_comment_lines() {
        let mut stream =
            SseEventStream::new(byte_stream(vec![": keep-alive\n\ndata: x\n\n"]));
        assert_eq!(stream.next().await.unwrap().unwrap().data, "");
        assert_eq!(stream.next().await.unwrap().unwrap().data, "x");
    }

    #[tokio::test]
    async fn flushes_unterminated_trailing_event() {
        let mut stream = SseEventStream::new(byte_stream(vec!["data: tail"]));
        assert_eq!(stream.next().await.unwrap().unwrap().data, "tail");
        assert!(stream.next().await.is_none());
    }
}
