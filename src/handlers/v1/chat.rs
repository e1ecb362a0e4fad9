//! SSE chat endpoint.

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;

use crate::llm::{LLMError, StreamEvent};
use crate::response;
use crate::server::AppState;

#[derive(Deserialize)]
pub struct ChatRequestBody {
    pub content: String,
}

#[derive(Serialize)]
struct TokenData {
    content: String,
}

#[derive(Serialize)]
struct DoneData {
    usage: Option<crate::llm::Usage>,
}

#[derive(Serialize)]
struct ErrorData {
    message: String,
}

/// POST /api/v1/agents/{id}/chat
///
/// SSE endpoint for streaming one chat completion against an agent.
/// Request body: {"content": "..."}
/// Events emitted:
/// - `token`: {"content": "..."}
/// - `done`: {"usage": {...}}
/// - `error`: {"message": "..."}
pub async fn chat_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequestBody>,
) -> Response {
    let record = match state.registry.get(&id).await {
        Ok(record) => record,
        Err(_) => {
            return response::not_found(format!("Agent '{id}' not found")).into_response();
        }
    };

    let stream = state.runtime.generate(&record, &req.content).await;

    // Apply idle timeout so a stalled provider cannot hold the connection open
    let sse_stream = TokenEventStream::new(
        stream,
        Duration::from_secs(state.idle_timeout_seconds),
    );

    // Keep-alive comments prevent proxies from closing idle connections
    let keep_alive = KeepAlive::new()
        .interval(Duration::from_secs(state.keep_alive_interval_seconds))
        .text("keep-alive");

    Sse::new(sse_stream).keep_alive(keep_alive).into_response()
}

/// Inner stream type with timeout wrapper.
type TimedChatStream = std::pin::Pin<
    Box<
        dyn futures::Stream<Item = Result<Result<StreamEvent, LLMError>, tokio_stream::Elapsed>>
            + Send,
    >,
>;

/// Converts runtime stream events into SSE events, ending the stream after
/// the first terminal event (done, error, or idle timeout).
struct TokenEventStream {
    inner: TimedChatStream,
    finished: bool,
}

impl TokenEventStream {
    fn new(inner: crate::llm::ChatStream, idle_timeout: Duration) -> Self {
        // Each item must arrive within idle_timeout
        let timed_stream = inner.timeout(idle_timeout);
        Self {
            inner: Box::pin(timed_stream),
            finished: false,
        }
    }
}

impl futures::Stream for TokenEventStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        use std::task::Poll;

        if self.finished {
            return Poll::Ready(None);
        }

        match self.inner.as_mut().poll_next(cx) {
            // Timeout elapsed - no token received within idle_timeout
            Poll::Ready(Some(Err(_elapsed))) => {
                self.finished = true;
                let event = Event::default()
                    .event("error")
                    .json_data(ErrorData {
                        message: "Stream idle timeout".to_string(),
                    })
                    .unwrap_or_else(|_| Event::default().event("error").data("{}"));
                Poll::Ready(Some(Ok(event)))
            }
            // Token received
            Poll::Ready(Some(Ok(Ok(StreamEvent::Token(content))))) => {
                let event = Event::default()
                    .event("token")
                    .json_data(TokenData { content })
                    .unwrap_or_else(|_| Event::default().event("token").data("{}"));
                Poll::Ready(Some(Ok(event)))
            }
            // Stream completed normally
            Poll::Ready(Some(Ok(Ok(StreamEvent::Done { usage })))) => {
                self.finished = true;
                let event = Event::default()
                    .event("done")
                    .json_data(DoneData { usage })
                    .unwrap_or_else(|_| Event::default().event("done").data("{}"));
                Poll::Ready(Some(Ok(event)))
            }
            // LLM error
            Poll::Ready(Some(Ok(Err(e)))) => {
                self.finished = true;
                let event = Event::default()
                    .event("error")
                    .json_data(ErrorData {
                        message: e.to_string(),
                    })
                    .unwrap_or_else(|_| Event::default().event("error").data("{}"));
                Poll::Ready(Some(Ok(event)))
            }
            // Inner stream ended
            Poll::Ready(None) => {
                self.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
