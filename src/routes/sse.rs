//! Streamed mentor replies over Server-Sent Events.
//!
//! Each chunk is sent as `data: {"content": "<chunk>"}`; the stream ends with
//! `data: [DONE]`.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
  extract::{Path, State},
  response::sse::{Event, KeepAlive, Sse},
  Json,
};
use futures::{Stream, StreamExt};
use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::logic::stream_conversation_reply;
use crate::protocol::{ChunkOut, MessageIn};
use crate::state::AppState;

fn chunk_event(chunk: &str) -> Event {
  let data = serde_json::to_string(&ChunkOut { content: chunk }).unwrap_or_else(|_| "{\"content\":\"\"}".into());
  Event::default().data(data)
}

#[instrument(level = "info", skip(state, body), fields(%id, content_len = body.content.len(), has_context = body.context.is_some()))]
pub async fn sse_post_message(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<MessageIn>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
  if body.content.trim().is_empty() {
    return Err(ApiError::BadRequest("message content is empty".into()));
  }
  let chunks = stream_conversation_reply(state, &id, body.content, body.context)
    .await
    .ok_or_else(|| ApiError::NotFound(format!("conversation '{id}'")))?;

  let events = chunks
    .map(|chunk| Ok(chunk_event(&chunk)))
    .chain(futures::stream::once(async move {
      debug!(target: "mentor", conversation = %id, "SSE stream done");
      Ok(Event::default().data("[DONE]"))
    }));
  Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

