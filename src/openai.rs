//! Minimal OpenAI client for the mentor.
//!
//! We only call chat.completions, either for one plain-text answer or as an SSE
//! stream of content deltas. Calls are instrumented and log model names,
//! latencies and response sizes (not contents).
//!
//! NOTE: We never log the API key.

use std::pin::Pin;
use std::time::Duration;

use futures::{Stream, StreamExt};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::domain::{Message, Role};

/// Boxed stream of content chunks; an `Err` item ends the stream.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, String>> + Send>>;

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty())?;
    let base_url = std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(60))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  fn request(&self, body: &ChatCompletionRequest) -> reqwest::RequestBuilder {
    self.client
      .post(format!("{}/chat/completions", self.base_url))
      .header(USER_AGENT, "curriculum-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(body)
  }

  /// Plain-text chat completion with one system and one user message.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model, user_len = user.len()))]
  pub async fn chat_plain(&self, system: &str, user: &str) -> Result<String, String> {
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![ChatMessageReq::new("system", system), ChatMessageReq::new("user", user)],
      temperature: 0.3,
      stream: false,
    };

    let start = std::time::Instant::now();
    let res = self.request(&req).send().await.map_err(|e| e.to_string())?;
    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or(body);
      return Err(format!("OpenAI HTTP {}: {}", status, msg));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default().trim().to_string();

    info!(elapsed = ?start.elapsed(), reply_len = text.len(), "Mentor reply received");
    Ok(text)
  }

  /// Streamed completion over a whole transcript. Yields content deltas in order.
  #[instrument(level = "info", skip(self, system, history), fields(model = %self.model, turns = history.len()))]
  pub async fn chat_stream(&self, system: &str, history: &[Message]) -> Result<ChunkStream, String> {
    let mut messages = vec![ChatMessageReq::new("system", system)];
    messages.extend(history.iter().map(|m| {
      let role = match m.role {
        Role::User => "user",
        Role::Assistant => "assistant",
      };
      ChatMessageReq::new(role, &m.content)
    }));
    let req = ChatCompletionRequest { model: self.model.clone(), messages, temperature: 0.3, stream: true };

    let res = self.request(&req).send().await.map_err(|e| e.to_string())?;
    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or(body);
      return Err(format!("OpenAI HTTP {}: {}", status, msg));
    }

    let mut bytes = Box::pin(res.bytes_stream());
    let stream = async_stream::stream! {
      let mut buffer: Vec<u8> = Vec::new();
      'read: while let Some(chunk) = bytes.next().await {
        let chunk = match chunk {
          Ok(c) => c,
          Err(e) => {
            yield Err(format!("stream error: {e}"));
            return;
          }
        };
        buffer.extend_from_slice(&chunk);

        // Only decode complete lines; a chunk may end inside a multi-byte char.
        while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
          let line: Vec<u8> = buffer.drain(..=pos).collect();
          let line = String::from_utf8_lossy(&line);
          match parse_sse_line(&line) {
            SseLine::Delta(text) => yield Ok(text),
            SseLine::Done => break 'read,
            SseLine::Skip => {}
          }
        }
      }
      debug!(target: "mentor", "Upstream stream finished");
    };
    Ok(Box::pin(stream))
  }
}

/// One line of an OpenAI streaming response.
#[derive(Debug, PartialEq)]
pub enum SseLine {
  Delta(String),
  Done,
  Skip,
}

pub fn parse_sse_line(line: &str) -> SseLine {
  let Some(data) = line.trim().strip_prefix("data:") else {
    return SseLine::Skip;
  };
  let data = data.trim();
  if data == "[DONE]" {
    return SseLine::Done;
  }
  match serde_json::from_str::<StreamChunk>(data) {
    Ok(chunk) => chunk
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.delta.content)
      .filter(|s| !s.is_empty())
      .map(SseLine::Delta)
      .unwrap_or(SseLine::Skip),
    Err(_) => SseLine::Skip,
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  stream: bool,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

impl ChatMessageReq {
  fn new(role: &str, content: &str) -> Self {
    Self { role: role.into(), content: content.into() }
  }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct StreamChunk { #[serde(default)] choices: Vec<StreamChoice> }
#[derive(Deserialize)]
struct StreamChoice { #[serde(default)] delta: StreamDelta }
#[derive(Deserialize, Default)]
struct StreamDelta { #[serde(default)] content: Option<String> }

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_delta_done_and_noise() {
    assert_eq!(
      parse_sse_line(r#"data: {"choices":[{"delta":{"content":"Hel"}}]}"#),
      SseLine::Delta("Hel".into())
    );
    assert_eq!(parse_sse_line("data: [DONE]\n"), SseLine::Done);
    assert_eq!(parse_sse_line(r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#), SseLine::Skip);
    assert_eq!(parse_sse_line(": keep-alive"), SseLine::Skip);
    assert_eq!(parse_sse_line("data: {broken"), SseLine::Skip);
  }

  #[test]
  fn error_body_message_is_extracted() {
    let body = r#"{"error":{"message":"Invalid API key","type":"auth"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("Invalid API key"));
    assert!(extract_openai_error("<html>").is_none());
  }

  #[test]
  fn non_streaming_request_omits_stream_flag() {
    let req = ChatCompletionRequest { model: "m".into(), messages: vec![], temperature: 0.0, stream: false };
    let v = serde_json::to_value(&req).unwrap();
    assert!(v.get("stream").is_none());
  }
}
