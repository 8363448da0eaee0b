//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - Mentor replies (single-shot and streamed into a conversation)
//!   - Run/submit orchestration and submission recording
//!   - Local fallbacks when OpenAI is not configured

use std::sync::Arc;

use chrono::Utc;
use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, error, info, instrument, Instrument, Span};
use uuid::Uuid;

use crate::domain::{Language, Role, Submission};
use crate::error::ApiError;
use crate::judge::{judge, JudgeMode, JudgeOutcome};
use crate::protocol::ChatContext;
use crate::state::AppState;
use crate::util::fill_template;

/// Shown when the upstream model call fails.
pub const MENTOR_FALLBACK: &str =
  "Sorry, I couldn't reach the assistant right now. Please try again in a moment.";

const ANONYMOUS_USER: &str = "anonymous";

fn mentor_prompt(state: &AppState, message: &str, ctx: &ChatContext) -> String {
  let or_none = |s: &str| if s.trim().is_empty() { "(none)".to_string() } else { s.to_string() };
  fill_template(
    &state.prompts.mentor_user_template,
    &[
      ("page", &or_none(&ctx.page)),
      ("problem_title", &or_none(&ctx.problem_title)),
      ("problem_difficulty", &or_none(&ctx.problem_difficulty)),
      ("user_code", &or_none(&ctx.user_code)),
      ("message", message),
    ],
  )
}

#[instrument(level = "info", skip(state, message, ctx), fields(message_len = message.len(), page = %ctx.page))]
pub async fn mentor_reply(state: &AppState, message: &str, ctx: &ChatContext) -> String {
  if let Some(oa) = &state.openai {
    let user = mentor_prompt(state, message, ctx);
    match oa.chat_plain(&state.prompts.mentor_system, &user).await {
      Ok(t) if !t.is_empty() => return t,
      Ok(_) => error!(target: "mentor", "OpenAI returned an empty reply; using fallback message."),
      Err(e) => error!(target: "mentor", error = %e, "OpenAI mentor call failed; using fallback message."),
    }
    return MENTOR_FALLBACK.to_string();
  }
  debug!(target: "mentor", "Mentor reply via stub.");
  mentor_stub(message, ctx)
}

/// Append the learner's message to `conversation_id` and stream the reply.
/// Chunks are accumulated and stored as one assistant message when the
/// upstream ends, whether or not the returned stream is still being read.
/// `None` when the conversation does not exist.
#[instrument(level = "info", skip(state, content, ctx), fields(%conversation_id, content_len = content.len()))]
pub async fn stream_conversation_reply(
  state: Arc<AppState>,
  conversation_id: &str,
  content: String,
  ctx: Option<ChatContext>,
) -> Option<BoxStream<'static, String>> {
  if !state.append_message(conversation_id, Role::User, content.clone()).await {
    return None;
  }
  let mut history = state.get_conversation(conversation_id).await?.messages;
  if let (Some(ctx), Some(last)) = (&ctx, history.last_mut()) {
    last.content = mentor_prompt(&state, &content, ctx);
  }

  let upstream: BoxStream<'static, Result<String, String>> = match &state.openai {
    Some(oa) => match oa.chat_stream(&state.prompts.mentor_system, &history).await {
      Ok(s) => s,
      Err(e) => {
        error!(target: "mentor", error = %e, "OpenAI stream failed to start; using fallback message.");
        futures::stream::iter(vec![Ok(MENTOR_FALLBACK.to_string())]).boxed()
      }
    },
    None => {
      let reply = mentor_stub(&content, &ctx.unwrap_or_default());
      futures::stream::iter(stub_chunks(&reply).into_iter().map(Ok)).boxed()
    }
  };

  // The reply is driven to completion and stored even if the client goes away.
  let (tx, rx) = futures::channel::mpsc::unbounded::<String>();
  let id = conversation_id.to_string();
  let task = async move {
    let mut upstream = upstream;
    let mut full = String::new();
    while let Some(item) = upstream.next().await {
      match item {
        Ok(chunk) => {
          full.push_str(&chunk);
          let _ = tx.unbounded_send(chunk);
        }
        Err(e) => {
          error!(target: "mentor", conversation = %id, error = %e, "Stream interrupted");
          if full.is_empty() {
            full.push_str(MENTOR_FALLBACK);
            let _ = tx.unbounded_send(MENTOR_FALLBACK.to_string());
          }
          break;
        }
      }
    }
    if tx.is_closed() {
      debug!(target: "mentor", conversation = %id, "Client left before the reply finished");
    }
    info!(target: "mentor", conversation = %id, reply_len = full.len(), "Assistant reply stored");
    state.append_message(&id, Role::Assistant, full).await;
  };
  tokio::spawn(task.instrument(Span::current()));
  Some(rx.boxed())
}

/// Run or submit `code` for `problem_id`. Submissions are recorded.
#[instrument(level = "info", skip(state, code), fields(%problem_id, %language, ?mode, code_len = code.len()))]
pub async fn run_code(
  state: &AppState,
  problem_id: &str,
  language: &str,
  code: &str,
  mode: JudgeMode,
  user_id: Option<String>,
) -> Result<(JudgeOutcome, Option<String>), ApiError> {
  let stored = state
    .curriculum
    .problem(problem_id)
    .ok_or_else(|| ApiError::NotFound(format!("problem '{problem_id}'")))?;
  let language: Language = language.parse().map_err(ApiError::BadRequest)?;

  let outcome = judge(state.runner.as_ref(), &stored.problem, language, code, mode).await;
  if mode == JudgeMode::Run {
    return Ok((outcome, None));
  }

  let submission = Submission {
    id: Uuid::new_v4().to_string(),
    user_id: user_id.filter(|u| !u.trim().is_empty()).unwrap_or_else(|| ANONYMOUS_USER.into()),
    problem_id: stored.id.clone(),
    language,
    code: code.to_string(),
    status: outcome.status,
    created_at: Utc::now(),
  };
  let id = submission.id.clone();
  info!(target: "judge", submission = %id, user = %submission.user_id, status = ?submission.status, "Submission recorded");
  state.record_submission(submission).await;
  Ok((outcome, Some(id)))
}

// -------- Local fallbacks --------

/// Word-sized chunks so the stub streams like a model would.
fn stub_chunks(reply: &str) -> Vec<String> {
  reply.split_inclusive(' ').map(str::to_string).collect()
}

/// Tiny mentor fallback that answers common questions without a model.
fn mentor_stub(message: &str, ctx: &ChatContext) -> String {
  let lower = message.to_lowercase();
  let about = if ctx.problem_title.trim().is_empty() {
    String::new()
  } else {
    format!(" for \"{}\"", ctx.problem_title.trim())
  };

  if lower.contains("hint") || lower.contains("stuck") {
    format!(
      "Here's a nudge{about}: write down what you need to know at each step, then ask which data structure answers that in O(1). Try it on the first example by hand before coding."
    )
  } else if lower.contains("complexity") || lower.contains("big o") || lower.contains("big-o") {
    "Count how many times each element is touched. One pass with constant work per element is O(n); a nested loop over the input is O(n^2); sorting first adds O(n log n).".into()
  } else if lower.contains("error") || lower.contains("bug") || lower.contains("wrong") {
    if ctx.user_code.trim().is_empty() {
      "Paste your code and the failing input, and compare the expected output with what you get line by line.".into()
    } else {
      "Check edge cases first: empty input, a single element, duplicates and negative numbers. Then trace your loop bounds on the failing test.".into()
    }
  } else {
    format!(
      "Let's work through it{about}. Start by restating the problem in your own words and listing the inputs and the expected output. What's the simplest approach that works, even if it's slow?"
    )
  }
}
