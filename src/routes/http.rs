//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, Query, State}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::boilerplate::generate_boilerplate;
use crate::domain::{Language, SnippetKind};
use crate::error::ApiError;
use crate::judge::JudgeMode;
use crate::leaderboard::{leaderboard, LeaderboardEntry};
use crate::logic::*;
use crate::normalize::{convert_to_multi_lang, parse_inputs_with_params};
use crate::protocol::*;
use crate::render::{render, RenderContext};
use crate::state::AppState;
use crate::store::StoredProblem;

fn find_problem<'a>(state: &'a AppState, id: &str) -> Result<&'a StoredProblem, ApiError> {
  state.curriculum.problem(id).ok_or_else(|| ApiError::NotFound(format!("problem '{id}'")))
}

fn parse_language(raw: &str) -> Result<Language, ApiError> {
  raw.parse().map_err(ApiError::BadRequest)
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut {
    ok: true,
    topics: state.curriculum.topics().len(),
    problems: state.curriculum.problem_count(),
    mentor: state.openai.is_some(),
    runner: state.runner.is_some(),
  })
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_topics(State(state): State<Arc<AppState>>) -> Json<Vec<TopicSummaryOut>> {
  Json(state.curriculum.topics().iter().map(TopicSummaryOut::from).collect())
}

#[instrument(level = "info", skip(state), fields(%slug))]
pub async fn http_get_topic(
  State(state): State<Arc<AppState>>,
  Path(slug): Path<String>,
) -> Result<Json<TopicDetailOut>, ApiError> {
  let topic = state.curriculum.topic(&slug).ok_or_else(|| ApiError::NotFound(format!("topic '{slug}'")))?;
  let problems = state.curriculum.problems_of(topic).map(ProblemSummaryOut::from).collect();
  Ok(Json(TopicDetailOut { summary: topic.into(), code_examples: topic.code_examples.clone(), problems }))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_problem(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<ProblemOut>, ApiError> {
  Ok(Json(find_problem(&state, &id)?.into()))
}

#[instrument(level = "info", skip(state), fields(%id, language = ?q.language))]
pub async fn http_render_problem(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Query(q): Query<LanguageQuery>,
) -> Result<Json<RenderedProblemOut>, ApiError> {
  let sp = find_problem(&state, &id)?;
  let language = q.language.as_deref().map(parse_language).transpose()?.unwrap_or_default();
  let ctx = RenderContext { language_hint: Some(language) };
  let p = &sp.problem;
  Ok(Json(RenderedProblemOut {
    id: sp.id.clone(),
    language,
    description: RenderedSection::new(render(&p.description, &ctx)),
    concept_explanation: RenderedSection::new(render(&p.concept_explanation, &ctx)),
    worked_example: RenderedSection::new(render(&p.worked_example, &ctx)),
  }))
}

#[instrument(level = "info", skip(state), fields(%id, %language))]
pub async fn http_get_boilerplate(
  State(state): State<Arc<AppState>>,
  Path((id, language)): Path<(String, String)>,
) -> Result<Json<BoilerplateOut>, ApiError> {
  let sp = find_problem(&state, &id)?;
  let language = parse_language(&language)?;
  let code = match sp.problem.solution_for(language, SnippetKind::Starter) {
    Some(starter) => starter.code.clone(),
    None => generate_boilerplate(&sp.problem, language),
  };
  Ok(Json(BoilerplateOut { language, code }))
}

#[instrument(level = "info", skip(state), fields(%id, %language, kind = ?q.kind))]
pub async fn http_get_code(
  State(state): State<Arc<AppState>>,
  Path((id, language)): Path<(String, String)>,
  Query(q): Query<CodeQuery>,
) -> Result<Json<CodeOut>, ApiError> {
  let sp = find_problem(&state, &id)?;
  let language = parse_language(&language)?;
  let kind = q.kind.unwrap_or_default();
  let snippet = sp
    .problem
    .solution_for(language, kind)
    .ok_or_else(|| ApiError::NotFound(format!("{} {} for problem '{id}'", language.label(), kind_label(kind))))?;
  Ok(Json(CodeOut { language, kind, code: snippet.code.clone() }))
}

fn kind_label(kind: SnippetKind) -> &'static str {
  match kind {
    SnippetKind::Solution => "solution",
    SnippetKind::Starter => "starter code",
  }
}

#[instrument(level = "info", skip(state, body), fields(%id, language = %body.language, code_len = body.code.len()))]
pub async fn http_post_run(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<RunIn>,
) -> Result<impl IntoResponse, ApiError> {
  let (outcome, _) = run_code(&state, &id, &body.language, &body.code, JudgeMode::Run, None).await?;
  info!(target: "judge", %id, status = ?outcome.status, "HTTP run evaluated");
  Ok(Json(outcome))
}

#[instrument(level = "info", skip(state, body), fields(%id, language = %body.language, user = ?body.user_id, code_len = body.code.len()))]
pub async fn http_post_submit(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<SubmitIn>,
) -> Result<impl IntoResponse, ApiError> {
  let (outcome, submission_id) =
    run_code(&state, &id, &body.language, &body.code, JudgeMode::Submit, body.user_id).await?;
  info!(target: "judge", %id, status = ?outcome.status, "HTTP submit evaluated");
  Ok(Json(serde_json::json!({
    "status": outcome.status,
    "results": outcome.results,
    "submissionId": submission_id,
  })))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_leaderboard(State(state): State<Arc<AppState>>) -> Json<Vec<LeaderboardEntry>> {
  let subs = state.submissions_snapshot().await;
  Json(leaderboard(&subs))
}

#[instrument(level = "info", skip(body), fields(input_len = body.input.len(), params = body.params.len()))]
pub async fn http_post_parse_inputs(Json(body): Json<ParseInputsIn>) -> Json<ParseInputsOut> {
  Json(ParseInputsOut {
    variables: parse_inputs_with_params(&body.input, &body.params),
    converted: convert_to_multi_lang(&body.input),
  })
}

#[instrument(level = "info", skip(state, body), fields(message_len = body.message.len(), page = %body.context.page))]
pub async fn http_post_chat(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ChatIn>,
) -> Json<ChatOut> {
  let response = mentor_reply(&state, &body.message, &body.context).await;
  Json(ChatOut { response })
}

#[instrument(level = "info", skip(state))]
pub async fn http_create_conversation(State(state): State<Arc<AppState>>) -> Json<ConversationCreatedOut> {
  let conv = state.create_conversation().await;
  Json(ConversationCreatedOut { id: conv.id })
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_conversation(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
  let conv = state.get_conversation(&id).await.ok_or_else(|| ApiError::NotFound(format!("conversation '{id}'")))?;
  Ok(Json(conv))
}
