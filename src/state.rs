//! Application state: curriculum, in-memory submission and conversation
//! stores, prompts, and the optional OpenAI and code-runner clients.
//!
//! The curriculum is read once at startup and never mutated. Submissions and
//! conversations are append-only and live only as long as the process.

use std::{collections::HashMap, path::Path, sync::Arc};

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::{AppConfig, Prompts};
use crate::curation;
use crate::domain::{Conversation, Curriculum, Message, Role, Submission};
use crate::judge::RunnerClient;
use crate::openai::OpenAI;
use crate::seeds::seed_curriculum;
use crate::store::CurriculumStore;

#[derive(Clone)]
pub struct AppState {
    pub curriculum: Arc<CurriculumStore>,
    pub submissions: Arc<RwLock<Vec<Submission>>>,
    pub conversations: Arc<RwLock<HashMap<String, Conversation>>>,
    pub openai: Option<OpenAI>,
    pub runner: Option<RunnerClient>,
    pub prompts: Prompts,
}

impl AppState {
    /// Build state from env: load config and curriculum, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = AppConfig::from_env();
        let curriculum = load_curriculum(&cfg.curriculum.path);

        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "curriculum_backend", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled.");
        } else {
            info!(target: "curriculum_backend", "OpenAI disabled (no OPENAI_API_KEY). Mentor uses local replies.");
        }

        Self::from_parts(&cfg, curriculum, openai)
    }

    pub fn from_parts(cfg: &AppConfig, curriculum: Curriculum, openai: Option<OpenAI>) -> Self {
        let runner = RunnerClient::from_config(&cfg.judge);
        match &cfg.judge.runner_url {
            Some(url) if runner.is_some() => {
                info!(target: "judge", %url, timeout_secs = cfg.judge.timeout_secs, "Code runner enabled.")
            }
            _ => warn!(target: "judge", "No code runner configured; run/submit report runner_unavailable."),
        }

        Self {
            curriculum: Arc::new(CurriculumStore::ingest(curriculum)),
            submissions: Arc::new(RwLock::new(Vec::new())),
            conversations: Arc::new(RwLock::new(HashMap::new())),
            openai,
            runner,
            prompts: cfg.prompts.clone(),
        }
    }

    #[instrument(level = "debug", skip(self, submission), fields(id = %submission.id, status = ?submission.status))]
    pub async fn record_submission(&self, submission: Submission) {
        self.submissions.write().await.push(submission);
    }

    pub async fn submissions_snapshot(&self) -> Vec<Submission> {
        self.submissions.read().await.clone()
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn create_conversation(&self) -> Conversation {
        let conv = Conversation { id: Uuid::new_v4().to_string(), created_at: Utc::now(), messages: Vec::new() };
        self.conversations.write().await.insert(conv.id.clone(), conv.clone());
        info!(target: "mentor", id = %conv.id, "Conversation created");
        conv
    }

    pub async fn get_conversation(&self, id: &str) -> Option<Conversation> {
        self.conversations.read().await.get(id).cloned()
    }

    /// Append a message; false when the conversation does not exist.
    #[instrument(level = "debug", skip(self, content), fields(%id, ?role, content_len = content.len()))]
    pub async fn append_message(&self, id: &str, role: Role, content: String) -> bool {
        let mut convs = self.conversations.write().await;
        match convs.get_mut(id) {
            Some(conv) => {
                conv.messages.push(Message { role, content, created_at: Utc::now() });
                true
            }
            None => false,
        }
    }
}

/// Curriculum from the aggregate file, or the built-in seed when it is missing,
/// unreadable or empty.
fn load_curriculum(path: &str) -> Curriculum {
    match curation::load(Path::new(path)) {
        Ok(c) if !c.topics.is_empty() => {
            info!(target: "curriculum", %path, topics = c.topics.len(), "Loaded curriculum");
            c
        }
        Ok(_) => {
            warn!(target: "curriculum", %path, "Curriculum file has no topics; using built-in seed");
            seed_curriculum()
        }
        Err(e) => {
            warn!(target: "curriculum", %path, error = %e, "Curriculum not loaded; using built-in seed");
            seed_curriculum()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::from_parts(&AppConfig::default(), seed_curriculum(), None)
    }

    #[tokio::test]
    async fn conversations_are_append_only() {
        let st = state();
        let conv = st.create_conversation().await;
        assert!(st.append_message(&conv.id, Role::User, "hi".into()).await);
        assert!(st.append_message(&conv.id, Role::Assistant, "hello".into()).await);
        assert!(!st.append_message("missing", Role::User, "x".into()).await);

        let got = st.get_conversation(&conv.id).await.unwrap();
        let roles: Vec<Role> = got.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
    }

    #[test]
    fn missing_file_falls_back_to_seed() {
        let c = load_curriculum("/definitely/not/here.json");
        assert_eq!(c, seed_curriculum());
        assert!(state().runner.is_none());
    }
}
