//! Public protocol structs for the HTTP API (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{CodeExample, Difficulty, Language, SnippetKind, TestCase};
use crate::render::{DifficultyBadge, RenderTree};
use crate::store::{StoredProblem, StoredTopic};

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub topics: usize,
    pub problems: usize,
    pub mentor: bool,
    pub runner: bool,
}

//
// Curriculum
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSummaryOut {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub order: Option<i64>,
    pub problem_count: usize,
}

impl From<&StoredTopic> for TopicSummaryOut {
    fn from(t: &StoredTopic) -> Self {
        Self {
            slug: t.meta.slug.clone(),
            title: t.meta.title.clone(),
            description: t.meta.description.clone(),
            order: t.meta.order,
            problem_count: t.problem_ids.len(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSummaryOut {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub badge: DifficultyBadge,
}

impl From<&StoredProblem> for ProblemSummaryOut {
    fn from(p: &StoredProblem) -> Self {
        Self {
            id: p.id.clone(),
            title: p.problem.title.clone(),
            difficulty: p.problem.difficulty,
            badge: DifficultyBadge::for_difficulty(p.problem.difficulty),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDetailOut {
    #[serde(flatten)]
    pub summary: TopicSummaryOut,
    pub code_examples: Vec<CodeExample>,
    pub problems: Vec<ProblemSummaryOut>,
}

/// Test case as shown to learners; hidden cases carry no contents.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseOut {
    pub index: usize,
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
}

impl TestCaseOut {
    pub fn redacted(index: usize, tc: &TestCase) -> Self {
        let visible = !tc.hidden;
        Self {
            index,
            hidden: tc.hidden,
            input: visible.then(|| tc.input.clone()),
            expected_output: visible.then(|| tc.expected_output.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemOut {
    pub id: String,
    pub topic_slug: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub badge: DifficultyBadge,
    pub concept_explanation: String,
    pub worked_example: String,
    pub submission_format: String,
    pub test_cases: Vec<TestCaseOut>,
    /// Languages with a reference solution.
    pub solution_languages: Vec<Language>,
}

impl From<&StoredProblem> for ProblemOut {
    fn from(sp: &StoredProblem) -> Self {
        let p = &sp.problem;
        let mut solution_languages: Vec<Language> = p
            .solutions
            .iter()
            .filter(|s| s.kind == SnippetKind::Solution)
            .map(|s| s.language)
            .collect();
        solution_languages.sort();
        solution_languages.dedup();
        Self {
            id: sp.id.clone(),
            topic_slug: sp.topic_slug.clone(),
            title: p.title.clone(),
            description: p.description.clone(),
            difficulty: p.difficulty,
            badge: DifficultyBadge::for_difficulty(p.difficulty),
            concept_explanation: p.concept_explanation.clone(),
            worked_example: p.worked_example.clone(),
            submission_format: p.submission_format.clone(),
            test_cases: p.test_cases.iter().enumerate().map(|(i, tc)| TestCaseOut::redacted(i, tc)).collect(),
            solution_languages,
        }
    }
}

//
// Workspace
//

#[derive(Debug, Deserialize)]
pub struct LanguageQuery {
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RenderedSection {
    pub tree: RenderTree,
    pub html: String,
}

impl RenderedSection {
    pub fn new(tree: RenderTree) -> Self {
        let html = tree.to_html();
        Self { tree, html }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedProblemOut {
    pub id: String,
    pub language: Language,
    pub description: RenderedSection,
    pub concept_explanation: RenderedSection,
    pub worked_example: RenderedSection,
}

#[derive(Debug, Serialize)]
pub struct BoilerplateOut {
    pub language: Language,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct CodeQuery {
    #[serde(rename = "type")]
    pub kind: Option<SnippetKind>,
}

#[derive(Debug, Serialize)]
pub struct CodeOut {
    pub language: Language,
    #[serde(rename = "type")]
    pub kind: SnippetKind,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct RunIn {
    pub code: String,
    pub language: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitIn {
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ParseInputsIn {
    pub input: String,
    /// Parameter names for positional binding (e.g. from a signature).
    #[serde(default)]
    pub params: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ParseInputsOut {
    pub variables: BTreeMap<String, String>,
    /// Legacy-format input rewritten as assignments (verbatim when not legacy).
    pub converted: String,
}

//
// Mentor
//

/// Where the learner is and what they are looking at.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatContext {
    pub page: String,
    pub problem_title: String,
    pub problem_difficulty: String,
    pub user_code: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatIn {
    pub message: String,
    #[serde(default)]
    pub context: ChatContext,
}

#[derive(Debug, Serialize)]
pub struct ChatOut {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct ConversationCreatedOut {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageIn {
    pub content: String,
    #[serde(default)]
    pub context: Option<ChatContext>,
}

#[derive(Debug, Serialize)]
pub struct ChunkOut<'a> {
    pub content: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_case_is_redacted() {
        let tc = TestCase { input: "secret".into(), expected_output: "42".into(), hidden: true };
        let out = TestCaseOut::redacted(3, &tc);
        assert_eq!(serde_json::to_value(&out).unwrap(), serde_json::json!({"index": 3, "hidden": true}));
    }

    #[test]
    fn chat_context_fields_are_optional() {
        let body: ChatIn = serde_json::from_str(r#"{"message":"hi","context":{"problemTitle":"Two Sum"}}"#).unwrap();
        assert_eq!(body.context.problem_title, "Two Sum");
        assert!(body.context.user_code.is_empty());
        let body: ChatIn = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert!(body.context.page.is_empty());
    }
}
