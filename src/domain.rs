//! Domain models: languages, difficulty, topics, problems, test cases, snippets,
//! submissions and mentor conversations.
//!
//! Data files are hand-authored and loosely structured, so most fields default
//! when absent and test-case text accepts any JSON scalar or array.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Languages a learner can write, run and read solutions in.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  Cpp,
  Python,
  Java,
  C,
  Javascript,
}

impl Language {
  /// Fixed switcher order shown in code-block headers.
  pub const ALL: [Language; 5] = [Language::Cpp, Language::Python, Language::Java, Language::C, Language::Javascript];

  pub fn as_str(&self) -> &'static str {
    match self {
      Language::Cpp => "cpp",
      Language::Python => "python",
      Language::Java => "java",
      Language::C => "c",
      Language::Javascript => "javascript",
    }
  }

  /// Human label for dropdowns.
  pub fn label(&self) -> &'static str {
    match self {
      Language::Cpp => "C++",
      Language::Python => "Python",
      Language::Java => "Java",
      Language::C => "C",
      Language::Javascript => "JavaScript",
    }
  }

  /// Line-comment prefix, used by generated scaffolding.
  pub fn comment_prefix(&self) -> &'static str {
    match self {
      Language::Python => "#",
      _ => "//",
    }
  }
}

impl Default for Language {
  fn default() -> Self { Language::Cpp }
}

impl fmt::Display for Language {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Language {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "cpp" | "c++" | "cxx" => Ok(Language::Cpp),
      "c" => Ok(Language::C),
      "python" | "py" | "python3" => Ok(Language::Python),
      "java" => Ok(Language::Java),
      "javascript" | "js" | "node" => Ok(Language::Javascript),
      other => Err(format!("unsupported language: {other}")),
    }
  }
}

impl<'de> Deserialize<'de> for Language {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
  }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash)]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub fn as_str(&self) -> &'static str {
    match self {
      Difficulty::Easy => "Easy",
      Difficulty::Medium => "Medium",
      Difficulty::Hard => "Hard",
    }
  }
}

impl Default for Difficulty {
  fn default() -> Self { Difficulty::Medium }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Difficulty {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "easy" => Ok(Difficulty::Easy),
      "medium" => Ok(Difficulty::Medium),
      "hard" => Ok(Difficulty::Hard),
      other => Err(format!("unknown difficulty: {other}")),
    }
  }
}

/// Lenient: data files carry "EASY", "medium", "Hard", or garbage.
/// Garbage lands on Medium; `curation::audit` reports the raw value separately.
impl<'de> Deserialize<'de> for Difficulty {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.and_then(|s| s.parse().ok()).unwrap_or_default())
  }
}

/// Accept strings, numbers, arrays, objects; keep strings verbatim and
/// serialize everything else as compact JSON text.
pub fn text_or_json<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
  let v = serde_json::Value::deserialize(deserializer)?;
  Ok(match v {
    serde_json::Value::String(s) => s,
    serde_json::Value::Null => String::new(),
    other => other.to_string(),
  })
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TopicMeta {
  pub slug: String,
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub order: Option<i64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CodeExample {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub language: Option<Language>,
  #[serde(default)]
  pub code: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
  #[serde(default, deserialize_with = "text_or_json")]
  pub input: String,
  #[serde(default, deserialize_with = "text_or_json", alias = "output", alias = "expected")]
  pub expected_output: String,
  #[serde(default, alias = "isHidden")]
  pub hidden: bool,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SnippetKind {
  #[default]
  Solution,
  #[serde(alias = "boilerplate", alias = "template")]
  Starter,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Solution {
  pub language: Language,
  #[serde(default)]
  pub code: String,
  #[serde(default, rename = "type")]
  pub kind: SnippetKind,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub difficulty: Difficulty,
  #[serde(default)]
  pub test_cases: Vec<TestCase>,
  #[serde(default)]
  pub solutions: Vec<Solution>,
  #[serde(default)]
  pub concept_explanation: String,
  #[serde(default)]
  pub worked_example: String,
  #[serde(default)]
  pub submission_format: String,
}

impl Problem {
  pub fn solution_for(&self, language: Language, kind: SnippetKind) -> Option<&Solution> {
    self.solutions.iter().find(|s| s.language == language && s.kind == kind)
  }
}

/// One topic with everything it owns, as stored in the aggregate document.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopicRecord {
  pub topic: TopicMeta,
  #[serde(default)]
  pub code_examples: Vec<CodeExample>,
  #[serde(default)]
  pub problems: Vec<Problem>,
}

/// Aggregate document consumed by the server at startup.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Curriculum {
  #[serde(default)]
  pub topics: Vec<TopicRecord>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
  Accepted,
  WrongAnswer,
  RuntimeError,
  RunnerUnavailable,
}

/// Append-only record of one attempt.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
  pub id: String,
  pub user_id: String,
  pub problem_id: String,
  pub language: Language,
  pub code: String,
  pub status: SubmissionStatus,
  pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Assistant,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
  pub role: Role,
  pub content: String,
  pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
  pub id: String,
  pub created_at: DateTime<Utc>,
  pub messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn difficulty_reads_any_case_and_displays_title_case() {
    let d: Difficulty = serde_json::from_str("\"MEDIUM\"").unwrap();
    assert_eq!(d, Difficulty::Medium);
    assert_eq!(d.to_string(), "Medium");
    let d: Difficulty = serde_json::from_str("\"hard\"").unwrap();
    assert_eq!(d.as_str(), "Hard");
  }

  #[test]
  fn language_aliases() {
    assert_eq!("C++".parse::<Language>(), Ok(Language::Cpp));
    assert_eq!("js".parse::<Language>(), Ok(Language::Javascript));
    assert!("rust".parse::<Language>().is_err());
    let s: Solution = serde_json::from_str(r#"{"language":"Python","code":"pass"}"#).unwrap();
    assert_eq!(s.language, Language::Python);
    assert_eq!(s.kind, SnippetKind::Solution);
  }

  #[test]
  fn test_case_accepts_non_string_values() {
    let tc: TestCase = serde_json::from_str(r#"{"input":[1,2,3],"expectedOutput":6}"#).unwrap();
    assert_eq!(tc.input, "[1,2,3]");
    assert_eq!(tc.expected_output, "6");
    assert!(!tc.hidden);
  }

  #[test]
  fn problem_defaults_are_lenient() {
    let p: Problem = serde_json::from_str(r#"{"title":"Two Sum","difficulty":"EASY"}"#).unwrap();
    assert_eq!(p.difficulty, Difficulty::Easy);
    assert!(p.test_cases.is_empty());
    assert!(p.id.is_none());
  }
}
