//! Reading, merging and writing curriculum documents.
//!
//! Hand-authored `*-topic.json` files come in several shapes: an array of
//! topics, one `{topic, codeExamples, problems}` record, one flat topic
//! (`{slug, title, problems}`), or an object keyed by slug. They are all
//! folded into the aggregate `Curriculum` the server loads.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::domain::{CodeExample, Curriculum, Problem, TopicMeta, TopicRecord};
use crate::util::slugify;

pub const TOPIC_FILE_SUFFIX: &str = "-topic.json";

#[derive(Debug, Error)]
pub enum CurationError {
  #[error("failed to read {}: {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("invalid JSON in {}: {source}", .path.display())]
  Json {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
  #[error("no *-topic.json files in {}", .0.display())]
  NoTopicFiles(PathBuf),
  #[error("failed to write {}: {source}", .path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlatTopic {
  #[serde(default)]
  slug: String,
  title: String,
  #[serde(default)]
  description: String,
  #[serde(default)]
  order: Option<i64>,
  #[serde(default, alias = "code_examples")]
  code_examples: Vec<CodeExample>,
  #[serde(default)]
  problems: Vec<Problem>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTopic {
  Nested(TopicRecord),
  Flat(FlatTopic),
}

impl RawTopic {
  /// `key` is the map key for slug-keyed files; it fills a missing slug.
  fn into_record(self, key: Option<&str>) -> TopicRecord {
    let mut record = match self {
      RawTopic::Nested(r) => r,
      RawTopic::Flat(f) => TopicRecord {
        topic: TopicMeta { slug: f.slug, title: f.title, description: f.description, order: f.order },
        code_examples: f.code_examples,
        problems: f.problems,
      },
    };
    if record.topic.slug.trim().is_empty() {
      record.topic.slug = key.map(str::to_string).unwrap_or_else(|| slugify(&record.topic.title));
    }
    record
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TopicFile {
  Many(Vec<RawTopic>),
  One(RawTopic),
  Keyed(BTreeMap<String, RawTopic>),
}

impl TopicFile {
  fn into_records(self) -> Vec<TopicRecord> {
    match self {
      TopicFile::Many(v) => v.into_iter().map(|t| t.into_record(None)).collect(),
      TopicFile::One(t) => vec![t.into_record(None)],
      TopicFile::Keyed(m) => m.into_iter().map(|(k, t)| t.into_record(Some(&k))).collect(),
    }
  }
}

fn read_value(path: &Path) -> Result<serde_json::Value, CurationError> {
  let text = fs::read_to_string(path).map_err(|source| CurationError::Io { path: path.to_path_buf(), source })?;
  serde_json::from_str(&text).map_err(|source| CurationError::Json { path: path.to_path_buf(), source })
}

/// Interpret any supported document shape: the aggregate `{topics: [...]}` or a topic file.
pub fn curriculum_from_value(path: &Path, value: serde_json::Value) -> Result<Curriculum, CurationError> {
  let is_aggregate = value.as_object().map_or(false, |o| o.contains_key("topics"));
  let json_err = |source| CurationError::Json { path: path.to_path_buf(), source };
  if is_aggregate {
    serde_json::from_value(value).map_err(json_err)
  } else {
    let file: TopicFile = serde_json::from_value(value).map_err(json_err)?;
    Ok(Curriculum { topics: file.into_records() })
  }
}

/// Load a curriculum document (aggregate or single topic file).
#[instrument(level = "info", fields(path = %path.display()))]
pub fn load(path: &Path) -> Result<Curriculum, CurationError> {
  let value = read_value(path)?;
  curriculum_from_value(path, value)
}

/// Raw JSON of a document, for passes that must see values before typed parsing.
pub fn load_value(path: &Path) -> Result<serde_json::Value, CurationError> {
  read_value(path)
}

/// Pretty-print `curriculum` to `path`, creating parent directories.
#[instrument(level = "info", skip(curriculum), fields(path = %path.display(), topics = curriculum.topics.len()))]
pub fn save(path: &Path, curriculum: &Curriculum) -> Result<(), CurationError> {
  let write_err = |source| CurationError::Write { path: path.to_path_buf(), source };
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent).map_err(write_err)?;
  }
  let mut text = serde_json::to_string_pretty(curriculum)
    .map_err(|source| CurationError::Json { path: path.to_path_buf(), source })?;
  text.push('\n');
  fs::write(path, text).map_err(write_err)
}

/// Fold same-slug records together, keeping first-seen order.
pub fn merge_records(records: impl IntoIterator<Item = TopicRecord>) -> Curriculum {
  let mut topics: Vec<TopicRecord> = Vec::new();
  for record in records {
    match topics.iter_mut().find(|t| t.topic.slug == record.topic.slug) {
      Some(existing) => {
        debug!(target: "curation", slug = %record.topic.slug, "Merging duplicate topic");
        if existing.topic.description.is_empty() {
          existing.topic.description = record.topic.description;
        }
        if existing.topic.order.is_none() {
          existing.topic.order = record.topic.order;
        }
        existing.code_examples.extend(record.code_examples);
        existing.problems.extend(record.problems);
      }
      None => topics.push(record),
    }
  }
  Curriculum { topics }
}

/// Merge every `*-topic.json` in `dir` (sorted by file name) into one curriculum.
#[instrument(level = "info", fields(dir = %dir.display()))]
pub fn merge_dir(dir: &Path) -> Result<Curriculum, CurationError> {
  let entries = fs::read_dir(dir).map_err(|source| CurationError::Io { path: dir.to_path_buf(), source })?;
  let mut files: Vec<PathBuf> = entries
    .filter_map(|e| e.ok().map(|e| e.path()))
    .filter(|p| p.is_file() && p.file_name().and_then(|n| n.to_str()).map_or(false, |n| n.ends_with(TOPIC_FILE_SUFFIX)))
    .collect();
  if files.is_empty() {
    return Err(CurationError::NoTopicFiles(dir.to_path_buf()));
  }
  files.sort();

  let mut records = Vec::new();
  for file in &files {
    let doc = load(file)?;
    debug!(target: "curation", file = %file.display(), topics = doc.topics.len(), "Read topic file");
    records.extend(doc.topics);
  }

  let merged = merge_records(records);
  info!(
    target: "curation",
    files = files.len(),
    topics = merged.topics.len(),
    problems = merged.topics.iter().map(|t| t.problems.len()).sum::<usize>(),
    "Merged topic files"
  );
  Ok(merged)
}
