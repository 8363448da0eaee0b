//! Read-only curriculum store built once from the aggregate document.
//!
//! Ingestion assigns every problem an id (`<topic-slug>-<title-slug>`, suffixed on
//! collision) and records which topic owns it, so each problem belongs to
//! exactly one topic.

use std::collections::HashMap;

use tracing::{info, instrument, warn};

use crate::domain::{CodeExample, Curriculum, Problem, TopicMeta};
use crate::util::slugify;

#[derive(Clone, Debug)]
pub struct StoredTopic {
  pub meta: TopicMeta,
  pub code_examples: Vec<CodeExample>,
  /// Problem ids in authoring order.
  pub problem_ids: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct StoredProblem {
  pub id: String,
  pub topic_slug: String,
  pub problem: Problem,
}

#[derive(Clone, Debug, Default)]
pub struct CurriculumStore {
  /// Sorted by `order`, then authoring position.
  topics: Vec<StoredTopic>,
  by_slug: HashMap<String, usize>,
  problems: HashMap<String, StoredProblem>,
}

impl CurriculumStore {
  #[instrument(level = "info", skip_all, fields(topics = curriculum.topics.len()))]
  pub fn ingest(curriculum: Curriculum) -> Self {
    let mut records: Vec<(usize, _)> = curriculum.topics.into_iter().enumerate().collect();
    records.sort_by_key(|(pos, r)| (r.topic.order.unwrap_or(i64::MAX), *pos));

    let mut store = CurriculumStore::default();
    for (_, record) in records {
      let slug = if record.topic.slug.trim().is_empty() { slugify(&record.topic.title) } else { record.topic.slug.clone() };
      if slug.is_empty() || store.by_slug.contains_key(&slug) {
        warn!(target: "curriculum", %slug, title = %record.topic.title, "Skipping topic with empty or duplicate slug");
        continue;
      }

      let mut problem_ids = Vec::with_capacity(record.problems.len());
      for mut problem in record.problems {
        let base = problem
          .id
          .clone()
          .filter(|id| !id.trim().is_empty())
          .unwrap_or_else(|| format!("{}-{}", slug, slugify(&problem.title)));
        let id = store.unique_problem_id(&base);
        problem.id = Some(id.clone());
        problem_ids.push(id.clone());
        store.problems.insert(id.clone(), StoredProblem { id, topic_slug: slug.clone(), problem });
      }

      let meta = TopicMeta { slug: slug.clone(), ..record.topic };
      store.by_slug.insert(slug, store.topics.len());
      store.topics.push(StoredTopic { meta, code_examples: record.code_examples, problem_ids });
    }

    info!(target: "curriculum", topics = store.topics.len(), problems = store.problems.len(), "Curriculum ingested");
    store
  }

  fn unique_problem_id(&self, base: &str) -> String {
    if !self.problems.contains_key(base) {
      return base.to_string();
    }
    (2..)
      .map(|n| format!("{base}-{n}"))
      .find(|candidate| !self.problems.contains_key(candidate))
      .unwrap_or_else(|| base.to_string())
  }

  pub fn topics(&self) -> &[StoredTopic] {
    &self.topics
  }

  pub fn topic(&self, slug: &str) -> Option<&StoredTopic> {
    self.by_slug.get(slug).map(|&i| &self.topics[i])
  }

  pub fn problem(&self, id: &str) -> Option<&StoredProblem> {
    self.problems.get(id)
  }

  pub fn problems_of<'a>(&'a self, topic: &'a StoredTopic) -> impl Iterator<Item = &'a StoredProblem> + 'a {
    topic.problem_ids.iter().filter_map(move |id| self.problems.get(id))
  }

  pub fn problem_count(&self) -> usize {
    self.problems.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::TopicRecord;
  use crate::seeds::seed_curriculum;

  fn topic(slug: &str, order: Option<i64>, titles: &[&str]) -> TopicRecord {
    TopicRecord {
      topic: TopicMeta { slug: slug.into(), title: slug.to_uppercase(), description: String::new(), order },
      code_examples: vec![],
      problems: titles.iter().map(|t| Problem { title: t.to_string(), ..Default::default() }).collect(),
    }
  }

  #[test]
  fn ids_are_derived_and_unique() {
    let store = CurriculumStore::ingest(Curriculum { topics: vec![topic("dp", None, &["Climb Stairs", "Climb  stairs!"])] });
    let t = store.topic("dp").unwrap();
    assert_eq!(t.problem_ids, vec!["dp-climb-stairs", "dp-climb-stairs-2"]);
    let p = store.problem("dp-climb-stairs-2").unwrap();
    assert_eq!(p.topic_slug, "dp");
    assert_eq!(p.problem.id.as_deref(), Some("dp-climb-stairs-2"));
  }

  #[test]
  fn topics_sorted_by_order_and_duplicates_dropped() {
    let store = CurriculumStore::ingest(Curriculum {
      topics: vec![topic("b", Some(2), &[]), topic("a", Some(1), &[]), topic("c", None, &[]), topic("a", Some(0), &["X"])],
    });
    let slugs: Vec<&str> = store.topics().iter().map(|t| t.meta.slug.as_str()).collect();
    // The order-0 "a" sorts first and wins; the later duplicate is skipped.
    assert_eq!(slugs, vec!["a", "b", "c"]);
    assert_eq!(store.problem_count(), 1);
  }

  #[test]
  fn every_problem_belongs_to_its_topic() {
    let store = CurriculumStore::ingest(seed_curriculum());
    for t in store.topics() {
      for p in store.problems_of(t) {
        assert_eq!(p.topic_slug, t.meta.slug);
      }
    }
    assert!(store.problem("arrays-and-hashing-two-sum").is_some());
  }
}
