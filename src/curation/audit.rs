//! Offline data-quality report.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::domain::{Curriculum, Difficulty, Language, SnippetKind};
use crate::normalize::parse_inputs;

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InputIssue {
  pub topic: String,
  pub problem: String,
  pub case_index: usize,
  pub input: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MissingLanguages {
  pub topic: String,
  pub problem: String,
  pub languages: Vec<Language>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DifficultyIssue {
  pub problem: String,
  pub raw: String,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
  pub topics: usize,
  pub problems: usize,
  /// Test cases whose input yields no variables.
  pub unparseable_inputs: Vec<InputIssue>,
  pub missing_languages: Vec<MissingLanguages>,
  pub unknown_difficulties: Vec<DifficultyIssue>,
  /// `topic/problem` of problems with no test cases.
  pub empty_test_sets: Vec<String>,
}

impl AuditReport {
  pub fn is_clean(&self) -> bool {
    self.unparseable_inputs.is_empty()
      && self.missing_languages.is_empty()
      && self.unknown_difficulties.is_empty()
      && self.empty_test_sets.is_empty()
  }
}

/// Audit a typed curriculum. Unknown difficulties are invisible once parsed;
/// fill them with `unknown_difficulties` on the raw document.
pub fn audit(curriculum: &Curriculum) -> AuditReport {
  let mut report = AuditReport { topics: curriculum.topics.len(), ..Default::default() };

  for record in &curriculum.topics {
    let topic = &record.topic.slug;
    for problem in &record.problems {
      report.problems += 1;

      if problem.test_cases.is_empty() {
        report.empty_test_sets.push(format!("{topic}/{}", problem.title));
      }
      for (case_index, tc) in problem.test_cases.iter().enumerate() {
        if parse_inputs(&tc.input).is_empty() {
          report.unparseable_inputs.push(InputIssue {
            topic: topic.clone(),
            problem: problem.title.clone(),
            case_index,
            input: tc.input.clone(),
          });
        }
      }

      let languages: Vec<Language> = Language::ALL
        .into_iter()
        .filter(|&l| problem.solution_for(l, SnippetKind::Solution).is_none())
        .collect();
      if !languages.is_empty() {
        report.missing_languages.push(MissingLanguages { topic: topic.clone(), problem: problem.title.clone(), languages });
      }
    }
  }
  report
}

/// Problems whose `difficulty` is not Easy/Medium/Hard in any case.
pub fn unknown_difficulties(doc: &Value) -> Vec<DifficultyIssue> {
  let mut out = Vec::new();
  collect_difficulties(doc, &mut out);
  out
}

fn collect_difficulties(v: &Value, out: &mut Vec<DifficultyIssue>) {
  match v {
    Value::Object(map) => {
      if let (Some(title), Some(d)) = (map.get("title").and_then(Value::as_str), map.get("difficulty")) {
        let ok = d.as_str().map_or(false, |s| s.parse::<Difficulty>().is_ok());
        if !ok {
          let raw = d.as_str().map(str::to_string).unwrap_or_else(|| d.to_string());
          out.push(DifficultyIssue { problem: title.to_string(), raw });
        }
      }
      map.values().for_each(|child| collect_difficulties(child, out));
    }
    Value::Array(items) => items.iter().for_each(|child| collect_difficulties(child, out)),
    _ => {}
  }
}

impl fmt::Display for AuditReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{} topics, {} problems", self.topics, self.problems)?;
    if self.is_clean() {
      return writeln!(f, "no issues found");
    }
    for i in &self.unparseable_inputs {
      writeln!(f, "unparseable input  {}/{} case {}: {:?}", i.topic, i.problem, i.case_index, i.input)?;
    }
    for m in &self.missing_languages {
      let langs: Vec<&str> = m.languages.iter().map(|l| l.as_str()).collect();
      writeln!(f, "missing solutions  {}/{}: {}", m.topic, m.problem, langs.join(", "))?;
    }
    for d in &self.unknown_difficulties {
      writeln!(f, "unknown difficulty {}: {:?}", d.problem, d.raw)?;
    }
    for p in &self.empty_test_sets {
      writeln!(f, "no test cases      {p}")?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Problem, Solution, TestCase, TopicMeta, TopicRecord};

  #[test]
  fn reports_each_issue_kind() {
    let full: Vec<Solution> = Language::ALL
      .into_iter()
      .map(|language| Solution { language, code: "x".into(), kind: SnippetKind::Solution })
      .collect();
    let c = Curriculum {
      topics: vec![TopicRecord {
        topic: TopicMeta { slug: "t".into(), title: "T".into(), ..Default::default() },
        code_examples: vec![],
        problems: vec![
          Problem {
            title: "Good".into(),
            test_cases: vec![TestCase { input: "nums = [1]".into(), expected_output: "1".into(), hidden: false }],
            solutions: full,
            ..Default::default()
          },
          Problem {
            title: "Bad".into(),
            test_cases: vec![TestCase { input: "see description".into(), expected_output: "1".into(), hidden: false }],
            ..Default::default()
          },
          Problem { title: "Empty".into(), ..Default::default() },
        ],
      }],
    };

    let report = audit(&c);
    assert_eq!(report.problems, 3);
    assert_eq!(report.unparseable_inputs.len(), 1);
    assert_eq!(report.unparseable_inputs[0].problem, "Bad");
    assert_eq!(report.missing_languages.len(), 2);
    assert_eq!(report.missing_languages[0].languages.len(), 5);
    assert_eq!(report.empty_test_sets, vec!["t/Empty"]);
    assert!(!report.is_clean());
    assert!(report.to_string().contains("no test cases      t/Empty"));
  }

  #[test]
  fn seed_curriculum_inputs_all_parse() {
    let report = audit(&crate::seeds::seed_curriculum());
    assert!(report.unparseable_inputs.is_empty());
    assert!(report.empty_test_sets.is_empty());
  }

  #[test]
  fn raw_difficulties_are_checked() {
    let doc = serde_json::json!([{"slug": "t", "title": "T", "problems": [
      {"title": "A", "difficulty": "EASY"},
      {"title": "B", "difficulty": "Expert"},
      {"title": "C", "difficulty": 3}
    ]}]);
    let issues = unknown_difficulties(&doc);
    assert_eq!(issues, vec![
      DifficultyIssue { problem: "B".into(), raw: "Expert".into() },
      DifficultyIssue { problem: "C".into(), raw: "3".into() },
    ]);
  }
}
