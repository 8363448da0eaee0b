//! Cleaning passes over a curriculum.
//!
//! Every pass is a pure edit applied through one traversal and is idempotent:
//! running the same pass twice changes nothing the second time.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::domain::{Curriculum, Difficulty, Problem, TopicMeta, TopicRecord};
use crate::normalize::convert_to_multi_lang;
use crate::util::{normalize, strip_wrapping_backticks, unescape_whitespace};

static COMPLEXITY_LINE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?im)^[ \t]*(?://|#|/\*+|\*|--)?[ \t]*(?:time|space)[ \t]+complexity\b.*(?:\r?\n|$)")
    .expect("static regex")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Pass {
  /// Literal `\n`, `\t`, `\r` in text fields become real whitespace.
  Unescape,
  /// Markdown fences and stray backticks around solution code.
  StripFences,
  /// `Time/Space Complexity` comment lines in solution code.
  StripComplexity,
  /// Title-case difficulty; unknown values become Medium.
  Difficulty,
  /// Legacy `N\nv1 v2 ...` inputs become named assignments.
  LegacyInputs,
  /// Same-title problems within a topic collapse into the first one.
  Dedupe,
}

impl Pass {
  pub const ALL: [Pass; 6] =
    [Pass::Unescape, Pass::StripFences, Pass::StripComplexity, Pass::Difficulty, Pass::LegacyInputs, Pass::Dedupe];
}

/// Visit every problem with its owning topic. Returns how many calls reported a change.
pub fn for_each_problem<F>(curriculum: &mut Curriculum, mut f: F) -> usize
where
  F: FnMut(&TopicMeta, &mut Problem) -> bool,
{
  let mut changed = 0;
  for record in &mut curriculum.topics {
    for problem in &mut record.problems {
      if f(&record.topic, problem) {
        changed += 1;
      }
    }
  }
  changed
}

fn set_if_changed(field: &mut String, value: String) -> bool {
  if *field == value {
    return false;
  }
  *field = value;
  true
}

pub fn unescape_problem(problem: &mut Problem) -> bool {
  let mut changed = false;
  for field in [
    &mut problem.description,
    &mut problem.concept_explanation,
    &mut problem.worked_example,
    &mut problem.submission_format,
  ] {
    let v = unescape_whitespace(field);
    changed |= set_if_changed(field, v);
  }
  for tc in &mut problem.test_cases {
    let v = unescape_whitespace(&tc.input);
    changed |= set_if_changed(&mut tc.input, v);
    let v = unescape_whitespace(&tc.expected_output);
    changed |= set_if_changed(&mut tc.expected_output, v);
  }
  for s in &mut problem.solutions {
    let v = unescape_whitespace(&s.code);
    changed |= set_if_changed(&mut s.code, v);
  }
  changed
}

/// Drop a leading ```lang line, a trailing ``` line and one pair of backticks
/// wrapping the whole snippet.
pub fn strip_fences(code: &str) -> String {
  if !code.contains('`') {
    return code.to_string();
  }
  let mut lines: Vec<&str> = code.lines().collect();
  if lines.first().map_or(false, |l| l.trim_start().starts_with("```")) {
    lines.remove(0);
  }
  if lines.last().map_or(false, |l| l.trim() == "```") {
    lines.pop();
  }
  let joined = lines.join("\n");
  strip_wrapping_backticks(&joined).trim_matches('\n').to_string()
}

pub fn strip_fences_problem(problem: &mut Problem) -> bool {
  let mut changed = false;
  for s in &mut problem.solutions {
    let v = strip_fences(&s.code);
    changed |= set_if_changed(&mut s.code, v);
  }
  changed
}

/// Remove complexity comment lines. Code without any is returned as is; otherwise
/// trailing blank space left by the removal is trimmed and a final newline kept.
pub fn strip_complexity(code: &str) -> String {
  if !COMPLEXITY_LINE.is_match(code) {
    return code.to_string();
  }
  let mut out = COMPLEXITY_LINE.replace_all(code, "").trim_end().to_string();
  if code.ends_with('\n') && !out.is_empty() {
    out.push('\n');
  }
  out
}

pub fn strip_complexity_problem(problem: &mut Problem) -> bool {
  let mut changed = false;
  for s in &mut problem.solutions {
    let v = strip_complexity(&s.code);
    changed |= set_if_changed(&mut s.code, v);
  }
  changed
}

pub fn legacy_inputs_problem(problem: &mut Problem) -> bool {
  let mut changed = false;
  for tc in &mut problem.test_cases {
    let v = convert_to_multi_lang(&tc.input);
    changed |= set_if_changed(&mut tc.input, v);
  }
  changed
}

/// Collapse same-title problems (ignoring case and whitespace). The kept
/// problem absorbs solutions for languages it lacks. Returns how many were dropped.
pub fn dedupe_topic(record: &mut TopicRecord) -> usize {
  let before = record.problems.len();
  let mut kept: Vec<Problem> = Vec::with_capacity(before);
  let mut index: HashMap<String, usize> = HashMap::new();

  for problem in record.problems.drain(..) {
    let key = normalize(&problem.title).to_lowercase();
    match index.get(&key) {
      Some(&i) => {
        let target = &mut kept[i];
        for s in problem.solutions {
          if target.solution_for(s.language, s.kind).is_none() {
            target.solutions.push(s);
          }
        }
        if target.test_cases.is_empty() {
          target.test_cases = problem.test_cases;
        }
      }
      None => {
        index.insert(key, kept.len());
        kept.push(problem);
      }
    }
  }

  record.problems = kept;
  before - record.problems.len()
}

/// Title-case every `difficulty` string in a raw document. Works on JSON
/// before typed parsing so the original spelling is still visible.
pub fn normalize_difficulty_value(doc: &mut Value) -> usize {
  match doc {
    Value::Object(map) => {
      let mut changed = 0;
      let is_problem = map.contains_key("title") && map.contains_key("difficulty");
      for (k, v) in map.iter_mut() {
        if is_problem && k == "difficulty" {
          let fixed = v
            .as_str()
            .and_then(|s| s.parse::<Difficulty>().ok())
            .unwrap_or_default()
            .as_str();
          if v.as_str() != Some(fixed) {
            *v = Value::String(fixed.to_string());
            changed += 1;
          }
        } else {
          changed += normalize_difficulty_value(v);
        }
      }
      changed
    }
    Value::Array(items) => items.iter_mut().map(normalize_difficulty_value).sum(),
    _ => 0,
  }
}

/// Per-pass change counts.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct CleanReport {
  pub changes: Vec<(Pass, usize)>,
}

impl CleanReport {
  pub fn total(&self) -> usize {
    self.changes.iter().map(|(_, n)| n).sum()
  }
}

/// Apply typed passes in the given order. `Pass::Difficulty` is a no-op here
/// (typed values are already normalized); use `normalize_difficulty_value`
/// on the raw document to count it.
#[instrument(level = "info", skip(curriculum), fields(topics = curriculum.topics.len()))]
pub fn apply_passes(curriculum: &mut Curriculum, passes: &[Pass]) -> CleanReport {
  let mut report = CleanReport::default();
  for &pass in passes {
    let n = match pass {
      Pass::Unescape => for_each_problem(curriculum, |_, p| unescape_problem(p)),
      Pass::StripFences => for_each_problem(curriculum, |_, p| strip_fences_problem(p)),
      Pass::StripComplexity => for_each_problem(curriculum, |_, p| strip_complexity_problem(p)),
      Pass::LegacyInputs => for_each_problem(curriculum, |_, p| legacy_inputs_problem(p)),
      Pass::Dedupe => curriculum.topics.iter_mut().map(dedupe_topic).sum(),
      Pass::Difficulty => 0,
    };
    debug!(target: "curation", ?pass, changed = n, "Pass applied");
    report.changes.push((pass, n));
  }
  info!(target: "curation", total = report.total(), "Cleaning finished");
  report
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Language, Solution, SnippetKind, TestCase};

  fn sol(language: Language, code: &str) -> Solution {
    Solution { language, code: code.into(), kind: SnippetKind::Solution }
  }

  fn curriculum_with(problems: Vec<Problem>) -> Curriculum {
    Curriculum {
      topics: vec![TopicRecord {
        topic: TopicMeta { slug: "t".into(), title: "T".into(), ..Default::default() },
        code_examples: vec![],
        problems,
      }],
    }
  }

  #[test]
  fn fences_and_backticks_are_stripped() {
    assert_eq!(strip_fences("```python\nprint(1)\n```"), "print(1)");
    assert_eq!(strip_fences("`x = 1`"), "x = 1");
    assert_eq!(strip_fences("a\nb"), "a\nb");
    let js = "const greet = (n) => `hi ${n}`";
    assert_eq!(strip_fences(js), js);
    assert_eq!(strip_fences("```js\nconst s = `a`;\n```"), "const s = `a`;");
    assert_eq!(strip_fences("`a` + `b`"), "`a` + `b`");
  }

  #[test]
  fn complexity_lines_are_removed() {
    let code = "int f() {\n    // Time Complexity: O(n)\n    // Space complexity - O(1)\n    return 0;\n}\n# time complexity O(n)";
    assert_eq!(strip_complexity(code), "int f() {\n    return 0;\n}");
    assert_eq!(strip_complexity("x = 1"), "x = 1");
    assert_eq!(strip_complexity("int x = 1;\n"), "int x = 1;\n");
    assert_eq!(strip_complexity("int x = 1;\n\n"), "int x = 1;\n\n");

    let once = strip_complexity("x = 1\n// Time complexity: O(1)\n");
    assert_eq!(once, "x = 1\n");
    assert_eq!(strip_complexity(&once), once);
  }

  #[test]
  fn passes_are_idempotent() {
    let problem = Problem {
      title: "P".into(),
      description: "Line one\\nLine two".into(),
      test_cases: vec![TestCase { input: "3\n1 2 3".into(), expected_output: "6".into(), hidden: false }],
      solutions: vec![sol(Language::Python, "```python\n# Time Complexity: O(n)\nprint(6)\n```")],
      ..Default::default()
    };
    let mut c = curriculum_with(vec![problem]);
    let first = apply_passes(&mut c, &Pass::ALL);
    assert!(first.total() > 0);
    let snapshot = c.clone();
    let second = apply_passes(&mut c, &Pass::ALL);
    assert_eq!(second.total(), 0);
    assert_eq!(c, snapshot);

    let p = &c.topics[0].problems[0];
    assert_eq!(p.description, "Line one\nLine two");
    assert_eq!(p.test_cases[0].input, "n = 3\narr = [1, 2, 3]");
    assert_eq!(p.solutions[0].code, "print(6)");
  }

  #[test]
  fn dedupe_absorbs_missing_languages() {
    let a = Problem { title: "Two Sum".into(), solutions: vec![sol(Language::Python, "a")], ..Default::default() };
    let b = Problem {
      title: "two  sum".into(),
      solutions: vec![sol(Language::Python, "b"), sol(Language::Java, "j")],
      ..Default::default()
    };
    let mut c = curriculum_with(vec![a, b]);
    let dropped = dedupe_topic(&mut c.topics[0]);
    assert_eq!(dropped, 1);
    let kept = &c.topics[0].problems[0];
    assert_eq!(kept.solutions.len(), 2);
    assert_eq!(kept.solution_for(Language::Python, SnippetKind::Solution).unwrap().code, "a");
  }

  #[test]
  fn difficulty_values_are_title_cased() {
    let mut doc = serde_json::json!({
      "topics": [{"topic": {"slug": "t", "title": "T"}, "problems": [
        {"title": "A", "difficulty": "EASY"},
        {"title": "B", "difficulty": "Hard"},
        {"title": "C", "difficulty": "legendary"}
      ]}]
    });
    assert_eq!(normalize_difficulty_value(&mut doc), 2);
    assert_eq!(doc["topics"][0]["problems"][2]["difficulty"], "Medium");
    assert_eq!(normalize_difficulty_value(&mut doc), 0);
  }

  #[test]
  fn traversal_sees_owning_topic() {
    let mut c = curriculum_with(vec![Problem { title: "X".into(), ..Default::default() }]);
    let mut seen = Vec::new();
    for_each_problem(&mut c, |t, p| {
      seen.push(format!("{}/{}", t.slug, p.title));
      false
    });
    assert_eq!(seen, vec!["t/X"]);
  }
}
