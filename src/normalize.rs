//! Test-case input normalization.
//!
//! Test data stores inputs as loosely formatted text:
//!   - `n = 5\narr = [1, 2, 3]`
//!   - `nums = [2, 7, 11, 15], target = 9`
//!   - `[1, 2, 3]` (no names at all)
//!   - legacy judge format: `3\n1 2 3`
//!
//! `parse_inputs` turns any of these into a name -> literal mapping that the
//! harness generator binds as variables. It never fails; unrecognized text just
//! produces fewer variables, which `curation::audit` reports offline.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

static NAMED_SEGMENT: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^([a-zA-Z_][a-zA-Z0-9_]*)\s*[:=]\s*(.*)$").expect("static regex"));

static LINKED_LIST: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^-?\w+(\s*->\s*-?\w+)+$").expect("static regex"));

static NUMBER: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^[-+]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("static regex"));

static INPUT_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^input\s*:\s*").expect("static regex"));

/// What an unnamed literal looks like, used to pick a default parameter name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LiteralKind {
  /// Level-order array with `null` holes.
  Tree,
  /// `1 -> 2 -> 3` chain.
  List,
  Array,
  Number,
  Str,
  Other,
}

/// Default parameter names, in assignment order, with the literal kind each accepts.
const DEFAULT_SLOTS: &[(&str, LiteralKind)] = &[
  ("root", LiteralKind::Tree),
  ("head", LiteralKind::List),
  ("nums", LiteralKind::Array),
  ("arr", LiteralKind::Array),
  ("n", LiteralKind::Number),
  ("s", LiteralKind::Str),
  ("target", LiteralKind::Number),
  ("k", LiteralKind::Number),
];

/// Parse a free-form test-case input into `name -> literal text`.
///
/// Named segments (`name = value` or `name: value`) always win; unnamed
/// literals are only used when no segment carried a name, and are then bound
/// to the default name table. Duplicate names keep the last value.
pub fn parse_inputs(input: &str) -> BTreeMap<String, String> {
  parse_inputs_with_params(input, &[])
}

/// Same as [`parse_inputs`], but unnamed literals bind to `params` (typically the
/// parameter names of the problem's function signature) positionally.
pub fn parse_inputs_with_params(input: &str, params: &[String]) -> BTreeMap<String, String> {
  let mut named = BTreeMap::new();
  let mut unnamed: Vec<String> = Vec::new();

  for segment in split_segments(input) {
    let segment = INPUT_LABEL.replace(&segment, "").trim().to_string();
    if segment.is_empty() {
      continue;
    }
    if let Some(caps) = NAMED_SEGMENT.captures(&segment) {
      named.insert(caps[1].to_string(), caps[2].trim().to_string());
    } else if looks_like_literal(&segment) {
      unnamed.push(segment);
    }
  }

  if !named.is_empty() || unnamed.is_empty() {
    return named;
  }

  if !params.is_empty() {
    for (i, value) in unnamed.into_iter().enumerate() {
      let name = params.get(i).cloned().unwrap_or_else(|| format!("arg{i}"));
      named.insert(name, canonical_literal(&value));
    }
    return named;
  }

  let mut used = [false; DEFAULT_SLOTS.len()];
  for (i, value) in unnamed.into_iter().enumerate() {
    let kind = classify(&value);
    let slot = DEFAULT_SLOTS
      .iter()
      .enumerate()
      .find(|(idx, (_, accepts))| !used[*idx] && *accepts == kind)
      .map(|(idx, _)| idx);
    let name = match slot {
      Some(idx) => {
        used[idx] = true;
        DEFAULT_SLOTS[idx].0.to_string()
      }
      None => format!("arg{i}"),
    };
    named.insert(name, canonical_literal(&value));
  }
  named
}

/// Split on newlines, then on commas at bracket depth zero and outside quotes.
pub fn split_segments(input: &str) -> Vec<String> {
  let mut out = Vec::new();
  for line in input.lines() {
    let mut depth: usize = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut current = String::new();

    for ch in line.chars() {
      if let Some(q) = quote {
        current.push(ch);
        if escaped {
          escaped = false;
        } else if ch == '\\' {
          escaped = true;
        } else if ch == q {
          quote = None;
        }
        continue;
      }
      match ch {
        '"' | '\'' => {
          quote = Some(ch);
          current.push(ch);
        }
        '[' | '{' | '(' => {
          depth += 1;
          current.push(ch);
        }
        ']' | '}' | ')' => {
          depth = depth.saturating_sub(1);
          current.push(ch);
        }
        ',' if depth == 0 => {
          out.push(std::mem::take(&mut current).trim().to_string());
        }
        _ => current.push(ch),
      }
    }
    out.push(current.trim().to_string());
  }
  out.retain(|s| !s.is_empty());
  out
}

/// Decimal literal only; `inf` and `NaN` are words here.
fn is_number(s: &str) -> bool {
  NUMBER.is_match(s)
}

fn looks_like_literal(s: &str) -> bool {
  s.starts_with(['[', '{', '"', '\''])
    || is_number(s)
    || matches!(s, "true" | "false" | "null" | "True" | "False" | "None")
    || LINKED_LIST.is_match(s)
}

fn classify(s: &str) -> LiteralKind {
  if s.starts_with('[') {
    if s.contains("null") { LiteralKind::Tree } else { LiteralKind::Array }
  } else if s.starts_with(['"', '\'']) {
    LiteralKind::Str
  } else if is_number(s) {
    LiteralKind::Number
  } else if LINKED_LIST.is_match(s) {
    LiteralKind::List
  } else {
    LiteralKind::Other
  }
}

/// Linked-list chains become bracket arrays (trailing `null` dropped);
/// everything else is kept verbatim.
fn canonical_literal(s: &str) -> String {
  if s.starts_with('[') || !LINKED_LIST.is_match(s) {
    return s.to_string();
  }
  let items: Vec<&str> = s
    .split("->")
    .map(str::trim)
    .filter(|t| !t.eq_ignore_ascii_case("null"))
    .collect();
  format!("[{}]", items.join(", "))
}

/// Rewrite the legacy judge formats into `name = value` lines.
///
/// Recognized shapes only:
///   - `N\nv1 .. vN`          -> `n = N\narr = [v1, .., vN]`
///   - `N\nv1 .. vN\ntarget`  -> same plus `\ntarget = target`
///   - `N` (a bare number)     -> `n = N`
///
/// Anything else is returned verbatim.
pub fn convert_to_multi_lang(input: &str) -> String {
  let lines: Vec<&str> = input.trim().lines().map(str::trim).collect();

  match lines.as_slice() {
    [single] if is_number(single) => format!("n = {single}"),
    [count, values] => match legacy_array(count, values) {
      Some(arr) => format!("n = {count}\narr = {arr}"),
      None => input.to_string(),
    },
    [count, values, target] if !target.is_empty() && !target.contains(char::is_whitespace) => {
      match legacy_array(count, values) {
        Some(arr) => format!("n = {count}\narr = {arr}\ntarget = {target}"),
        None => input.to_string(),
      }
    }
    _ => input.to_string(),
  }
}

fn legacy_array(count: &str, values: &str) -> Option<String> {
  let n: usize = count.parse().ok()?;
  let tokens: Vec<&str> = values.split_whitespace().collect();
  if tokens.len() != n || n == 0 {
    return None;
  }
  Some(format!("[{}]", tokens.join(", ")))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
  }

  #[test]
  fn named_lines() {
    assert_eq!(parse_inputs("n = 5\narr = [1, 2, 3]"), map(&[("n", "5"), ("arr", "[1, 2, 3]")]));
  }

  #[test]
  fn commas_inside_brackets_do_not_split() {
    let got = parse_inputs("arr = [1, 2], target = 3");
    assert_eq!(got.len(), 2);
    assert_eq!(got, map(&[("arr", "[1, 2]"), ("target", "3")]));

    let got = parse_inputs("grid = [[1,0],[0,1]], pairs = {\"a\": (1, 2)}");
    assert_eq!(got["grid"], "[[1,0],[0,1]]");
    assert_eq!(got["pairs"], "{\"a\": (1, 2)}");
  }

  #[test]
  fn commas_inside_quotes_do_not_split() {
    let got = parse_inputs("s = \"a,b\", k = 2");
    assert_eq!(got, map(&[("s", "\"a,b\""), ("k", "2")]));
  }

  #[test]
  fn colon_separator_and_input_label() {
    assert_eq!(parse_inputs("target: 9"), map(&[("target", "9")]));
    assert_eq!(parse_inputs("Input: nums = [3, 2]"), map(&[("nums", "[3, 2]")]));
  }

  #[test]
  fn bare_array_goes_to_nums() {
    assert_eq!(parse_inputs("[1, 2, 3, 4]"), map(&[("nums", "[1, 2, 3, 4]")]));
  }

  #[test]
  fn positional_defaults_follow_kind() {
    let got = parse_inputs("[3,9,20,null,null,15,7]");
    assert_eq!(got, map(&[("root", "[3,9,20,null,null,15,7]")]));

    let got = parse_inputs("1 -> 2 -> 3 -> null");
    assert_eq!(got, map(&[("head", "[1, 2, 3]")]));

    let got = parse_inputs("[2, 7, 11, 15]\n9");
    assert_eq!(got, map(&[("nums", "[2, 7, 11, 15]"), ("n", "9")]));

    let got = parse_inputs("\"abc\", 2, 3");
    assert_eq!(got, map(&[("s", "\"abc\""), ("n", "2"), ("target", "3")]));
  }

  #[test]
  fn overflow_gets_arg_names() {
    let got = parse_inputs("[1], [2], [3]");
    assert_eq!(got, map(&[("nums", "[1]"), ("arr", "[2]"), ("arg2", "[3]")]));
    let got = parse_inputs("true");
    assert_eq!(got, map(&[("arg0", "true")]));
  }

  #[test]
  fn named_segments_suppress_unnamed_literals() {
    assert_eq!(parse_inputs("x = 1\n[5, 6]"), map(&[("x", "1")]));
  }

  #[test]
  fn last_write_wins_on_duplicates() {
    assert_eq!(parse_inputs("x = 1, x = 2"), map(&[("x", "2")]));
  }

  #[test]
  fn garbage_yields_empty_mapping() {
    assert!(parse_inputs("").is_empty());
    assert!(parse_inputs("see the picture above").is_empty());
    assert!(parse_inputs("]]]], ,,").is_empty());
  }

  #[test]
  fn params_override_default_table() {
    let params = vec!["prices".to_string(), "fee".to_string()];
    let got = parse_inputs_with_params("[1, 3, 2]\n2", &params);
    assert_eq!(got, map(&[("prices", "[1, 3, 2]"), ("fee", "2")]));
  }

  #[test]
  fn legacy_two_line_array() {
    assert_eq!(convert_to_multi_lang("5\n1 2 3 4 5"), "n = 5\narr = [1, 2, 3, 4, 5]");
    assert_eq!(convert_to_multi_lang("3\n-1 x 7"), "n = 3\narr = [-1, x, 7]");
  }

  #[test]
  fn legacy_three_line_adds_target() {
    assert_eq!(convert_to_multi_lang("4\n2 7 11 15\n9"), "n = 4\narr = [2, 7, 11, 15]\ntarget = 9");
  }

  #[test]
  fn legacy_single_number() {
    assert_eq!(convert_to_multi_lang("42"), "n = 42");
    assert_eq!(convert_to_multi_lang("-2.5e3"), "n = -2.5e3");
  }

  #[test]
  fn non_finite_words_are_not_numbers() {
    for s in ["inf", "NaN", "infinity", "-inf", "1_000"] {
      assert_eq!(convert_to_multi_lang(s), s);
      assert!(parse_inputs(s).is_empty(), "{s:?} should not bind a variable");
    }
  }

  #[test]
  fn unrecognized_shapes_are_identity() {
    for s in [
      "n = 5\narr = [1, 2, 3]",
      "3\n1 2",
      "abc",
      "2\n1 2\n3 4",
      "[1, 2, 3]",
      "",
      "1\n2\n3\n4",
      "x\n1 2",
    ] {
      assert_eq!(convert_to_multi_lang(s), s, "input {s:?} should be untouched");
    }
  }

  #[test]
  fn converted_output_parses_back() {
    let converted = convert_to_multi_lang("3\n4 5 6\n10");
    assert_eq!(parse_inputs(&converted), map(&[("n", "3"), ("arr", "[4, 5, 6]"), ("target", "10")]));
  }
}
