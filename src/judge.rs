//! Run/submit judging against a Piston-compatible code runner.
//!
//! Python and JavaScript submissions get a generated driver that calls the
//! function named in the problem's submission format with each test case's
//! normalized variables and prints the result as JSON. Compiled languages run
//! as written, with the variable values fed on stdin one per line.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::boilerplate::{extract_signature, function_name, signature_params};
use crate::config::JudgeCfg;
use crate::domain::{Language, Problem, SubmissionStatus, TestCase};
use crate::normalize::parse_inputs_with_params;
use crate::util::trunc_for_log;

static PY_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(true|false|null)\b").expect("static regex"));
static JS_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(True|False|None)\b").expect("static regex"));
static BOOL_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(true|false)\b").expect("static regex"));

pub const RUNNER_MISSING: &str = "Code runner is not configured";

#[derive(Clone)]
pub struct RunnerClient {
  client: reqwest::Client,
  base_url: String,
  versions: HashMap<String, String>,
}

/// Output of one execution. `compile_error` is set when the compile stage failed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecOutput {
  pub stdout: String,
  pub stderr: String,
  pub exit_code: Option<i32>,
  pub compile_error: Option<String>,
}

impl RunnerClient {
  /// None when no runner URL is configured.
  pub fn from_config(cfg: &JudgeCfg) -> Option<Self> {
    let base_url = cfg.runner_url.clone()?.trim_end_matches('/').to_string();
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
      .build()
      .ok()?;
    Some(Self { client, base_url, versions: cfg.versions.clone() })
  }

  fn file_name(language: Language) -> &'static str {
    match language {
      Language::Cpp => "main.cpp",
      Language::C => "main.c",
      Language::Java => "Main.java",
      Language::Python => "main.py",
      Language::Javascript => "main.js",
    }
  }

  #[instrument(level = "debug", skip(self, source, stdin), fields(source_len = source.len()))]
  pub async fn execute(&self, language: Language, source: &str, stdin: &str) -> Result<ExecOutput, String> {
    let version = self.versions.get(language.as_str()).cloned().unwrap_or_else(|| "*".into());
    let req = ExecuteRequest {
      language: language.as_str(),
      version,
      files: vec![ExecuteFile { name: Self::file_name(language), content: source }],
      stdin,
    };

    let res = self.client
      .post(format!("{}/execute", self.base_url))
      .json(&req)
      .send()
      .await
      .map_err(|e| e.to_string())?;
    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      return Err(format!("runner HTTP {}: {}", status, trunc_for_log(&body, 200)));
    }

    let body: ExecuteResponse = res.json().await.map_err(|e| e.to_string())?;
    Ok(body.into())
  }
}

#[derive(Serialize)]
struct ExecuteRequest<'a> {
  language: &'a str,
  version: String,
  files: Vec<ExecuteFile<'a>>,
  stdin: &'a str,
}

#[derive(Serialize)]
struct ExecuteFile<'a> {
  name: &'a str,
  content: &'a str,
}

#[derive(Deserialize, Default)]
struct Stage {
  #[serde(default)]
  stdout: String,
  #[serde(default)]
  stderr: String,
  #[serde(default)]
  code: Option<i32>,
}

#[derive(Deserialize)]
struct ExecuteResponse {
  #[serde(default)]
  run: Stage,
  #[serde(default)]
  compile: Option<Stage>,
}

impl From<ExecuteResponse> for ExecOutput {
  fn from(r: ExecuteResponse) -> Self {
    let compile_error = r
      .compile
      .filter(|c| c.code.unwrap_or(0) != 0)
      .map(|c| if c.stderr.trim().is_empty() { c.stdout } else { c.stderr });
    ExecOutput { stdout: r.run.stdout, stderr: r.run.stderr, exit_code: r.run.code, compile_error }
  }
}

/// Program text plus stdin for one test case.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
  pub source: String,
  pub stdin: String,
}

/// Rewrite literal keywords for the target language, leaving quoted text alone.
fn literal_for(language: Language, value: &str) -> String {
  let re: &Regex = match language {
    Language::Python => &*PY_KEYWORD,
    Language::Javascript => &*JS_KEYWORD,
    _ => return value.to_string(),
  };
  let mut out = String::with_capacity(value.len());
  let mut quote: Option<char> = None;
  let mut chunk = String::new();
  let flush = |chunk: &mut String, out: &mut String| {
    let replaced = re.replace_all(chunk.as_str(), |caps: &regex::Captures| {
      match &caps[1] {
        "true" => "True",
        "false" => "False",
        "null" => "None",
        "True" => "true",
        "False" => "false",
        _ => "null",
      }
      .to_string()
    });
    out.push_str(&replaced);
    chunk.clear();
  };
  for ch in value.chars() {
    match quote {
      Some(q) => {
        out.push(ch);
        if ch == q {
          quote = None;
        }
      }
      None if ch == '"' || ch == '\'' => {
        flush(&mut chunk, &mut out);
        out.push(ch);
        quote = Some(ch);
      }
      None => chunk.push(ch),
    }
  }
  flush(&mut chunk, &mut out);
  out
}

/// Arguments in signature order; without a usable signature, every variable in name order.
fn ordered_args(params: &[String], vars: &BTreeMap<String, String>) -> Vec<String> {
  let by_param: Vec<String> = params.iter().filter_map(|p| vars.get(p).cloned()).collect();
  if by_param.is_empty() { vars.values().cloned().collect() } else { by_param }
}

/// Build the program for one test case.
pub fn build_program(code: &str, language: Language, signature: Option<&str>, case_input: &str) -> Program {
  let params = signature.map(|s| signature_params(s, language)).unwrap_or_default();
  let vars = parse_inputs_with_params(case_input, &params);
  let args = ordered_args(&params, &vars);
  let func = signature.and_then(|s| function_name(s, language));
  let has_class = code.contains("class Solution");

  match (language, func) {
    (Language::Python, Some(func)) => {
      let call = if has_class { format!("Solution().{func}") } else { func };
      let args: Vec<String> = args.iter().map(|a| literal_for(language, a)).collect();
      Program {
        source: format!(
          "{code}\n\nif __name__ == \"__main__\":\n    import json as _json\n    _result = {call}({})\n    print(_json.dumps(_result))\n",
          args.join(", ")
        ),
        stdin: String::new(),
      }
    }
    (Language::Javascript, Some(func)) => {
      let call = if has_class { format!("new Solution().{func}") } else { func };
      let args: Vec<String> = args.iter().map(|a| literal_for(language, a)).collect();
      Program {
        source: format!(
          "{code}\n\n;(() => {{\n  const __result = {call}({});\n  console.log(JSON.stringify(__result));\n}})();\n",
          args.join(", ")
        ),
        stdin: String::new(),
      }
    }
    _ => {
      let mut stdin = args.join("\n");
      if !stdin.is_empty() {
        stdin.push('\n');
      }
      Program { source: code.to_string(), stdin }
    }
  }
}

fn strip_one_quote_layer(s: &str) -> &str {
  let b = s.as_bytes();
  if b.len() >= 2 && (b[0] == b'"' || b[0] == b'\'') && b[b.len() - 1] == b[0] {
    &s[1..s.len() - 1]
  } else {
    s
  }
}

fn canonical_output(s: &str) -> String {
  let s = strip_one_quote_layer(s.trim());
  let squashed: String = s
    .chars()
    .filter(|c| !c.is_whitespace())
    .map(|c| if c == '\'' { '"' } else { c })
    .collect();
  BOOL_WORD.replace_all(&squashed, |caps: &regex::Captures| caps[1].to_ascii_lowercase()).into_owned()
}

/// Compare outputs ignoring whitespace, one layer of surrounding quotes,
/// quote style and boolean case.
pub fn outputs_match(expected: &str, actual: &str) -> bool {
  canonical_output(expected) == canonical_output(actual)
}

/// Run shows visible cases only; submit runs everything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JudgeMode {
  Run,
  Submit,
}

impl JudgeMode {
  /// Cases to execute with their original indices. When every case is
  /// hidden, run still executes the first one.
  pub fn select_cases<'a>(&self, cases: &'a [TestCase]) -> Vec<(usize, &'a TestCase)> {
    let all = cases.iter().enumerate();
    match self {
      JudgeMode::Submit => all.collect(),
      JudgeMode::Run => {
        let visible: Vec<_> = all.filter(|(_, c)| !c.hidden).collect();
        if visible.is_empty() { cases.iter().enumerate().take(1).collect() } else { visible }
      }
    }
  }
}

/// Per-case result. Hidden cases expose only pass/fail.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
  pub index: usize,
  pub passed: bool,
  pub hidden: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub input: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub expected_output: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub actual_output: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  #[serde(skip)]
  pub(crate) outcome: CaseOutcome,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CaseOutcome {
  Passed,
  Wrong,
  Errored,
  Unavailable,
}

/// Grade one case from its execution result.
pub fn grade_case(index: usize, case: &TestCase, exec: Result<ExecOutput, String>) -> TestResult {
  let (outcome, actual, error) = match exec {
    Err(e) => (CaseOutcome::Unavailable, None, Some(e)),
    Ok(out) => {
      if let Some(compile) = out.compile_error {
        (CaseOutcome::Errored, None, Some(compile))
      } else if out.exit_code.unwrap_or(0) != 0 {
        let msg = if out.stderr.trim().is_empty() { format!("exited with code {}", out.exit_code.unwrap_or(-1)) } else { out.stderr };
        (CaseOutcome::Errored, Some(out.stdout.trim().to_string()), Some(msg))
      } else {
        let actual = out.stdout.trim().to_string();
        let outcome = if outputs_match(&case.expected_output, &actual) { CaseOutcome::Passed } else { CaseOutcome::Wrong };
        (outcome, Some(actual), None)
      }
    }
  };

  let visible = !case.hidden;
  TestResult {
    index,
    passed: outcome == CaseOutcome::Passed,
    hidden: case.hidden,
    input: visible.then(|| case.input.clone()),
    expected_output: visible.then(|| case.expected_output.clone()),
    actual_output: actual.filter(|_| visible),
    error: error.filter(|_| visible || outcome == CaseOutcome::Unavailable),
    outcome,
  }
}

/// Overall verdict. Zero executed cases is never accepted.
pub fn overall_status(results: &[TestResult]) -> SubmissionStatus {
  if results.iter().any(|r| r.outcome == CaseOutcome::Unavailable) {
    SubmissionStatus::RunnerUnavailable
  } else if results.iter().any(|r| r.outcome == CaseOutcome::Errored) {
    SubmissionStatus::RuntimeError
  } else if !results.is_empty() && results.iter().all(|r| r.passed) {
    SubmissionStatus::Accepted
  } else {
    SubmissionStatus::WrongAnswer
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct JudgeOutcome {
  pub status: SubmissionStatus,
  pub results: Vec<TestResult>,
}

/// Execute the selected cases sequentially and grade them.
#[instrument(level = "info", skip(runner, problem, code), fields(problem = %problem.title, code_len = code.len()))]
pub async fn judge(
  runner: Option<&RunnerClient>,
  problem: &Problem,
  language: Language,
  code: &str,
  mode: JudgeMode,
) -> JudgeOutcome {
  let signature = extract_signature(&problem.submission_format, language);
  let cases = mode.select_cases(&problem.test_cases);
  if cases.is_empty() {
    warn!(target: "judge", "Problem has no test cases");
  }

  let mut results = Vec::with_capacity(cases.len());
  for (index, case) in cases {
    let exec = match runner {
      None => Err(RUNNER_MISSING.to_string()),
      Some(runner) => {
        let program = build_program(code, language, signature.as_deref(), &case.input);
        let exec = runner.execute(language, &program.source, &program.stdin).await;
        if let Err(e) = &exec {
          error!(target: "judge", index, error = %e, "Runner call failed");
        }
        exec
      }
    };
    let result = grade_case(index, case, exec);
    debug!(target: "judge", index, passed = result.passed, hidden = result.hidden, "Case graded");
    results.push(result);
  }

  let status = overall_status(&results);
  info!(target: "judge", ?status, cases = results.len(), passed = results.iter().filter(|r| r.passed).count(), "Judging finished");
  JudgeOutcome { status, results }
}
