//! Loading application configuration (curriculum path, judge, mentor prompts) from TOML.
//!
//! See `AppConfig` and `Prompts` for expected schema. Every section is optional;
//! a few environment variables override the file (see `apply_env`).

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub curriculum: CurriculumCfg,
  #[serde(default)]
  pub judge: JudgeCfg,
  #[serde(default)]
  pub prompts: Prompts,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CurriculumCfg {
  /// Aggregate JSON produced by `merge`.
  #[serde(default = "default_curriculum_path")]
  pub path: String,
}

impl Default for CurriculumCfg {
  fn default() -> Self {
    Self { path: default_curriculum_path() }
  }
}

fn default_curriculum_path() -> String {
  "./data/curriculum.json".into()
}

/// Code runner settings. Without `runner_url`, run/submit report the runner as unavailable.
#[derive(Clone, Debug, Deserialize)]
pub struct JudgeCfg {
  #[serde(default)]
  pub runner_url: Option<String>,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  /// Runtime version per language (`python = "3.10.0"`); missing entries use `"*"`.
  #[serde(default)]
  pub versions: HashMap<String, String>,
}

impl Default for JudgeCfg {
  fn default() -> Self {
    Self { runner_url: None, timeout_secs: default_timeout_secs(), versions: HashMap::new() }
  }
}

fn default_timeout_secs() -> u64 {
  10
}

/// Prompts used by the mentor. Defaults suit a coding tutor; override them in
/// TOML to tune tone or length.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub mentor_system: String,
  /// Placeholders: {page}, {problem_title}, {problem_difficulty}, {user_code}, {message}
  pub mentor_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      mentor_system: "You are a patient programming mentor on a coding-practice site. Guide the learner with hints and questions; do not hand over complete solutions unless they explicitly ask. Use fenced code blocks tagged with the language for any code.".into(),
      mentor_user_template: "Page: {page}\nProblem: {problem_title} ({problem_difficulty})\nLearner's current code:\n```\n{user_code}\n```\n\nLearner says: {message}".into(),
    }
  }
}

impl AppConfig {
  /// Config file from CONFIG_PATH (or defaults), then environment overrides.
  pub fn from_env() -> Self {
    let cfg = load_config_from_env().unwrap_or_default();
    cfg.apply_env(|k| std::env::var(k).ok())
  }

  /// CURRICULUM_PATH and RUNNER_URL win over the file.
  pub fn apply_env(mut self, get: impl Fn(&str) -> Option<String>) -> Self {
    if let Some(p) = get("CURRICULUM_PATH").filter(|p| !p.is_empty()) {
      self.curriculum.path = p;
    }
    if let Some(u) = get("RUNNER_URL").filter(|u| !u.is_empty()) {
      self.judge.runner_url = Some(u);
    }
    self
  }
}

/// Attempt to load `AppConfig` from CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "curriculum_backend", %path, "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "curriculum_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "curriculum_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_toml_keeps_defaults() {
    let cfg: AppConfig = toml::from_str(
      r#"
      [judge]
      runner_url = "http://localhost:2000/api/v2"
      [judge.versions]
      python = "3.10.0"
      [prompts]
      mentor_system = "Be brief."
      "#,
    )
    .unwrap();
    assert_eq!(cfg.judge.runner_url.as_deref(), Some("http://localhost:2000/api/v2"));
    assert_eq!(cfg.judge.timeout_secs, 10);
    assert_eq!(cfg.judge.versions.get("python").map(String::as_str), Some("3.10.0"));
    assert_eq!(cfg.prompts.mentor_system, "Be brief.");
    assert!(cfg.prompts.mentor_user_template.contains("{message}"));
    assert_eq!(cfg.curriculum.path, "./data/curriculum.json");
  }

  #[test]
  fn env_overrides_file_values() {
    let cfg = AppConfig::default().apply_env(|k| match k {
      "CURRICULUM_PATH" => Some("/srv/curriculum.json".into()),
      "RUNNER_URL" => Some(String::new()),
      _ => None,
    });
    assert_eq!(cfg.curriculum.path, "/srv/curriculum.json");
    assert!(cfg.judge.runner_url.is_none());
  }
}
