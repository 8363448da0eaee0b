//! Code spans: cleaning, inline/block classification, and per-block UI state.

use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::domain::Language;
use crate::render::highlight::highlight_lines;
use crate::render::RenderContext;
use crate::util::{strip_wrapping_backticks, unescape_whitespace};

/// Inline spans longer than this are promoted to blocks.
pub const INLINE_MAX_CHARS: usize = 60;

/// How long the copy button shows its acknowledgement.
pub const COPY_ACK: Duration = Duration::from_secs(2);

static FENCE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*```[\w+#-]*[ \t]*\r?\n?").expect("static regex"));

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CodeNode {
  Inline { text: String },
  Block(CodeBlock),
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CodeLine {
  pub number: usize,
  pub text: String,
  pub html: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CodeBlock {
  /// Raw fence tag as written (`python`, `bash`, ...), if any.
  pub tag: Option<String>,
  /// Initially selected language in the switcher.
  pub language: Language,
  /// Switcher options.
  pub languages: Vec<Language>,
  pub text: String,
  pub lines: Vec<CodeLine>,
}

impl CodeBlock {
  /// Token used to pick a highlighting grammar.
  pub fn highlight_token(&self) -> &str {
    self.tag.as_deref().unwrap_or(self.language.as_str())
  }
}

/// Strip fence remnants and wrapping backticks, unescape whitespace, then drop
/// one layer of matching surrounding quotes.
pub fn clean_code_text(raw: &str) -> String {
  let without_fences = FENCE_LINE.replace_all(raw, "");
  let trimmed = strip_wrapping_backticks(&without_fences);
  let unescaped = unescape_whitespace(trimmed);
  strip_matching_quotes(&unescaped).to_string()
}

fn strip_matching_quotes(s: &str) -> &str {
  let t = s.trim();
  for q in ['"', '\''] {
    if t.len() >= 2 && t.starts_with(q) && t.ends_with(q) {
      return &t[1..t.len() - 1];
    }
  }
  s
}

/// Build a code node from raw span text and an optional fence tag.
///
/// Fenced and indented blocks are always blocks. A code span becomes a block
/// when it contains a newline or is longer than [`INLINE_MAX_CHARS`].
pub fn build_code_node(raw: &str, tag: Option<&str>, fenced: bool, ctx: &RenderContext) -> CodeNode {
  let tag = tag
    .and_then(|t| t.split_whitespace().next())
    .map(|t| t.trim_start_matches('{').trim_end_matches('}').to_ascii_lowercase())
    .filter(|t| !t.is_empty());
  let text = clean_code_text(raw);

  let is_block = fenced || tag.is_some() || text.contains('\n') || text.chars().count() > INLINE_MAX_CHARS;
  if !is_block {
    return CodeNode::Inline { text };
  }

  let text = text
    .trim_end()
    .trim_start_matches(|c| c == '\n' || c == '\r')
    .to_string();
  let language = tag
    .as_deref()
    .and_then(|t| t.parse::<Language>().ok())
    .or(ctx.language_hint)
    .unwrap_or_default();

  let mut block = CodeBlock {
    tag,
    language,
    languages: Language::ALL.to_vec(),
    text,
    lines: Vec::new(),
  };
  block.lines = highlight_lines(&block.text, block.highlight_token());
  CodeNode::Block(block)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyStatus {
  Idle,
  Copied,
}

/// Interactive state of one rendered block: language switcher, dropdown and
/// copy acknowledgement. Not persisted; a remount starts over from the block.
#[derive(Clone, Debug)]
pub struct CodeBlockState {
  selected: Language,
  allowed: Vec<Language>,
  menu_open: bool,
  copied_at: Option<Instant>,
}

impl CodeBlockState {
  pub fn new(block: &CodeBlock) -> Self {
    Self {
      selected: block.language,
      allowed: block.languages.clone(),
      menu_open: false,
      copied_at: None,
    }
  }

  pub fn selected(&self) -> Language { self.selected }

  pub fn menu_open(&self) -> bool { self.menu_open }

  pub fn copy_status(&self, now: Instant) -> CopyStatus {
    match self.copied_at {
      Some(at) if now.saturating_duration_since(at) < COPY_ACK => CopyStatus::Copied,
      _ => CopyStatus::Idle,
    }
  }
}

/// Transitions driven by the page; the server renders whichever state it is given.
#[cfg_attr(not(test), allow(dead_code))]
impl CodeBlockState {
  pub fn toggle_menu(&mut self) {
    self.menu_open = !self.menu_open;
  }

  /// Switch language; closes the menu. Languages outside the switcher are ignored.
  pub fn select_language(&mut self, language: Language) -> bool {
    if !self.allowed.contains(&language) {
      return false;
    }
    self.selected = language;
    self.menu_open = false;
    true
  }

  /// Record a copy; a second copy restarts the acknowledgement window.
  pub fn copy(&mut self, now: Instant) {
    self.copied_at = Some(now);
  }
}
