//! Syntax highlighting for code blocks (syntect, inline-styled HTML per line).

use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::render::code_block::CodeLine;
use crate::util::escape_html;

const THEME: &str = "base16-ocean.dark";

static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

fn theme() -> Option<&'static Theme> {
  THEME_SET.themes.get(THEME)
}

/// Split `code` into numbered lines, each with highlighted HTML for `token`.
/// Unknown tokens highlight as plain text; highlighting errors fall back to
/// escaped text for that line.
pub fn highlight_lines(code: &str, token: &str) -> Vec<CodeLine> {
  let syntax = SYNTAXES
    .find_syntax_by_token(token)
    .or_else(|| SYNTAXES.find_syntax_by_extension(token))
    .unwrap_or_else(|| SYNTAXES.find_syntax_plain_text());

  let mut highlighter = theme().map(|t| HighlightLines::new(syntax, t));

  LinesWithEndings::from(code)
    .enumerate()
    .map(|(i, line)| {
      let html = highlighter
        .as_mut()
        .and_then(|h| h.highlight_line(line, &SYNTAXES).ok())
        .and_then(|ranges| styled_line_to_highlighted_html(&ranges, IncludeBackground::No).ok())
        .unwrap_or_else(|| escape_html(line));
      CodeLine {
        number: i + 1,
        text: line.trim_end_matches(['\n', '\r']).to_string(),
        html: html.trim_end_matches(['\n', '\r']).to_string(),
      }
    })
    .collect()
}
