//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Undo double escaping from JSON storage: literal `\n`, `\t`, `\r` become real
/// whitespace. Text that already contains a real newline was stored correctly,
/// so it is returned untouched (its `\n` sequences are code, e.g. `printf("\n")`).
pub fn unescape_whitespace(s: &str) -> String {
  if s.contains('\n') || !s.contains('\\') {
    return s.to_string();
  }
  s.replace("\\r\\n", "\n")
    .replace("\\n", "\n")
    .replace("\\t", "\t")
    .replace("\\r", "\r")
}

/// Drop one matched run of backticks wrapping the whole snippet, as in
/// `` `x = 1` ``. Lone or unbalanced edge backticks are code and stay.
pub fn strip_wrapping_backticks(s: &str) -> &str {
  let t = s.trim();
  let lead = t.len() - t.trim_start_matches('`').len();
  let inner = t.trim_matches('`');
  if lead == 0 || inner.trim().is_empty() || inner.contains('`') || t.len() - inner.len() != lead * 2 {
    return s;
  }
  inner
}

/// Normalize a string by removing all whitespace.
/// Used for output comparisons that ignore spacing.
pub fn normalize(s: &str) -> String {
  s.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for ch in s.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(ch),
    }
  }
  out
}

/// Lowercase ASCII slug: runs of non-alphanumerics collapse into one `-`.
pub fn slugify(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for ch in s.chars() {
    if ch.is_ascii_alphanumeric() {
      out.push(ch.to_ascii_lowercase());
    } else if !out.is_empty() && !out.ends_with('-') {
      out.push('-');
    }
  }
  out.trim_end_matches('-').to_string()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    format!("{}… ({} bytes total)", s.chars().take(max).collect::<String>(), s.len())
  }
}
