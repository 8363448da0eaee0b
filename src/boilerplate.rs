//! Starter code from a problem's submission format.
//!
//! `submissionFormat` holds one line per language:
//!
//! ```text
//! C++: `int maxProfit(vector<int>& prices)`
//! Python: `def maxProfit(self, prices: List[int]) -> int:`
//! ```
//!
//! The signature is extracted for the selected language and wrapped in that
//! language's scaffolding. The same signature supplies the function name and
//! parameter order for the judge's harness.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{Language, Problem};

static FORMAT_LINE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?m)^\s*[-*]?\s*([A-Za-z+#]+)\s*:\s*`([^`]+)`").expect("static regex"));
static CALL_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Za-z_]\w*)\s*\(").expect("static regex"));
static PY_DEF: Lazy<Regex> = Lazy::new(|| Regex::new(r"def\s+([A-Za-z_]\w*)").expect("static regex"));
static JS_NAMED: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?:function\s+|(?:const|let|var)\s+)([A-Za-z_$][\w$]*)").expect("static regex"));
static TRAILING_IDENT: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"([A-Za-z_]\w*)\s*(?:\[\s*\d*\s*\]\s*)*$").expect("static regex"));

const PLACEHOLDER: &str = "Write your code here";

/// Find the signature for `language` among `LANG: \`sig\`` lines.
pub fn extract_signature(submission_format: &str, language: Language) -> Option<String> {
  FORMAT_LINE
    .captures_iter(submission_format)
    .find(|caps| caps[1].parse::<Language>().ok() == Some(language))
    .map(|caps| caps[2].trim().to_string())
}

/// Function name declared by a signature.
pub fn function_name(signature: &str, language: Language) -> Option<String> {
  let specific = match language {
    Language::Python => PY_DEF.captures(signature),
    Language::Javascript => JS_NAMED.captures(signature),
    _ => None,
  };
  specific
    .or_else(|| CALL_NAME.captures(signature))
    .map(|caps| caps[1].to_string())
}

/// Parameter names in declaration order (`self` and type annotations dropped).
pub fn signature_params(signature: &str, language: Language) -> Vec<String> {
  let (Some(open), Some(close)) = (signature.find('('), signature.rfind(')')) else {
    return Vec::new();
  };
  if close <= open {
    return Vec::new();
  }
  split_params(&signature[open + 1..close])
    .into_iter()
    .filter_map(|param| {
      let param = param.split('=').next().unwrap_or_default().trim();
      let name = match language {
        Language::Python => param.split(':').next().unwrap_or_default().trim().trim_start_matches('*').to_string(),
        Language::Javascript => param.trim_start_matches("...").to_string(),
        _ => TRAILING_IDENT.captures(param).map(|c| c[1].to_string()).unwrap_or_default(),
      };
      (!name.is_empty() && name != "self").then_some(name)
    })
    .collect()
}

/// Split a parameter list on commas outside `()`, `[]`, `{}` and `<>`.
fn split_params(list: &str) -> Vec<String> {
  let mut out = Vec::new();
  let mut depth: usize = 0;
  let mut current = String::new();
  for ch in list.chars() {
    match ch {
      '(' | '[' | '{' | '<' => depth += 1,
      ')' | ']' | '}' | '>' => depth = depth.saturating_sub(1),
      ',' if depth == 0 => {
        out.push(std::mem::take(&mut current).trim().to_string());
        continue;
      }
      _ => {}
    }
    current.push(ch);
  }
  out.push(current.trim().to_string());
  out.retain(|p| !p.is_empty());
  out
}

/// Starter code for `problem` in `language`.
pub fn generate_boilerplate(problem: &Problem, language: Language) -> String {
  match extract_signature(&problem.submission_format, language) {
    Some(sig) => wrap_signature(&sig, language),
    None => generic_template(language),
  }
}

fn wrap_signature(sig: &str, language: Language) -> String {
  let c = language.comment_prefix();
  let bare = sig.trim().trim_end_matches(['{', ';']).trim_end();
  match language {
    Language::Cpp => format!("class Solution {{\npublic:\n    {bare} {{\n        {c} {PLACEHOLDER}\n    }}\n}};\n"),
    Language::Java => {
      let decl = if bare.starts_with("public") { bare.to_string() } else { format!("public {bare}") };
      format!("class Solution {{\n    {decl} {{\n        {c} {PLACEHOLDER}\n    }}\n}}\n")
    }
    Language::C => format!("{bare} {{\n    {c} {PLACEHOLDER}\n}}\n"),
    Language::Javascript => {
      let terminator = if bare.starts_with("function") { "" } else { ";" };
      format!("{bare} {{\n    {c} {PLACEHOLDER}\n}}{terminator}\n")
    }
    Language::Python => {
      let decl = if bare.ends_with(':') { bare.to_string() } else { format!("{bare}:") };
      if decl.contains("(self") {
        format!("class Solution:\n    {decl}\n        {c} {PLACEHOLDER}\n        pass\n")
      } else {
        format!("{decl}\n    {c} {PLACEHOLDER}\n    pass\n")
      }
    }
  }
}

fn generic_template(language: Language) -> String {
  let c = language.comment_prefix();
  match language {
    Language::Cpp => format!(
      "#include <bits/stdc++.h>\nusing namespace std;\n\nint main() {{\n    {c} {PLACEHOLDER}\n    return 0;\n}}\n"
    ),
    Language::C => format!("#include <stdio.h>\n\nint main(void) {{\n    {c} {PLACEHOLDER}\n    return 0;\n}}\n"),
    Language::Java => format!(
      "import java.util.*;\n\npublic class Main {{\n    public static void main(String[] args) {{\n        {c} {PLACEHOLDER}\n    }}\n}}\n"
    ),
    Language::Python => format!("def solve():\n    {c} {PLACEHOLDER}\n    pass\n"),
    Language::Javascript => format!("function solve() {{\n    {c} {PLACEHOLDER}\n}}\n"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const FORMAT: &str = "C++: `int maxProfit(vector<int>& prices, int fee)`\n\
Python: `def maxProfit(self, prices: List[int], fee: int) -> int:`\n\
Java: `public int maxProfit(int[] prices, int fee)`\n\
JavaScript: `var maxProfit = function(prices, fee)`\n\
C: `int maxProfit(int* prices, int pricesSize, int fee)`";

  fn problem() -> Problem {
    Problem { title: "Stock".into(), submission_format: FORMAT.into(), ..Default::default() }
  }

  #[test]
  fn extracts_per_language_signature() {
    assert_eq!(extract_signature(FORMAT, Language::Java).as_deref(), Some("public int maxProfit(int[] prices, int fee)"));
    assert_eq!(extract_signature(FORMAT, Language::Cpp).as_deref(), Some("int maxProfit(vector<int>& prices, int fee)"));
    assert_eq!(extract_signature("python: `def f(x):`", Language::Python).as_deref(), Some("def f(x):"));
    assert!(extract_signature("", Language::C).is_none());
  }

  #[test]
  fn names_and_params() {
    for lang in Language::ALL {
      let sig = extract_signature(FORMAT, lang).unwrap();
      assert_eq!(function_name(&sig, lang).as_deref(), Some("maxProfit"), "{lang}");
    }
    let py = extract_signature(FORMAT, Language::Python).unwrap();
    assert_eq!(signature_params(&py, Language::Python), vec!["prices", "fee"]);
    let c = extract_signature(FORMAT, Language::C).unwrap();
    assert_eq!(signature_params(&c, Language::C), vec!["prices", "pricesSize", "fee"]);
    assert_eq!(signature_params("void f(map<int, int>& m, char grid[][3])", Language::Cpp), vec!["m", "grid"]);
  }

  #[test]
  fn cpp_and_java_get_a_solution_class() {
    let cpp = generate_boilerplate(&problem(), Language::Cpp);
    assert!(cpp.starts_with("class Solution {\npublic:\n    int maxProfit(vector<int>& prices, int fee) {"));
    assert!(cpp.trim_end().ends_with("};"));
    let java = generate_boilerplate(&problem(), Language::Java);
    assert!(java.contains("    public int maxProfit(int[] prices, int fee) {"));
  }

  #[test]
  fn python_method_vs_function() {
    let py = generate_boilerplate(&problem(), Language::Python);
    assert!(py.starts_with("class Solution:\n    def maxProfit(self"));
    assert!(py.contains("        pass"));
    let p = Problem { submission_format: "Python: `def add(a, b)`".into(), ..Default::default() };
    assert_eq!(generate_boilerplate(&p, Language::Python), "def add(a, b):\n    # Write your code here\n    pass\n");
  }

  #[test]
  fn javascript_expression_gets_semicolon() {
    let js = generate_boilerplate(&problem(), Language::Javascript);
    assert!(js.trim_end().ends_with("};"));
  }

  #[test]
  fn missing_signature_uses_generic_template() {
    let p = Problem::default();
    assert!(generate_boilerplate(&p, Language::C).contains("int main(void)"));
    assert!(generate_boilerplate(&p, Language::Java).contains("public class Main"));
  }
}
