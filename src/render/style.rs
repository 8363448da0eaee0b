//! Fixed visual constants for rendered content. There is no theming: these are
//! the classes the client stylesheet knows about.

use serde::Serialize;

use crate::domain::Difficulty;

pub const HEADING: [&str; 6] = [
  "text-2xl font-bold mt-6 mb-3",
  "text-xl font-semibold mt-5 mb-2",
  "text-lg font-semibold mt-4 mb-2",
  "text-base font-semibold mt-3 mb-1",
  "text-sm font-semibold mt-2 mb-1",
  "text-sm font-medium mt-2 mb-1",
];
pub const PARAGRAPH: &str = "my-2 leading-relaxed";
pub const UL: &str = "list-disc pl-6 my-2 space-y-1";
pub const OL: &str = "list-decimal pl-6 my-2 space-y-1";
pub const BLOCKQUOTE: &str = "border-l-4 border-gray-500 pl-4 italic text-gray-300 my-3";
pub const TABLE: &str = "min-w-full border border-gray-700 my-3 text-sm";
pub const TH: &str = "border border-gray-700 px-3 py-2 bg-gray-800 text-left font-semibold";
pub const TD: &str = "border border-gray-700 px-3 py-2";
pub const LINK: &str = "text-blue-400 underline hover:text-blue-300";
pub const RULE: &str = "my-4 border-gray-700";
pub const INLINE_CODE: &str = "px-1.5 py-0.5 rounded bg-gray-800 text-pink-300 font-mono text-sm";
pub const CODE_BLOCK: &str = "code-block my-3 rounded-lg border border-gray-700 overflow-hidden";
pub const CODE_HEADER: &str = "code-header flex items-center justify-between px-3 py-1.5 bg-gray-800";
pub const CODE_BODY: &str = "code-body font-mono text-sm overflow-x-auto bg-gray-900";
pub const LINE_NUMBER: &str = "line-number select-none pr-4 text-right text-gray-500";

/// Difficulty badge label + colour class.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct DifficultyBadge {
  pub label: String,
  pub class: &'static str,
}

impl DifficultyBadge {
  pub const EASY: &'static str = "badge bg-green-900 text-green-300";
  pub const MEDIUM: &'static str = "badge bg-yellow-900 text-yellow-300";
  pub const HARD: &'static str = "badge bg-red-900 text-red-300";
  pub const UNKNOWN: &'static str = "badge bg-gray-800 text-gray-300";

  pub fn for_difficulty(d: Difficulty) -> Self {
    let class = match d {
      Difficulty::Easy => Self::EASY,
      Difficulty::Medium => Self::MEDIUM,
      Difficulty::Hard => Self::HARD,
    };
    Self { label: d.to_string(), class }
  }

  /// From raw data text; anything unrecognized keeps its label in gray.
  pub fn for_label(raw: &str) -> Self {
    match raw.parse::<Difficulty>() {
      Ok(d) => Self::for_difficulty(d),
      Err(_) => Self { label: raw.trim().to_string(), class: Self::UNKNOWN },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn medium_badge_is_yellow_and_title_cased() {
    let badge = DifficultyBadge::for_label("MEDIUM");
    assert_eq!(badge.label, "Medium");
    assert!(badge.class.contains("yellow"));
  }

  #[test]
  fn other_badges() {
    assert!(DifficultyBadge::for_label("easy").class.contains("green"));
    assert!(DifficultyBadge::for_difficulty(Difficulty::Hard).class.contains("red"));
    let odd = DifficultyBadge::for_label("Expert");
    assert_eq!(odd.label, "Expert");
    assert_eq!(odd.class, DifficultyBadge::UNKNOWN);
  }
}
