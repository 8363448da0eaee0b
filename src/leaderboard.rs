//! Ranking users by distinct accepted problems.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Submission, SubmissionStatus};

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
  pub rank: usize,
  pub user_id: String,
  pub solved: usize,
  /// When the user's most recent first-time solve happened.
  pub last_solved_at: DateTime<Utc>,
}

/// More solved problems rank higher; ties go to whoever reached that count
/// first, then to the smaller user id.
pub fn leaderboard(submissions: &[Submission]) -> Vec<LeaderboardEntry> {
  // user -> problem -> first accepted time
  let mut first_solves: BTreeMap<&str, HashMap<&str, DateTime<Utc>>> = BTreeMap::new();
  for s in submissions.iter().filter(|s| s.status == SubmissionStatus::Accepted) {
    let solved = first_solves.entry(s.user_id.as_str()).or_default();
    solved
      .entry(s.problem_id.as_str())
      .and_modify(|t| *t = (*t).min(s.created_at))
      .or_insert(s.created_at);
  }

  let mut rows: Vec<(String, usize, DateTime<Utc>)> = first_solves
    .into_iter()
    .filter_map(|(user, solved)| {
      let last = solved.values().max().copied()?;
      Some((user.to_string(), solved.len(), last))
    })
    .collect();
  rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)).then(a.0.cmp(&b.0)));

  rows
    .into_iter()
    .enumerate()
    .map(|(i, (user_id, solved, last_solved_at))| LeaderboardEntry { rank: i + 1, user_id, solved, last_solved_at })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Language;
  use chrono::TimeZone;

  fn sub(user: &str, problem: &str, status: SubmissionStatus, minute: u32) -> Submission {
    Submission {
      id: format!("{user}-{problem}-{minute}"),
      user_id: user.into(),
      problem_id: problem.into(),
      language: Language::Python,
      code: String::new(),
      status,
      created_at: Utc.with_ymd_and_hms(2026, 1, 1, 12, minute, 0).unwrap(),
    }
  }

  #[test]
  fn ranks_by_distinct_solves_then_time_then_id() {
    use SubmissionStatus::*;
    let subs = vec![
      sub("ann", "a", Accepted, 1),
      sub("ann", "a", Accepted, 2),
      sub("ann", "b", Accepted, 9),
      sub("bob", "a", Accepted, 3),
      sub("bob", "b", Accepted, 5),
      sub("cat", "a", WrongAnswer, 0),
      sub("dan", "a", Accepted, 4),
      sub("eve", "c", Accepted, 4),
    ];
    let board = leaderboard(&subs);
    let order: Vec<(&str, usize)> = board.iter().map(|e| (e.user_id.as_str(), e.solved)).collect();
    assert_eq!(order, vec![("bob", 2), ("ann", 2), ("dan", 1), ("eve", 1)]);
    assert_eq!(board[0].rank, 1);
    assert_eq!(board[3].rank, 4);
    assert_eq!(board[1].last_solved_at, Utc.with_ymd_and_hms(2026, 1, 1, 12, 9, 0).unwrap());
  }

  #[test]
  fn no_accepted_submissions_means_empty_board() {
    assert!(leaderboard(&[sub("x", "p", SubmissionStatus::RuntimeError, 0)]).is_empty());
  }
}
