//! Command-line interface: the server plus the offline data tooling.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::curation::{self, document::curriculum_from_value, Pass};

#[derive(Parser, Debug)]
#[command(name = "curriculum-backend")]
#[command(about = "Coding-curriculum API server and data tooling")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Merge every *-topic.json in a directory into one curriculum document
    Merge {
        /// Directory holding the topic files
        dir: PathBuf,

        /// Output file
        #[arg(long, short, default_value = "data/curriculum.json")]
        output: PathBuf,
    },

    /// Apply cleaning passes to a curriculum document
    Clean {
        /// Input document (aggregate or single topic file)
        input: PathBuf,

        /// Output file; defaults to rewriting the input
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Passes to run, in order; all of them when omitted
        #[arg(long = "pass", value_enum)]
        passes: Vec<Pass>,
    },

    /// Report data-quality issues
    Audit {
        /// Input document (aggregate or single topic file)
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Exit with an error when issues are found
        #[arg(long)]
        strict: bool,
    },
}

pub fn run_merge(dir: &Path, output: &Path) -> Result<()> {
    let merged = curation::merge_dir(dir).with_context(|| format!("merging topic files in {}", dir.display()))?;
    curation::save(output, &merged).context("saving merged curriculum")?;
    let problems: usize = merged.topics.iter().map(|t| t.problems.len()).sum();
    println!("wrote {} ({} topics, {} problems)", output.display(), merged.topics.len(), problems);
    Ok(())
}

pub fn run_clean(input: &Path, output: Option<&Path>, passes: &[Pass]) -> Result<()> {
    let passes: Vec<Pass> = if passes.is_empty() { Pass::ALL.to_vec() } else { passes.to_vec() };

    let mut value = curation::load_value(input).with_context(|| format!("reading {}", input.display()))?;
    let difficulty_fixes = if passes.contains(&Pass::Difficulty) { curation::normalize_difficulty_value(&mut value) } else { 0 };
    let mut curriculum = curriculum_from_value(input, value).context("parsing curriculum")?;

    let mut report = curation::apply_passes(&mut curriculum, &passes);
    for (pass, n) in report.changes.iter_mut() {
        if *pass == Pass::Difficulty {
            *n = difficulty_fixes;
        }
    }

    let output = output.unwrap_or(input);
    curation::save(output, &curriculum).context("saving cleaned curriculum")?;
    for (pass, n) in &report.changes {
        println!("{:<18} {n}", format!("{pass:?}"));
    }
    info!(target: "curation", output = %output.display(), total = report.total(), "Clean finished");
    Ok(())
}

pub fn run_audit(input: &Path, json: bool, strict: bool) -> Result<()> {
    let value = curation::load_value(input).with_context(|| format!("reading {}", input.display()))?;
    let unknown = curation::unknown_difficulties(&value);
    let curriculum = curriculum_from_value(input, value).context("parsing curriculum")?;

    let mut report = curation::audit(&curriculum);
    report.unknown_difficulties = unknown;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    if strict && !report.is_clean() {
        bail!("audit found issues in {}", input.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["curriculum-backend"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["curriculum-backend", "clean", "in.json", "--pass", "strip-fences", "--pass", "dedupe"])
            .unwrap();
        match cli.command {
            Some(Commands::Clean { passes, output, .. }) => {
                assert_eq!(passes, vec![Pass::StripFences, Pass::Dedupe]);
                assert!(output.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn merge_clean_audit_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("arrays-topic.json"),
            r#"{"slug":"arrays","title":"Arrays","problems":[
                {"title":"Sum","difficulty":"EASY","testCases":[{"input":"3\n1 2 3","output":6}],
                 "solutions":[{"language":"python","code":"```python\nprint(6)\n```"}]}
            ]}"#,
        )
        .unwrap();
        let out = dir.path().join("curriculum.json");

        run_merge(dir.path(), &out).unwrap();
        run_clean(&out, None, &[]).unwrap();

        let cleaned = curation::load(&out).unwrap();
        let p = &cleaned.topics[0].problems[0];
        assert_eq!(p.test_cases[0].input, "n = 3\narr = [1, 2, 3]");
        assert_eq!(p.test_cases[0].expected_output, "6");
        assert_eq!(p.solutions[0].code, "print(6)");

        // Four languages still lack solutions.
        assert!(run_audit(&out, false, true).is_err());
        assert!(run_audit(&out, true, false).is_ok());
    }
}
