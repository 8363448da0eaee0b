//! Offline tooling for the curriculum data files: merge topic files into the
//! aggregate document, clean it with idempotent passes, and audit it.

pub mod audit;
pub mod document;
pub mod transforms;

pub use audit::{audit, unknown_difficulties, AuditReport};
pub use document::{load, load_value, merge_dir, save, CurationError};
pub use transforms::{apply_passes, normalize_difficulty_value, CleanReport, Pass};
