//! Run results: the exported artifact, warnings, and stats.
//!
//! A [`ProcessOutput`] is the explicit state record of one completed run —
//! everything the publish action needs is carried here rather than in shared
//! mutable state, so concurrent runs in the same process stay independent.

use crate::fields::FieldMapping;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a successful extract → normalize → export run.
///
/// Holding the artifact bytes and filename here (instead of ambient "last
/// processed" globals) is what lets [`crate::process::publish_output`] be a
/// separately invokable action gated on a prior successful export.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// The structured field mapping the service produced.
    pub mapping: FieldMapping,

    /// The exported spreadsheet: one header row, one data row.
    pub artifact: Vec<u8>,

    /// Timestamped artifact filename, e.g. `license_renewal_20260830_143000.xlsx`.
    pub artifact_filename: String,

    /// Non-fatal conditions recorded during the run.
    pub warnings: Vec<RunWarning>,

    /// Per-stage timing and size statistics.
    pub stats: ProcessStats,
}

/// A non-fatal condition recorded during a run.
///
/// Warnings never abort the pipeline; they tell the caller why the result
/// may be weaker than expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunWarning {
    /// Extraction produced very little text — the source is likely a scanned
    /// or image-based PDF that would need OCR for better results.
    LowTextYield {
        /// Trimmed character count of the extracted text.
        chars: usize,
    },

    /// The structuring reply parsed but omitted canonical fields, violating
    /// the prompt contract.
    SchemaIncomplete {
        /// The canonical field names that were absent.
        missing: Vec<String>,
    },
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunWarning::LowTextYield { chars } => write!(
                f,
                "very little text extracted ({chars} characters); the document may be scanned and need OCR"
            ),
            RunWarning::SchemaIncomplete { missing } => write!(
                f,
                "structuring reply omitted {} canonical field(s): {}",
                missing.len(),
                missing.join(", ")
            ),
        }
    }
}

/// Statistics for one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessStats {
    /// Trimmed character count of the extracted text.
    pub extracted_chars: usize,
    /// Number of fields in the resulting mapping (canonical + discovered).
    pub field_count: usize,
    /// Size of the exported spreadsheet in bytes.
    pub artifact_bytes: usize,
    /// Time spent extracting text.
    pub extract_duration_ms: u64,
    /// Time spent in the structuring-service call and parsing.
    pub normalize_duration_ms: u64,
    /// Wall-clock time of the whole run.
    pub total_duration_ms: u64,
}
