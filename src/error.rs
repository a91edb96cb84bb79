//! Error types for the pdf2table library.
//!
//! [`PipelineError`] covers every fatal failure a run can hit, grouped by
//! pipeline stage. Non-fatal conditions — low text yield from a likely
//! scanned document, a structuring reply missing canonical fields — are not
//! errors at all: they are recorded as [`crate::output::RunWarning`] values
//! on the run output so callers can surface them without losing the result.
//!
//! Every variant carries enough context to diagnose the failure (byte sizes,
//! identifiers, bounded response previews) but never full document text or
//! credentials. [`PipelineError::stage`] maps each variant back to the stage
//! that produced it for user-facing reporting.

use std::fmt;
use thiserror::Error;

/// All fatal errors returned by the pdf2table library.
///
/// No failure is retried automatically; recovery is always a fresh
/// caller-initiated attempt. A publish failure does not invalidate the
/// in-memory run result — the exported artifact remains valid and can be
/// re-published independently.
#[derive(Debug, Error)]
pub enum PipelineError {
    // ── Extraction errors ─────────────────────────────────────────────────
    /// Every extraction strategy ran cleanly but produced no text.
    #[error("no extractable text in '{filename}': the document may be scanned or image-based")]
    NoTextExtracted { filename: String },

    /// The PDF could not be parsed by any extraction strategy.
    #[error("failed to parse PDF: {detail}")]
    PdfParse { detail: String },

    // ── Normalization errors ──────────────────────────────────────────────
    /// The structuring service call itself failed (network, auth, throttling).
    #[error("structuring service call failed for model '{model_id}': {detail}")]
    StructuringTransport { model_id: String, detail: String },

    /// The structuring service answered, but with no completion content.
    #[error("structuring service returned an empty reply for model '{model_id}'")]
    EmptyStructuringResponse { model_id: String },

    /// The reply contained no parseable JSON object.
    ///
    /// `preview` holds at most the first 200 characters of the offending
    /// reply so the cause is diagnosable without logging the full response.
    #[error("structuring service reply is not valid JSON (preview: {preview:?})")]
    MalformedStructuringResponse { preview: String },

    // ── Export errors ─────────────────────────────────────────────────────
    /// Workbook serialisation failed. Rare and fatal to the run.
    #[error("spreadsheet serialisation failed: {detail}")]
    ExportFailed { detail: String },

    // ── Publish errors ────────────────────────────────────────────────────
    /// Refused before any network call: there is nothing to upload.
    #[error("refusing to publish an empty artifact")]
    EmptyArtifact,

    /// Refused before any network call: no destination bucket was given.
    #[error("no destination bucket configured; set S3_BUCKET_NAME or PipelineConfig::bucket")]
    DestinationNotConfigured,

    /// The reachability probe failed before any write was attempted.
    #[error("destination bucket '{bucket}' is not reachable: {detail}")]
    DestinationUnreachable { bucket: String, detail: String },

    /// The object store reports the bucket does not exist.
    #[error("destination bucket '{bucket}' does not exist")]
    BucketNotFound { bucket: String },

    /// The object store rejected the write for authorization reasons.
    ///
    /// `code` and `message` are the vendor's error code and message, verbatim.
    #[error("object store denied the write [{code}]: {message}")]
    PublishPermission { code: String, message: String },

    /// The write completed without a transport fault but the store did not
    /// report success.
    #[error("object store returned a non-success response: {detail}")]
    UnexpectedPublishResponse { detail: String },

    /// Generic transport failure while writing the artifact.
    #[error("object store write failed: {detail}")]
    PublishTransport { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (runtime creation, task join).
    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// The pipeline stage this error belongs to, for user-facing reporting.
    pub fn stage(&self) -> Stage {
        match self {
            Self::NoTextExtracted { .. } | Self::PdfParse { .. } => Stage::Extraction,
            Self::StructuringTransport { .. }
            | Self::EmptyStructuringResponse { .. }
            | Self::MalformedStructuringResponse { .. } => Stage::Normalization,
            Self::ExportFailed { .. } => Stage::Export,
            Self::EmptyArtifact
            | Self::DestinationNotConfigured
            | Self::DestinationUnreachable { .. }
            | Self::BucketNotFound { .. }
            | Self::PublishPermission { .. }
            | Self::UnexpectedPublishResponse { .. }
            | Self::PublishTransport { .. } => Stage::Publish,
            Self::InvalidConfig(_) | Self::Internal(_) => Stage::Setup,
        }
    }
}

/// The pipeline stage a run was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Configuration or runtime setup, before any document was touched.
    Setup,
    /// PDF text extraction.
    Extraction,
    /// Structuring-service call and response parsing.
    Normalization,
    /// Spreadsheet serialisation.
    Export,
    /// Artifact upload to the object store.
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Setup => "setup",
            Stage::Extraction => "text extraction",
            Stage::Normalization => "schema normalization",
            Stage::Export => "tabular export",
            Stage::Publish => "artifact publish",
        };
        f.write_str(name)
    }
}
