//! Pipeline orchestration: extract → normalize → export, plus the
//! caller-gated publish action.
//!
//! Control flow is strictly sequential — no stage starts before its
//! predecessor succeeds — with one deliberate exception: low-confidence
//! extraction output (very little text) is a recorded warning, not a stop.
//! No stage is retried automatically; every failure surfaces to the caller
//! with stage and cause, and recovery is a fresh invocation.
//!
//! Publishing is **not** part of [`process`]. It is a separate action taking
//! the run's [`ProcessOutput`], so the decision to persist the artifact stays
//! with the caller and concurrent runs never share publish state.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::output::{ProcessOutput, ProcessStats, RunWarning};
use crate::pipeline::normalize::StructuringClient;
use crate::pipeline::publish::ObjectStore;
use crate::pipeline::{export, extract, normalize, publish};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// An uploaded document: raw bytes plus the declared filename.
///
/// Immutable once received; consumed by the extraction stage and discarded
/// after the run completes.
#[derive(Debug, Clone)]
pub struct Document {
    /// Raw PDF bytes.
    pub bytes: Vec<u8>,
    /// Filename as declared at the upload boundary.
    pub filename: String,
}

impl Document {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
        }
    }

    /// Read a document from disk, using the path's file name.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        Ok(Self { bytes, filename })
    }
}

/// Run the extract → normalize → export pipeline for one document.
///
/// # Returns
/// `Ok(ProcessOutput)` holding the field mapping, the exported artifact, and
/// any warnings recorded along the way (low text yield, schema-incomplete
/// reply).
///
/// # Errors
/// The first stage failure ends the run; [`PipelineError::stage`] names the
/// stage for reporting. Notably:
/// - extraction finding *no* text at all is terminal
///   ([`PipelineError::NoTextExtracted`]) — the normalizer is never called
///   with empty text
/// - extraction finding *little* text continues with a
///   [`RunWarning::LowTextYield`]
pub async fn process(
    document: &Document,
    client: &dyn StructuringClient,
    config: &PipelineConfig,
) -> Result<ProcessOutput, PipelineError> {
    let total_start = Instant::now();
    info!(
        filename = %document.filename,
        bytes = document.bytes.len(),
        "starting pipeline run"
    );

    // ── Stage 1: Text extraction (CPU-bound, off the async runtime) ──────
    let extract_start = Instant::now();
    let bytes = document.bytes.clone();
    let text = tokio::task::spawn_blocking(move || extract::extract_text(&bytes))
        .await
        .map_err(|e| PipelineError::Internal(format!("extraction task failed: {e}")))??;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

    let extracted_chars = text.chars().count();
    if text.is_empty() {
        return Err(PipelineError::NoTextExtracted {
            filename: document.filename.clone(),
        });
    }

    let mut warnings = Vec::new();
    if extracted_chars < config.low_text_threshold {
        warn!(
            chars = extracted_chars,
            threshold = config.low_text_threshold,
            "very little text extracted; source may be image-based"
        );
        warnings.push(RunWarning::LowTextYield {
            chars: extracted_chars,
        });
    }
    info!(chars = extracted_chars, duration_ms = extract_duration_ms, "text extracted");

    // ── Stage 2: Schema normalization ────────────────────────────────────
    let normalize_start = Instant::now();
    let mapping = normalize::normalize(client, &text, config).await?;
    let normalize_duration_ms = normalize_start.elapsed().as_millis() as u64;

    let missing = mapping.missing_canonical();
    if !missing.is_empty() {
        warn!(
            missing = missing.len(),
            fields = %missing.join(", "),
            "structuring reply omitted canonical fields"
        );
        warnings.push(RunWarning::SchemaIncomplete {
            missing: missing.into_iter().map(str::to_string).collect(),
        });
    }

    // ── Stage 3: Tabular export ──────────────────────────────────────────
    let artifact = export::export_mapping(&mapping)?;
    let artifact_filename = export::artifact_filename(chrono::Local::now());

    let stats = ProcessStats {
        extracted_chars,
        field_count: mapping.len(),
        artifact_bytes: artifact.len(),
        extract_duration_ms,
        normalize_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        fields = stats.field_count,
        artifact_bytes = stats.artifact_bytes,
        warnings = warnings.len(),
        duration_ms = stats.total_duration_ms,
        "pipeline run complete"
    );

    Ok(ProcessOutput {
        mapping,
        artifact,
        artifact_filename,
        warnings,
        stats,
    })
}

/// Publish a completed run's artifact to the configured destination.
///
/// Requires a prior successful export (the `output` argument) — publishing
/// is never automatic. With no bucket configured this is a no-op returning
/// `Ok(None)` and logging a configuration warning, not a failure. A publish
/// failure leaves `output` intact and independently retryable.
pub async fn publish_output(
    output: &ProcessOutput,
    store: &dyn ObjectStore,
    config: &PipelineConfig,
) -> Result<Option<String>, PipelineError> {
    let Some(bucket) = config.bucket.as_deref() else {
        warn!("no destination bucket configured; skipping publish");
        return Ok(None);
    };

    publish::publish(
        store,
        &output.artifact,
        &output.artifact_filename,
        bucket,
        &config.key_prefix,
    )
    .await
    .map(Some)
}

/// Synchronous wrapper around [`process`].
///
/// Creates a temporary tokio runtime internally.
pub fn process_sync(
    document: &Document,
    client: &dyn StructuringClient,
    config: &PipelineConfig,
) -> Result<ProcessOutput, PipelineError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PipelineError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(process(document, client, config))
}
