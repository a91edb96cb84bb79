//! # pdf2table
//!
//! Extract structured data from PDF license-renewal forms into single-row
//! spreadsheets using an LLM structuring service, with optional publishing
//! to date-partitioned object storage.
//!
//! ## Why this crate?
//!
//! Government renewal forms arrive as free-layout PDFs. Template-based
//! scraping breaks on every agency's variant; instead this crate extracts
//! the raw text and asks an LLM to coerce it into a fixed canonical schema
//! (applicant, license, dates, payment, …), then renders the result as a
//! one-row workbook ready for ingestion.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Extract    lopdf page-by-page, pdf-extract fallback (spawn_blocking)
//!  ├─ 2. Normalize  one Bedrock call, JSON reply → ordered field mapping
//!  ├─ 3. Export     single-row xlsx workbook, in memory
//!  └─ 4. Publish    (caller-gated) S3 put under processed-data/YYYY/MM/DD/
//! ```
//!
//! One document per invocation, strictly sequential; low-confidence
//! extraction continues with a recorded warning, every other stage failure
//! is terminal for the run. Nothing is retried automatically.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2table::{process, publish_output, BedrockClient, Document, PipelineConfig, S3Store};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::from_env();
//!     let client = BedrockClient::from_region(&config.region).await;
//!
//!     let document = Document::from_file("renewal_form.pdf")?;
//!     let output = process(&document, &client, &config).await?;
//!     for warning in &output.warnings {
//!         eprintln!("warning: {warning}");
//!     }
//!
//!     let store = S3Store::from_region(&config.region).await;
//!     if let Some(key) = publish_output(&output, &store, &config).await? {
//!         println!("published: {key}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2table` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2table = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod fields;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PipelineConfig, PipelineConfigBuilder, DEFAULT_MODEL_ID, DEFAULT_REGION};
pub use error::{PipelineError, Stage};
pub use fields::{FieldMapping, ABSENT_VALUE, CANONICAL_FIELDS};
pub use output::{ProcessOutput, ProcessStats, RunWarning};
pub use pipeline::export::{artifact_filename, export_mapping, SPREADSHEET_CONTENT_TYPE};
pub use pipeline::extract::extract_text;
pub use pipeline::normalize::{BedrockClient, StructuringClient, StructuringRequest};
pub use pipeline::publish::{storage_key, ObjectStore, PutReceipt, S3Store};
pub use process::{process, process_sync, publish_output, Document};
