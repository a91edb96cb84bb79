//! Pipeline stages for form-to-spreadsheet processing.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap an external
//! collaborator (extraction backend, structuring service, object store)
//! without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ normalize ──▶ export ──▶ publish
//! (PDF text)  (LLM → JSON)  (xlsx)    (object store)
//! ```
//!
//! 1. [`extract`]   — pull plain text out of the PDF bytes; runs under
//!    `spawn_blocking` because PDF parsing is CPU-bound
//! 2. [`normalize`] — one structuring-service call, reply parsed into an
//!    ordered field mapping; the only stage with LLM network I/O
//! 3. [`export`]    — serialise the mapping into a single-row workbook,
//!    entirely in memory
//! 4. [`publish`]   — caller-gated upload of the artifact under a
//!    date-partitioned storage key

pub mod export;
pub mod extract;
pub mod normalize;
pub mod publish;
