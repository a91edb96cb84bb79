//! CLI binary for pdf2table.
//!
//! A thin shim over the library crate: reads a PDF form, runs the pipeline,
//! writes the workbook next to the current directory, and optionally uploads
//! it to the configured bucket.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2table::{process, publish_output, BedrockClient, Document, PipelineConfig, S3Store};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Extract structured data from a PDF license-renewal form.
#[derive(Debug, Parser)]
#[command(name = "pdf2table", version, about)]
struct Cli {
    /// Path to the PDF form to process.
    input: PathBuf,

    /// Where to write the exported workbook (default: timestamped name in
    /// the current directory).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Structuring-service model identifier.
    #[arg(long, env = "BEDROCK_MODEL_ID")]
    model: Option<String>,

    /// AWS region for the service clients.
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// Destination bucket for --upload.
    #[arg(long, env = "S3_BUCKET_NAME")]
    bucket: Option<String>,

    /// Upload the workbook to the destination bucket after processing.
    #[arg(long)]
    upload: bool,

    /// Print the extracted field mapping as JSON to stdout.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut builder = PipelineConfig::builder();
    if let Some(model) = cli.model {
        builder = builder.model_id(model);
    }
    if let Some(region) = cli.region {
        builder = builder.region(region);
    }
    if let Some(bucket) = cli.bucket {
        builder = builder.bucket(bucket);
    }
    let config = builder.build()?;

    let document = Document::from_file(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;

    let client = BedrockClient::from_region(&config.region).await;
    let output = process(&document, &client, &config)
        .await
        .map_err(|e| anyhow::anyhow!("{} failed: {e}", e.stage()))?;

    for warning in &output.warnings {
        eprintln!("warning: {warning}");
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output.mapping.to_json())?);
    }

    let out_path = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&output.artifact_filename));
    std::fs::write(&out_path, &output.artifact)
        .with_context(|| format!("writing {}", out_path.display()))?;
    eprintln!(
        "wrote {} ({} bytes, {} fields)",
        out_path.display(),
        output.artifact.len(),
        output.stats.field_count
    );

    if cli.upload {
        let store = S3Store::from_region(&config.region).await;
        match publish_output(&output, &store, &config).await? {
            Some(key) => eprintln!(
                "published to s3://{}/{key}",
                config.bucket.as_deref().unwrap_or_default()
            ),
            None => eprintln!("no bucket configured; skipped upload"),
        }
    }

    Ok(())
}
