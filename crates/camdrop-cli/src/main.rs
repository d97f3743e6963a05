//! Camdrop CLI - upload an image file through the widget's file-drop path.
//!
//! Set CAMDROP_CLOUD_NAME, CAMDROP_API_KEY and CAMDROP_PRESET_NAME (optionally
//! CAMDROP_API_BASE_URL, CAMDROP_MAX_FILE_SIZE_MB), or put them in a `.env` file.

use anyhow::Context;
use camdrop_cli::{init_tracing, CliConfig, ConfigSummary};
use camdrop_core::LifecycleState;
use camdrop_processing::{MediaEncoder, PayloadValidator};
use camdrop_widget::{DroppedFile, FileSurface, UploadOrchestrator};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;

#[derive(Parser)]
#[command(name = "camdrop", about = "Upload images to a media-hosting API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image file and print the hosted URL
    Upload {
        /// Path to the image
        file: std::path::PathBuf,
        /// Print the full upload response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Decode an image and print its preview details
    Preview {
        /// Path to the image
        file: std::path::PathBuf,
        /// Include the data URL in the output
        #[arg(long)]
        data_url: bool,
    },
    /// Validate the upload configuration
    CheckConfig,
}

#[derive(Serialize)]
struct PreviewOutput {
    mime_type: String,
    width: u32,
    height: u32,
    size_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_url: Option<String>,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

async fn upload(file: &std::path::Path, json: bool) -> anyhow::Result<()> {
    let config = CliConfig::from_env()?.widget_config()?;
    let mut surface = FileSurface::new(MediaEncoder::new(PayloadValidator::new(
        config.max_file_size_bytes,
    )));
    let mut orchestrator =
        UploadOrchestrator::from_config(&config).context("Failed to create upload client")?;

    tracing::debug!(path = %file.display(), api_base_url = %config.api_base_url, "Uploading file");
    let dropped = DroppedFile::from_path(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    surface
        .select_file(dropped, &mut orchestrator)
        .context("Not a supported image")?;

    orchestrator.confirm_upload()?;
    let mut last_progress = None;
    while orchestrator.state().is_uploading() {
        orchestrator.process_next_event().await;
        if let Some(p) = orchestrator.progress() {
            if last_progress != Some(p) {
                eprint!("\rUploading... {:>3}%", p);
                std::io::stderr().flush().ok();
                last_progress = Some(p);
            }
        }
    }
    if last_progress.is_some() {
        eprintln!();
    }

    match orchestrator.state() {
        LifecycleState::Uploaded(result) => {
            if json {
                print_json(result)?;
            } else {
                println!("{}", result.hosted_url);
            }
            Ok(())
        }
        LifecycleState::Failed(err) => Err(anyhow::Error::new(err.clone()).context("Upload failed")),
        other => anyhow::bail!("Upload ended in unexpected state: {}", other.name()),
    }
}

async fn preview(file: &std::path::Path, include_data_url: bool) -> anyhow::Result<()> {
    let raw = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let preview = MediaEncoder::default()
        .decode_to_preview(&raw)
        .context("Not a supported image")?;

    print_json(&PreviewOutput {
        size_bytes: raw.len(),
        data_url: include_data_url.then(|| preview.data_url.clone()),
        mime_type: preview.mime_type,
        width: preview.width,
        height: preview.height,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload { file, json } => upload(&file, json).await?,
        Commands::Preview { file, data_url } => preview(&file, data_url).await?,
        Commands::CheckConfig => {
            let config = CliConfig::from_env()?.widget_config()?;
            print_json(&ConfigSummary::from(&config))?;
        }
    }

    Ok(())
}
