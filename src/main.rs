use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use uploader::{
    AttachmentStore, DataUrlDecoder, HttpTransport, LocalFile, TracingNotifier, UploadOutcome, UploadTracker,
    UploaderConfig,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] uploader::ConfigError),
    #[error(transparent)]
    Transport(#[from] uploader::UploadError),
    #[error("no files given")]
    NoFiles,
}

#[derive(Parser, Debug)]
#[command(name = "uploader", about = "Upload local files and report their progress")]
struct Cli {
    /// Explicit upload endpoint; overrides the API prefixes.
    #[arg(long, env = "UPLOAD_URL")]
    url: Option<String>,

    /// Upload through the public API prefix instead of the console API.
    #[arg(long)]
    public: bool,

    #[arg(long, env = "UPLOAD_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Reject files larger than this many bytes before uploading.
    #[arg(long)]
    max_preview_bytes: Option<u64>,

    /// Files to upload. Each one is tracked as its own attachment.
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!(error = %e, "uploader failed");
            ExitCode::from(2)
        }
    }
}

/// Returns whether every file uploaded.
async fn run(cli: Cli) -> Result<bool, CliError> {
    if cli.files.is_empty() {
        return Err(CliError::NoFiles);
    }

    let mut config = UploaderConfig::from_env()?;
    config.public_api |= cli.public;
    if cli.url.is_some() {
        config.url = cli.url;
    }
    if cli.token.is_some() {
        config.token = cli.token;
    }
    if let Some(limit) = cli.max_preview_bytes {
        config.max_preview_bytes = limit;
    }

    let url = config.upload_url()?;
    tracing::info!(%url, files = cli.files.len(), "uploading");
    let transport = HttpTransport::new(url, &config)?;

    let tracker = UploadTracker::new(AttachmentStore::new(), Arc::new(transport), Arc::new(TracingNotifier))
        .with_decoder(Arc::new(DataUrlDecoder::with_limit(config.max_preview_bytes)));

    let reporter = tokio::spawn(report_progress(tracker.subscribe()));

    let handles: Vec<_> = cli
        .files
        .into_iter()
        .map(|path| tracker.start_local_upload(LocalFile::from_path(path)))
        .collect();

    let mut all_ok = true;
    for handle in handles {
        match handle.finished().await {
            UploadOutcome::Uploaded { id, server_id } => tracing::debug!(%id, %server_id, "done"),
            outcome => {
                tracing::debug!(?outcome, "not uploaded");
                all_ok = false;
            }
        }
    }
    reporter.abort();

    let snapshot = tracker.snapshot();
    match serde_json::to_string_pretty(&*snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!(error = %e, "failed to render summary"),
    }
    Ok(all_ok)
}

async fn report_progress(mut rx: tokio::sync::watch::Receiver<uploader::Snapshot>) {
    while rx.changed().await.is_ok() {
        let snapshot = rx.borrow_and_update().clone();
        for attachment in snapshot.iter() {
            tracing::info!(
                file = attachment.file.name(),
                progress = %attachment.progress,
                server_id = attachment.server_id.as_deref().unwrap_or("-"),
                "progress"
            );
        }
    }
}
