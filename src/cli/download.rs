//! Download pipeline behind the command line: metadata, tracks, chat, mux.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::bbb::{BbbClient, MeetingUrl, RecordingMetadata};
use crate::cli::args::Cli;
use crate::download::download_asset;
use crate::mux::{self, MuxInputs};
use crate::subtitles::write_chat_subtitles;

/// What to fetch and where to put it, resolved from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    pub url: String,
    pub include_deskshare: bool,
    pub include_chat: bool,
    pub accept_invalid_certs: bool,
    pub output: Option<PathBuf>,
}

impl From<Cli> for DownloadOptions {
    fn from(cli: Cli) -> Self {
        Self {
            url: cli.url,
            include_deskshare: !cli.no_deskshare,
            include_chat: !cli.no_chat,
            accept_invalid_certs: cli.no_ssl,
            output: cli.output,
        }
    }
}

impl DownloadOptions {
    /// `-o` wins; otherwise the name is derived from the recording metadata.
    pub fn output_path(&self, metadata: &RecordingMetadata) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(metadata.default_file_name()))
    }
}

/// Handle the download command, returning the path of the written file.
pub async fn handle_download_command(cli: Cli) -> Result<PathBuf> {
    run_download(DownloadOptions::from(cli)).await
}

pub async fn run_download(options: DownloadOptions) -> Result<PathBuf> {
    // 1. Validate input before touching the network
    let meeting = MeetingUrl::parse(&options.url)?;
    let ffmpeg = mux::locate_ffmpeg()?;
    if options.accept_invalid_certs {
        warn!("TLS certificate verification is disabled");
    }
    let http = BbbClient::http_client(options.accept_invalid_certs)?;
    let client = BbbClient::new(meeting, http);
    info!("Downloading meeting {}", client.meeting());

    // 2. Recording metadata drives the output name and subtitle length
    let metadata = client
        .get_metadata()
        .await
        .context("Failed to fetch recording metadata")?;
    info!(
        "Recording \"{}\" ({}), {} participants, {} to {}",
        metadata.name,
        metadata.subject_name,
        metadata.participants,
        metadata.start_time().format("%Y-%m-%d %H:%M"),
        metadata.end_time().format("%H:%M")
    );
    let output = options.output_path(&metadata);

    let temp_dir = tempfile::tempdir().context("Failed to create temporary directory")?;

    // 3. Tracks and subtitles, one after another
    let inputs = fetch_inputs(&client, &options, &metadata, temp_dir.path()).await?;

    // 4. Compose
    mux::build_video(&ffmpeg, &inputs, &output).await?;
    Ok(output)
}

async fn fetch_inputs(
    client: &BbbClient,
    options: &DownloadOptions,
    metadata: &RecordingMetadata,
    work_dir: &Path,
) -> Result<MuxInputs> {
    let webcam = client
        .find_webcam()
        .await?
        .ok_or_else(|| anyhow!("Unable to download webcam from remote server"))?;
    let webcam = download_asset(webcam, work_dir)
        .await
        .context("Failed to download webcam recording")?;

    let deskshare = if options.include_deskshare {
        match client.find_deskshare().await? {
            Some(asset) => Some(
                download_asset(asset, work_dir)
                    .await
                    .context("Failed to download deskshare recording")?,
            ),
            None => {
                warn!("No deskshare recording published for this meeting");
                None
            }
        }
    } else {
        info!("Skipping deskshare");
        None
    };

    let subtitles = if options.include_chat {
        let chat = client
            .get_chat()
            .await
            .context("Failed to fetch chat transcript")?;
        let subtitles = write_chat_subtitles(&chat, work_dir, metadata.duration).await?;
        if subtitles.is_none() {
            warn!("Chat is empty, no subtitles will be added");
        }
        subtitles
    } else {
        info!("Skipping chat subtitles");
        None
    };

    Ok(MuxInputs {
        webcam,
        deskshare,
        subtitles,
    })
}
