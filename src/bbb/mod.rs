//! Client for the published recordings of a BigBlueButton server.
//!
//! Recordings are static files under `presentation/<meeting id>/` on the
//! server origin, so every asset location is derived from the meeting URL.

pub mod chat;
pub mod meeting_url;
pub mod metadata;
mod xml;

pub use chat::ChatEntry;
pub use meeting_url::{MeetingUrl, MeetingUrlError};
pub use metadata::RecordingMetadata;

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Response};
use tracing::{debug, info};
use url::Url;

/// Extensions BBB publishes video streams with, in the order they are tried.
pub const VIDEO_EXTENSIONS: [&str; 2] = ["mp4", "webm"];

/// A file the server answered for, with its body not yet read.
pub struct RemoteAsset {
    pub file_name: String,
    pub url: Url,
    pub response: Response,
}

impl RemoteAsset {
    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }
}

pub struct BbbClient {
    client: Client,
    meeting: MeetingUrl,
}

impl BbbClient {
    pub fn new(meeting: MeetingUrl, client: Client) -> Self {
        Self { client, meeting }
    }

    /// HTTP client for talking to a BBB server. Certificate verification is
    /// only skipped when `accept_invalid_certs` is set.
    pub fn http_client(accept_invalid_certs: bool) -> Result<Client> {
        Client::builder()
            .user_agent(concat!("BBBDownloader/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .context("Failed to create HTTP client")
    }

    pub fn meeting(&self) -> &MeetingUrl {
        &self.meeting
    }

    pub async fn get_metadata(&self) -> Result<RecordingMetadata> {
        let xml = self.get_text("metadata.xml").await?;
        RecordingMetadata::from_xml(&xml)
    }

    pub async fn get_chat(&self) -> Result<Vec<ChatEntry>> {
        let xml = self.get_text("slides_new.xml").await?;
        ChatEntry::from_xml(&xml)
    }

    /// Main recording with the presenter's camera and all meeting audio.
    pub async fn find_webcam(&self) -> Result<Option<RemoteAsset>> {
        self.find_video("video", "webcams").await
    }

    pub async fn find_deskshare(&self) -> Result<Option<RemoteAsset>> {
        self.find_video("deskshare", "deskshare").await
    }

    /// First published variant of `<dir>/<stem>.<ext>`. Transport errors
    /// (including TLS failures) are returned; error statuses mean the
    /// variant does not exist.
    async fn find_video(&self, dir: &str, stem: &str) -> Result<Option<RemoteAsset>> {
        for extension in VIDEO_EXTENSIONS {
            let file_name = format!("{stem}.{extension}");
            let url = self.meeting.presentation_file(&format!("{dir}/{file_name}"))?;

            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .with_context(|| format!("Failed to request {url}"))?;

            if !response.status().is_success() {
                debug!("{} not available ({})", url, response.status());
                continue;
            }

            info!("Found {} at {}", file_name, url);
            return Ok(Some(RemoteAsset {
                file_name,
                url,
                response,
            }));
        }

        Ok(None)
    }

    async fn get_text(&self, relative: &str) -> Result<String> {
        let url = self.meeting.presentation_file(relative)?;
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to request {url}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Server returned {status} for {url}"));
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {url}"))
    }
}
