use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local, Utc};
use std::collections::HashMap;
use std::time::Duration;

use super::xml::element_texts;

/// Recording information published in `metadata.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingMetadata {
    pub name: String,
    pub start_time_utc: DateTime<Utc>,
    pub end_time_utc: DateTime<Utc>,
    pub participants: u32,
    pub subject_name: String,
    pub subject_code: String,
    pub duration: Duration,
    pub size: u64,
    pub playback_url: String,
}

impl RecordingMetadata {
    pub fn from_xml(xml: &str) -> Result<Self> {
        let texts = element_texts(xml).context("Failed to parse recording metadata")?;
        let fields = Fields(&texts);

        Ok(Self {
            name: fields.text("meta/bbb-recording-name")?,
            start_time_utc: fields.timestamp("start_time")?,
            end_time_utc: fields.timestamp("end_time")?,
            participants: fields.number("participants")?,
            subject_name: fields.text("meta/bbb-context-name")?,
            subject_code: fields.text("meta/bbb-context-label")?,
            duration: Duration::from_millis(fields.number("playback/duration")?),
            size: fields.number("playback/size")?,
            playback_url: fields.text("playback/link")?,
        })
    }

    pub fn start_time(&self) -> DateTime<Local> {
        self.start_time_utc.with_timezone(&Local)
    }

    pub fn end_time(&self) -> DateTime<Local> {
        self.end_time_utc.with_timezone(&Local)
    }

    /// Output name used when none is given: `"<subject>. <name> - <dd.mm.yy>.mp4"`.
    pub fn default_file_name(&self) -> String {
        let name = format!(
            "{}. {} - {}.mp4",
            self.subject_name,
            self.name,
            self.start_time().format("%d.%m.%y")
        );
        name.replace(['/', '\\'], "_")
    }
}

struct Fields<'a>(&'a HashMap<String, String>);

impl Fields<'_> {
    fn text(&self, path: &str) -> Result<String> {
        self.0
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("Unable to find \"{path}\" in the metadata"))
    }

    fn number<T>(&self, path: &str) -> Result<T>
    where
        T: std::str::FromStr + Default,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let raw = self.text(path)?;
        if raw.is_empty() {
            return Ok(T::default());
        }
        raw.parse()
            .with_context(|| format!("Invalid number \"{raw}\" in metadata field \"{path}\""))
    }

    fn timestamp(&self, path: &str) -> Result<DateTime<Utc>> {
        let millis: i64 = self.number(path)?;
        DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| anyhow!("Timestamp {millis} in \"{path}\" is out of range"))
    }
}
