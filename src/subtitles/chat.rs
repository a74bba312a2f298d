//! Turns the public chat log into subtitle cues.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::info;

use super::{apply_mp4_fixes, to_srt, SubtitleEntry};
use crate::bbb::ChatEntry;

/// How long a burst of chat stays on screen when nothing follows it.
pub const CHAT_ENTRY_MAX_DURATION: Duration = Duration::from_secs(3);

const SUBTITLES_FILE_NAME: &str = "subtitles.srt";

/// Convert chat messages to cues.
///
/// Messages posted at the same second form a group. A group is shown until
/// the next group starts, for at most `max_duration`, and its messages share
/// that span equally in posting order.
pub fn chat_to_subtitles(entries: &[ChatEntry], max_duration: Duration) -> Vec<SubtitleEntry> {
    let groups = group_by_timestamp(entries);

    let mut result = Vec::with_capacity(entries.len());
    for (i, group) in groups.iter().enumerate() {
        let start = group[0].timestamp;
        let span = match groups.get(i + 1) {
            Some(next) => max_duration.min(next[0].timestamp.saturating_sub(start)),
            None => max_duration,
        };
        split_group(group, span, &mut result);
    }
    result
}

/// Build the chat subtitle file for a recording inside `destination`.
///
/// Returns `None` when the chat is empty, in which case no file is written.
pub async fn write_chat_subtitles(
    entries: &[ChatEntry],
    destination: &Path,
    recording_duration: Duration,
) -> Result<Option<PathBuf>> {
    let subtitles = chat_to_subtitles(entries, CHAT_ENTRY_MAX_DURATION);
    let subtitles = apply_mp4_fixes(subtitles, Some(recording_duration));
    if subtitles.is_empty() {
        return Ok(None);
    }

    let path = destination.join(SUBTITLES_FILE_NAME);
    fs::write(&path, to_srt(&subtitles))
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Converted {} chat messages to subtitles", entries.len());
    Ok(Some(path))
}

/// Group entries sharing a timestamp, keeping the order groups first appear in.
fn group_by_timestamp(entries: &[ChatEntry]) -> Vec<Vec<&ChatEntry>> {
    let mut groups: Vec<Vec<&ChatEntry>> = Vec::new();
    let mut index: HashMap<Duration, usize> = HashMap::new();
    for entry in entries {
        match index.get(&entry.timestamp) {
            Some(&i) => groups[i].push(entry),
            None => {
                index.insert(entry.timestamp, groups.len());
                groups.push(vec![entry]);
            }
        }
    }
    groups
}

fn split_group(group: &[&ChatEntry], span: Duration, out: &mut Vec<SubtitleEntry>) {
    let start = group[0].timestamp;
    let part = span / group.len() as u32;

    let mut current = start;
    for (i, entry) in group.iter().enumerate() {
        let end = if i + 1 == group.len() {
            start + span
        } else {
            current + part
        };
        out.push(SubtitleEntry::new(
            format!("{}: {}", entry.name, entry.message),
            current,
            end,
        ));
        current = end;
    }
}
