//! SubRip subtitle cues and the timing fixes the MP4 `mov_text` track needs.

pub mod chat;

pub use chat::{chat_to_subtitles, write_chat_subtitles, CHAT_ENTRY_MAX_DURATION};

use std::fmt;
use std::time::Duration;

/// Longest span a single `mov_text` sample may cover: `i32::MAX` microseconds.
pub const MAX_MP4_CUE_DURATION: Duration = Duration::from_micros(i32::MAX as u64);

/// Filler text for gap cues. A non-breaking space renders as nothing.
pub const GAP_PLACEHOLDER: &str = "\u{a0}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    pub text: String,
    pub start: Duration,
    pub end: Duration,
}

impl SubtitleEntry {
    pub fn new(text: impl Into<String>, start: Duration, end: Duration) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    pub fn duration(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} --> {}\n{}",
            format_srt_time(self.start),
            format_srt_time(self.end),
            self.text
        )
    }
}

/// Render cues as an SRT document, numbered from 1.
pub fn to_srt(entries: &[SubtitleEntry]) -> String {
    let mut srt = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{}\n{}", i + 1, entry))
        .collect::<Vec<_>>()
        .join("\n\n");
    if !srt.is_empty() {
        srt.push('\n');
    }
    srt
}

/// Format a duration as SRT timestamp (HH:MM:SS,mmm).
pub fn format_srt_time(time: Duration) -> String {
    let total_millis = time.as_millis();
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let seconds = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Reshape cues so every sample fits the MP4 subtitle track limits.
///
/// Long gaps between cues get placeholder cues, long cues are split into
/// equal parts, and the last cue is cut at `recording_duration`.
pub fn apply_mp4_fixes(
    entries: Vec<SubtitleEntry>,
    recording_duration: Option<Duration>,
) -> Vec<SubtitleEntry> {
    let mut result: Vec<SubtitleEntry> = fill_gaps(entries)
        .into_iter()
        .flat_map(split_entry)
        .collect();

    if let (Some(last), Some(limit)) = (result.last_mut(), recording_duration) {
        last.end = last.end.min(limit).max(last.start);
    }

    result
}

fn fill_gaps(entries: Vec<SubtitleEntry>) -> Vec<SubtitleEntry> {
    if entries.len() < 2 {
        return entries;
    }

    let mut result = Vec::with_capacity(entries.len());
    let mut previous_end = Duration::ZERO;
    for entry in entries {
        if entry.start.saturating_sub(previous_end) > MAX_MP4_CUE_DURATION {
            result.push(SubtitleEntry::new(GAP_PLACEHOLDER, previous_end, entry.start));
        }
        previous_end = entry.end;
        result.push(entry);
    }
    result
}

fn split_entry(entry: SubtitleEntry) -> Vec<SubtitleEntry> {
    let duration = entry.duration();
    if duration <= MAX_MP4_CUE_DURATION {
        return vec![entry];
    }

    let limit = MAX_MP4_CUE_DURATION.as_nanos();
    let parts = duration.as_nanos().div_ceil(limit) as u32;
    let part = duration / parts;

    let mut result: Vec<SubtitleEntry> = (0..parts - 1)
        .map(|i| {
            let start = entry.start + part * i;
            SubtitleEntry::new(entry.text.clone(), start, start + part)
        })
        .collect();
    let last_start = entry.start + part * (parts - 1);
    result.push(SubtitleEntry::new(entry.text, last_start, entry.end));
    result
}
