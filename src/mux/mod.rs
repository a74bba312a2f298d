//! FFmpeg-based composition of the downloaded tracks into one file.

use anyhow::{bail, Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Downloaded tracks to combine. Audio always comes from `webcam`; video
/// comes from `deskshare` when it is present.
#[derive(Debug, Clone, Default)]
pub struct MuxInputs {
    pub webcam: PathBuf,
    pub deskshare: Option<PathBuf>,
    pub subtitles: Option<PathBuf>,
}

/// Resolve the `ffmpeg` binary from `PATH`.
pub fn locate_ffmpeg() -> Result<PathBuf> {
    which::which("ffmpeg").map_err(|_| {
        anyhow::anyhow!(
            "FFmpeg is required to assemble the recording but was not found.\n\
             Install FFmpeg:\n\
             - macOS: brew install ffmpeg\n\
             - Ubuntu/Debian: sudo apt install ffmpeg\n\
             - Arch: sudo pacman -S ffmpeg\n\
             - Windows: winget install ffmpeg"
        )
    })
}

/// Arguments for one ffmpeg run that writes `output` from `inputs`.
pub fn build_ffmpeg_args(inputs: &MuxInputs, output: &Path) -> Vec<OsString> {
    let mut files: Vec<OsString> = vec!["-i".into(), inputs.webcam.clone().into()];
    let mut maps: Vec<OsString> = vec!["-map".into(), "0:a:0".into()];
    let mut input_index = 1;

    match &inputs.deskshare {
        Some(deskshare) => {
            files.push("-i".into());
            files.push(deskshare.clone().into());
            maps.push("-map".into());
            maps.push(format!("{input_index}:v:0").into());
            input_index += 1;
        }
        None => {
            maps.push("-map".into());
            maps.push("0:v:0".into());
        }
    }

    if let Some(subtitles) = &inputs.subtitles {
        files.push("-i".into());
        files.push(subtitles.clone().into());
        maps.push("-c:s".into());
        maps.push("mov_text".into());
        maps.push("-map".into());
        maps.push(format!("{input_index}:s:0").into());
    }

    let mut args: Vec<OsString> = vec!["-y".into()];
    args.append(&mut files);
    args.append(&mut maps);
    args.push(output.as_os_str().to_os_string());
    args
}

/// Run ffmpeg to produce `output`. FFmpeg's own progress goes straight to
/// the terminal.
pub async fn build_video(ffmpeg: &Path, inputs: &MuxInputs, output: &Path) -> Result<()> {
    let args = build_ffmpeg_args(inputs, output);
    debug!("Running {} {:?}", ffmpeg.display(), args);

    let status = Command::new(ffmpeg)
        .args(&args)
        .status()
        .await
        .context("Failed to run FFmpeg")?;

    if !status.success() {
        bail!("FFmpeg failed to assemble {} ({status})", output.display());
    }

    if !output.exists() {
        bail!("FFmpeg did not produce output file {}", output.display());
    }

    info!("Wrote {}", output.display());
    Ok(())
}
