pub mod args;
pub mod download;

pub use args::Cli;
pub use download::{handle_download_command, run_download, DownloadOptions};
