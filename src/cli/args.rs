use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "BBBDownloader")]
#[command(
    about = "Download meeting recordings from a BigBlueButton server",
    long_about = None
)]
pub struct Cli {
    /// Do not append deskshare video to the output file
    #[arg(short = 'd', long)]
    pub no_deskshare: bool,

    /// Do not append chat subtitles to the output file
    #[arg(short = 'c', long)]
    pub no_chat: bool,

    /// Ignore SSL errors when connecting to the server
    #[arg(short = 's', long)]
    pub no_ssl: bool,

    /// Override the output filename
    #[arg(short = 'o', long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// URL to the meeting
    pub url: String,
}
