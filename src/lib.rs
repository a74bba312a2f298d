pub mod bbb;
pub mod cli;
pub mod download;
pub mod mux;
pub mod subtitles;
