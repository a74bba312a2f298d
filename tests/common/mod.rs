//! Fake BBB server and media fixtures shared by the integration tests.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::routing::get;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use bbb_downloader::cli::DownloadOptions;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub const ID: &str = "6e35e3b2778883f5db637d7a5dba0a427f692e91-1589364286185";

pub const METADATA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<recording>
  <id>6e35e3b2778883f5db637d7a5dba0a427f692e91-1589364286185</id>
  <start_time>1589364286185</start_time>
  <end_time>1589364288185</end_time>
  <participants>2</participants>
  <meta>
    <bbb-context-name>Test Subject</bbb-context-name>
    <bbb-context-label>TS-1</bbb-context-label>
    <bbb-recording-name>Fixture</bbb-recording-name>
  </meta>
  <playback>
    <link>http://localhost/playback</link>
    <duration>2000</duration>
    <size>1</size>
  </playback>
</recording>"#;

pub const CHAT: &str = r#"<?xml version="1.0"?>
<popcorn>
  <chattimeline in="0" direction="down" name="Alice" message="hello" target="chat"/>
  <chattimeline in="1" direction="down" name="Bob" message="hi there" target="chat"/>
</popcorn>"#;

pub fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Two second clip with a test pattern of the given size, optionally with a tone.
pub fn make_video(path: &Path, size: &str, with_audio: bool) -> Bytes {
    let mut command = Command::new("ffmpeg");
    command
        .args(["-hide_banner", "-loglevel", "error", "-y"])
        .args(["-f", "lavfi", "-i"])
        .arg(format!("testsrc=size={size}:rate=10:duration=2"));
    if with_audio {
        command.args(["-f", "lavfi", "-i", "sine=frequency=440:duration=2"]);
        command.args(["-c:a", "aac"]);
    }
    let status = command
        .args(["-c:v", "mpeg4", "-shortest"])
        .arg(path)
        .status()
        .unwrap();
    assert!(status.success(), "failed to create fixture {}", path.display());
    Bytes::from(std::fs::read(path).unwrap())
}

pub struct Fixture {
    _dir: TempDir,
    pub webcam: Bytes,
    pub deskshare: Bytes,
    pub out_dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let webcam = make_video(&dir.path().join("webcams.mp4"), "320x240", true);
        let deskshare = make_video(&dir.path().join("deskshare.mp4"), "640x360", false);
        Self {
            _dir: dir,
            webcam,
            deskshare,
            out_dir: TempDir::new().unwrap(),
        }
    }

    pub fn output(&self, name: &str) -> PathBuf {
        self.out_dir.path().join(name)
    }
}

fn router(files: Vec<(String, Bytes)>) -> Router {
    let mut router = Router::new();
    for (path, body) in files {
        router = router.route(
            &path,
            get(move || {
                let body = body.clone();
                async move { body }
            }),
        );
    }
    router
}

/// Serve `files` (path, body) over plain HTTP on an ephemeral port; everything
/// else is 404.
pub async fn serve(files: Vec<(String, Bytes)>) -> SocketAddr {
    let router = router(files);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Same as [`serve`], but over HTTPS with a freshly generated self-signed
/// certificate no client trusts.
pub async fn serve_self_signed(files: Vec<(String, Bytes)>) -> SocketAddr {
    let cert = rcgen::generate_simple_self_signed(vec![
        "localhost".to_string(),
        "127.0.0.1".to_string(),
    ])
    .unwrap();
    let config = RustlsConfig::from_pem(
        cert.serialize_pem().unwrap().into_bytes(),
        cert.serialize_private_key_pem().into_bytes(),
    )
    .await
    .unwrap();

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    let router = router(files);
    tokio::spawn(async move {
        axum_server::from_tcp_rustls(listener, config)
            .serve(router.into_make_service())
            .await
            .unwrap();
    });
    addr
}

pub fn presentation(file: &str) -> String {
    format!("/presentation/{ID}/{file}")
}

pub fn full_site(fixture: &Fixture) -> Vec<(String, Bytes)> {
    vec![
        (presentation("metadata.xml"), Bytes::from_static(METADATA.as_bytes())),
        (presentation("slides_new.xml"), Bytes::from_static(CHAT.as_bytes())),
        (presentation("video/webcams.mp4"), fixture.webcam.clone()),
        (presentation("deskshare/deskshare.mp4"), fixture.deskshare.clone()),
    ]
}

pub fn meeting_url(scheme: &str, addr: SocketAddr) -> String {
    format!("{scheme}://{addr}/playback/presentation/2.3/{ID}")
}

pub fn options(addr: SocketAddr, output: PathBuf) -> DownloadOptions {
    DownloadOptions {
        url: meeting_url("http", addr),
        include_deskshare: true,
        include_chat: true,
        accept_invalid_certs: false,
        output: Some(output),
    }
}

/// Stream summary as printed by `ffmpeg -i`.
pub fn stream_info(path: &Path) -> String {
    let output = Command::new("ffmpeg")
        .args(["-hide_banner", "-i"])
        .arg(path)
        .output()
        .unwrap();
    String::from_utf8_lossy(&output.stderr).into_owned()
}
