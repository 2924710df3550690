//! `spotifydown`: tracks and playlists through `spotdl`.

use super::{home_subdir, output_template, run_tool, validate_url, Tool};
use crate::error::DownloadError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const SPOTDL: Tool = Tool {
    program: "spotdl",
    install_hint: "pip install spotdl",
};

/// Parallel downloads requested from spotdl.
const THREADS: u32 = 4;

/// Audio containers spotdl can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AudioFormat {
    #[default]
    Mp3,
    M4a,
    Flac,
    Ogg,
    Opus,
    Wav,
}

impl AudioFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::M4a => "m4a",
            AudioFormat::Flac => "flac",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Opus => "opus",
            AudioFormat::Wav => "wav",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp3" => Ok(AudioFormat::Mp3),
            "m4a" => Ok(AudioFormat::M4a),
            "flac" => Ok(AudioFormat::Flac),
            "ogg" => Ok(AudioFormat::Ogg),
            "opus" => Ok(AudioFormat::Opus),
            "wav" => Ok(AudioFormat::Wav),
            other => Err(format!(
                "unsupported audio format '{other}' (expected mp3, m4a, flac, ogg, opus or wav)"
            )),
        }
    }
}

/// `~/Music/Spotify`.
pub fn default_output_dir() -> PathBuf {
    home_subdir(&["Music", "Spotify"])
}

/// One `spotifydown` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyRequest {
    pub url: String,
    pub output_dir: PathBuf,
    pub format: AudioFormat,
    /// Ask spotdl to fetch the whole playlist the URL points at.
    pub playlist: bool,
}

impl SpotifyRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            output_dir: default_output_dir(),
            format: AudioFormat::default(),
            playlist: false,
        }
    }

    /// spotdl arguments; the URL always comes last.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "download".to_string(),
            "--output".to_string(),
            output_template(&self.output_dir, "{artist} - {title}.{ext}"),
            "--format".to_string(),
            self.format.to_string(),
            "--threads".to_string(),
            THREADS.to_string(),
        ];
        if self.playlist {
            args.push("--playlist".to_string());
        }
        args.push(self.url.trim().to_string());
        args
    }
}

/// Download a track or playlist into `request.output_dir`.
pub async fn download(request: &SpotifyRequest) -> Result<(), DownloadError> {
    validate_url(&request.url)?;
    run_tool(&SPOTDL, &request.output_dir, &request.args()).await
}
