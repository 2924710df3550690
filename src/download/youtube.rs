//! `ytdown`: videos and shorts through `yt-dlp`.

use super::{home_subdir, output_template, run_tool, validate_url, Tool};
use crate::error::DownloadError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const YT_DLP: Tool = Tool {
    program: "yt-dlp",
    install_hint: "pip install yt-dlp",
};

/// Containers yt-dlp can merge video and audio into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VideoFormat {
    #[default]
    Mp4,
    Webm,
    Mkv,
}

impl VideoFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "mp4",
            VideoFormat::Webm => "webm",
            VideoFormat::Mkv => "mkv",
        }
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp4" => Ok(VideoFormat::Mp4),
            "webm" => Ok(VideoFormat::Webm),
            "mkv" => Ok(VideoFormat::Mkv),
            other => Err(format!(
                "unsupported video format '{other}' (expected mp4, webm or mkv)"
            )),
        }
    }
}

/// `~/Downloads`.
pub fn default_output_dir() -> PathBuf {
    home_subdir(&["Downloads"])
}

/// One `ytdown` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YoutubeRequest {
    pub url: String,
    pub output_dir: PathBuf,
    pub format: VideoFormat,
}

impl YoutubeRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            output_dir: default_output_dir(),
            format: VideoFormat::default(),
        }
    }

    /// Best video in the requested container plus m4a audio, falling back to
    /// the best single file in that container, then to anything.
    pub fn format_selector(&self) -> String {
        let ext = self.format.as_str();
        format!("bestvideo[ext={ext}]+bestaudio[ext=m4a]/best[ext={ext}]/best")
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            "--format".to_string(),
            self.format_selector(),
            "--merge-output-format".to_string(),
            self.format.to_string(),
            "-o".to_string(),
            output_template(&self.output_dir, "%(title)s.%(ext)s"),
            self.url.trim().to_string(),
        ]
    }
}

/// Download a single video into `request.output_dir`.
pub async fn download(request: &YoutubeRequest) -> Result<(), DownloadError> {
    validate_url(&request.url)?;
    run_tool(&YT_DLP, &request.output_dir, &request.args()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mp4_args() {
        let mut req = YoutubeRequest::new("https://youtube.com/watch?v=abc");
        req.output_dir = PathBuf::from("/videos");
        assert_eq!(
            req.args(),
            vec![
                "--format",
                "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best",
                "--merge-output-format",
                "mp4",
                "-o",
                "/videos/%(title)s.%(ext)s",
                "https://youtube.com/watch?v=abc",
            ]
        );
    }

    #[test]
    fn webm_selector() {
        let mut req = YoutubeRequest::new("https://youtu.be/abc");
        req.format = VideoFormat::Webm;
        assert_eq!(
            req.format_selector(),
            "bestvideo[ext=webm]+bestaudio[ext=m4a]/best[ext=webm]/best"
        );
    }

    #[test]
    fn default_dir_is_downloads() {
        assert!(YoutubeRequest::new("u").output_dir.ends_with("Downloads"));
    }

    #[test]
    fn video_format_parsing() {
        assert_eq!("WebM".parse::<VideoFormat>().unwrap(), VideoFormat::Webm);
        assert!("avi".parse::<VideoFormat>().is_err());
    }
}
