use std::collections::BTreeMap;
use std::path::Path;

use rayon::prelude::*;

use crate::{
    foundation::core::Fps,
    foundation::error::{EditError, EditResult},
    model::clip::{MediaKind, MediaRef},
};

/// What the media-info provider knows about one file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MediaInfo {
    /// Media path as referenced by clips.
    pub path: String,
    /// Media kind.
    pub kind: MediaKind,
    /// Length in timeline frames. `None` for unbounded synthetic media.
    pub length: Option<u64>,
    /// Primary codec name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    /// Picture width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Picture height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl MediaInfo {
    /// Media reference for clips using this file.
    pub fn to_media_ref(&self) -> MediaRef {
        match self.length {
            Some(len) if !self.kind.is_synthetic() => MediaRef::new(self.path.clone(), self.kind, len),
            _ => MediaRef {
                path: self.path.clone(),
                kind: self.kind,
                length: None,
                missing: false,
            },
        }
    }
}

/// Source of duration/codec/dimension facts about media files.
pub trait MediaInfoProvider: Send + Sync {
    /// Probe one file. Absent files fail with [`EditError::SourceMissing`].
    fn probe(&self, path: &str) -> EditResult<MediaInfo>;
}

/// In-memory provider, mostly for tests and scripted sessions.
#[derive(Clone, Debug, Default)]
pub struct StaticMediaInfo {
    entries: BTreeMap<String, MediaInfo>,
}

impl StaticMediaInfo {
    /// Empty provider: every probe reports the source as missing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a file's info.
    pub fn with(mut self, info: MediaInfo) -> Self {
        self.entries.insert(info.path.clone(), info);
        self
    }

    /// Add a file of `kind` and `length` frames.
    pub fn with_file(self, path: impl Into<String>, kind: MediaKind, length: u64) -> Self {
        self.with(MediaInfo {
            path: path.into(),
            kind,
            length: (!kind.is_synthetic()).then_some(length),
            codec: None,
            width: None,
            height: None,
        })
    }
}

impl MediaInfoProvider for StaticMediaInfo {
    fn probe(&self, path: &str) -> EditResult<MediaInfo> {
        self.entries
            .get(path)
            .cloned()
            .ok_or_else(|| EditError::SourceMissing {
                path: path.to_string(),
            })
    }
}

/// Provider that runs the system `ffprobe` binary.
///
/// Durations are converted to frames at `fps`, rounding down.
#[derive(Clone, Copy, Debug)]
pub struct FfprobeMediaInfo {
    /// Timeline frame rate used for length conversion.
    pub fps: Fps,
}

impl FfprobeMediaInfo {
    /// Provider converting durations at `fps`.
    pub fn new(fps: Fps) -> Self {
        Self { fps }
    }
}

impl MediaInfoProvider for FfprobeMediaInfo {
    fn probe(&self, path: &str) -> EditResult<MediaInfo> {
        if !Path::new(path).exists() {
            return Err(EditError::SourceMissing {
                path: path.to_string(),
            });
        }
        ffprobe(path, self.fps)
    }
}

#[cfg(feature = "media-ffmpeg")]
fn ffprobe(path: &str, fps: Fps) -> EditResult<MediaInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        codec_name: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        format_name: Option<String>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| EditError::validation(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(EditError::validation(format!(
            "ffprobe failed for '{path}': {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| EditError::serde(format!("ffprobe json parse failed: {e}")))?;
    let format_name = parsed
        .format
        .as_ref()
        .and_then(|f| f.format_name.as_deref())
        .unwrap_or_default();
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));
    let audio = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));
    let kind = if format_name.contains("image2") || format_name.ends_with("_pipe") {
        MediaKind::Image
    } else if video.is_some() {
        MediaKind::Video
    } else if audio.is_some() {
        MediaKind::Audio
    } else {
        return Err(EditError::validation(format!(
            "no audio or video stream in '{path}'"
        )));
    };
    let length = if kind.is_synthetic() {
        None
    } else {
        let secs = parsed
            .format
            .as_ref()
            .and_then(|f| f.duration.as_ref())
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);
        Some(fps.secs_to_frames_floor(secs))
    };
    let primary = video.or(audio);

    Ok(MediaInfo {
        path: path.to_string(),
        kind,
        length,
        codec: primary.and_then(|s| s.codec_name.clone()),
        width: video.and_then(|s| s.width),
        height: video.and_then(|s| s.height),
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
fn ffprobe(_path: &str, _fps: Fps) -> EditResult<MediaInfo> {
    Err(EditError::validation(
        "probing media requires the 'media-ffmpeg' feature",
    ))
}

/// Probe every path in parallel. Results keep the input order.
pub fn probe_all(
    provider: &dyn MediaInfoProvider,
    paths: &[String],
) -> Vec<(String, EditResult<MediaInfo>)> {
    paths
        .par_iter()
        .map(|p| (p.clone(), provider.probe(p)))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/media/info.rs"]
mod tests;
