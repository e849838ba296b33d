use crate::foundation::core::MAX_FRAME;
use crate::foundation::error::{EditError, EditResult};

/// Stable clip identity, unique within a [`crate::Sequence`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ClipId(pub u64);

impl std::fmt::Display for ClipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of media a clip references.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Video file (may carry audio).
    Video,
    /// Audio-only file.
    Audio,
    /// Still image; synthetic, unbounded length.
    Image,
    /// Generated pattern (colour, noise, bars); synthetic, unbounded length.
    Pattern,
}

impl MediaKind {
    /// Synthetic media can be stretched to any length.
    pub fn is_synthetic(self) -> bool {
        matches!(self, Self::Image | Self::Pattern)
    }
}

/// Reference to a media source.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MediaRef {
    /// Media path, or pattern descriptor for pattern producers.
    pub path: String,
    /// Media kind.
    pub kind: MediaKind,
    /// Source length in frames. `None` means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    /// Set at load time when the file could not be found.
    #[serde(skip)]
    pub missing: bool,
}

impl MediaRef {
    /// Media with a known, finite length.
    pub fn new(path: impl Into<String>, kind: MediaKind, length: u64) -> Self {
        Self {
            path: path.into(),
            kind,
            length: if kind.is_synthetic() {
                None
            } else {
                Some(length)
            },
            missing: false,
        }
    }

    /// Still image (unbounded length).
    pub fn image(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: MediaKind::Image,
            length: None,
            missing: false,
        }
    }

    /// Pattern producer (unbounded length).
    pub fn pattern(descriptor: impl Into<String>) -> Self {
        Self {
            path: descriptor.into(),
            kind: MediaKind::Pattern,
            length: None,
            missing: false,
        }
    }

    /// Finite source length, or `None` when unbounded.
    pub fn bounded_length(&self) -> Option<u64> {
        if self.kind.is_synthetic() {
            None
        } else {
            self.length
        }
    }
}

/// Where a clip's frames come from.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipSource {
    /// Gap placeholder.
    Blank,
    /// Frames from a media source.
    Media(MediaRef),
}

/// Parent link of a synchronized child clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SyncData {
    /// Parent clip.
    pub parent: ClipId,
    /// Child timeline start minus parent timeline start when sync was set.
    pub offset: i64,
}

/// A filter attached to a clip.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Filter {
    /// Filter service identifier understood by the render backend.
    pub service: String,
    /// Filter parameter object.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

impl Filter {
    /// Filter without parameters.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            params: serde_json::Value::Null,
        }
    }
}

/// Link to a container program whose rendered output the clip plays.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContainerRef {
    /// Container program or project path.
    pub program: String,
    /// Rendered media path, once available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered: Option<String>,
}

/// A timeline entry: a range of media frames, or a blank.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Clip {
    /// Identity within the sequence.
    pub id: ClipId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Frame source.
    pub source: ClipSource,
    /// First used source frame (inclusive).
    pub clip_in: u64,
    /// Last used source frame (inclusive).
    pub clip_out: u64,
    /// Sync link to a parent clip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncData>,
    /// Attached filters, applied in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    /// Container program reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerRef>,
}

impl Clip {
    /// Blank of `len` frames.
    pub(crate) fn blank(id: ClipId, len: u64) -> Self {
        Self {
            id,
            name: String::new(),
            source: ClipSource::Blank,
            clip_in: 0,
            clip_out: len.saturating_sub(1),
            sync: None,
            filters: Vec::new(),
            container: None,
        }
    }

    /// Media clip from a validated [`ClipSpec`].
    pub(crate) fn from_spec(id: ClipId, spec: &ClipSpec) -> Self {
        Self {
            id,
            name: spec.name.clone(),
            source: ClipSource::Media(spec.media.clone()),
            clip_in: spec.clip_in,
            clip_out: spec.clip_out,
            sync: None,
            filters: spec.filters.clone(),
            container: None,
        }
    }

    /// `true` for gap placeholders.
    pub fn is_blank(&self) -> bool {
        matches!(self.source, ClipSource::Blank)
    }

    /// Media reference, if any.
    pub fn media(&self) -> Option<&MediaRef> {
        match &self.source {
            ClipSource::Blank => None,
            ClipSource::Media(m) => Some(m),
        }
    }

    /// Timeline length in frames.
    pub fn len_frames(&self) -> u64 {
        self.clip_out.saturating_sub(self.clip_in).saturating_add(1)
    }

    /// Unused source frames before `clip_in`. Blanks have none.
    pub fn head_handle(&self) -> u64 {
        if self.is_blank() { 0 } else { self.clip_in }
    }

    /// Unused source frames after `clip_out`. `None` means unbounded.
    pub fn tail_handle(&self) -> Option<u64> {
        match &self.source {
            ClipSource::Blank => Some(0),
            ClipSource::Media(m) => m
                .bounded_length()
                .map(|len| len.saturating_sub(1).saturating_sub(self.clip_out)),
        }
    }

    /// Copy of this clip with a new identity and in/out points.
    pub(crate) fn with_range(&self, id: ClipId, clip_in: u64, clip_out: u64) -> Self {
        let mut c = self.clone();
        c.id = id;
        c.clip_in = clip_in;
        c.clip_out = clip_out;
        c
    }

    /// Copy of this blank resized to `len` frames.
    pub(crate) fn resized_blank(&self, len: u64) -> Self {
        Clip::blank(self.id, len)
    }
}

/// Caller-facing description of a media clip to place on a track.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClipSpec {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Media source.
    pub media: MediaRef,
    /// First source frame (inclusive).
    pub clip_in: u64,
    /// Last source frame (inclusive).
    pub clip_out: u64,
    /// Filters to attach.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
}

impl ClipSpec {
    /// Spec using source frames `clip_in..=clip_out`.
    pub fn new(media: MediaRef, clip_in: u64, clip_out: u64) -> Self {
        let name = media
            .path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            name,
            media,
            clip_in,
            clip_out,
            filters: Vec::new(),
        }
    }

    /// Set the display name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Timeline length in frames.
    pub fn len_frames(&self) -> u64 {
        self.clip_out.saturating_sub(self.clip_in).saturating_add(1)
    }

    /// Check in/out against the media length.
    pub fn validate(&self) -> EditResult<()> {
        if self.clip_in > self.clip_out {
            return Err(EditError::invalid_range(format!(
                "clip in {} is after clip out {}",
                self.clip_in, self.clip_out
            )));
        }
        if self.clip_out >= MAX_FRAME {
            return Err(EditError::invalid_range(format!(
                "clip out {} is past the last usable frame {}",
                self.clip_out,
                MAX_FRAME - 1
            )));
        }
        if let Some(len) = self.media.bounded_length()
            && self.clip_out >= len
        {
            return Err(EditError::invalid_range(format!(
                "clip out {} is past the end of '{}' ({len} frames)",
                self.clip_out, self.media.path
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/clip.rs"]
mod tests;
