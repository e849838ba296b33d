use crate::{
    foundation::error::{EditError, EditResult},
    model::clip::{Clip, ClipId, MediaRef},
    model::sequence::Sequence,
    model::track::TrackId,
};

/// Where a rendered transition sits relative to the cut.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAlignment {
    /// Half before the cut, half after.
    #[default]
    Centered,
    /// Entirely before the cut.
    EndsAtCut,
    /// Entirely after the cut.
    StartsAtCut,
}

impl TransitionAlignment {
    /// Frames of a `length` frame transition that lie before the cut.
    pub fn frames_before_cut(self, length: u64) -> u64 {
        match self {
            Self::Centered => length / 2,
            Self::EndsAtCut => length,
            Self::StartsAtCut => 0,
        }
    }
}

/// Fade direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeDirection {
    /// Fade from black into the clip's head.
    In,
    /// Fade the clip's tail out to black.
    Out,
}

/// Wipe direction for wipe transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WipeDir {
    /// Reveal from left to right.
    LeftToRight,
    /// Reveal from right to left.
    RightToLeft,
    /// Reveal from top to bottom.
    TopToBottom,
    /// Reveal from bottom to top.
    BottomToTop,
}

/// Parsed transition kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    /// Cross dissolve.
    Dissolve,
    /// Directional wipe.
    Wipe(WipeDir),
}

/// Parse a transition kind identifier and its parameter object.
pub fn parse_transition_kind(kind: &str, params: &serde_json::Value) -> EditResult<TransitionKind> {
    let kind = kind.trim().to_ascii_lowercase();
    if kind.is_empty() {
        return Err(EditError::validation("transition kind must be non-empty"));
    }
    match kind.as_str() {
        "dissolve" | "crossfade" => Ok(TransitionKind::Dissolve),
        "wipe" => {
            let params = if params.is_null() {
                None
            } else {
                Some(
                    params
                        .as_object()
                        .ok_or_else(|| EditError::validation("wipe params must be an object"))?,
                )
            };
            let dir = match params.and_then(|p| p.get("dir")).and_then(|v| v.as_str()) {
                None => WipeDir::LeftToRight,
                Some(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "left_to_right" | "ltr" => WipeDir::LeftToRight,
                    "right_to_left" | "rtl" => WipeDir::RightToLeft,
                    "top_to_bottom" | "ttb" => WipeDir::TopToBottom,
                    "bottom_to_top" | "btt" => WipeDir::BottomToTop,
                    other => {
                        return Err(EditError::validation(format!("unknown wipe.dir '{other}'")));
                    }
                },
            };
            Ok(TransitionKind::Wipe(dir))
        }
        _ => Err(EditError::validation(format!(
            "unknown transition kind '{kind}'"
        ))),
    }
}

/// Transition kind identifier and its parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransitionStyle {
    /// Kind identifier (`"dissolve"`, `"wipe"`).
    pub kind: String,
    /// Kind parameters, e.g. `{"dir": "rtl"}` for a wipe.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

impl TransitionStyle {
    /// Style with explicit kind and parameters.
    pub fn new(kind: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            params,
        }
    }

    /// Plain cross dissolve.
    pub fn dissolve() -> Self {
        Self::new("dissolve", serde_json::Value::Null)
    }

    /// Parse into a [`TransitionKind`].
    pub fn parse(&self) -> EditResult<TransitionKind> {
        parse_transition_kind(&self.kind, &self.params)
    }
}

impl Default for TransitionStyle {
    fn default() -> Self {
        Self::dissolve()
    }
}

/// Source frames a renderer reads for one side of a transition or fade.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SourceSpan {
    /// Media read.
    pub media: MediaRef,
    /// First source frame (inclusive).
    pub clip_in: u64,
    /// Last source frame (inclusive).
    pub clip_out: u64,
}

/// Validated description of a rendered transition between two adjacent clips.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransitionPlan {
    /// Track holding both clips.
    pub track: TrackId,
    /// Clip before the cut.
    pub from_clip: ClipId,
    /// Clip after the cut.
    pub to_clip: ClipId,
    /// Transition kind identifier (`"dissolve"`, `"wipe"`).
    pub kind: String,
    /// Kind parameters.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
    /// Total transition length in frames.
    pub length: u64,
    /// Alignment the plan was made with.
    pub alignment: TransitionAlignment,
    /// Frames before the cut.
    pub before_cut: u64,
    /// Frames after the cut.
    pub after_cut: u64,
    /// `clip_out` of the from-clip when planned.
    pub from_out: u64,
    /// `clip_in` of the to-clip when planned.
    pub to_in: u64,
    /// Outgoing material.
    pub from_source: SourceSpan,
    /// Incoming material.
    pub to_source: SourceSpan,
}

/// Validated description of a rendered fade over a clip's head or tail.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FadePlan {
    /// Track holding the clip.
    pub track: TrackId,
    /// Faded clip.
    pub clip: ClipId,
    /// Fade direction.
    pub direction: FadeDirection,
    /// Fade length in frames.
    pub length: u64,
    /// `clip_in` when planned.
    pub clip_in: u64,
    /// `clip_out` when planned.
    pub clip_out: u64,
    /// Material the fade is rendered from.
    pub source: SourceSpan,
}

fn media_of(clip: &Clip, what: &str) -> EditResult<MediaRef> {
    clip.media()
        .cloned()
        .ok_or_else(|| EditError::validation(format!("{what} clip {} is a blank", clip.id)))
}

/// Plan a `length` frame transition across the cut after entry `from_index` on `track`.
pub fn plan_transition(
    seq: &Sequence,
    track: TrackId,
    from_index: usize,
    length: u64,
    alignment: TransitionAlignment,
    style: &TransitionStyle,
) -> EditResult<TransitionPlan> {
    style.parse()?;
    let t = seq.editable_track(track)?;
    if length < 2 {
        return Err(EditError::invalid_range(format!(
            "transition length {length} must be at least 2 frames"
        )));
    }
    let from = t.clip(from_index)?;
    let to = t.clip(from_index + 1)?;
    let from_media = media_of(from, "from")?;
    let to_media = media_of(to, "to")?;

    let before_cut = alignment.frames_before_cut(length);
    let after_cut = length - before_cut;

    if let Some(tail) = from.tail_handle()
        && tail < after_cut
    {
        return Err(EditError::handle("from-clip tail", after_cut, tail));
    }
    if to.head_handle() < before_cut {
        return Err(EditError::handle("to-clip head", before_cut, to.head_handle()));
    }
    if from.len_frames() <= before_cut {
        return Err(EditError::invalid_range(format!(
            "from-clip {} has {} frames, transition takes {before_cut}",
            from.id,
            from.len_frames()
        )));
    }
    if to.len_frames() <= after_cut {
        return Err(EditError::invalid_range(format!(
            "to-clip {} has {} frames, transition takes {after_cut}",
            to.id,
            to.len_frames()
        )));
    }

    Ok(TransitionPlan {
        track,
        from_clip: from.id,
        to_clip: to.id,
        kind: style.kind.clone(),
        params: style.params.clone(),
        length,
        alignment,
        before_cut,
        after_cut,
        from_out: from.clip_out,
        to_in: to.clip_in,
        from_source: SourceSpan {
            media: from_media,
            clip_in: from.clip_out + 1 - before_cut,
            clip_out: from.clip_out + after_cut,
        },
        to_source: SourceSpan {
            media: to_media,
            clip_in: to.clip_in - before_cut,
            clip_out: to.clip_in + after_cut - 1,
        },
    })
}

/// Plan a `length` frame fade over the head or tail of `clip`.
pub fn plan_fade(
    seq: &Sequence,
    clip: ClipId,
    length: u64,
    direction: FadeDirection,
) -> EditResult<FadePlan> {
    let loc = seq
        .find_clip(clip)
        .ok_or_else(|| EditError::not_found(format!("clip {clip}")))?;
    let t = seq.editable_track(loc.track)?;
    let c = t.clip(loc.index)?;
    let media = media_of(c, "faded")?;
    if length == 0 {
        return Err(EditError::invalid_range("fade length must be > 0"));
    }
    if c.len_frames() <= length {
        return Err(EditError::invalid_range(format!(
            "clip {clip} has {} frames, fade takes {length}",
            c.len_frames()
        )));
    }
    let (clip_in, clip_out) = match direction {
        FadeDirection::In => (c.clip_in, c.clip_in + length - 1),
        FadeDirection::Out => (c.clip_out + 1 - length, c.clip_out),
    };
    Ok(FadePlan {
        track: loc.track,
        clip,
        direction,
        length,
        clip_in: c.clip_in,
        clip_out: c.clip_out,
        source: SourceSpan {
            media,
            clip_in,
            clip_out,
        },
    })
}

#[cfg(test)]
#[path = "../../tests/unit/transition/plan.rs"]
mod tests;
