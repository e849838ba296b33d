use crate::{
    foundation::core::{FrameRange, MAX_FRAME},
    foundation::error::{EditError, EditResult},
    model::clip::{ClipId, ClipSpec, Filter, MediaRef},
    model::compositor::{CompositorId, CompositorSpec},
    model::track::TrackId,
    transition::plan::{FadePlan, TransitionPlan},
};

/// Address of a clip by position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClipRef {
    /// Owning track.
    pub track: TrackId,
    /// Index in the track.
    pub index: usize,
}

impl ClipRef {
    /// Clip `index` on `track`.
    pub fn new(track: TrackId, index: usize) -> Self {
        Self { track, index }
    }
}

/// Trim philosophy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimMode {
    /// Track length follows the trim; later clips shift.
    #[default]
    Insert,
    /// Track length is kept; growth overwrites neighbours, shrinking leaves a blank.
    Overwrite,
}

/// Clip edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// Head of the clip.
    Start,
    /// Tail of the clip.
    End,
}

/// How moved clips land on the destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveMode {
    /// Splice out of the source, insert at the destination.
    Insert,
    /// Lift from the source, overwrite at the destination.
    Overwrite,
}

/// One atomic timeline mutation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditRequest {
    /// Place a clip at the end of a track.
    Append {
        /// Target track.
        track: TrackId,
        /// Clip to place.
        clip: ClipSpec,
    },
    /// Insert a clip at `frame`, pushing later material right.
    Insert {
        /// Target track.
        track: TrackId,
        /// Timeline frame.
        frame: u64,
        /// Clip to place.
        clip: ClipSpec,
    },
    /// Replace `[frame, frame + len)` with a clip.
    Overwrite {
        /// Target track.
        track: TrackId,
        /// Timeline frame.
        frame: u64,
        /// Clip to place.
        clip: ClipSpec,
    },
    /// Replace clips `from..=to` with a blank of equal length.
    Lift {
        /// Target track.
        track: TrackId,
        /// First clip index.
        from: usize,
        /// Last clip index (inclusive).
        to: usize,
    },
    /// Remove clips `from..=to` and close the gap.
    SpliceOut {
        /// Target track.
        track: TrackId,
        /// First clip index.
        from: usize,
        /// Last clip index (inclusive).
        to: usize,
    },
    /// Split the clip under `frame`.
    Cut {
        /// Target track.
        track: TrackId,
        /// Timeline frame.
        frame: u64,
    },
    /// Split the clip under `frame` on every unlocked track.
    CutAll {
        /// Timeline frame.
        frame: u64,
    },
    /// Move a clip's head by `delta` frames (positive shortens).
    TrimStart {
        /// Trimmed clip.
        clip: ClipRef,
        /// Frames to move the head by.
        delta: i64,
        /// Trim philosophy; session default when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<TrimMode>,
    },
    /// Move a clip's tail by `delta` frames (positive lengthens).
    TrimEnd {
        /// Trimmed clip.
        clip: ClipRef,
        /// Frames to move the tail by.
        delta: i64,
        /// Trim philosophy; session default when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<TrimMode>,
    },
    /// Move the cut between `clip` and the following entry.
    Roll {
        /// Clip left of the cut.
        clip: ClipRef,
        /// Frames to move the cut by.
        delta: i64,
    },
    /// Shift a clip's source in/out without moving it on the timeline.
    Slip {
        /// Slipped clip.
        clip: ClipRef,
        /// Source frames to shift by.
        delta: i64,
    },
    /// Insert-style trim that keeps other unlocked tracks aligned.
    RippleTrim {
        /// Trimmed clip.
        clip: ClipRef,
        /// Trimmed edge.
        edge: Edge,
        /// Same sign convention as [`EditRequest::TrimStart`] / [`EditRequest::TrimEnd`].
        delta: i64,
    },
    /// Insert `length` blank frames at `frame` on every unlocked track.
    InsertSpace {
        /// Timeline frame.
        frame: u64,
        /// Frames to insert.
        length: u64,
    },
    /// Move clips `from..=to` to another position.
    MoveClips {
        /// Source track.
        track: TrackId,
        /// First clip index.
        from: usize,
        /// Last clip index (inclusive).
        to: usize,
        /// Destination track.
        dest_track: TrackId,
        /// Destination frame. For insert moves it is read after the clips are removed.
        dest_frame: u64,
        /// Landing mode.
        mode: MoveMode,
    },
    /// Sync one clip to a parent clip on another track.
    SetClipSync {
        /// Child clip.
        child: ClipId,
        /// Parent clip.
        parent: ClipId,
    },
    /// Sync every clip of `child_track` to the parent-track clip under its start.
    SetTrackSync {
        /// Track holding the children.
        child_track: TrackId,
        /// Track holding the parents.
        parent_track: TrackId,
    },
    /// Drop sync relations without moving clips.
    ClearSync {
        /// Child clips.
        clips: Vec<ClipId>,
    },
    /// Drop every sync relation on a track.
    ClearTrackSync {
        /// Track holding the children.
        track: TrackId,
    },
    /// Move children back to `parent start + offset`.
    Resync {
        /// Child clips.
        clips: Vec<ClipId>,
    },
    /// Attach a filter to a clip.
    AddFilter {
        /// Target clip.
        clip: ClipRef,
        /// Filter to add.
        filter: Filter,
        /// Position in the filter list; appended when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },
    /// Remove a filter from a clip.
    RemoveFilter {
        /// Target clip.
        clip: ClipRef,
        /// Position in the filter list.
        index: usize,
    },
    /// Add a compositor.
    AddCompositor {
        /// Compositor to add.
        spec: CompositorSpec,
    },
    /// Remove a compositor.
    RemoveCompositor {
        /// Compositor to remove.
        id: CompositorId,
    },
    /// Change a compositor's range.
    MoveCompositor {
        /// Compositor to move.
        id: CompositorId,
        /// New range.
        range: FrameRange,
    },
    /// Place a rendered transition between two adjacent clips.
    AddTransition {
        /// Plan the media was rendered from.
        plan: TransitionPlan,
        /// Rendered media.
        media: MediaRef,
    },
    /// Replace a clip's head or tail with a rendered fade.
    AddFade {
        /// Plan the media was rendered from.
        plan: FadePlan,
        /// Rendered media.
        media: MediaRef,
    },
}

impl EditRequest {
    /// Human-readable label for history display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Append { .. } => "Append",
            Self::Insert { .. } => "Insert",
            Self::Overwrite { .. } => "Overwrite",
            Self::Lift { .. } => "Lift",
            Self::SpliceOut { .. } => "Splice Out",
            Self::Cut { .. } => "Cut",
            Self::CutAll { .. } => "Cut All Tracks",
            Self::TrimStart { .. } => "Trim Start",
            Self::TrimEnd { .. } => "Trim End",
            Self::Roll { .. } => "Roll",
            Self::Slip { .. } => "Slip",
            Self::RippleTrim { .. } => "Ripple Trim",
            Self::InsertSpace { .. } => "Insert Space",
            Self::MoveClips { .. } => "Move",
            Self::SetClipSync { .. } => "Set Sync",
            Self::SetTrackSync { .. } => "Set Track Sync",
            Self::ClearSync { .. } => "Clear Sync",
            Self::ClearTrackSync { .. } => "Clear Track Sync",
            Self::Resync { .. } => "Resync",
            Self::AddFilter { .. } => "Add Filter",
            Self::RemoveFilter { .. } => "Remove Filter",
            Self::AddCompositor { .. } => "Add Compositor",
            Self::RemoveCompositor { .. } => "Remove Compositor",
            Self::MoveCompositor { .. } => "Move Compositor",
            Self::AddTransition { .. } => "Add Transition",
            Self::AddFade { .. } => "Add Fade",
        }
    }

    /// Reject timeline positions at or past [`MAX_FRAME`].
    pub(crate) fn check_frames(&self) -> EditResult<()> {
        let furthest = match self {
            Self::Insert { frame, .. }
            | Self::Overwrite { frame, .. }
            | Self::Cut { frame, .. }
            | Self::CutAll { frame } => *frame,
            Self::InsertSpace { frame, length } => frame.saturating_add(*length),
            Self::MoveClips { dest_frame, .. } => *dest_frame,
            Self::MoveCompositor { range, .. } => range.end,
            _ => return Ok(()),
        };
        if furthest >= MAX_FRAME {
            return Err(EditError::invalid_range(format!(
                "frame {furthest} is past the last usable frame {}",
                MAX_FRAME - 1
            )));
        }
        Ok(())
    }
}
