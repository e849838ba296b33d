//! flowedit is the timeline edit-decision core of a non-linear video editor.
//!
//! It models a [`Sequence`] of parallel [`Track`]s holding contiguous [`Clip`]s (gaps are explicit
//! blank clips) and applies reversible edits to it: insert, overwrite, lift, splice-out, razor
//! cuts, insert/overwrite trims, roll, slip, ripple trims, moves, parent/child sync and
//! compositor/filter changes.
//!
//! # Editing model
//!
//! 1. **Request**: every edit is an [`EditRequest`] value, serializable as JSON.
//! 2. **Apply**: [`EditAction::apply`] validates the request against the sequence and mutates it
//!    through a recording transaction. Any failure rolls the sequence back untouched.
//! 3. **History**: [`EditorSession`] keeps applied actions in a [`History`]; undo reverts the
//!    recorded primitive operations, redo re-applies them.
//! 4. **Background renders**: transitions and fades are planned on the editing thread, rendered
//!    by a [`JobQueue`] worker, and placed on the timeline by a follow-up edit when
//!    [`EditorSession::poll_jobs`] sees the job complete.
//!
//! The crate never decodes or encodes media itself. Media facts come from a
//! [`MediaInfoProvider`], rendered media from a [`RenderEngine`]; the `media-ffmpeg` feature
//! enables implementations backed by the system `ffprobe`/`ffmpeg` binaries.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod edit;
mod foundation;
mod history;
mod jobs;
mod media;
mod model;
mod project;
mod session;
mod transition;

pub use edit::action::{ActionState, EditAction};
pub use edit::request::{ClipRef, Edge, EditRequest, MoveMode, TrimMode};
pub use foundation::core::{Fps, FrameRange, MAX_FRAME, shift_frame};
pub use foundation::error::{EditError, EditResult};
pub use history::stack::{History, HistoryEntry};
pub use jobs::engine::{CancelToken, FfmpegRenderEngine, RenderEngine, RenderJob, RenderRequest};
pub use jobs::queue::{JobEvent, JobHandle, JobId, JobQueue, JobStatus};
pub use media::info::{
    FfprobeMediaInfo, MediaInfo, MediaInfoProvider, StaticMediaInfo, probe_all,
};
pub use model::clip::{
    Clip, ClipId, ClipSource, ClipSpec, ContainerRef, Filter, MediaKind, MediaRef, SyncData,
};
pub use model::compositor::{Compositor, CompositorId, CompositorSpec};
pub use model::sequence::{ClipLocation, Profile, Sequence};
pub use model::track::{ClipSpan, EditFreedom, MuteState, Track, TrackId, TrackKind};
pub use project::file::{LoadReport, PROJECT_FORMAT_VERSION, Project};
pub use session::config::EditorConfig;
pub use session::editor_session::{EditSummary, EditorSession, JobOutcome, Selection};
pub use transition::plan::{
    FadeDirection, FadePlan, SourceSpan, TransitionAlignment, TransitionKind, TransitionPlan,
    TransitionStyle, WipeDir, parse_transition_kind, plan_fade, plan_transition,
};
