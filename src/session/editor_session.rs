use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::{
    edit::action::EditAction,
    edit::request::EditRequest,
    foundation::error::{EditError, EditResult},
    history::stack::{History, HistoryEntry},
    jobs::engine::{RenderJob, RenderRequest},
    jobs::queue::{JobHandle, JobId, JobQueue, JobStatus},
    model::clip::{ClipId, MediaRef},
    model::sequence::Sequence,
    model::track::{EditFreedom, MuteState, TrackId},
    session::config::EditorConfig,
    transition::plan::{
        FadeDirection, TransitionAlignment, TransitionStyle, plan_fade, plan_transition,
    },
};

/// What the user has selected on the timeline.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// Track receiving track-scoped commands.
    pub active_track: Option<TrackId>,
    /// Selected clips.
    pub clips: Vec<ClipId>,
}

/// Result of a successful edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditSummary {
    /// History label.
    pub label: String,
    /// Tracks whose contents changed.
    pub touched: Vec<TrackId>,
    /// Sequence length after the edit.
    pub sequence_len: u64,
}

/// What became of a finished render job.
#[derive(Debug)]
pub enum JobOutcome {
    /// The rendered media was placed on the timeline.
    Applied {
        /// Job.
        id: JobId,
        /// Follow-up edit.
        summary: EditSummary,
    },
    /// The engine failed; the timeline is untouched.
    Failed {
        /// Job.
        id: JobId,
        /// Engine message.
        message: String,
    },
    /// The job was cancelled; the timeline is untouched.
    Cancelled {
        /// Job.
        id: JobId,
    },
    /// Media was rendered but the timeline changed so it no longer fits.
    Rejected {
        /// Job.
        id: JobId,
        /// Why the follow-up edit failed.
        error: EditError,
    },
}

/// Editing context: one sequence, its history and the jobs feeding it.
///
/// All edits go through [`EditorSession::apply`] on the thread that owns the session.
#[derive(Debug)]
pub struct EditorSession {
    sequence: Sequence,
    history: History,
    config: EditorConfig,
    /// Current selection.
    pub selection: Selection,
    pending: BTreeMap<JobId, RenderJob>,
}

impl EditorSession {
    /// Session over `sequence` with an empty history.
    pub fn new(sequence: Sequence, config: EditorConfig) -> Self {
        Self {
            sequence,
            history: History::new(config.history_limit),
            config,
            selection: Selection::default(),
            pending: BTreeMap::new(),
        }
    }

    /// The edited sequence.
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Give the sequence back, dropping history.
    pub fn into_sequence(self) -> Sequence {
        self.sequence
    }

    /// Undo/redo stacks.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Active options.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    fn summary(&self, label: String, touched: Vec<TrackId>) -> EditSummary {
        EditSummary {
            label,
            touched,
            sequence_len: self.sequence.len_frames(),
        }
    }

    /// Apply one edit and record it in history.
    #[tracing::instrument(skip_all, fields(op = request.label()))]
    pub fn apply(&mut self, request: EditRequest) -> EditResult<EditSummary> {
        let action = EditAction::apply(&mut self.sequence, request, &self.config)?;
        let label = action.label().to_string();
        let touched = action.touched_tracks().to_vec();
        self.history.push(HistoryEntry {
            label: label.clone(),
            edits: vec![action],
        });
        tracing::info!(label = %label, "edit applied");
        Ok(self.summary(label, touched))
    }

    /// Apply several edits as one history entry. If any fails, none take effect.
    #[tracing::instrument(skip_all, fields(label = %label, count = requests.len()))]
    pub fn apply_consolidated(
        &mut self,
        label: &str,
        requests: Vec<EditRequest>,
    ) -> EditResult<EditSummary> {
        if requests.is_empty() {
            return Err(EditError::no_op("empty edit group"));
        }
        let mut edits: Vec<EditAction> = Vec::with_capacity(requests.len());
        for request in requests {
            match EditAction::apply(&mut self.sequence, request, &self.config) {
                Ok(action) => edits.push(action),
                Err(e) => {
                    for done in edits.iter_mut().rev() {
                        if let Err(undo) = done.undo_edit(&mut self.sequence) {
                            tracing::error!(error = %undo, "failed to unwind edit group");
                        }
                    }
                    return Err(e);
                }
            }
        }
        let mut touched: Vec<TrackId> = edits
            .iter()
            .flat_map(|e| e.touched_tracks().iter().copied())
            .collect();
        touched.sort();
        touched.dedup();
        self.history.push(HistoryEntry {
            label: label.to_string(),
            edits,
        });
        Ok(self.summary(label.to_string(), touched))
    }

    /// Undo the newest history entry and return its label.
    #[tracing::instrument(skip(self))]
    pub fn undo(&mut self) -> EditResult<String> {
        let label = self.history.undo(&mut self.sequence)?;
        tracing::info!(label = %label, "undo");
        Ok(label)
    }

    /// Redo the newest undone entry and return its label.
    #[tracing::instrument(skip(self))]
    pub fn redo(&mut self) -> EditResult<String> {
        let label = self.history.redo(&mut self.sequence)?;
        tracing::info!(label = %label, "redo");
        Ok(label)
    }

    /// Move every drifted child on `track` back to its synced position.
    /// Returns `Ok(None)` when nothing was out of sync.
    pub fn resync_track(&mut self, track: TrackId) -> EditResult<Option<EditSummary>> {
        let clips: Vec<ClipId> = self
            .sequence
            .track(track)?
            .clips
            .iter()
            .filter(|c| c.sync.is_some())
            .map(|c| c.id)
            .collect();
        if clips.is_empty() {
            return Ok(None);
        }
        match self.apply(EditRequest::Resync { clips }) {
            Ok(summary) => Ok(Some(summary)),
            Err(EditError::NoOp(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Lock or unlock a track. Not recorded in history.
    pub fn set_track_locked(&mut self, track: TrackId, locked: bool) -> EditResult<()> {
        self.sequence.track_mut(track)?.edit_freedom = if locked {
            EditFreedom::Locked
        } else {
            EditFreedom::Free
        };
        Ok(())
    }

    /// Change a track's mute state. Not recorded in history.
    pub fn set_track_mute(&mut self, track: TrackId, mute: MuteState) -> EditResult<()> {
        self.sequence.track_mut(track)?.mute = mute;
        Ok(())
    }

    fn submit(
        &mut self,
        queue: &mut JobQueue,
        job: RenderJob,
        out_path: PathBuf,
    ) -> EditResult<JobHandle> {
        let handle = queue.submit(RenderRequest {
            job: job.clone(),
            out_path,
            fps: self.sequence.profile.fps,
        })?;
        self.pending.insert(handle.id(), job);
        Ok(handle)
    }

    /// Plan a transition after entry `from_index` on `track` and queue its render.
    pub fn request_transition(
        &mut self,
        queue: &mut JobQueue,
        track: TrackId,
        from_index: usize,
        length: u64,
        alignment: TransitionAlignment,
        style: &TransitionStyle,
        out_path: PathBuf,
    ) -> EditResult<JobHandle> {
        let plan = plan_transition(&self.sequence, track, from_index, length, alignment, style)?;
        self.submit(queue, RenderJob::Transition { plan }, out_path)
    }

    /// Plan a fade over `clip` and queue its render.
    pub fn request_fade(
        &mut self,
        queue: &mut JobQueue,
        clip: ClipId,
        length: u64,
        direction: FadeDirection,
        out_path: PathBuf,
    ) -> EditResult<JobHandle> {
        let plan = plan_fade(&self.sequence, clip, length, direction)?;
        self.submit(queue, RenderJob::Fade { plan }, out_path)
    }

    /// Jobs submitted through this session that have not finished.
    pub fn pending_jobs(&self) -> Vec<JobId> {
        self.pending.keys().copied().collect()
    }

    /// Drain finished jobs from `queue` and place their media on the timeline.
    pub fn poll_jobs(&mut self, queue: &JobQueue) -> Vec<JobOutcome> {
        let mut outcomes = Vec::new();
        while let Some(event) = queue.try_next_event() {
            if !event.status.is_terminal() {
                continue;
            }
            let Some(job) = self.pending.remove(&event.id) else {
                tracing::debug!(job = event.id.0, "event for unknown job ignored");
                continue;
            };
            outcomes.push(self.finish_job(event.id, job, event.status));
        }
        outcomes
    }

    fn finish_job(&mut self, id: JobId, job: RenderJob, status: JobStatus) -> JobOutcome {
        let path = match status {
            JobStatus::Completed(path) => path,
            JobStatus::Failed(message) => return JobOutcome::Failed { id, message },
            JobStatus::Cancelled | JobStatus::Started => return JobOutcome::Cancelled { id },
        };
        let media = MediaRef::new(path.display().to_string(), job.output_kind(), job.length());
        let request = match job {
            RenderJob::Transition { plan } => EditRequest::AddTransition { plan, media },
            RenderJob::Fade { plan } => EditRequest::AddFade { plan, media },
        };
        match self.apply(request) {
            Ok(summary) => JobOutcome::Applied { id, summary },
            Err(error) => {
                tracing::warn!(job = id.0, error = %error, "rendered media no longer fits");
                JobOutcome::Rejected { id, error }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor_session.rs"]
mod tests;
