use crate::{
    edit::op::{SeqOp, apply_all, revert_all},
    edit::request::EditRequest,
    edit::transaction::Transaction,
    edit::{arrange, decorate, rendered, sync, trim},
    foundation::error::{EditError, EditResult},
    model::sequence::Sequence,
    model::track::TrackId,
    session::config::EditorConfig,
};

/// Lifecycle of an [`EditAction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionState {
    /// Effects are present in the sequence.
    Applied,
    /// Effects have been reverted.
    Undone,
}

/// A reversible record of one applied [`EditRequest`].
///
/// The action owns every clip it removed from the sequence, so undoing it restores exactly
/// the entries, ids and in/out points that were there before.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EditAction {
    request: EditRequest,
    label: String,
    ops: Vec<SeqOp>,
    touched: Vec<TrackId>,
    state: ActionState,
}

impl EditAction {
    /// Validate and apply `request`. On error the sequence is left untouched.
    #[tracing::instrument(skip_all, fields(op = request.label()))]
    pub fn apply(seq: &mut Sequence, request: EditRequest, cfg: &EditorConfig) -> EditResult<Self> {
        request.check_frames()?;
        let mut tx = Transaction::new(seq);
        let result = execute(&mut tx, &request, cfg)
            .and_then(|()| tx.settle(cfg.compositors_follow_clips));
        if let Err(e) = result {
            tracing::debug!(error = %e, "edit rejected");
            tx.rollback();
            return Err(e);
        }
        if tx.is_empty() {
            tx.rollback();
            return Err(EditError::no_op(format!(
                "{} would not change the sequence",
                request.label()
            )));
        }
        let (ops, touched) = tx.into_parts();
        tracing::debug!(ops = ops.len(), tracks = touched.len(), "edit applied");
        Ok(Self {
            label: request.label().to_string(),
            request,
            ops,
            touched,
            state: ActionState::Applied,
        })
    }

    /// Re-apply an undone action.
    pub fn do_edit(&mut self, seq: &mut Sequence) -> EditResult<()> {
        if self.state != ActionState::Undone {
            return Err(EditError::state(format!("'{}' is already applied", self.label)));
        }
        apply_all(seq, &self.ops)?;
        self.state = ActionState::Applied;
        Ok(())
    }

    /// Revert an applied action.
    pub fn undo_edit(&mut self, seq: &mut Sequence) -> EditResult<()> {
        if self.state != ActionState::Applied {
            return Err(EditError::state(format!("'{}' is not applied", self.label)));
        }
        revert_all(seq, &self.ops)?;
        self.state = ActionState::Undone;
        Ok(())
    }

    /// Request this action was built from.
    pub fn request(&self) -> &EditRequest {
        &self.request
    }

    /// Display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Current state.
    pub fn state(&self) -> ActionState {
        self.state
    }

    /// Tracks whose clip lists the action changes.
    pub fn touched_tracks(&self) -> &[TrackId] {
        &self.touched
    }
}

fn execute(tx: &mut Transaction<'_>, request: &EditRequest, cfg: &EditorConfig) -> EditResult<()> {
    match request {
        EditRequest::Append { track, clip } => arrange::append(tx, *track, clip),
        EditRequest::Insert { track, frame, clip } => arrange::insert(tx, *track, *frame, clip),
        EditRequest::Overwrite { track, frame, clip } => {
            arrange::overwrite(tx, *track, *frame, clip)
        }
        EditRequest::Lift { track, from, to } => arrange::lift(tx, *track, *from, *to),
        EditRequest::SpliceOut { track, from, to } => arrange::splice_out(tx, *track, *from, *to),
        EditRequest::Cut { track, frame } => arrange::cut(tx, *track, *frame),
        EditRequest::CutAll { frame } => arrange::cut_all(tx, *frame),
        EditRequest::TrimStart { clip, delta, mode } => {
            trim::trim_start(tx, *clip, *delta, mode.unwrap_or(cfg.trim_mode))
        }
        EditRequest::TrimEnd { clip, delta, mode } => {
            trim::trim_end(tx, *clip, *delta, mode.unwrap_or(cfg.trim_mode))
        }
        EditRequest::Roll { clip, delta } => trim::roll(tx, *clip, *delta),
        EditRequest::Slip { clip, delta } => trim::slip(tx, *clip, *delta),
        EditRequest::RippleTrim { clip, edge, delta } => {
            trim::ripple_trim(tx, *clip, *edge, *delta)
        }
        EditRequest::InsertSpace { frame, length } => arrange::insert_space(tx, *frame, *length),
        EditRequest::MoveClips {
            track,
            from,
            to,
            dest_track,
            dest_frame,
            mode,
        } => arrange::move_clips(tx, *track, *from, *to, *dest_track, *dest_frame, *mode),
        EditRequest::SetClipSync { child, parent } => sync::set_clip_sync(tx, *child, *parent),
        EditRequest::SetTrackSync {
            child_track,
            parent_track,
        } => sync::set_track_sync(tx, *child_track, *parent_track),
        EditRequest::ClearSync { clips } => sync::clear_sync(tx, clips),
        EditRequest::ClearTrackSync { track } => sync::clear_track_sync(tx, *track),
        EditRequest::Resync { clips } => sync::resync(tx, clips),
        EditRequest::AddFilter {
            clip,
            filter,
            index,
        } => decorate::add_filter(tx, *clip, filter, *index),
        EditRequest::RemoveFilter { clip, index } => decorate::remove_filter(tx, *clip, *index),
        EditRequest::AddCompositor { spec } => decorate::add_compositor(tx, spec),
        EditRequest::RemoveCompositor { id } => decorate::remove_compositor(tx, *id),
        EditRequest::MoveCompositor { id, range } => decorate::move_compositor(tx, *id, *range),
        EditRequest::AddTransition { plan, media } => rendered::add_transition(tx, plan, media),
        EditRequest::AddFade { plan, media } => rendered::add_fade(tx, plan, media),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/edit/action.rs"]
mod tests;
