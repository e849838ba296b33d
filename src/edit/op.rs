use crate::{
    foundation::error::{EditError, EditResult},
    model::clip::Clip,
    model::compositor::Compositor,
    model::sequence::Sequence,
    model::track::TrackId,
};

/// Primitive, exactly invertible sequence mutation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum SeqOp {
    /// Replace `removed` at `index` on `track` with `inserted`.
    Splice {
        track: TrackId,
        index: usize,
        removed: Vec<Clip>,
        inserted: Vec<Clip>,
    },
    /// Insert (`before == None`), remove (`after == None`) or replace a compositor at `position`.
    Compositor {
        position: usize,
        before: Option<Compositor>,
        after: Option<Compositor>,
    },
}

impl SeqOp {
    /// Apply forward, checking the sequence still holds what the op expects to replace.
    pub(crate) fn apply(&self, seq: &mut Sequence) -> EditResult<()> {
        match self {
            Self::Splice {
                track,
                index,
                removed,
                inserted,
            } => splice_checked(seq, *track, *index, removed, inserted),
            Self::Compositor {
                position,
                before,
                after,
            } => compositor_checked(seq, *position, before.as_ref(), after.as_ref()),
        }
    }

    /// Apply the inverse, with the same check.
    pub(crate) fn revert(&self, seq: &mut Sequence) -> EditResult<()> {
        match self {
            Self::Splice {
                track,
                index,
                removed,
                inserted,
            } => splice_checked(seq, *track, *index, inserted, removed),
            Self::Compositor {
                position,
                before,
                after,
            } => compositor_checked(seq, *position, after.as_ref(), before.as_ref()),
        }
    }
}

fn splice_checked(
    seq: &mut Sequence,
    track: TrackId,
    index: usize,
    expect: &[Clip],
    replacement: &[Clip],
) -> EditResult<()> {
    let t = seq.track_mut(track)?;
    let end = index + expect.len();
    if end > t.clips.len() || t.clips[index..end] != *expect {
        return Err(EditError::state(format!(
            "track {track} no longer matches the recorded edit at index {index}"
        )));
    }
    t.splice(index, expect.len(), replacement.to_vec());
    Ok(())
}

fn compositor_checked(
    seq: &mut Sequence,
    position: usize,
    expect: Option<&Compositor>,
    replacement: Option<&Compositor>,
) -> EditResult<()> {
    match expect {
        Some(old) => {
            if seq.compositors.get(position) != Some(old) {
                return Err(EditError::state(format!(
                    "compositor {} no longer matches the recorded edit",
                    old.id.0
                )));
            }
            match replacement {
                Some(new) => seq.compositors[position] = new.clone(),
                None => {
                    seq.compositors.remove(position);
                }
            }
        }
        None => {
            if position > seq.compositors.len() {
                return Err(EditError::state(format!(
                    "compositor position {position} is out of bounds"
                )));
            }
            if let Some(new) = replacement {
                seq.compositors.insert(position, new.clone());
            }
        }
    }
    Ok(())
}

/// Apply `ops` in order; on failure restore everything applied so far.
pub(crate) fn apply_all(seq: &mut Sequence, ops: &[SeqOp]) -> EditResult<()> {
    for (i, op) in ops.iter().enumerate() {
        if let Err(e) = op.apply(seq) {
            for done in ops[..i].iter().rev() {
                if let Err(undo) = done.revert(seq) {
                    tracing::error!(error = %undo, "restoring after a failed apply failed");
                }
            }
            return Err(e);
        }
    }
    Ok(())
}

/// Revert `ops` in reverse order; on failure re-apply everything reverted so far.
pub(crate) fn revert_all(seq: &mut Sequence, ops: &[SeqOp]) -> EditResult<()> {
    for (i, op) in ops.iter().enumerate().rev() {
        if let Err(e) = op.revert(seq) {
            for done in &ops[i + 1..] {
                if let Err(redo) = done.apply(seq) {
                    tracing::error!(error = %redo, "restoring after a failed revert failed");
                }
            }
            return Err(e);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/edit/op.rs"]
mod tests;
