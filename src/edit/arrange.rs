use crate::{
    edit::request::MoveMode,
    edit::transaction::Transaction,
    foundation::core::FrameRange,
    foundation::error::{EditError, EditResult},
    model::clip::{Clip, ClipSpec},
    model::track::TrackId,
};

fn check_index_range(tx: &Transaction<'_>, track: TrackId, from: usize, to: usize) -> EditResult<()> {
    let count = tx.track(track)?.clip_count();
    if from > to || to >= count {
        return Err(EditError::invalid_range(format!(
            "clip range {from}..={to} is outside track {track} ({count} clips)"
        )));
    }
    Ok(())
}

fn new_clip(tx: &mut Transaction<'_>, spec: &ClipSpec) -> EditResult<Clip> {
    spec.validate()?;
    let id = tx.alloc_clip_id();
    Ok(Clip::from_spec(id, spec))
}

pub(crate) fn append(tx: &mut Transaction<'_>, track: TrackId, spec: &ClipSpec) -> EditResult<()> {
    let count = tx.track(track)?.clip_count();
    let clip = new_clip(tx, spec)?;
    tx.splice(track, count, 0, vec![clip])?;
    Ok(())
}

pub(crate) fn insert(
    tx: &mut Transaction<'_>,
    track: TrackId,
    frame: u64,
    spec: &ClipSpec,
) -> EditResult<()> {
    tx.track(track)?.ensure_editable()?;
    let clip = new_clip(tx, spec)?;
    let index = tx.split_at(track, frame)?;
    tx.splice(track, index, 0, vec![clip])?;
    Ok(())
}

pub(crate) fn overwrite(
    tx: &mut Transaction<'_>,
    track: TrackId,
    frame: u64,
    spec: &ClipSpec,
) -> EditResult<()> {
    tx.track(track)?.ensure_editable()?;
    let clip = new_clip(tx, spec)?;
    let index = tx.clear_range(track, FrameRange::with_len(frame, clip.len_frames()))?;
    tx.splice(track, index, 0, vec![clip])?;
    Ok(())
}

pub(crate) fn lift(tx: &mut Transaction<'_>, track: TrackId, from: usize, to: usize) -> EditResult<()> {
    check_index_range(tx, track, from, to)?;
    let t = tx.track(track)?;
    if t.clips[from..=to].iter().all(Clip::is_blank) {
        return Err(EditError::no_op("lift range holds only blank space"));
    }
    let len: u64 = t.clips[from..=to].iter().map(Clip::len_frames).sum();
    let blank = tx.blank(len);
    tx.splice(track, from, to - from + 1, vec![blank])?;
    Ok(())
}

pub(crate) fn splice_out(
    tx: &mut Transaction<'_>,
    track: TrackId,
    from: usize,
    to: usize,
) -> EditResult<()> {
    check_index_range(tx, track, from, to)?;
    tx.splice(track, from, to - from + 1, Vec::new())?;
    Ok(())
}

/// `true` when `frame` falls strictly inside a media clip on `track`.
fn is_cuttable(tx: &Transaction<'_>, track: TrackId, frame: u64) -> EditResult<bool> {
    let t = tx.track(track)?;
    let Some(i) = t.clip_index_at(frame) else {
        return Ok(false);
    };
    Ok(!t.clip(i)?.is_blank() && t.clip_start(i)? != frame)
}

pub(crate) fn cut(tx: &mut Transaction<'_>, track: TrackId, frame: u64) -> EditResult<()> {
    tx.track(track)?.ensure_editable()?;
    if !is_cuttable(tx, track, frame)? {
        return Err(EditError::no_op(format!(
            "no clip to cut at frame {frame} on track {track}"
        )));
    }
    tx.split_at(track, frame)?;
    Ok(())
}

pub(crate) fn cut_all(tx: &mut Transaction<'_>, frame: u64) -> EditResult<()> {
    let tracks: Vec<TrackId> = tx.seq().unlocked_tracks().map(|t| t.id).collect();
    for track in tracks {
        if is_cuttable(tx, track, frame)? {
            tx.split_at(track, frame)?;
        }
    }
    Ok(())
}

pub(crate) fn insert_space(tx: &mut Transaction<'_>, frame: u64, length: u64) -> EditResult<()> {
    if length == 0 {
        return Err(EditError::invalid_range("inserted space must be > 0 frames"));
    }
    let tracks: Vec<TrackId> = tx
        .seq()
        .unlocked_tracks()
        .filter(|t| frame < t.len_frames())
        .map(|t| t.id)
        .collect();
    for track in tracks {
        let index = tx.split_at(track, frame)?;
        let blank = tx.blank(length);
        tx.splice(track, index, 0, vec![blank])?;
    }
    Ok(())
}

pub(crate) fn move_clips(
    tx: &mut Transaction<'_>,
    track: TrackId,
    from: usize,
    to: usize,
    dest_track: TrackId,
    dest_frame: u64,
    mode: MoveMode,
) -> EditResult<()> {
    check_index_range(tx, track, from, to)?;
    let src = tx.track(track)?;
    src.ensure_editable()?;
    let dest = tx.track(dest_track)?;
    dest.ensure_editable()?;
    if src.kind != dest.kind {
        return Err(EditError::validation(format!(
            "cannot move clips from a {:?} track to a {:?} track",
            src.kind, dest.kind
        )));
    }
    let moved = tx.track(track)?.clips[from..=to].to_vec();
    if moved.iter().all(Clip::is_blank) {
        return Err(EditError::no_op("move range holds only blank space"));
    }
    match mode {
        MoveMode::Insert => {
            tx.splice(track, from, moved.len(), Vec::new())?;
            let index = tx.split_at(dest_track, dest_frame)?;
            tx.splice(dest_track, index, 0, moved)?;
        }
        MoveMode::Overwrite => {
            let start = tx.track(track)?.clip_start(from)?;
            move_overwrite(tx, track, start, moved, dest_track, dest_frame)?;
        }
    }
    Ok(())
}

/// Lift `moved` (which starts at `start` on `track`) and lay it over `dest_frame` on `dest_track`.
pub(crate) fn move_overwrite(
    tx: &mut Transaction<'_>,
    track: TrackId,
    start: u64,
    moved: Vec<Clip>,
    dest_track: TrackId,
    dest_frame: u64,
) -> EditResult<()> {
    let len: u64 = moved.iter().map(Clip::len_frames).sum();
    tx.lift_range(track, FrameRange::with_len(start, len))?;
    let index = tx.clear_range(dest_track, FrameRange::with_len(dest_frame, len))?;
    tx.splice(dest_track, index, 0, moved)?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/edit/arrange.rs"]
mod tests;
