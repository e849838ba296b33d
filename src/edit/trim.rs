use crate::{
    edit::request::{ClipRef, Edge, TrimMode},
    edit::transaction::Transaction,
    foundation::core::FrameRange,
    foundation::error::{EditError, EditResult},
    model::clip::Clip,
    model::track::TrackId,
};

/// The media clip at `r` and its timeline start.
fn media_clip(tx: &Transaction<'_>, r: ClipRef, what: &str) -> EditResult<(Clip, u64)> {
    let t = tx.track(r.track)?;
    t.ensure_editable()?;
    let clip = t.clip(r.index)?.clone();
    if clip.is_blank() {
        return Err(EditError::validation(format!(
            "blank at index {} on track {} cannot be {what}",
            r.index, r.track
        )));
    }
    Ok((clip, t.clip_start(r.index)?))
}

fn check_nonzero(delta: i64) -> EditResult<()> {
    if delta == 0 {
        return Err(EditError::no_op("zero frame trim"));
    }
    Ok(())
}

/// Clip with `n` more source frames after its out point.
fn grow_tail(clip: &Clip, n: u64) -> EditResult<Clip> {
    if let Some(tail) = clip.tail_handle()
        && tail < n
    {
        return Err(EditError::handle(format!("tail of clip {}", clip.id), n, tail));
    }
    let mut c = clip.clone();
    c.clip_out += n;
    Ok(c)
}

/// Clip with `n` more source frames before its in point.
fn grow_head(clip: &Clip, n: u64) -> EditResult<Clip> {
    if clip.clip_in < n {
        return Err(EditError::handle(
            format!("head of clip {}", clip.id),
            n,
            clip.clip_in,
        ));
    }
    let mut c = clip.clone();
    c.clip_in -= n;
    Ok(c)
}

fn check_keeps_frame(clip: &Clip, n: u64) -> EditResult<()> {
    if clip.len_frames() <= n {
        return Err(EditError::invalid_range(format!(
            "clip {} has {} frames, cannot remove {n}",
            clip.id,
            clip.len_frames()
        )));
    }
    Ok(())
}

fn shrink_tail(clip: &Clip, n: u64) -> EditResult<Clip> {
    check_keeps_frame(clip, n)?;
    let mut c = clip.clone();
    c.clip_out -= n;
    Ok(c)
}

fn shrink_head(clip: &Clip, n: u64) -> EditResult<Clip> {
    check_keeps_frame(clip, n)?;
    let mut c = clip.clone();
    c.clip_in += n;
    Ok(c)
}

pub(crate) fn trim_end(
    tx: &mut Transaction<'_>,
    r: ClipRef,
    delta: i64,
    mode: TrimMode,
) -> EditResult<()> {
    check_nonzero(delta)?;
    let (clip, start) = media_clip(tx, r, "trimmed")?;
    let n = delta.unsigned_abs();
    match (mode, delta > 0) {
        (TrimMode::Insert, true) => tx.replace(r.track, r.index, grow_tail(&clip, n)?),
        (TrimMode::Insert, false) => tx.replace(r.track, r.index, shrink_tail(&clip, n)?),
        (TrimMode::Overwrite, true) => {
            let grown = grow_tail(&clip, n)?;
            let end = start + clip.len_frames();
            tx.clear_range(r.track, FrameRange::with_len(end, n))?;
            tx.replace(r.track, r.index, grown)
        }
        (TrimMode::Overwrite, false) => {
            let shrunk = shrink_tail(&clip, n)?;
            let blank = tx.blank(n);
            tx.splice(r.track, r.index, 1, vec![shrunk, blank])?;
            Ok(())
        }
    }
}

pub(crate) fn trim_start(
    tx: &mut Transaction<'_>,
    r: ClipRef,
    delta: i64,
    mode: TrimMode,
) -> EditResult<()> {
    check_nonzero(delta)?;
    let (clip, start) = media_clip(tx, r, "trimmed")?;
    let n = delta.unsigned_abs();
    match (mode, delta > 0) {
        (TrimMode::Insert, true) => tx.replace(r.track, r.index, shrink_head(&clip, n)?),
        (TrimMode::Insert, false) => tx.replace(r.track, r.index, grow_head(&clip, n)?),
        (TrimMode::Overwrite, true) => {
            let shrunk = shrink_head(&clip, n)?;
            let blank = tx.blank(n);
            tx.splice(r.track, r.index, 1, vec![blank, shrunk])?;
            Ok(())
        }
        (TrimMode::Overwrite, false) => {
            let grown = grow_head(&clip, n)?;
            if start < n {
                return Err(EditError::invalid_range(format!(
                    "clip {} starts at frame {start}, cannot extend {n} frames before it",
                    clip.id
                )));
            }
            let index = tx.clear_range(r.track, FrameRange::with_len(start - n, n))?;
            tx.replace(r.track, index, grown)
        }
    }
}

/// Blank of `len` frames resized by `change`, or `None` when fully consumed.
fn resize_blank(clip: &Clip, grow: bool, n: u64) -> EditResult<Option<Clip>> {
    let len = clip.len_frames();
    if grow {
        Ok(Some(clip.resized_blank(len + n)))
    } else if len > n {
        Ok(Some(clip.resized_blank(len - n)))
    } else if len == n {
        Ok(None)
    } else {
        Err(EditError::invalid_range(format!(
            "blank of {len} frames cannot give up {n}"
        )))
    }
}

/// Entry left of the cut after the cut moved by `delta`.
fn roll_left(clip: &Clip, delta: i64) -> EditResult<Option<Clip>> {
    let n = delta.unsigned_abs();
    if clip.is_blank() {
        return resize_blank(clip, delta > 0, n);
    }
    if delta > 0 {
        grow_tail(clip, n).map(Some)
    } else {
        shrink_tail(clip, n).map(Some)
    }
}

/// Entry right of the cut after the cut moved by `delta`.
fn roll_right(clip: &Clip, delta: i64) -> EditResult<Option<Clip>> {
    let n = delta.unsigned_abs();
    if clip.is_blank() {
        return resize_blank(clip, delta < 0, n);
    }
    if delta > 0 {
        shrink_head(clip, n).map(Some)
    } else {
        grow_head(clip, n).map(Some)
    }
}

pub(crate) fn roll(tx: &mut Transaction<'_>, r: ClipRef, delta: i64) -> EditResult<()> {
    check_nonzero(delta)?;
    let t = tx.track(r.track)?;
    t.ensure_editable()?;
    let left = t.clip(r.index)?.clone();
    let right = t
        .clips
        .get(r.index + 1)
        .cloned()
        .ok_or_else(|| {
            EditError::invalid_range(format!(
                "no cut after index {} on track {}",
                r.index, r.track
            ))
        })?;
    let new_left = roll_left(&left, delta)?;
    let new_right = roll_right(&right, delta)?;
    let replacement: Vec<Clip> = new_left.into_iter().chain(new_right).collect();
    tx.splice(r.track, r.index, 2, replacement)?;
    Ok(())
}

pub(crate) fn slip(tx: &mut Transaction<'_>, r: ClipRef, delta: i64) -> EditResult<()> {
    check_nonzero(delta)?;
    let (clip, _) = media_clip(tx, r, "slipped")?;
    let n = delta.unsigned_abs();
    let slipped = if delta > 0 {
        let mut c = grow_tail(&clip, n)?;
        c.clip_in += n;
        c
    } else {
        let mut c = grow_head(&clip, n)?;
        c.clip_out -= n;
        c
    };
    tx.replace(r.track, r.index, slipped)
}

/// `true` when `range` on `track` holds only blank entries (or lies past the track end).
fn is_blank_span(tx: &Transaction<'_>, track: TrackId, range: FrameRange) -> EditResult<bool> {
    let t = tx.track(track)?;
    let mut start = 0u64;
    for c in &t.clips {
        let span = FrameRange::with_len(start, c.len_frames());
        if span.overlaps(range) && !c.is_blank() {
            return Ok(false);
        }
        start = span.end;
    }
    Ok(true)
}

/// `true` when `frame` on `track` is a cut, lies inside a blank, or is at/after the end.
fn can_open_gap(tx: &Transaction<'_>, track: TrackId, frame: u64) -> EditResult<bool> {
    let t = tx.track(track)?;
    let Some(i) = t.clip_index_at(frame) else {
        return Ok(true);
    };
    Ok(t.clip(i)?.is_blank() || t.clip_start(i)? == frame)
}

pub(crate) fn ripple_trim(
    tx: &mut Transaction<'_>,
    r: ClipRef,
    edge: Edge,
    delta: i64,
) -> EditResult<()> {
    check_nonzero(delta)?;
    let (clip, start) = media_clip(tx, r, "trimmed")?;
    let n = delta.unsigned_abs();
    let grows = match edge {
        Edge::End => delta > 0,
        Edge::Start => delta < 0,
    };
    let (frame, removed) = match edge {
        Edge::End => {
            let end = start + clip.len_frames();
            (end, FrameRange::with_len(end.saturating_sub(n), n))
        }
        Edge::Start => (start, FrameRange::with_len(start, n)),
    };

    match edge {
        Edge::End => trim_end(tx, r, delta, TrimMode::Insert)?,
        Edge::Start => trim_start(tx, r, delta, TrimMode::Insert)?,
    }

    let others: Vec<(TrackId, u64)> = tx
        .seq()
        .unlocked_tracks()
        .filter(|t| t.id != r.track)
        .map(|t| (t.id, t.len_frames()))
        .collect();
    for (track, len) in others {
        if grows {
            if frame >= len {
                continue;
            }
            if !can_open_gap(tx, track, frame)? {
                return Err(EditError::validation(format!(
                    "ripple would split a clip at frame {frame} on track {track}"
                )));
            }
            let index = tx.split_at(track, frame)?;
            let blank = tx.blank(n);
            tx.splice(track, index, 0, vec![blank])?;
        } else {
            if removed.start >= len {
                continue;
            }
            if !is_blank_span(tx, track, removed)? {
                return Err(EditError::invalid_range(format!(
                    "ripple would remove media in {}..{} on track {track}",
                    removed.start, removed.end
                )));
            }
            tx.clear_range(track, removed)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/edit/trim.rs"]
mod tests;
