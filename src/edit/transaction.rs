use std::collections::BTreeSet;

use crate::{
    edit::op::SeqOp,
    foundation::core::{FrameRange, MAX_FRAME},
    foundation::error::{EditError, EditResult},
    model::clip::{Clip, ClipId, SyncData},
    model::compositor::Compositor,
    model::sequence::Sequence,
    model::track::{Track, TrackId, blank_run},
};

/// Recording mutation scope over a sequence.
///
/// Every change goes through [`Transaction::splice`] or the compositor helpers, which apply it
/// immediately and record a [`SeqOp`]. A failed edit calls [`Transaction::rollback`], so the
/// sequence is left exactly as it was found.
pub(crate) struct Transaction<'a> {
    seq: &'a mut Sequence,
    ops: Vec<SeqOp>,
    touched: BTreeSet<TrackId>,
    next_ids: (u64, u64),
}

/// Which half of a split clip keeps the original identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Keep {
    Left,
    Right,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(seq: &'a mut Sequence) -> Self {
        let next_ids = (seq.next_clip_id, seq.next_compositor_id);
        Self {
            seq,
            ops: Vec::new(),
            touched: BTreeSet::new(),
            next_ids,
        }
    }

    pub(crate) fn seq(&self) -> &Sequence {
        self.seq
    }

    pub(crate) fn track(&self, id: TrackId) -> EditResult<&Track> {
        self.seq.track(id)
    }

    pub(crate) fn alloc_clip_id(&mut self) -> ClipId {
        self.seq.alloc_clip_id()
    }

    pub(crate) fn blank(&mut self, len: u64) -> Clip {
        let id = self.seq.alloc_clip_id();
        Clip::blank(id, len)
    }

    /// Replace `remove` entries at `index` with `inserted` and record it.
    pub(crate) fn splice(
        &mut self,
        track: TrackId,
        index: usize,
        remove: usize,
        inserted: Vec<Clip>,
    ) -> EditResult<Vec<Clip>> {
        let t = self.seq.track_mut(track)?;
        t.ensure_editable()?;
        if index + remove > t.clips.len() {
            return Err(EditError::invalid_range(format!(
                "splice {index}+{remove} is outside track {track} ({} clips)",
                t.clips.len()
            )));
        }
        if inserted.iter().any(|c| c.clip_in > c.clip_out) {
            return Err(EditError::invalid_range("clips must be at least one frame long"));
        }
        if remove == 0 && inserted.is_empty() {
            return Ok(Vec::new());
        }
        let removed = t.splice(index, remove, inserted.clone());
        self.touched.insert(track);
        self.ops.push(SeqOp::Splice {
            track,
            index,
            removed: removed.clone(),
            inserted,
        });
        Ok(removed)
    }

    /// Replace the single clip at `index`.
    pub(crate) fn replace(&mut self, track: TrackId, index: usize, clip: Clip) -> EditResult<()> {
        if self.track(track)?.clip(index)? == &clip {
            return Ok(());
        }
        self.splice(track, index, 1, vec![clip]).map(|_| ())
    }

    /// Make sure an entry boundary exists at `frame` and return the index of the entry that
    /// starts there. Pads the track with a blank when `frame` is past its end.
    pub(crate) fn split_at(&mut self, track: TrackId, frame: u64) -> EditResult<usize> {
        self.split_keeping(track, frame, Keep::Left)
    }

    /// [`Transaction::split_at`] with control over which half keeps the clip id.
    pub(crate) fn split_keeping(
        &mut self,
        track: TrackId,
        frame: u64,
        keep: Keep,
    ) -> EditResult<usize> {
        let t = self.track(track)?;
        let len = t.len_frames();
        let count = t.clip_count();
        if frame > len {
            let pad = self.blank(frame - len);
            self.splice(track, count, 0, vec![pad])?;
            return Ok(count + 1);
        }
        let Some(i) = t.clip_index_at(frame) else {
            return Ok(count);
        };
        let start = t.clip_start(i)?;
        if start == frame {
            return Ok(i);
        }
        let clip = t.clip(i)?.clone();
        let offset = frame - start;
        let fresh = self.alloc_clip_id();
        let (left_id, right_id) = match keep {
            Keep::Left => (clip.id, fresh),
            Keep::Right => (fresh, clip.id),
        };
        let (first, second) = if clip.is_blank() {
            (
                Clip::blank(left_id, offset),
                Clip::blank(right_id, clip.len_frames() - offset),
            )
        } else {
            let first = clip.with_range(left_id, clip.clip_in, clip.clip_in + offset - 1);
            let mut second = clip.with_range(right_id, clip.clip_in + offset, clip.clip_out);
            second.sync = clip.sync.map(|s| SyncData {
                parent: s.parent,
                offset: s.offset + offset as i64,
            });
            (first, second)
        };
        self.splice(track, i, 1, vec![first, second])?;
        if keep == Keep::Right && !clip.is_blank() {
            self.shift_children(clip.id, offset)?;
        }
        Ok(i + 1)
    }

    /// Keep the children of `parent` in place after the parent's start moved `by` frames later.
    fn shift_children(&mut self, parent: ClipId, by: u64) -> EditResult<()> {
        for child in self.seq.children_of(parent) {
            let Some(loc) = self.seq.find_clip(child) else {
                continue;
            };
            let mut c = self.track(loc.track)?.clip(loc.index)?.clone();
            c.sync = c.sync.map(|s| SyncData {
                parent: s.parent,
                offset: s.offset - by as i64,
            });
            self.replace(loc.track, loc.index, c)?;
        }
        Ok(())
    }

    /// Remove everything in `range` without shifting what follows the range's end into it.
    /// Returns the index where the cleared range started. Later material moves left by the
    /// cleared length, so callers refill the gap.
    pub(crate) fn clear_range(&mut self, track: TrackId, range: FrameRange) -> EditResult<usize> {
        let a = self.split_keeping(track, range.start, Keep::Left)?;
        let len = self.track(track)?.len_frames();
        let b = self.split_keeping(track, range.end.min(len), Keep::Right)?;
        if b > a {
            self.splice(track, a, b - a, Vec::new())?;
        }
        Ok(a)
    }

    /// Replace `range` with a single blank of the same length.
    pub(crate) fn lift_range(&mut self, track: TrackId, range: FrameRange) -> EditResult<()> {
        let len = self.track(track)?.len_frames();
        let end = range.end.min(len);
        if range.start >= end {
            return Ok(());
        }
        let a = self.clear_range(track, FrameRange::with_len(range.start, end - range.start))?;
        let blank = self.blank(end - range.start);
        self.splice(track, a, 0, vec![blank])?;
        Ok(())
    }

    /// Merge every adjacent blank run on `track`.
    pub(crate) fn normalize(&mut self, track: TrackId) -> EditResult<()> {
        loop {
            let run = blank_run(&self.track(track)?.clips);
            let Some((start, count, len)) = run else {
                return Ok(());
            };
            let merged = self.track(track)?.clip(start)?.resized_blank(len);
            self.splice(track, start, count, vec![merged])?;
        }
    }

    pub(crate) fn insert_compositor(&mut self, comp: Compositor) {
        let position = self.seq.compositors.len();
        self.seq.compositors.push(comp.clone());
        self.ops.push(SeqOp::Compositor {
            position,
            before: None,
            after: Some(comp),
        });
    }

    pub(crate) fn remove_compositor(&mut self, position: usize) -> EditResult<()> {
        if position >= self.seq.compositors.len() {
            return Err(EditError::not_found(format!(
                "compositor position {position}"
            )));
        }
        let old = self.seq.compositors.remove(position);
        self.ops.push(SeqOp::Compositor {
            position,
            before: Some(old),
            after: None,
        });
        Ok(())
    }

    pub(crate) fn replace_compositor(&mut self, position: usize, comp: Compositor) -> EditResult<()> {
        let old = self
            .seq
            .compositors
            .get(position)
            .cloned()
            .ok_or_else(|| EditError::not_found(format!("compositor position {position}")))?;
        if old == comp {
            return Ok(());
        }
        self.seq.compositors[position] = comp.clone();
        self.ops.push(SeqOp::Compositor {
            position,
            before: Some(old),
            after: Some(comp),
        });
        Ok(())
    }

    pub(crate) fn alloc_compositor_id(&mut self) -> crate::model::compositor::CompositorId {
        self.seq.alloc_compositor_id()
    }

    /// Drop sync links whose parent left the sequence.
    pub(crate) fn drop_orphaned_sync(&mut self) -> EditResult<()> {
        let mut orphans = Vec::new();
        for t in &self.seq.tracks {
            for (i, c) in t.clips.iter().enumerate() {
                if let Some(s) = c.sync
                    && self.seq.find_clip(s.parent).is_none()
                {
                    orphans.push((t.id, i));
                }
            }
        }
        for (track, index) in orphans {
            let mut c = self.track(track)?.clip(index)?.clone();
            c.sync = None;
            tracing::debug!(clip = %c.id, "parent removed, clearing sync");
            self.replace(track, index, c)?;
        }
        Ok(())
    }

    /// Move compositors that follow a clip onto the clip's current span.
    pub(crate) fn follow_origin_clips(&mut self) -> EditResult<()> {
        let mut moves = Vec::new();
        for (pos, comp) in self.seq.compositors.iter().enumerate() {
            let Some(origin) = comp.origin_clip else {
                continue;
            };
            let Ok(span) = self.seq.clip_span(origin) else {
                continue;
            };
            if span != comp.range {
                let mut moved = comp.clone();
                moved.range = span;
                moves.push((pos, moved));
            }
        }
        for (pos, moved) in moves {
            self.replace_compositor(pos, moved)?;
        }
        Ok(())
    }

    /// Normalize touched tracks, drop orphaned sync links and, when asked, move compositors
    /// along with their origin clips.
    pub(crate) fn settle(&mut self, follow_compositors: bool) -> EditResult<()> {
        let touched: Vec<TrackId> = self.touched.iter().copied().collect();
        for t in touched {
            self.normalize(t)?;
            if self.track(t)?.len_frames() > MAX_FRAME {
                return Err(EditError::invalid_range(format!(
                    "track {t} would run past frame {MAX_FRAME}"
                )));
            }
        }
        self.drop_orphaned_sync()?;
        if follow_compositors {
            self.follow_origin_clips()?;
        }
        Ok(())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Recorded ops and the tracks they touched.
    pub(crate) fn into_parts(self) -> (Vec<SeqOp>, Vec<TrackId>) {
        (self.ops, self.touched.into_iter().collect())
    }

    /// Undo everything recorded so far.
    pub(crate) fn rollback(mut self) {
        for op in self.ops.iter().rev() {
            if let Err(e) = op.revert(self.seq) {
                tracing::error!(error = %e, "transaction rollback failed");
            }
        }
        (self.seq.next_clip_id, self.seq.next_compositor_id) = self.next_ids;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/edit/transaction.rs"]
mod tests;
