use crate::{
    foundation::core::FrameRange,
    foundation::error::{EditError, EditResult},
    model::clip::{Clip, ClipId},
};

/// Track identity: its index in the owning sequence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TrackId(pub usize);

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Media type carried by a track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    /// Video track.
    Video,
    /// Audio track.
    Audio,
}

/// Whether edits may touch the track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditFreedom {
    /// Edits allowed.
    #[default]
    Free,
    /// All edits rejected.
    Locked,
}

/// Output muting of a track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuteState {
    /// Nothing muted.
    #[default]
    Unmuted,
    /// Picture muted.
    Video,
    /// Sound muted.
    Audio,
    /// Picture and sound muted.
    All,
}

/// Ordered, gap-free sequence of clips. Gaps are explicit blank clips.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Track {
    /// Index of this track in its sequence.
    pub id: TrackId,
    /// Media type.
    pub kind: TrackKind,
    /// Lock state.
    #[serde(default)]
    pub edit_freedom: EditFreedom,
    /// Mute state.
    #[serde(default)]
    pub mute: MuteState,
    /// Display height; no effect on editing.
    #[serde(default = "default_track_height")]
    pub height: u32,
    /// Clips in timeline order.
    #[serde(default)]
    pub clips: Vec<Clip>,
}

fn default_track_height() -> u32 {
    50
}

/// One row of a track's display list.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ClipSpan {
    /// Index in the track.
    pub index: usize,
    /// Clip identity.
    pub id: ClipId,
    /// Display name (empty for blanks).
    pub name: String,
    /// Timeline frames covered.
    pub range: FrameRange,
    /// Gap placeholder.
    pub is_blank: bool,
    /// Source in point.
    pub clip_in: u64,
    /// Source out point.
    pub clip_out: u64,
    /// Parent clip when synchronized.
    pub sync_parent: Option<ClipId>,
}

impl Track {
    /// Empty track.
    pub fn new(id: TrackId, kind: TrackKind) -> Self {
        Self {
            id,
            kind,
            edit_freedom: EditFreedom::Free,
            mute: MuteState::Unmuted,
            height: default_track_height(),
            clips: Vec::new(),
        }
    }

    /// `true` when the track is locked.
    pub fn is_locked(&self) -> bool {
        self.edit_freedom == EditFreedom::Locked
    }

    /// Error if the track is locked.
    pub fn ensure_editable(&self) -> EditResult<()> {
        if self.is_locked() {
            return Err(EditError::locked(self.id.0));
        }
        Ok(())
    }

    /// Sum of all clip lengths.
    pub fn len_frames(&self) -> u64 {
        self.clips.iter().map(Clip::len_frames).sum()
    }

    /// Number of entries, blanks included.
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Clip at `index`.
    pub fn clip(&self, index: usize) -> EditResult<&Clip> {
        self.clips.get(index).ok_or_else(|| {
            EditError::not_found(format!("track {} has no clip at index {index}", self.id))
        })
    }

    /// Timeline frame where entry `index` starts. `index == clip_count()` gives the track end.
    pub fn clip_start(&self, index: usize) -> EditResult<u64> {
        if index > self.clips.len() {
            return Err(EditError::not_found(format!(
                "track {} has no clip at index {index}",
                self.id
            )));
        }
        Ok(self.clips[..index].iter().map(Clip::len_frames).sum())
    }

    /// Timeline frames covered by entry `index`.
    pub fn clip_range(&self, index: usize) -> EditResult<FrameRange> {
        let len = self.clip(index)?.len_frames();
        Ok(FrameRange::with_len(self.clip_start(index)?, len))
    }

    /// Index of the entry covering `frame`, `None` at or after the track end.
    pub fn clip_index_at(&self, frame: u64) -> Option<usize> {
        let mut start = 0u64;
        for (i, c) in self.clips.iter().enumerate() {
            let end = start + c.len_frames();
            if frame < end {
                return Some(i);
            }
            start = end;
        }
        None
    }

    /// Index of a clip by identity.
    pub fn index_of(&self, id: ClipId) -> Option<usize> {
        self.clips.iter().position(|c| c.id == id)
    }

    /// Insert `clip` before entry `index`, merging blanks that become adjacent.
    pub fn insert(&mut self, clip: Clip, index: usize) -> EditResult<()> {
        if index > self.clips.len() {
            return Err(EditError::invalid_range(format!(
                "insert index {index} is past the end of track {} ({} clips)",
                self.id,
                self.clips.len()
            )));
        }
        self.splice(index, 0, vec![clip]);
        self.normalize_blanks();
        Ok(())
    }

    /// Remove entries `from..to` (half-open), closing the gap, and return them.
    pub fn remove_range(&mut self, from: usize, to: usize) -> EditResult<Vec<Clip>> {
        if from > to || to > self.clips.len() {
            return Err(EditError::invalid_range(format!(
                "remove range {from}..{to} is outside track {} ({} clips)",
                self.id,
                self.clips.len()
            )));
        }
        let removed = self.splice(from, to - from, Vec::new());
        self.normalize_blanks();
        Ok(removed)
    }

    /// Merge every run of adjacent blanks into its first blank.
    pub fn normalize_blanks(&mut self) {
        while let Some((start, count, len)) = blank_run(&self.clips) {
            let merged = self.clips[start].resized_blank(len);
            self.splice(start, count, vec![merged]);
        }
    }

    /// Ordered clip list for display.
    pub fn display_list(&self) -> Vec<ClipSpan> {
        let mut start = 0u64;
        self.clips
            .iter()
            .enumerate()
            .map(|(index, c)| {
                let len = c.len_frames();
                let span = ClipSpan {
                    index,
                    id: c.id,
                    name: c.name.clone(),
                    range: FrameRange::with_len(start, len),
                    is_blank: c.is_blank(),
                    clip_in: c.clip_in,
                    clip_out: c.clip_out,
                    sync_parent: c.sync.map(|s| s.parent),
                };
                start += len;
                span
            })
            .collect()
    }

    /// Raw replacement of `remove` entries at `index` by `inserted`. No normalization.
    pub(crate) fn splice(&mut self, index: usize, remove: usize, inserted: Vec<Clip>) -> Vec<Clip> {
        self.clips.splice(index..index + remove, inserted).collect()
    }
}

/// First run of two or more adjacent blanks: `(start, count, total_len)`.
pub(crate) fn blank_run(clips: &[Clip]) -> Option<(usize, usize, u64)> {
    let mut i = 0;
    while i < clips.len() {
        if clips[i].is_blank() {
            let mut j = i + 1;
            let mut len = clips[i].len_frames();
            while j < clips.len() && clips[j].is_blank() {
                len += clips[j].len_frames();
                j += 1;
            }
            if j - i >= 2 {
                return Some((i, j - i, len));
            }
            i = j;
        } else {
            i += 1;
        }
    }
    None
}

#[cfg(test)]
#[path = "../../tests/unit/model/track.rs"]
mod tests;
