use crate::{
    foundation::core::{Fps, FrameRange, MAX_FRAME},
    foundation::error::{EditError, EditResult},
    model::clip::{Clip, ClipId},
    model::compositor::{Compositor, CompositorId},
    model::track::{Track, TrackId, TrackKind},
};

/// Frame rate and frame size shared by all tracks of a sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Profile {
    /// Timeline frame rate.
    pub fps: Fps,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            fps: Fps { num: 25, den: 1 },
            width: 1920,
            height: 1080,
        }
    }
}

/// Where a clip currently sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipLocation {
    /// Owning track.
    pub track: TrackId,
    /// Index in the track.
    pub index: usize,
    /// Timeline start frame.
    pub start: u64,
}

/// Parallel tracks plus the compositors blending them.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Sequence {
    /// Display name.
    pub name: String,
    /// Shared profile.
    pub profile: Profile,
    /// Tracks; audio tracks first, then video tracks.
    pub tracks: Vec<Track>,
    /// Compositors between track pairs.
    #[serde(default)]
    pub compositors: Vec<Compositor>,
    /// Next clip id to hand out.
    #[serde(default)]
    pub next_clip_id: u64,
    /// Next compositor id to hand out.
    #[serde(default)]
    pub next_compositor_id: u64,
}

impl Sequence {
    /// Sequence with `audio_tracks` audio tracks followed by `video_tracks` video tracks.
    pub fn new(
        name: impl Into<String>,
        profile: Profile,
        video_tracks: usize,
        audio_tracks: usize,
    ) -> Self {
        let tracks = (0..audio_tracks)
            .map(|_| TrackKind::Audio)
            .chain((0..video_tracks).map(|_| TrackKind::Video))
            .enumerate()
            .map(|(i, kind)| Track::new(TrackId(i), kind))
            .collect();
        Self {
            name: name.into(),
            profile,
            tracks,
            compositors: Vec::new(),
            next_clip_id: 1,
            next_compositor_id: 1,
        }
    }

    /// Track by id.
    pub fn track(&self, id: TrackId) -> EditResult<&Track> {
        self.tracks
            .get(id.0)
            .ok_or_else(|| EditError::not_found(format!("track {id}")))
    }

    pub(crate) fn track_mut(&mut self, id: TrackId) -> EditResult<&mut Track> {
        self.tracks
            .get_mut(id.0)
            .ok_or_else(|| EditError::not_found(format!("track {id}")))
    }

    /// Error unless the track exists and is unlocked.
    pub fn editable_track(&self, id: TrackId) -> EditResult<&Track> {
        let t = self.track(id)?;
        t.ensure_editable()?;
        Ok(t)
    }

    /// Tracks edits may touch.
    pub fn unlocked_tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(|t| !t.is_locked())
    }

    /// Length of the longest track.
    pub fn len_frames(&self) -> u64 {
        self.tracks.iter().map(Track::len_frames).max().unwrap_or(0)
    }

    pub(crate) fn alloc_clip_id(&mut self) -> ClipId {
        let id = ClipId(self.next_clip_id.max(1));
        self.next_clip_id = id.0 + 1;
        id
    }

    pub(crate) fn alloc_compositor_id(&mut self) -> CompositorId {
        let id = CompositorId(self.next_compositor_id.max(1));
        self.next_compositor_id = id.0 + 1;
        id
    }

    /// Make sure freshly allocated ids never collide with ids already present.
    pub(crate) fn reseed_ids(&mut self) {
        let max_clip = self
            .tracks
            .iter()
            .flat_map(|t| t.clips.iter().map(|c| c.id.0))
            .max()
            .unwrap_or(0);
        self.next_clip_id = self.next_clip_id.max(max_clip.saturating_add(1)).max(1);
        let max_comp = self.compositors.iter().map(|c| c.id.0).max().unwrap_or(0);
        self.next_compositor_id = self
            .next_compositor_id
            .max(max_comp.saturating_add(1))
            .max(1);
    }

    /// Locate a clip by identity.
    pub fn find_clip(&self, id: ClipId) -> Option<ClipLocation> {
        self.tracks.iter().find_map(|t| {
            let mut start = 0u64;
            for (index, c) in t.clips.iter().enumerate() {
                if c.id == id {
                    return Some(ClipLocation {
                        track: t.id,
                        index,
                        start,
                    });
                }
                start += c.len_frames();
            }
            None
        })
    }

    /// Clip by identity.
    pub fn clip(&self, id: ClipId) -> EditResult<&Clip> {
        let loc = self
            .find_clip(id)
            .ok_or_else(|| EditError::not_found(format!("clip {id}")))?;
        self.tracks[loc.track.0].clip(loc.index)
    }

    /// Clips whose sync parent is `parent`.
    pub fn children_of(&self, parent: ClipId) -> Vec<ClipId> {
        self.tracks
            .iter()
            .flat_map(|t| t.clips.iter())
            .filter(|c| c.sync.is_some_and(|s| s.parent == parent))
            .map(|c| c.id)
            .collect()
    }

    /// Frames the child is away from its synced position; `None` when not synced.
    pub fn sync_diff(&self, child: ClipId) -> EditResult<Option<i64>> {
        let c = self.clip(child)?;
        let Some(sync) = c.sync else {
            return Ok(None);
        };
        let child_loc = self
            .find_clip(child)
            .ok_or_else(|| EditError::not_found(format!("clip {child}")))?;
        let parent_loc = self.find_clip(sync.parent).ok_or_else(|| {
            EditError::sync(format!("parent {} of clip {child} is gone", sync.parent))
        })?;
        let desired = parent_loc.start as i64 + sync.offset;
        Ok(Some(child_loc.start as i64 - desired))
    }

    /// Timeline span of a clip.
    pub fn clip_span(&self, id: ClipId) -> EditResult<FrameRange> {
        let loc = self
            .find_clip(id)
            .ok_or_else(|| EditError::not_found(format!("clip {id}")))?;
        let len = self.tracks[loc.track.0].clip(loc.index)?.len_frames();
        Ok(FrameRange::with_len(loc.start, len))
    }

    /// Compositor by identity.
    pub fn compositor(&self, id: CompositorId) -> EditResult<&Compositor> {
        self.compositors
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| EditError::not_found(format!("compositor {}", id.0)))
    }

    /// Check every structural invariant of the sequence.
    pub fn validate(&self) -> EditResult<()> {
        if self.profile.fps.num == 0 || self.profile.fps.den == 0 {
            return Err(EditError::validation("fps must have num>0 and den>0"));
        }
        let mut seen = std::collections::BTreeSet::new();
        for (i, t) in self.tracks.iter().enumerate() {
            if t.id.0 != i {
                return Err(EditError::validation(format!(
                    "track at position {i} carries id {}",
                    t.id
                )));
            }
            for (j, c) in t.clips.iter().enumerate() {
                if !seen.insert(c.id) {
                    return Err(EditError::validation(format!("duplicate clip id {}", c.id)));
                }
                if c.clip_in > c.clip_out {
                    return Err(EditError::invalid_range(format!(
                        "clip {} on track {i} has in {} after out {}",
                        c.id, c.clip_in, c.clip_out
                    )));
                }
                if c.clip_out >= MAX_FRAME {
                    return Err(EditError::invalid_range(format!(
                        "clip {} on track {i} ends at source frame {}",
                        c.id, c.clip_out
                    )));
                }
                if c.is_blank() {
                    if c.clip_in != 0 {
                        return Err(EditError::validation(format!(
                            "blank {} on track {i} must start at source frame 0",
                            c.id
                        )));
                    }
                    if j > 0 && t.clips[j - 1].is_blank() {
                        return Err(EditError::validation(format!(
                            "adjacent blanks at index {j} on track {i}"
                        )));
                    }
                    if c.sync.is_some() {
                        return Err(EditError::sync(format!("blank {} carries sync data", c.id)));
                    }
                } else if let Some(len) = c.media().and_then(|m| m.bounded_length())
                    && c.clip_out >= len
                {
                    return Err(EditError::invalid_range(format!(
                        "clip {} on track {i} uses frame {} of a {len} frame source",
                        c.id, c.clip_out
                    )));
                }
            }
            if t.len_frames() > MAX_FRAME {
                return Err(EditError::invalid_range(format!(
                    "track {i} runs past frame {MAX_FRAME}"
                )));
            }
        }
        for t in &self.tracks {
            for c in &t.clips {
                let Some(sync) = c.sync else { continue };
                let parent = self.clip(sync.parent).map_err(|_| {
                    EditError::sync(format!("clip {} syncs to missing parent {}", c.id, sync.parent))
                })?;
                if parent.sync.is_some() {
                    return Err(EditError::sync(format!(
                        "clip {} syncs to {} which is itself synced",
                        c.id, sync.parent
                    )));
                }
            }
        }
        for comp in &self.compositors {
            comp.validate(self.tracks.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/sequence.rs"]
mod tests;
