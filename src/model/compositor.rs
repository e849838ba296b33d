use crate::{
    foundation::core::FrameRange,
    foundation::error::{EditError, EditResult},
    model::clip::ClipId,
    model::track::TrackId,
};

/// Stable compositor identity within a sequence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct CompositorId(pub u64);

/// Blend/transition relationship compositing `a_track` onto `b_track` over `range`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Compositor {
    /// Identity.
    pub id: CompositorId,
    /// Compositor service identifier (e.g. `"dissolve"`, `"blend"`).
    pub kind: String,
    /// Source (upper) track.
    pub a_track: TrackId,
    /// Destination (lower) track.
    pub b_track: TrackId,
    /// Timeline frames affected.
    pub range: FrameRange,
    /// Parameter object.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
    /// Clip whose span the compositor follows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_clip: Option<ClipId>,
}

/// Caller-facing description of a compositor to add.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompositorSpec {
    /// Compositor service identifier.
    pub kind: String,
    /// Source (upper) track.
    pub a_track: TrackId,
    /// Destination (lower) track.
    pub b_track: TrackId,
    /// Timeline frames affected.
    pub range: FrameRange,
    /// Parameter object.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
    /// Clip whose span the compositor follows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_clip: Option<ClipId>,
}

impl CompositorSpec {
    pub(crate) fn into_compositor(self, id: CompositorId) -> Compositor {
        Compositor {
            id,
            kind: self.kind,
            a_track: self.a_track,
            b_track: self.b_track,
            range: self.range,
            params: self.params,
            origin_clip: self.origin_clip,
        }
    }
}

impl Compositor {
    /// Check track references and range against a sequence with `track_count` tracks.
    pub fn validate(&self, track_count: usize) -> EditResult<()> {
        if self.kind.trim().is_empty() {
            return Err(EditError::validation("compositor kind must be non-empty"));
        }
        for t in [self.a_track, self.b_track] {
            if t.0 >= track_count {
                return Err(EditError::not_found(format!(
                    "compositor {} references missing track {t}",
                    self.id.0
                )));
            }
        }
        if self.a_track == self.b_track {
            return Err(EditError::validation(
                "compositor a_track and b_track must differ",
            ));
        }
        if self.range.is_empty() {
            return Err(EditError::invalid_range("compositor range must be non-empty"));
        }
        Ok(())
    }
}
