/// Result alias used across the crate.
pub type EditResult<T> = Result<T, EditError>;

/// Errors produced by the edit core.
///
/// Edits validate before they mutate, so any error returned from an edit entry point
/// means the sequence is exactly as it was before the call.
#[derive(thiserror::Error, Debug)]
pub enum EditError {
    /// Frame bounds outside a clip or track extent.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// The edit touches a locked track.
    #[error("track {track} is locked")]
    LockedTrack {
        /// Index of the locked track.
        track: usize,
    },

    /// Trim/transition would need more source material than exists.
    #[error("insufficient handle: {what} needs {needed} frames, {available} available")]
    InsufficientHandle {
        /// Which handle ran short.
        what: String,
        /// Frames the edit requires.
        needed: u64,
        /// Frames the source can provide.
        available: u64,
    },

    /// Referenced media file is absent.
    #[error("source missing: {path}")]
    SourceMissing {
        /// Missing media path.
        path: String,
    },

    /// Sync relation would chain or cycle, or references a bad clip.
    #[error("sync error: {0}")]
    Sync(String),

    /// Clip, track, compositor or job lookup failed.
    #[error("not found: {0}")]
    NotFound(String),

    /// Request or data is structurally invalid.
    #[error("validation error: {0}")]
    Validation(String),

    /// The edit is legal but would not change anything.
    #[error("no-op edit: {0}")]
    NoOp(String),

    /// Undo/redo invoked on an action in the wrong state.
    #[error("state error: {0}")]
    State(String),

    /// Background job failure.
    #[error("job error: {0}")]
    Job(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EditError {
    /// Build an [`EditError::InvalidRange`].
    pub fn invalid_range(msg: impl Into<String>) -> Self {
        Self::InvalidRange(msg.into())
    }

    /// Build an [`EditError::LockedTrack`].
    pub fn locked(track: usize) -> Self {
        Self::LockedTrack { track }
    }

    /// Build an [`EditError::InsufficientHandle`].
    pub fn handle(what: impl Into<String>, needed: u64, available: u64) -> Self {
        Self::InsufficientHandle {
            what: what.into(),
            needed,
            available,
        }
    }

    /// Build an [`EditError::Sync`].
    pub fn sync(msg: impl Into<String>) -> Self {
        Self::Sync(msg.into())
    }

    /// Build an [`EditError::NotFound`].
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build an [`EditError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`EditError::NoOp`].
    pub fn no_op(msg: impl Into<String>) -> Self {
        Self::NoOp(msg.into())
    }

    /// Build an [`EditError::State`].
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Build an [`EditError::Job`].
    pub fn job(msg: impl Into<String>) -> Self {
        Self::Job(msg.into())
    }

    /// Build an [`EditError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRange(_) => "INVALID_RANGE",
            Self::LockedTrack { .. } => "LOCKED_TRACK",
            Self::InsufficientHandle { .. } => "INSUFFICIENT_HANDLE",
            Self::SourceMissing { .. } => "SOURCE_MISSING",
            Self::Sync(_) => "SYNC",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION",
            Self::NoOp(_) => "NO_OP",
            Self::State(_) => "STATE",
            Self::Job(_) => "JOB",
            Self::Serde(_) => "SERDE",
            Self::Io(_) => "IO",
            Self::Other(_) => "OTHER",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
