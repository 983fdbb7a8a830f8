use thiserror::Error;

use crate::session::{ListenerId, SourceId};

/// Registration failures for playable sound assets. A failed registration
/// aborts the one graph build that requested it; other sources are
/// unaffected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("unsupported audio format: {url}")]
    UnsupportedFormat { url: String },
    #[error("unreadable sound asset: {url}")]
    Unreadable { url: String },
    #[error("empty capture buffer")]
    EmptyBuffer,
    #[error("sound asset already registered: {identifier}")]
    Duplicate { identifier: String },
}

/// Failures surfaced by the graph builders. Builds are atomic-or-abort,
/// but sources attached to the graph root before the failing step are not
/// rolled back; callers own that teardown (see
/// [`AudioSession::detach_source`](crate::session::AudioSession::detach_source)).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphBuildError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("unknown source {0:?}")]
    UnknownSource(SourceId),
    #[error("unknown listener {0:?}")]
    UnknownListener(ListenerId),
}
