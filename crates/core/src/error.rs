use thiserror::Error;

/// A publishing-frequency label that is neither in the period table nor in
/// the known non-period set.
#[derive(Debug, Error)]
#[error("{0:?} is not a known publishing frequency")]
pub struct UnknownFrequency(pub String);

#[derive(Debug, Error)]
pub enum CoreError {
    /// Fatal: the whole pass aborts so the bad metadata gets fixed instead
    /// of being silently skipped.
    #[error("{title}: {source}")]
    Schedule {
        title: String,
        #[source]
        source: UnknownFrequency,
    },

    #[error("unrecognized gap descriptor: {0:?}")]
    UnknownGapDescriptor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization error: {0}")]
    Snapshot(#[from] serde_json::Error),
}
