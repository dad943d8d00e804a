use thiserror::Error;

/// Rejected target geometry. Returned by `GestureTracingEngine::configure`
/// so a controller learns about a broken level before the round starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    #[error("target path has no segments")]
    EmptyPath,

    #[error("segment {segment} has no points")]
    EmptySegment { segment: usize },

    #[error("point {index} of segment {segment} has invalid radius {radius}")]
    InvalidRadius { segment: usize, index: usize, radius: f32 },

    #[error("point {index} of segment {segment} has a non-finite position")]
    InvalidPosition { segment: usize, index: usize },
}

/// Failure reported by a remote attempt store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("network error: {0}")]
    Network(String),

    #[error("write rejected at {path}: {reason}")]
    Rejected { path: String, reason: String },

    #[error("could not decode value at {path}: {reason}")]
    Decode { path: String, reason: String },
}

/// Invalid configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
