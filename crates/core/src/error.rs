/// Errors shared by the pipeline and its collaborators.
///
/// Retrieval and asset failures carry a human-readable description only;
/// the pipeline treats them as opaque and never inspects the detail.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Stack retrieval failed: {0}")]
    Retrieval(String),

    #[error("Fallback asset unavailable: {0}")]
    Asset(String),

    #[error("Malformed stack payload: {0}")]
    Decode(#[from] serde_json::Error),
}
