use thiserror::Error;

/// Unified result type for the gridboard crate.
pub type Result<T> = std::result::Result<T, BoardError>;

/// Errors surfaced by the board core.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("layout payload is not an array of entries")]
    MalformedLayoutPayload,
    #[error("chart backend error: {0}")]
    ChartBackend(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
