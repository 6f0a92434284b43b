use thiserror::Error;

/// Errors surfaced by the loading helpers and the presentation-layer boundary.
///
/// The computation stages (hierarchy, timeline, layout) never return these:
/// they are total over well-typed input.
#[derive(Debug, Error)]
pub enum GanttError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid color '{0}': expected 6 or 8 hex digits")]
    InvalidColor(String),

    #[error("gantt store accessed before it was installed in the context")]
    MissingContext,
}

pub type Result<T> = std::result::Result<T, GanttError>;
