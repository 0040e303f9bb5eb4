//! Tool errors

use thiserror::Error;

/// Calls the scale tool rejects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("no resize is in progress")]
    NotDragging,

    #[error("a resize is already in progress")]
    AlreadyDragging,

    #[error("nothing is selected")]
    NoSelection,

    #[error("the document is no longer available")]
    DocumentExpired,

    /// The document changed underneath the drag, which was cancelled
    #[error("the resize was cancelled because the document changed")]
    DragInvalidated,
}

pub type ToolResult<T> = Result<T, ToolError>;
