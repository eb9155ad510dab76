use orgraph_api::ApiError;
use orgraph_core::{EdgeId, NodeId, RecordRef};
use orgraph_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum BackendError {
    /// Non-success HTTP status, with the server's error body.
    #[error("Backend rejected request ({status}): {error}")]
    Status { status: u16, error: ApiError },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Record not found: {0:?}")]
    NotFound(RecordRef),
}

impl BackendError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BackendError::NotFound(_) | BackendError::Status { status: 404, .. }
        )
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The view was reloaded while the call was in flight; its result was
    /// discarded.
    #[error("Response discarded: view changed while request was in flight")]
    Stale,
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),
    #[error("Edge would connect {0} to itself")]
    SelfLoop(NodeId),
}

impl SyncError {
    /// Invalid user actions are dropped without telling the user.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            SyncError::SelfLoop(_)
                | SyncError::NodeNotFound(_)
                | SyncError::EdgeNotFound(_)
                | SyncError::Stale
                | SyncError::Storage(StorageError::EmptyComment)
        )
    }
}
