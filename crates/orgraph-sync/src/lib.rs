//! Keeps the in-memory organization graph and the REST backend in step.

mod backend;
mod coordinator;
mod draft;
mod error;
mod memory;
mod rest;
mod state;

pub use backend::{Backend, collection_path};
pub use coordinator::{FetchFailure, LoadReport, SyncCoordinator};
pub use draft::{DEFAULT_DIVISION_CODE, NodeDraft, default_label};
pub use error::{BackendError, SyncError};
pub use memory::{BackendCall, BackendOp, MemoryBackend};
pub use rest::{DEFAULT_TIMEOUT, RestBackend};
pub use state::GraphState;
