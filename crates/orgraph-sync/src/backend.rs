use crate::BackendError;
use async_trait::async_trait;
use orgraph_api::{ListQuery, Record};
use orgraph_core::{RecordKind, RecordRef};

/// REST resource path of a record collection.
pub fn collection_path(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Organization => "/organizations",
        RecordKind::Division => "/divisions",
        RecordKind::Staff => "/staff",
        RecordKind::FunctionalRelation => "/functional-relations",
    }
}

/// CRUD access to the organization backend. Every call is a suspension
/// point; implementations must be usable from several tasks at once.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list(&self, kind: RecordKind, query: &ListQuery) -> Result<Vec<Record>, BackendError>;

    async fn get(&self, target: RecordRef) -> Result<Record, BackendError>;

    /// Create a record and return it as persisted, id included.
    async fn create(&self, record: Record) -> Result<Record, BackendError>;

    async fn update(&self, target: RecordRef, record: Record) -> Result<Record, BackendError>;

    async fn delete(&self, target: RecordRef) -> Result<(), BackendError>;
}
