use crate::backend::Backend;
use crate::BackendError;
use async_trait::async_trait;
use orgraph_api::{ApiError, ListQuery, Record};
use orgraph_core::{RecordKind, RecordRef};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOp {
    List,
    Get,
    Create,
    Update,
    Delete,
}

/// One completed backend call, with start and end instants on the tokio
/// clock.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendCall {
    pub op: BackendOp,
    pub kind: RecordKind,
    pub id: Option<i64>,
    pub started: Instant,
    pub finished: Instant,
}

#[derive(Default)]
struct Inner {
    records: HashMap<RecordKind, BTreeMap<i64, Record>>,
    next_id: i64,
    failing: HashSet<(BackendOp, RecordKind)>,
    calls: Vec<BackendCall>,
}

/// Backend kept entirely in memory. Supports injected latency and failures
/// so optimistic flows can be exercised without a server.
pub struct MemoryBackend {
    inner: Mutex<Inner>,
    latency: Duration,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                ..Inner::default()
            }),
            latency: Duration::ZERO,
        }
    }

    /// Every call sleeps this long before it is served.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Insert a record under its own id. Later creates never reuse it.
    pub fn seed(&self, record: Record) {
        let mut inner = self.inner.lock();
        let id = record.id();
        inner.next_id = inner.next_id.max(id + 1);
        inner.records.entry(record.kind()).or_default().insert(id, record);
    }

    pub fn seed_all(&self, records: impl IntoIterator<Item = Record>) {
        for record in records {
            self.seed(record);
        }
    }

    /// Make every `op` on `kind` fail with a 500 until `heal` is called.
    pub fn fail(&self, op: BackendOp, kind: RecordKind) {
        self.inner.lock().failing.insert((op, kind));
    }

    pub fn heal(&self) {
        self.inner.lock().failing.clear();
    }

    pub fn record(&self, target: RecordRef) -> Option<Record> {
        self.inner
            .lock()
            .records
            .get(&target.kind)
            .and_then(|records| records.get(&target.id))
            .cloned()
    }

    pub fn records(&self, kind: RecordKind) -> Vec<Record> {
        self.inner
            .lock()
            .records
            .get(&kind)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.inner.lock().calls.clone()
    }

    async fn serve<T>(
        &self,
        op: BackendOp,
        kind: RecordKind,
        id: Option<i64>,
        handler: impl FnOnce(&mut Inner) -> Result<T, BackendError>,
    ) -> Result<T, BackendError> {
        let started = Instant::now();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut inner = self.inner.lock();
        inner.calls.push(BackendCall {
            op,
            kind,
            id,
            started,
            finished: Instant::now(),
        });
        if inner.failing.contains(&(op, kind)) {
            tracing::debug!("Injected failure for {:?} on {}", op, kind);
            return Err(BackendError::Status {
                status: 500,
                error: ApiError::internal(format!("injected {op:?} failure")),
            });
        }
        handler(&mut inner)
    }
}

fn matches_query(record: &Record, query: &ListQuery) -> bool {
    let (active, organization_id, parent_id) = match record {
        Record::Organization(org) => {
            if query.org_type.is_some_and(|wanted| wanted != org.org_type) {
                return false;
            }
            (org.is_active, None, org.parent_id)
        }
        Record::Division(division) => (division.is_active, division.organization_id, division.parent_id),
        Record::Staff(staff) => (staff.is_active, staff.organization_id, None),
        Record::FunctionalRelation(relation) => (relation.is_active, None, None),
    };
    if !active && !query.include_inactive {
        return false;
    }
    if let (Some(wanted), Some(actual)) = (query.organization_id, organization_id)
        && wanted != actual
    {
        return false;
    }
    if let Some(wanted) = query.parent_id
        && parent_id != Some(wanted)
    {
        return false;
    }
    true
}

fn not_found(target: RecordRef) -> BackendError {
    BackendError::NotFound(target)
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn list(&self, kind: RecordKind, query: &ListQuery) -> Result<Vec<Record>, BackendError> {
        self.serve(BackendOp::List, kind, None, |inner| {
            Ok(inner
                .records
                .get(&kind)
                .map(|records| {
                    records
                        .values()
                        .filter(|record| matches_query(record, query))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default())
        })
        .await
    }

    async fn get(&self, target: RecordRef) -> Result<Record, BackendError> {
        self.serve(BackendOp::Get, target.kind, Some(target.id), |inner| {
            inner
                .records
                .get(&target.kind)
                .and_then(|records| records.get(&target.id))
                .cloned()
                .ok_or_else(|| not_found(target))
        })
        .await
    }

    async fn create(&self, mut record: Record) -> Result<Record, BackendError> {
        let kind = record.kind();
        self.serve(BackendOp::Create, kind, None, move |inner| {
            let id = inner.next_id;
            inner.next_id += 1;
            record.set_id(id);
            inner.records.entry(kind).or_default().insert(id, record.clone());
            Ok(record)
        })
        .await
    }

    async fn update(&self, target: RecordRef, mut record: Record) -> Result<Record, BackendError> {
        self.serve(BackendOp::Update, target.kind, Some(target.id), move |inner| {
            let records = inner.records.entry(target.kind).or_default();
            let Some(slot) = records.get_mut(&target.id) else {
                return Err(not_found(target));
            };
            record.set_id(target.id);
            *slot = record.clone();
            Ok(record)
        })
        .await
    }

    async fn delete(&self, target: RecordRef) -> Result<(), BackendError> {
        self.serve(BackendOp::Delete, target.kind, Some(target.id), |inner| {
            let removed = inner
                .records
                .get_mut(&target.kind)
                .and_then(|records| records.remove(&target.id));
            if removed.is_none() {
                return Err(not_found(target));
            }
            // Relations do not outlive either of their staff members.
            if target.kind == RecordKind::Staff
                && let Some(relations) = inner.records.get_mut(&RecordKind::FunctionalRelation)
            {
                relations.retain(|_, record| {
                    record.as_relation().is_none_or(|relation| {
                        relation.manager_id != target.id && relation.subordinate_id != target.id
                    })
                });
            }
            Ok(())
        })
        .await
    }
}
