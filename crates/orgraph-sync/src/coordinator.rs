use crate::draft::{
    NodeDraft, apply_patch, clear_parent_link, draft_record, link_owner, parent_edge_identity,
    parent_relation,
};
use crate::{Backend, BackendError, GraphState, SyncError};
use chrono::Utc;
use orgraph_api::{FunctionalRelationDto, ListQuery, OrgType, Record};
use orgraph_core::{
    Comment, Edge, EdgeId, EdgeOrigin, Node, NodeId, NodePatch, PositionMap, RecordKind,
    RecordRef, RelationKind, StructureType, Vec2,
};
use orgraph_events::{Event, EventBus, MutationKind};
use orgraph_graph::{GraphSnapshot, LayoutConfig, LayoutEngine, map_structure};
use orgraph_storage::{CommentStore, PositionStore, merge_comments};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

/// A collection that could not be fetched during `load_view`.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub kind: RecordKind,
    pub error: BackendError,
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub structure: StructureType,
    pub node_count: usize,
    pub edge_count: usize,
    pub failures: Vec<FetchFailure>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Publishes `LoadingChanged` when the first call starts and the last one
/// ends.
struct BusyGuard<'a> {
    count: &'a AtomicUsize,
    bus: &'a EventBus,
}

impl<'a> BusyGuard<'a> {
    fn enter(count: &'a AtomicUsize, bus: &'a EventBus) -> Self {
        if count.fetch_add(1, Ordering::SeqCst) == 0 {
            bus.publish(Event::LoadingChanged { busy: true });
        }
        Self { count, bus }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.bus.publish(Event::LoadingChanged { busy: false });
        }
    }
}

type IdGuard = OwnedMutexGuard<()>;

fn node_key(id: &NodeId) -> String {
    format!("node:{id}")
}

fn edge_key(id: &EdgeId) -> String {
    format!("edge:{id}")
}

fn fetch_plan(structure: StructureType, organization_id: Option<i64>) -> Vec<(RecordKind, ListQuery)> {
    let scoped = organization_id
        .map(ListQuery::for_organization)
        .unwrap_or_default();
    match structure {
        StructureType::Business => vec![
            (RecordKind::Division, scoped.clone()),
            (RecordKind::Staff, scoped.clone()),
            (RecordKind::FunctionalRelation, scoped),
        ],
        StructureType::Legal => vec![(
            RecordKind::Organization,
            ListQuery::default().with_org_type(OrgType::LegalEntity),
        )],
        StructureType::Territorial => vec![(
            RecordKind::Organization,
            ListQuery::default().with_org_type(OrgType::Location),
        )],
    }
}

/// Owns the graph of the current view and keeps it in step with the backend.
///
/// Every mutation is applied locally first, then sent; a failed call puts the
/// local state back. Calls touching the same node or edge run one at a time,
/// calls on different ids run concurrently. Reloading the view bumps a
/// generation counter, and responses that arrive for an older generation are
/// dropped.
pub struct SyncCoordinator<B: Backend> {
    backend: Arc<B>,
    state: RwLock<GraphState>,
    layout: LayoutConfig,
    positions: PositionStore,
    comments: CommentStore,
    bus: EventBus,
    generation: AtomicU64,
    busy: AtomicUsize,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    /// Temporary id -> persisted id, for nodes and edges alike.
    aliases: RwLock<HashMap<String, String>>,
}

impl<B: Backend> SyncCoordinator<B> {
    pub fn new(backend: Arc<B>, positions: PositionStore, comments: CommentStore, bus: EventBus) -> Self {
        Self {
            backend,
            state: RwLock::new(GraphState::default()),
            layout: LayoutConfig::default(),
            positions,
            comments,
            bus,
            generation: AtomicU64::new(0),
            busy: AtomicUsize::new(0),
            locks: Mutex::new(HashMap::new()),
            aliases: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn structure(&self) -> StructureType {
        self.state.read().structure()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst) > 0
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        self.state.read().view.clone()
    }

    pub fn node(&self, id: &NodeId) -> Option<Node> {
        let id = self.resolve_node(id);
        self.state.read().view.node(&id).cloned()
    }

    pub fn administrative_edges(&self) -> Vec<Edge> {
        self.state.read().view.administrative_edges()
    }

    pub fn functional_edges(&self) -> Vec<Edge> {
        self.state.read().view.functional_edges()
    }

    pub fn positions(&self) -> PositionMap {
        self.state.read().view.positions()
    }

    /// Persisted id of a node created under a temporary id, or the id itself.
    pub fn resolve_node(&self, id: &NodeId) -> NodeId {
        self.aliases
            .read()
            .get(id.as_str())
            .map(|persisted| NodeId(persisted.clone()))
            .unwrap_or_else(|| id.clone())
    }

    pub fn resolve_edge(&self, id: &EdgeId) -> EdgeId {
        self.aliases
            .read()
            .get(id.as_str())
            .map(|persisted| EdgeId(persisted.clone()))
            .unwrap_or_else(|| id.clone())
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn ensure_current(&self, generation: u64) -> Result<(), SyncError> {
        if self.current_generation() == generation {
            Ok(())
        } else {
            tracing::debug!("Discarding response from view generation {}", generation);
            Err(SyncError::Stale)
        }
    }

    fn busy_guard(&self) -> BusyGuard<'_> {
        BusyGuard::enter(&self.busy, &self.bus)
    }

    fn id_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.locks.lock().entry(key.to_string()).or_default().clone()
    }

    async fn lock_key(&self, key: String) -> IdGuard {
        self.id_lock(&key).lock_owned().await
    }

    /// Lock every key `wanted` names, in one global order. Aliases can be
    /// recorded while a lock is awaited, so the set is recomputed under the
    /// locks and acquisition starts over until it covers everything.
    async fn lock_all<T>(&self, wanted: impl Fn() -> (T, BTreeSet<String>)) -> (T, Vec<IdGuard>) {
        let (_, mut keys) = wanted();
        loop {
            let mut guards = Vec::with_capacity(keys.len());
            for key in &keys {
                guards.push(self.lock_key(key.clone()).await);
            }
            let (value, needed) = wanted();
            if needed.is_subset(&keys) {
                return (value, guards);
            }
            drop(guards);
            keys.extend(needed);
        }
    }

    fn node_keys(&self, id: &NodeId, keys: &mut BTreeSet<String>) -> NodeId {
        let resolved = self.resolve_node(id);
        keys.insert(node_key(id));
        keys.insert(node_key(&resolved));
        resolved
    }

    /// Wait for earlier calls on `id`, then resolve it. A node that was still
    /// pending when the call was queued is locked under its persisted id too.
    async fn acquire_node(&self, id: &NodeId) -> (NodeId, Vec<IdGuard>) {
        self.lock_all(|| {
            let mut keys = BTreeSet::new();
            let resolved = self.node_keys(id, &mut keys);
            (resolved, keys)
        })
        .await
    }

    fn failed(&self, kind: MutationKind, target: impl ToString, error: SyncError) -> SyncError {
        let target = target.to_string();
        tracing::warn!("Failed to {} {}: {}", kind.as_str(), target, error);
        self.bus.publish(Event::MutationFailed {
            kind,
            target,
            error: error.to_string(),
        });
        error
    }

    fn committed(&self, kind: MutationKind, target: impl ToString) {
        let target = target.to_string();
        tracing::debug!("Committed {} {}", kind.as_str(), target);
        self.bus.publish(Event::MutationCommitted { kind, target });
    }

    /// Backing record of a node, from cache or fetched.
    async fn record_for(&self, target: RecordRef) -> Result<Record, BackendError> {
        let cached = self.state.read().record(&target).cloned();
        match cached {
            Some(record) => Ok(record),
            None => self.backend.get(target).await,
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Fetch, map and lay out one structure view, replacing the current one.
    ///
    /// Collections that fail to load are reported and the rest of the graph
    /// is still built from whatever arrived.
    pub async fn load_view(
        &self,
        structure: StructureType,
        organization_id: Option<i64>,
    ) -> Result<LoadReport, SyncError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _busy = self.busy_guard();
        tracing::info!("Loading {} view (organization {:?})", structure, organization_id);

        let mut records = Vec::new();
        let mut failures = Vec::new();
        for (kind, query) in fetch_plan(structure, organization_id) {
            match self.backend.list(kind, &query).await {
                Ok(batch) => records.extend(batch),
                Err(error) => {
                    tracing::error!("Failed to fetch {}: {}", kind.as_str(), error);
                    self.bus.publish(Event::FetchFailed {
                        collection: kind.as_str().to_string(),
                        error: error.to_string(),
                    });
                    self.bus.publish(Event::ShowError {
                        message: format!("Could not load {}: {}", kind.as_str(), error),
                    });
                    failures.push(FetchFailure { kind, error });
                }
            }
        }
        self.ensure_current(generation)?;

        let relations: Vec<FunctionalRelationDto> = records
            .iter()
            .filter_map(|record| record.as_relation().cloned())
            .collect();
        let mapped = map_structure(structure, &records, &relations);
        let engine = LayoutEngine::new(self.layout, self.positions.clone());
        let mut nodes = engine.layout(mapped.nodes, &mapped.edges, structure);

        let mut state = self.state.write();
        let mut previous: HashMap<NodeId, Vec<Comment>> = if state.structure() == structure {
            state
                .view
                .nodes
                .iter_mut()
                .map(|node| (node.id.clone(), std::mem::take(&mut node.comments)))
                .collect()
        } else {
            HashMap::new()
        };
        for node in &mut nodes {
            let in_memory = previous.remove(&node.id).unwrap_or_default();
            node.comments = merge_comments(in_memory, self.comments.load_comments(&node.id, structure));
        }

        let report = LoadReport {
            structure,
            node_count: nodes.len(),
            edge_count: mapped.edges.len(),
            failures,
        };
        *state = GraphState::new(
            GraphSnapshot::new(structure, nodes, mapped.edges),
            organization_id,
            records,
        );
        drop(state);
        self.aliases.write().clear();

        tracing::info!(
            "Loaded {} view: {} nodes, {} edges",
            structure,
            report.node_count,
            report.edge_count
        );
        self.bus.publish(Event::ViewLoaded {
            structure,
            node_count: report.node_count,
            edge_count: report.edge_count,
        });
        Ok(report)
    }

    // ========================================================================
    // Node mutations
    // ========================================================================

    /// Insert a node under a temporary id, create its record, then re-key the
    /// node to the persisted id. Returns the persisted id.
    pub async fn add_node(&self, draft: NodeDraft) -> Result<NodeId, SyncError> {
        let temporary = NodeId(format!("tmp_{}", Uuid::new_v4().simple()));
        let (parent, _guards) = self
            .lock_all(|| {
                let mut keys = BTreeSet::from([node_key(&temporary)]);
                let parent = draft
                    .parent
                    .as_ref()
                    .map(|parent| self.node_keys(parent, &mut keys));
                (parent, keys)
            })
            .await;
        let _busy = self.busy_guard();
        let generation = self.current_generation();

        let (structure, record, pending_edge) = {
            let mut state = self.state.write();
            let structure = state.structure();
            let parent_node = parent
                .as_ref()
                .and_then(|id| state.view.node(id))
                .and_then(|node| node.origin.map(|origin| (node.id.clone(), origin)));
            let link = parent_node.and_then(|(id, origin)| {
                parent_relation(draft.kind, origin).map(|kind| (id, origin, kind))
            });
            if draft.parent.is_some() && link.is_none() {
                tracing::debug!("Ignoring parent {:?} for new {:?} node", draft.parent, draft.kind);
            }

            let record = draft_record(&draft, link.as_ref().map(|(_, origin, _)| *origin), state.organization_id);

            let mut node = Node::new(temporary.clone(), draft.label.trim(), draft.kind)
                .with_position(draft.position);
            node.secondary_label = draft.secondary_label.clone();
            if let Some(text) = draft.comment.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                node.comments.push(Comment::new(text, Utc::now()));
            }
            state.view.nodes.push(node);

            let pending_edge = link.map(|(parent_id, _, kind)| {
                let edge = Edge::new(
                    format!("tmp_{}", Uuid::new_v4().simple()),
                    parent_id,
                    temporary.clone(),
                    kind,
                );
                let id = edge.id.clone();
                state.view.edges.push(edge);
                id
            });
            (structure, record, pending_edge)
        };
        tracing::debug!("Creating {} for {}", record.kind(), temporary);

        let created = match self.backend.create(record).await {
            Ok(created) => created,
            Err(error) => {
                self.ensure_current(generation)?;
                self.state.write().view.remove_node(&temporary);
                return Err(self.failed(MutationKind::AddNode, &temporary, error.into()));
            }
        };
        self.ensure_current(generation)?;

        let origin = created.record_ref();
        let persisted = origin.node_id();
        let comments = {
            let mut state = self.state.write();
            state.view.rename_node(&temporary, &persisted);
            if let Some(edge_id) = &pending_edge
                && let Some((id, edge_origin, _)) = parent_edge_identity(&created, structure)
                && let Some(edge) = state.view.edges.iter_mut().find(|edge| &edge.id == edge_id)
            {
                edge.id = id;
                edge.origin = edge_origin;
            }
            state.cache_record(created);
            match state.view.node_mut(&persisted) {
                Some(node) => {
                    node.origin = Some(origin);
                    node.comments.clone()
                }
                None => Vec::new(),
            }
        };
        self.aliases
            .write()
            .insert(temporary.to_string(), persisted.to_string());

        if !comments.is_empty()
            && let Err(e) = self.comments.save_comments(&persisted, structure, &comments)
        {
            tracing::warn!("Failed to save comments for {}: {}", persisted, e);
        }

        self.bus.publish(Event::NodeIdResolved {
            temporary: temporary.clone(),
            persisted: persisted.clone(),
        });
        self.committed(MutationKind::AddNode, &persisted);
        Ok(persisted)
    }

    /// Apply an edit locally and send the updated record.
    pub async fn update_node(&self, id: &NodeId, patch: NodePatch) -> Result<(), SyncError> {
        let (id, _guards) = self.acquire_node(id).await;
        if patch.is_empty() {
            return Ok(());
        }
        let _busy = self.busy_guard();
        let generation = self.current_generation();

        let (previous, origin) = {
            let mut state = self.state.write();
            let Some(node) = state.view.node_mut(&id) else {
                return Err(SyncError::NodeNotFound(id));
            };
            let previous = node.clone();
            patch.apply(node);
            (previous, node.origin)
        };
        let Some(origin) = origin else {
            return Ok(());
        };

        let result = async {
            let mut record = self.record_for(origin).await?;
            apply_patch(&mut record, &patch);
            self.backend.update(origin, record).await
        }
        .await;
        self.ensure_current(generation)?;

        match result {
            Ok(updated) => {
                self.state.write().cache_record(updated);
                self.committed(MutationKind::UpdateNode, &id);
                Ok(())
            }
            Err(error) => {
                if let Some(node) = self.state.write().view.node_mut(&id) {
                    node.label = previous.label;
                    node.secondary_label = previous.secondary_label;
                    node.tertiary_label = previous.tertiary_label;
                    node.is_active = previous.is_active;
                }
                Err(self.failed(MutationKind::UpdateNode, &id, error.into()))
            }
        }
    }

    /// Remove a node and its edges locally, then delete the record.
    pub async fn delete_node(&self, id: &NodeId) -> Result<(), SyncError> {
        let (id, _guards) = self.acquire_node(id).await;
        let _busy = self.busy_guard();
        let generation = self.current_generation();

        let Some(removed) = self.state.write().view.remove_node(&id) else {
            return Err(SyncError::NodeNotFound(id));
        };
        let Some(origin) = removed.node.origin else {
            self.committed(MutationKind::DeleteNode, &id);
            return Ok(());
        };

        let result = match self.backend.delete(origin).await {
            Err(error) if error.is_not_found() => {
                tracing::debug!("{} was already gone on the backend", origin);
                Ok(())
            }
            other => other,
        };
        self.ensure_current(generation)?;

        match result {
            Ok(()) => {
                let mut state = self.state.write();
                if origin.kind == RecordKind::Staff {
                    state.forget_staff(origin.id);
                    state.refresh_connections();
                } else {
                    state.forget_record(&origin);
                }
                drop(state);
                self.committed(MutationKind::DeleteNode, &id);
                Ok(())
            }
            Err(error) => {
                self.state.write().view.restore_node(removed);
                Err(self.failed(MutationKind::DeleteNode, &id, error.into()))
            }
        }
    }

    /// Local position change. Persisting layouts is the position store's job.
    pub fn move_node(&self, id: &NodeId, position: Vec2) -> Result<(), SyncError> {
        let id = self.resolve_node(id);
        let mut state = self.state.write();
        let node = state
            .view
            .node_mut(&id)
            .ok_or_else(|| SyncError::NodeNotFound(id.clone()))?;
        node.position = position;
        Ok(())
    }

    // ========================================================================
    // Edge mutations
    // ========================================================================

    /// Connect two nodes. Only staff-to-staff links can be persisted; they
    /// become functional relations. Returns the persisted edge id.
    pub async fn add_edge(
        &self,
        from: &NodeId,
        to: &NodeId,
        relation_kind: RelationKind,
    ) -> Result<EdgeId, SyncError> {
        if from == to {
            return Err(SyncError::SelfLoop(from.clone()));
        }
        let temporary = EdgeId(format!("tmp_{}", Uuid::new_v4().simple()));
        let ((from, to), _guards) = self
            .lock_all(|| {
                let mut keys = BTreeSet::from([edge_key(&temporary)]);
                let from = self.node_keys(from, &mut keys);
                let to = self.node_keys(to, &mut keys);
                ((from, to), keys)
            })
            .await;
        if from == to {
            return Err(SyncError::SelfLoop(from));
        }

        let _busy = self.busy_guard();
        let generation = self.current_generation();

        let endpoints = {
            let mut state = self.state.write();
            let origin_of = |id: &NodeId| state.view.node(id).map(|node| node.origin);
            let (Some(source), Some(target)) = (origin_of(&from), origin_of(&to)) else {
                let missing = if state.view.contains_node(&from) { to } else { from };
                return Err(SyncError::NodeNotFound(missing));
            };
            state
                .view
                .edges
                .push(Edge::new(temporary.clone(), from.clone(), to.clone(), relation_kind));
            (source, target)
        };

        let (manager, subordinate) = match endpoints {
            (
                Some(RecordRef {
                    kind: RecordKind::Staff,
                    id: manager,
                }),
                Some(RecordRef {
                    kind: RecordKind::Staff,
                    id: subordinate,
                }),
            ) => (manager, subordinate),
            _ => {
                self.state.write().view.remove_edge(&temporary);
                let error = SyncError::Unsupported(format!(
                    "only staff-to-staff links can be created ({from} -> {to})"
                ));
                return Err(self.failed(MutationKind::AddEdge, &temporary, error));
            }
        };

        let relation = Record::FunctionalRelation(FunctionalRelationDto {
            id: 0,
            manager_id: manager,
            subordinate_id: subordinate,
            relation_type: relation_kind.as_str().to_ascii_uppercase(),
            description: None,
            is_active: true,
        });
        let result = self.backend.create(relation).await;
        self.ensure_current(generation)?;

        let created = match result {
            Ok(created) => created,
            Err(error) => {
                self.state.write().view.remove_edge(&temporary);
                return Err(self.failed(MutationKind::AddEdge, &temporary, error.into()));
            }
        };

        let persisted = EdgeId(created.id().to_string());
        {
            let mut state = self.state.write();
            if let Some(edge) = state.view.edges.iter_mut().find(|edge| edge.id == temporary) {
                edge.id = persisted.clone();
                edge.origin = EdgeOrigin::Relation { id: created.id() };
            }
            state.cache_record(created);
            state.refresh_connections();
        }
        self.aliases
            .write()
            .insert(temporary.to_string(), persisted.to_string());
        self.committed(MutationKind::AddEdge, &persisted);
        Ok(persisted)
    }

    /// Remove an edge locally, then undo the backend fact it mirrors.
    pub async fn delete_edge(&self, id: &EdgeId) -> Result<(), SyncError> {
        // Both endpoints are locked too, so a node delete cannot slip in
        // between removing the edge and putting it back.
        let ((id, origin), _guards) = self
            .lock_all(|| {
                let resolved = self.resolve_edge(id);
                let mut keys = BTreeSet::from([edge_key(id), edge_key(&resolved)]);
                let edge = self
                    .state
                    .read()
                    .view
                    .edge(&resolved)
                    .map(|edge| (edge.origin, edge.from.clone(), edge.to.clone()));
                let origin = edge.map(|(origin, from, to)| {
                    self.node_keys(&from, &mut keys);
                    self.node_keys(&to, &mut keys);
                    origin
                });
                ((resolved, origin), keys)
            })
            .await;
        let Some(origin) = origin else {
            return Err(SyncError::EdgeNotFound(id));
        };
        let _busy = self.busy_guard();
        let generation = self.current_generation();

        let Some(removed) = self.state.write().view.remove_edge(&id) else {
            return Err(SyncError::EdgeNotFound(id));
        };

        let result = match origin {
            EdgeOrigin::Pending => {
                self.committed(MutationKind::DeleteEdge, &id);
                return Ok(());
            }
            EdgeOrigin::Relation { id: relation } => {
                let target = RecordRef::new(RecordKind::FunctionalRelation, relation);
                match self.backend.delete(target).await {
                    Err(error) if error.is_not_found() => Ok(None),
                    other => other.map(|()| None),
                }
            }
            _ => match link_owner(origin) {
                Some(owner) => self.clear_link(owner, origin).await.map(Some),
                None => Ok(None),
            },
        };
        self.ensure_current(generation)?;

        match result {
            Ok(updated) => {
                let mut state = self.state.write();
                match (origin, updated) {
                    (EdgeOrigin::Relation { id: relation }, _) => {
                        state.forget_record(&RecordRef::new(RecordKind::FunctionalRelation, relation));
                        state.refresh_connections();
                    }
                    (_, Some(record)) => state.cache_record(record),
                    _ => {}
                }
                drop(state);
                self.committed(MutationKind::DeleteEdge, &id);
                Ok(())
            }
            Err(error) => {
                self.state.write().view.restore_edge(removed);
                Err(self.failed(MutationKind::DeleteEdge, &id, error.into()))
            }
        }
    }

    async fn clear_link(&self, owner: RecordRef, origin: EdgeOrigin) -> Result<Record, BackendError> {
        let mut record = self.record_for(owner).await?;
        if !clear_parent_link(&mut record, origin) {
            tracing::debug!("{} has no link to clear for {:?}", owner, origin);
        }
        self.backend.update(owner, record).await
    }

    // ========================================================================
    // Comments
    // ========================================================================

    fn sync_comments_to_store(&self, id: &NodeId) -> Result<StructureType, SyncError> {
        let state = self.state.read();
        let structure = state.structure();
        let node = state
            .view
            .node(id)
            .ok_or_else(|| SyncError::NodeNotFound(id.clone()))?;
        if !node.comments.is_empty() && self.comments.load_comments(id, structure).is_empty() {
            self.comments.save_comments(id, structure, &node.comments)?;
        }
        Ok(structure)
    }

    fn reload_comments(&self, id: &NodeId, structure: StructureType) {
        let comments = self.comments.load_comments(id, structure);
        if let Some(node) = self.state.write().view.node_mut(id) {
            node.comments = comments;
        }
    }

    pub fn add_comment(&self, id: &NodeId, text: &str) -> Result<Comment, SyncError> {
        let id = self.resolve_node(id);
        let structure = self.sync_comments_to_store(&id)?;
        let comment = self.comments.add_comment(&id, structure, text)?;
        self.reload_comments(&id, structure);
        Ok(comment)
    }

    pub fn toggle_comment(&self, id: &NodeId, index: usize) -> Result<Comment, SyncError> {
        let id = self.resolve_node(id);
        let structure = self.sync_comments_to_store(&id)?;
        let comment = self.comments.toggle_comment(&id, structure, index)?;
        self.reload_comments(&id, structure);
        Ok(comment)
    }
}
