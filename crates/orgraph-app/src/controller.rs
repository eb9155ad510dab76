use crate::Settings;
use anyhow::Context;
use orgraph_core::{NodeId, NodeKind, StructureType, Vec2};
use orgraph_events::{Event, EventBus};
use orgraph_storage::{CommentStore, PositionStore, PositionWriter, SharedStore, Storage};
use orgraph_surface::{GraphSurface, PointerEvent};
use orgraph_sync::{Backend, LoadReport, NodeDraft, RestBackend, SyncCoordinator, SyncError, default_label};
use std::sync::Arc;
use std::time::Instant;

/// Wires one graph view together: the coordinator owns the data, the surface
/// owns interaction, and the controller turns surface requests on the bus
/// into coordinator calls.
pub struct GraphController<B: Backend> {
    coordinator: Arc<SyncCoordinator<B>>,
    surface: GraphSurface,
    bus: EventBus,
    organization_id: Option<i64>,
    selected: Option<NodeId>,
}

impl GraphController<RestBackend> {
    /// Controller against the configured REST backend and the on-disk store.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let path = settings
            .database_path()
            .context("No data directory for the local store")?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let storage = Storage::open(&path)
            .with_context(|| format!("Failed to open local store at {}", path.display()))?;

        let mut backend =
            RestBackend::with_timeout(settings.api_base_url.clone(), settings.request_timeout())?;
        if let Some(token) = &settings.api_token {
            backend = backend.with_token(token.clone());
        }
        Ok(Self::new(Arc::new(backend), Arc::new(storage), settings))
    }
}

impl<B: Backend> GraphController<B> {
    pub fn new(backend: Arc<B>, store: SharedStore, settings: &Settings) -> Self {
        let bus = EventBus::new();
        let positions = PositionStore::new(store.clone());
        let comments = CommentStore::new(store);
        let coordinator = SyncCoordinator::new(backend, positions.clone(), comments, bus.clone())
            .with_layout(settings.layout);
        let writer = PositionWriter::with_quiet_period(positions, settings.debounce());
        let surface = GraphSurface::new(bus.clone(), writer)
            .with_visibility(settings.visibility)
            .with_default_relation_kind(settings.default_relation_kind)
            .with_read_only(settings.read_only);

        Self {
            coordinator: Arc::new(coordinator),
            surface,
            bus,
            organization_id: settings.organization_id,
            selected: None,
        }
    }

    pub fn coordinator(&self) -> &Arc<SyncCoordinator<B>> {
        &self.coordinator
    }

    pub fn surface(&self) -> &GraphSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut GraphSurface {
        &mut self.surface
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Switch to a structure view. Pending position writes of the old view
    /// are flushed first.
    pub async fn open_view(&mut self, structure: StructureType) -> Result<LoadReport, SyncError> {
        self.surface.flush();
        let report = self
            .coordinator
            .load_view(structure, self.organization_id)
            .await?;
        self.selected = None;
        self.surface.sync(&self.coordinator.snapshot());
        Ok(report)
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, now: Instant) {
        self.surface.handle_pointer(event, now);
    }

    /// Run every queued request against the coordinator and refresh the
    /// surface. Returns all events seen, in order, for the shell to display.
    pub async fn pump(&mut self, now: Instant) -> Vec<Event> {
        self.surface.tick(now);

        let mut seen = Vec::new();
        loop {
            let events = self.bus.drain();
            if events.is_empty() {
                break;
            }
            for event in events {
                self.dispatch(&event).await;
                seen.push(event);
            }
        }
        self.surface.sync(&self.coordinator.snapshot());
        seen
    }

    async fn dispatch(&mut self, event: &Event) {
        let result = match event {
            Event::NodeSelected { id } => {
                self.selected = id.clone();
                Ok(())
            }
            Event::NodeIdResolved {
                temporary,
                persisted,
            } => {
                if self.selected.as_ref() == Some(temporary) {
                    self.selected = Some(persisted.clone());
                }
                Ok(())
            }
            Event::NodeMoved { id, position } => self.coordinator.move_node(id, *position),
            Event::NodeAddRequested { position, kind } => {
                let draft = self.draft(*kind, *position);
                self.coordinator.add_node(draft).await.map(|_| ())
            }
            Event::NodeUpdateRequested { id, patch } => {
                self.coordinator.update_node(id, patch.clone()).await
            }
            Event::NodeDeleteRequested { id } => self.coordinator.delete_node(id).await,
            Event::EdgeAddRequested {
                from,
                to,
                relation_kind,
            } => self
                .coordinator
                .add_edge(from, to, *relation_kind)
                .await
                .map(|_| ()),
            Event::EdgeDeleteRequested { id } => self.coordinator.delete_edge(id).await,
            Event::CommentAddRequested { id, text } => {
                self.coordinator.add_comment(id, text).map(|_| ())
            }
            Event::CommentToggleRequested { id, index } => {
                self.coordinator.toggle_comment(id, *index).map(|_| ())
            }
            Event::ViewLoadRequested {
                structure,
                organization_id,
            } => {
                self.organization_id = *organization_id;
                self.open_view(*structure).await.map(|_| ())
            }
            other => {
                self.surface.apply_control(other);
                Ok(())
            }
        };

        if let Err(e) = result {
            if e.is_silent() {
                tracing::debug!("Ignored request: {}", e);
            } else {
                tracing::warn!("Request failed: {}", e);
            }
        }
    }

    /// New nodes hang under the selected node when there is one.
    fn draft(&self, kind: NodeKind, position: Vec2) -> NodeDraft {
        let structure = self.coordinator.structure();
        let mut draft = if kind == NodeKind::default_for(structure) {
            NodeDraft::new_at(structure, position)
        } else {
            let mut draft = NodeDraft::new(kind, default_label(kind));
            draft.position = position;
            draft
        };
        if let Some(parent) = &self.selected {
            draft = draft.with_parent(parent.clone());
        }
        draft
    }
}
