use crossbeam_channel::{Receiver, Sender, unbounded};
use orgraph_core::{EdgeId, NodeId, NodeKind, NodePatch, RelationKind, StructureType, Vec2};
use serde::{Deserialize, Serialize};

/// Optimistic graph mutations reported back on failure or commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    AddNode,
    UpdateNode,
    DeleteNode,
    AddEdge,
    DeleteEdge,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::AddNode => "add node",
            MutationKind::UpdateNode => "update node",
            MutationKind::DeleteNode => "delete node",
            MutationKind::AddEdge => "add edge",
            MutationKind::DeleteEdge => "delete edge",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // ========================================================================
    // Interaction (emitted by the surface)
    // ========================================================================
    NodeSelected {
        id: Option<NodeId>,
    },
    NodeMoved {
        id: NodeId,
        position: Vec2,
    },
    NodeAddRequested {
        position: Vec2,
        kind: NodeKind,
    },
    NodeEditRequested {
        id: NodeId,
    },
    NodeUpdateRequested {
        id: NodeId,
        patch: NodePatch,
    },
    NodeDeleteRequested {
        id: NodeId,
    },
    EdgeAddRequested {
        from: NodeId,
        to: NodeId,
        relation_kind: RelationKind,
    },
    EdgeDeleteRequested {
        id: EdgeId,
    },
    CommentAddRequested {
        id: NodeId,
        text: String,
    },
    CommentToggleRequested {
        id: NodeId,
        index: usize,
    },

    // ========================================================================
    // Graph controls
    // ========================================================================
    /// Show or hide manager/department/administrative edges
    SetShowAdministrative(bool),
    /// Show or hide functional/project/mentoring edges
    SetShowFunctional(bool),
    /// Relation kind used for newly drawn edges
    SetDefaultRelationKind(RelationKind),
    ZoomToFit,
    ZoomIn,
    ZoomOut,
    ZoomReset,

    // ========================================================================
    // Sync status (emitted by the coordinator)
    // ========================================================================
    ViewLoadRequested {
        structure: StructureType,
        organization_id: Option<i64>,
    },
    ViewLoaded {
        structure: StructureType,
        node_count: usize,
        edge_count: usize,
    },
    /// Busy state changed; `true` while any backend call is in flight
    LoadingChanged {
        busy: bool,
    },
    FetchFailed {
        collection: String,
        error: String,
    },
    MutationFailed {
        kind: MutationKind,
        target: String,
        error: String,
    },
    MutationCommitted {
        kind: MutationKind,
        target: String,
    },
    /// A temporary node id was replaced by the server-assigned one
    NodeIdResolved {
        temporary: NodeId,
        persisted: NodeId,
    },
    PositionsSaved {
        structure: StructureType,
        count: usize,
    },

    // ========================================================================
    // Notifications
    // ========================================================================
    ShowWarning {
        message: String,
    },
    ShowError {
        message: String,
    },
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Event bus has no receivers; event dropped");
        }
    }

    /// Drain everything currently queued without blocking.
    pub fn drain(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }

    /// Dispatch all pending events to a listener.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }
}

/// Implement this to receive events from the EventBus.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}
