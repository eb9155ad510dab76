use crate::input::{EdgeVisibility, PointerEvent};
use crate::scene::{Scene, edge_sprite, node_sprite};
use orgraph_core::{EdgeId, NodeId, NodeKind, NodePatch, RelationKind, Vec2};
use orgraph_events::{Event, EventBus};
use orgraph_graph::{
    GraphSnapshot, HitResult, HitTester, Viewport, get_node_border_color, get_node_style,
    inactive_style,
};
use orgraph_storage::PositionWriter;
use std::collections::HashMap;
use std::time::Instant;

/// Screen pixels the pointer must travel before a press becomes a drag.
pub const DRAG_THRESHOLD: f32 = 4.0;
/// Zoom factor per wheel notch or zoom button press.
pub const ZOOM_STEP: f32 = 1.2;
pub const FIT_PADDING: f32 = 40.0;
pub const DEFAULT_VIEWPORT_SIZE: Vec2 = Vec2 { x: 1280.0, y: 800.0 };

#[derive(Debug, Clone, Copy)]
struct DragState {
    start_pan: Vec2,
    start_pos: Vec2,
}

#[derive(Debug, Clone)]
enum Gesture {
    Pan {
        drag: DragState,
        moved: bool,
    },
    MoveNode {
        id: NodeId,
        start_pos: Vec2,
        grab_offset: Vec2,
        moved: bool,
    },
    Connect {
        from: NodeId,
        cursor: Vec2,
    },
    PressEdge {
        id: EdgeId,
    },
}

/// Interactive canvas over one structure view.
///
/// The surface never edits the coordinator's graph. It keeps a local copy
/// for drag previews and hit testing, and reports what the user did as
/// events on the bus.
pub struct GraphSurface {
    bus: EventBus,
    writer: PositionWriter,
    view: GraphSnapshot,
    viewport: Viewport,
    viewport_size: Vec2,
    hit_tester: HitTester,
    selected_node: Option<NodeId>,
    selected_edge: Option<EdgeId>,
    editing: Option<NodeId>,
    gesture: Option<Gesture>,
    visibility: EdgeVisibility,
    default_relation_kind: RelationKind,
    read_only: bool,
    scheduled_count: usize,
}

impl GraphSurface {
    pub fn new(bus: EventBus, writer: PositionWriter) -> Self {
        Self {
            bus,
            writer,
            view: GraphSnapshot::default(),
            viewport: Viewport::default(),
            viewport_size: DEFAULT_VIEWPORT_SIZE,
            hit_tester: HitTester::new(),
            selected_node: None,
            selected_edge: None,
            editing: None,
            gesture: None,
            visibility: EdgeVisibility::default(),
            default_relation_kind: RelationKind::default(),
            read_only: false,
            scheduled_count: 0,
        }
    }

    pub fn with_visibility(mut self, visibility: EdgeVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_default_relation_kind(mut self, kind: RelationKind) -> Self {
        self.default_relation_kind = kind;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn view(&self) -> &GraphSnapshot {
        &self.view
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_viewport_size(&mut self, size: Vec2) {
        self.viewport_size = size;
    }

    pub fn selected_node(&self) -> Option<&NodeId> {
        self.selected_node.as_ref()
    }

    pub fn selected_edge(&self) -> Option<&EdgeId> {
        self.selected_edge.as_ref()
    }

    pub fn editing(&self) -> Option<&NodeId> {
        self.editing.as_ref()
    }

    pub fn visibility(&self) -> EdgeVisibility {
        self.visibility
    }

    pub fn default_relation_kind(&self) -> RelationKind {
        self.default_relation_kind
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Some(Gesture::MoveNode { moved: true, .. }))
    }

    pub fn writer(&self) -> &PositionWriter {
        &self.writer
    }

    /// Take over the coordinator's current graph. A node being dragged keeps
    /// its preview position; selections on vanished ids are dropped.
    pub fn sync(&mut self, snapshot: &GraphSnapshot) {
        let dragged = match &self.gesture {
            Some(Gesture::MoveNode {
                id, moved: true, ..
            }) => self.view.node(id).map(|node| (id.clone(), node.position)),
            _ => None,
        };

        self.view = snapshot.clone();
        if let Some((id, position)) = dragged
            && let Some(node) = self.view.node_mut(&id)
        {
            node.position = position;
        }

        if self
            .selected_node
            .as_ref()
            .is_some_and(|id| !self.view.contains_node(id))
        {
            self.selected_node = None;
        }
        if self
            .selected_edge
            .as_ref()
            .is_some_and(|id| self.view.edge(id).is_none())
        {
            self.selected_edge = None;
        }
        if self
            .editing
            .as_ref()
            .is_some_and(|id| !self.view.contains_node(id))
        {
            self.editing = None;
        }
        self.rebuild_hits();
    }

    fn rebuild_hits(&mut self) {
        let visible: Vec<_> = self
            .view
            .edges
            .iter()
            .filter(|edge| self.visibility.shows(edge.relation_kind.category()))
            .cloned()
            .collect();
        self.hit_tester.update(&self.view.nodes, &visible);
    }

    // ========================================================================
    // Pointer input
    // ========================================================================

    pub fn handle_pointer(&mut self, event: PointerEvent, now: Instant) {
        match event {
            PointerEvent::Down(screen) => self.pointer_down(screen),
            PointerEvent::Move(screen) => self.pointer_move(screen),
            PointerEvent::Up(screen) => self.pointer_up(screen, now),
            PointerEvent::DoubleClick(screen) => self.double_click(screen),
            PointerEvent::Wheel { pos, delta } => {
                self.viewport.zoom_at(ZOOM_STEP.powf(delta), pos);
            }
        }
    }

    fn pointer_down(&mut self, screen: Vec2) {
        let graph = self.viewport.screen_to_graph(screen);
        let gesture = match self.hit_tester.hit_test(graph) {
            HitResult::OutputAnchor(id) if !self.read_only => Gesture::Connect {
                from: id,
                cursor: graph,
            },
            HitResult::OutputAnchor(id) | HitResult::InputAnchor(id) | HitResult::Node(id) => {
                let position = self.view.node(&id).map_or(graph, |node| node.position);
                Gesture::MoveNode {
                    id,
                    start_pos: screen,
                    grab_offset: position - graph,
                    moved: false,
                }
            }
            HitResult::Edge(id) => Gesture::PressEdge { id },
            HitResult::None => Gesture::Pan {
                drag: DragState {
                    start_pan: self.viewport.pan,
                    start_pos: screen,
                },
                moved: false,
            },
        };
        self.gesture = Some(gesture);
    }

    fn pointer_move(&mut self, screen: Vec2) {
        let graph = self.viewport.screen_to_graph(screen);
        let mut dirty = false;
        match &mut self.gesture {
            Some(Gesture::Pan { drag, moved }) => {
                if *moved || (screen - drag.start_pos).length() >= DRAG_THRESHOLD {
                    *moved = true;
                    self.viewport.pan = drag.start_pan + (screen - drag.start_pos);
                }
            }
            Some(Gesture::MoveNode {
                id,
                start_pos,
                grab_offset,
                moved,
            }) => {
                if *moved || (screen - *start_pos).length() >= DRAG_THRESHOLD {
                    *moved = true;
                    if let Some(node) = self.view.node_mut(id) {
                        node.position = graph + *grab_offset;
                        dirty = true;
                    }
                }
            }
            Some(Gesture::Connect { cursor, .. }) => *cursor = graph,
            Some(Gesture::PressEdge { .. }) | None => {}
        }
        if dirty {
            self.rebuild_hits();
        }
    }

    fn pointer_up(&mut self, screen: Vec2, now: Instant) {
        let graph = self.viewport.screen_to_graph(screen);
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        match gesture {
            Gesture::Pan { moved: true, .. } => {}
            Gesture::Pan { moved: false, .. } => self.click_canvas(graph),
            Gesture::MoveNode {
                id, moved: true, ..
            } => self.finish_drag(id, now),
            Gesture::MoveNode { id, .. } => self.select_node(Some(id)),
            Gesture::Connect { from, .. } => self.finish_connect(from, graph),
            Gesture::PressEdge { id } => self.select_edge(id),
        }
    }

    fn double_click(&mut self, screen: Vec2) {
        self.gesture = None;
        let graph = self.viewport.screen_to_graph(screen);
        let Some(id) = self.hit_tester.node_at(graph) else {
            return;
        };
        self.select_node(Some(id.clone()));
        if self.read_only {
            return;
        }
        self.editing = Some(id.clone());
        self.bus.publish(Event::NodeEditRequested { id });
    }

    fn click_canvas(&mut self, graph: Vec2) {
        self.select_node(None);
        self.selected_edge = None;
        self.request_add(graph);
    }

    fn request_add(&self, position: Vec2) -> bool {
        if self.read_only {
            return false;
        }
        self.bus.publish(Event::NodeAddRequested {
            position,
            kind: NodeKind::default_for(self.view.structure),
        });
        true
    }

    fn finish_drag(&mut self, id: NodeId, now: Instant) {
        let Some(position) = self.view.node(&id).map(|node| node.position) else {
            return;
        };
        self.bus.publish(Event::NodeMoved { id, position });

        let positions = self.view.positions();
        self.scheduled_count = positions.len();
        if let Err(e) = self.writer.schedule(self.view.structure, positions, now) {
            tracing::warn!("Failed to save node positions: {}", e);
        }
    }

    fn finish_connect(&mut self, from: NodeId, graph: Vec2) {
        let Some(to) = self.hit_tester.node_at(graph) else {
            tracing::debug!("Connection from {} dropped on empty canvas", from);
            return;
        };
        if to == from {
            tracing::debug!("Ignoring self-loop on {}", from);
            return;
        }
        self.bus.publish(Event::EdgeAddRequested {
            from,
            to,
            relation_kind: self.default_relation_kind,
        });
    }

    fn select_node(&mut self, id: Option<NodeId>) {
        self.selected_edge = None;
        if self.selected_node != id {
            self.selected_node = id.clone();
            self.bus.publish(Event::NodeSelected { id });
        }
    }

    fn select_edge(&mut self, id: EdgeId) {
        self.select_node(None);
        self.selected_edge = Some(id);
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// The "add node" control: a new node in the middle of the visible area.
    pub fn add_node_at_center(&mut self, viewport_size: Vec2) -> bool {
        self.viewport_size = viewport_size;
        self.request_add(self.viewport.center_in_graph(viewport_size))
    }

    /// Submit the edit form opened by a double click.
    pub fn confirm_edit(&mut self, patch: NodePatch) -> bool {
        let Some(id) = self.editing.take() else {
            return false;
        };
        if patch.is_empty() {
            return false;
        }
        self.bus.publish(Event::NodeUpdateRequested { id, patch });
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn request_delete(&mut self, id: &NodeId) -> bool {
        if self.read_only || !self.view.contains_node(id) {
            return false;
        }
        if self.editing.as_ref() == Some(id) {
            self.editing = None;
        }
        self.bus.publish(Event::NodeDeleteRequested { id: id.clone() });
        true
    }

    /// Delete whatever is selected, node or edge.
    pub fn delete_selected(&mut self) -> bool {
        if self.read_only {
            return false;
        }
        if let Some(id) = self.selected_node.clone() {
            return self.request_delete(&id);
        }
        if let Some(id) = self.selected_edge.take() {
            self.bus.publish(Event::EdgeDeleteRequested { id });
            return true;
        }
        false
    }

    /// Apply a toolbar/control event. Returns whether the surface used it.
    pub fn apply_control(&mut self, event: &Event) -> bool {
        let center = self.viewport_size.scale(0.5);
        match event {
            Event::SetShowAdministrative(show) => {
                self.visibility.administrative = *show;
                self.rebuild_hits();
            }
            Event::SetShowFunctional(show) => {
                self.visibility.functional = *show;
                self.rebuild_hits();
            }
            Event::SetDefaultRelationKind(kind) => self.default_relation_kind = *kind,
            Event::ZoomIn => self.viewport.zoom_at(ZOOM_STEP, center),
            Event::ZoomOut => self.viewport.zoom_at(1.0 / ZOOM_STEP, center),
            Event::ZoomReset => self.viewport = Viewport::default(),
            Event::ZoomToFit => self.zoom_to_fit(),
            _ => return false,
        }
        true
    }

    pub fn zoom_to_fit(&mut self) {
        if let Some(bounds) = self.hit_tester.bounds() {
            self.viewport.fit(bounds, self.viewport_size, FIT_PADDING);
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Drive the debounced position write. Returns whether positions were
    /// written.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.writer.flush_due(now) {
            Ok(true) => {
                self.bus.publish(Event::PositionsSaved {
                    structure: self.view.structure,
                    count: self.scheduled_count,
                });
                true
            }
            Ok(false) => false,
            Err(e) => {
                tracing::warn!("Failed to write node positions: {}", e);
                self.bus.publish(Event::ShowWarning {
                    message: format!("Node positions were not saved: {e}"),
                });
                false
            }
        }
    }

    /// Write any pending positions now, e.g. before switching views.
    pub fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!("Failed to write node positions: {}", e);
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    pub fn render(&self) -> Scene {
        let mut scene = Scene::empty(self.viewport);

        let mut incoming: HashMap<&NodeId, RelationKind> = HashMap::new();
        for edge in &self.view.edges {
            incoming.entry(&edge.to).or_insert(edge.relation_kind);
        }

        for node in &self.view.nodes {
            let Some(rect) = self.hit_tester.node_rect(&node.id) else {
                continue;
            };
            let mut style = get_node_style(node.kind);
            style.colors.border = get_node_border_color(incoming.get(&node.id).copied());
            if !node.is_active {
                style = inactive_style(&style);
            }
            let selected = self.selected_node.as_ref() == Some(&node.id);
            scene.nodes.push(node_sprite(node, rect, style, selected));
        }

        for edge in &self.view.edges {
            if !self.visibility.shows(edge.relation_kind.category()) {
                continue;
            }
            let (Some(from), Some(to)) = (
                self.hit_tester.output_anchor(&edge.from),
                self.hit_tester.input_anchor(&edge.to),
            ) else {
                continue;
            };
            let selected = self.selected_edge.as_ref() == Some(&edge.id);
            scene.edges.push(edge_sprite(edge, from, to, selected));
        }

        if let Some(Gesture::Connect { from, cursor }) = &self.gesture {
            scene.connection_preview = self
                .hit_tester
                .output_anchor(from)
                .map(|anchor| (anchor, *cursor));
        }
        scene.bounds = self.hit_tester.bounds();
        scene
    }
}
