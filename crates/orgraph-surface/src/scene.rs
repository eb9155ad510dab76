use orgraph_core::comment::active_count;
use orgraph_core::{EdgeId, NodeId, NodeKind, Vec2};
use orgraph_graph::style::{COLOR_CANVAS, COLOR_SELECTION};
use orgraph_graph::{
    Color, EdgeStyle, NodeStyle, Rect, Viewport, get_edge_kind_label, get_kind_label,
};

/// Everything a renderer needs to draw one frame, in graph space.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub viewport: Viewport,
    pub background: Color,
    pub nodes: Vec<NodeSprite>,
    pub edges: Vec<EdgeSprite>,
    /// Rubber band from the source anchor to the cursor while connecting
    pub connection_preview: Option<(Vec2, Vec2)>,
    pub bounds: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeSprite {
    pub id: NodeId,
    pub kind: NodeKind,
    pub kind_label: &'static str,
    pub rect: Rect,
    pub label: String,
    pub secondary_label: Option<String>,
    pub tertiary_label: Option<String>,
    pub avatar_ref: Option<String>,
    pub style: NodeStyle,
    pub selected: bool,
    pub active: bool,
    /// Still waiting for the backend to assign an id
    pub pending: bool,
    pub open_comments: usize,
    pub connection_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSprite {
    pub id: EdgeId,
    pub from: Vec2,
    pub to: Vec2,
    pub style: EdgeStyle,
    pub kind_label: &'static str,
    pub label: Option<String>,
    pub selected: bool,
}

impl Scene {
    pub fn empty(viewport: Viewport) -> Self {
        Self {
            viewport,
            background: COLOR_CANVAS,
            nodes: Vec::new(),
            edges: Vec::new(),
            connection_preview: None,
            bounds: None,
        }
    }

    pub fn node(&self, id: &NodeId) -> Option<&NodeSprite> {
        self.nodes.iter().find(|sprite| &sprite.id == id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&EdgeSprite> {
        self.edges.iter().find(|sprite| &sprite.id == id)
    }
}

pub(crate) fn node_sprite(
    node: &orgraph_core::Node,
    rect: Rect,
    style: NodeStyle,
    selected: bool,
) -> NodeSprite {
    let mut style = style;
    if selected {
        style.colors.border = COLOR_SELECTION;
    }
    NodeSprite {
        id: node.id.clone(),
        kind: node.kind,
        kind_label: get_kind_label(node.kind),
        rect,
        label: node.label.clone(),
        secondary_label: node.secondary_label.clone(),
        tertiary_label: node.tertiary_label.clone(),
        avatar_ref: node.avatar_ref.clone(),
        style,
        selected,
        active: node.is_active,
        pending: node.is_pending(),
        open_comments: active_count(&node.comments),
        connection_count: node.functional_connections.len(),
    }
}

pub(crate) fn edge_sprite(edge: &orgraph_core::Edge, from: Vec2, to: Vec2, selected: bool) -> EdgeSprite {
    let mut style = orgraph_graph::get_edge_style(edge.relation_kind);
    if selected {
        style.width += 1.5;
    }
    EdgeSprite {
        id: edge.id.clone(),
        from,
        to,
        style,
        kind_label: get_edge_kind_label(edge.relation_kind),
        label: edge.label.clone(),
        selected,
    }
}
