use crate::style::get_node_style;
use orgraph_core::{Edge, EdgeId, Node, NodeId, Vec2};
use std::collections::HashMap;

/// Axis-aligned rectangle in graph space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: Vec2::new(pos.x + size.x, pos.y + size.y),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min: Vec2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Vec2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }
}

/// Result of a hit test at a given position.
///
/// Priority order: anchor > node body > edge > none. Among overlapping
/// nodes the one drawn last wins.
#[derive(Debug, Clone, PartialEq)]
pub enum HitResult {
    None,
    Node(NodeId),
    /// Connection source handle, bottom centre of the node
    OutputAnchor(NodeId),
    /// Connection target handle, top centre of the node
    InputAnchor(NodeId),
    Edge(EdgeId),
}

#[derive(Debug, Clone)]
struct EdgeSegment {
    id: EdgeId,
    from: Vec2,
    to: Vec2,
}

/// Spatial index of the rendered graph, rebuilt after every layout change.
#[derive(Debug, Clone)]
pub struct HitTester {
    /// Node rects in draw order
    node_order: Vec<NodeId>,
    node_rects: HashMap<NodeId, Rect>,
    edge_segments: Vec<EdgeSegment>,
    edge_tolerance: f32,
    anchor_radius: f32,
}

impl Default for HitTester {
    fn default() -> Self {
        Self::new()
    }
}

impl HitTester {
    pub fn new() -> Self {
        Self {
            node_order: Vec::new(),
            node_rects: HashMap::new(),
            edge_segments: Vec::new(),
            edge_tolerance: 8.0,
            anchor_radius: 8.0,
        }
    }

    pub fn with_tolerance(tolerance: f32) -> Self {
        Self {
            edge_tolerance: tolerance,
            ..Self::new()
        }
    }

    pub fn edge_tolerance(&self) -> f32 {
        self.edge_tolerance
    }

    pub fn node_rect_for(node: &Node) -> Rect {
        let style = get_node_style(node.kind);
        Rect::from_pos_size(node.position, Vec2::new(style.min_width, style.min_height))
    }

    pub fn update(&mut self, nodes: &[Node], edges: &[Edge]) {
        self.node_order.clear();
        self.node_rects.clear();
        self.edge_segments.clear();

        for node in nodes {
            self.node_order.push(node.id.clone());
            self.node_rects
                .insert(node.id.clone(), Self::node_rect_for(node));
        }
        for edge in edges {
            if let (Some(from), Some(to)) = (self.output_anchor(&edge.from), self.input_anchor(&edge.to)) {
                self.edge_segments.push(EdgeSegment {
                    id: edge.id.clone(),
                    from,
                    to,
                });
            }
        }
    }

    pub fn node_rect(&self, id: &NodeId) -> Option<Rect> {
        self.node_rects.get(id).copied()
    }

    pub fn output_anchor(&self, id: &NodeId) -> Option<Vec2> {
        self.node_rects
            .get(id)
            .map(|r| Vec2::new(r.center().x, r.max.y))
    }

    pub fn input_anchor(&self, id: &NodeId) -> Option<Vec2> {
        self.node_rects
            .get(id)
            .map(|r| Vec2::new(r.center().x, r.min.y))
    }

    /// Bounding box of all nodes, if any.
    pub fn bounds(&self) -> Option<Rect> {
        self.node_rects.values().copied().reduce(|a, b| a.union(&b))
    }

    pub fn hit_test(&self, pos: Vec2) -> HitResult {
        for id in self.node_order.iter().rev() {
            if let Some(anchor) = self.output_anchor(id)
                && (pos - anchor).length() <= self.anchor_radius
            {
                return HitResult::OutputAnchor(id.clone());
            }
            if let Some(anchor) = self.input_anchor(id)
                && (pos - anchor).length() <= self.anchor_radius
            {
                return HitResult::InputAnchor(id.clone());
            }
        }

        for id in self.node_order.iter().rev() {
            if self.node_rects.get(id).is_some_and(|r| r.contains(pos)) {
                return HitResult::Node(id.clone());
            }
        }

        self.edge_segments
            .iter()
            .map(|seg| (seg, distance_to_segment(pos, seg.from, seg.to)))
            .filter(|(_, d)| *d <= self.edge_tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(seg, _)| HitResult::Edge(seg.id.clone()))
            .unwrap_or(HitResult::None)
    }

    /// Node whose body or anchor contains `pos`, ignoring edges.
    pub fn node_at(&self, pos: Vec2) -> Option<NodeId> {
        match self.hit_test(pos) {
            HitResult::Node(id) | HitResult::InputAnchor(id) | HitResult::OutputAnchor(id) => Some(id),
            HitResult::Edge(_) | HitResult::None => None,
        }
    }
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq <= f32::EPSILON {
        return (p - a).length();
    }
    let ap = p - a;
    let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab.scale(t))).length()
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgraph_core::{NodeKind, RelationKind};

    fn staff_at(id: &str, x: f32, y: f32) -> Node {
        Node::new(id, id, NodeKind::Staff).with_position(Vec2::new(x, y))
    }

    fn tester() -> HitTester {
        let nodes = vec![staff_at("a", 0.0, 0.0), staff_at("b", 0.0, 300.0)];
        let edges = vec![Edge::new("e", "a", "b", RelationKind::Manager)];
        let mut tester = HitTester::new();
        tester.update(&nodes, &edges);
        tester
    }

    #[test]
    fn test_node_body_hit() {
        assert_eq!(
            tester().hit_test(Vec2::new(50.0, 40.0)),
            HitResult::Node(NodeId::from("a"))
        );
    }

    #[test]
    fn test_anchor_beats_body() {
        let tester = tester();
        // Staff nodes are 220x90
        assert_eq!(
            tester.hit_test(Vec2::new(110.0, 88.0)),
            HitResult::OutputAnchor(NodeId::from("a"))
        );
        assert_eq!(
            tester.hit_test(Vec2::new(110.0, 302.0)),
            HitResult::InputAnchor(NodeId::from("b"))
        );
    }

    #[test]
    fn test_edge_hit_between_nodes() {
        let tester = tester();
        assert_eq!(
            tester.hit_test(Vec2::new(114.0, 200.0)),
            HitResult::Edge(EdgeId::from("e"))
        );
        assert_eq!(tester.hit_test(Vec2::new(160.0, 200.0)), HitResult::None);
    }

    #[test]
    fn test_topmost_node_wins() {
        let nodes = vec![staff_at("under", 0.0, 0.0), staff_at("over", 20.0, 20.0)];
        let mut tester = HitTester::new();
        tester.update(&nodes, &[]);
        assert_eq!(tester.node_at(Vec2::new(50.0, 50.0)), Some(NodeId::from("over")));
    }

    #[test]
    fn test_bounds_cover_all_nodes() {
        let bounds = tester().bounds().unwrap();
        assert_eq!(bounds.min, Vec2::ZERO);
        assert_eq!(bounds.max, Vec2::new(220.0, 390.0));
    }
}
