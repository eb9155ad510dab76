use orgraph_core::{Edge, EdgeCategory, EdgeId, Node, NodeId, PositionMap, StructureType};
use serde::{Deserialize, Serialize};

/// Nodes and edges of one structure view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub structure: StructureType,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// A node taken out of a snapshot together with the edges that referenced
/// it, keeping original indices so it can be put back in place.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    pub index: usize,
    pub node: Node,
    pub edges: Vec<(usize, Edge)>,
}

impl GraphSnapshot {
    pub fn new(structure: StructureType, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            structure,
            nodes,
            edges,
        }
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| &node.id == id)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|edge| &edge.id == id)
    }

    /// Edges in the administrative overlay, derived on every call.
    pub fn administrative_edges(&self) -> Vec<Edge> {
        self.edges_in(EdgeCategory::Administrative)
    }

    /// Edges in the functional overlay, derived on every call.
    pub fn functional_edges(&self) -> Vec<Edge> {
        self.edges_in(EdgeCategory::Functional)
    }

    pub fn edges_in(&self, category: EdgeCategory) -> Vec<Edge> {
        self.edges
            .iter()
            .filter(|edge| edge.relation_kind.category() == category)
            .cloned()
            .collect()
    }

    pub fn positions(&self) -> PositionMap {
        self.nodes
            .iter()
            .map(|node| (node.id.clone(), node.position))
            .collect()
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<RemovedNode> {
        let index = self.nodes.iter().position(|node| &node.id == id)?;
        let node = self.nodes.remove(index);

        let mut edges = Vec::new();
        let mut kept = Vec::with_capacity(self.edges.len());
        for (i, edge) in self.edges.drain(..).enumerate() {
            if edge.touches(id) {
                edges.push((i, edge));
            } else {
                kept.push(edge);
            }
        }
        self.edges = kept;
        Some(RemovedNode { index, node, edges })
    }

    /// Undo `remove_node`. Edges whose other endpoint has gone in the
    /// meantime stay out.
    pub fn restore_node(&mut self, removed: RemovedNode) {
        let index = removed.index.min(self.nodes.len());
        self.nodes.insert(index, removed.node);
        for (i, edge) in removed.edges {
            self.restore_edge((i, edge));
        }
    }

    fn has_endpoints(&self, edge: &Edge) -> bool {
        self.contains_node(&edge.from) && self.contains_node(&edge.to)
    }

    pub fn remove_edge(&mut self, id: &EdgeId) -> Option<(usize, Edge)> {
        let index = self.edges.iter().position(|edge| &edge.id == id)?;
        Some((index, self.edges.remove(index)))
    }

    /// Put a removed edge back. Returns false, leaving the snapshot as is,
    /// when one of its endpoints is no longer present.
    pub fn restore_edge(&mut self, (index, edge): (usize, Edge)) -> bool {
        if !self.has_endpoints(&edge) {
            return false;
        }
        let index = index.min(self.edges.len());
        self.edges.insert(index, edge);
        true
    }

    /// Re-key a node and every edge endpoint that referenced it.
    pub fn rename_node(&mut self, from: &NodeId, to: &NodeId) {
        if let Some(node) = self.node_mut(from) {
            node.id = to.clone();
        }
        for edge in &mut self.edges {
            if &edge.from == from {
                edge.from = to.clone();
            }
            if &edge.to == from {
                edge.to = to.clone();
            }
        }
    }
}
