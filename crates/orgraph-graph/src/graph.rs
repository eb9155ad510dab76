use orgraph_core::{Edge, EdgeId, Node, NodeId, RelationKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::{Index, IndexMut};

/// Position of a node in input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeIndex(pub usize);

#[derive(Debug, Clone)]
pub struct GraphNode {
    pub id: NodeId,
    // Hierarchy, from hierarchical edges only
    pub children: Vec<NodeIndex>,
    pub parents: Vec<NodeIndex>,
}

#[derive(Debug, Clone)]
pub struct GraphEdge {
    pub id: EdgeId,
    pub relation_kind: RelationKind,
    pub source_idx: NodeIndex,
    pub target_idx: NodeIndex,
}

#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len());
        self.nodes.push(node);
        idx
    }

    pub fn add_edge(&mut self, edge: GraphEdge) -> EdgeIndex {
        let idx = EdgeIndex(self.edges.len());
        self.edges.push(edge);
        idx
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        (0..self.nodes.len()).map(NodeIndex)
    }

    pub fn edge_indices(&self) -> impl Iterator<Item = EdgeIndex> {
        (0..self.edges.len()).map(EdgeIndex)
    }
}

impl Index<NodeIndex> for Graph {
    type Output = GraphNode;
    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index.0]
    }
}

impl IndexMut<NodeIndex> for Graph {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        &mut self.nodes[index.0]
    }
}

impl Index<EdgeIndex> for Graph {
    type Output = GraphEdge;
    fn index(&self, index: EdgeIndex) -> &Self::Output {
        &self.edges[index.0]
    }
}

/// Index-based view of one structure's nodes and edges, used for layout.
#[derive(Debug, Default)]
pub struct GraphModel {
    pub graph: Graph,
    pub node_map: HashMap<NodeId, NodeIndex>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(nodes: &[Node], edges: &[Edge]) -> Self {
        let mut model = Self::new();
        for node in nodes {
            model.add_node(node);
        }
        for edge in edges {
            model.add_edge(edge);
        }
        model.rebuild_hierarchy();
        model
    }

    pub fn add_node(&mut self, node: &Node) {
        if self.node_map.contains_key(&node.id) {
            tracing::warn!("Duplicate node id {} ignored by graph model", node.id);
            return;
        }
        let idx = self.graph.add_node(GraphNode {
            id: node.id.clone(),
            children: Vec::new(),
            parents: Vec::new(),
        });
        self.node_map.insert(node.id.clone(), idx);
    }

    pub fn add_edge(&mut self, edge: &Edge) {
        match (self.node_map.get(&edge.from), self.node_map.get(&edge.to)) {
            (Some(&source_idx), Some(&target_idx)) => {
                self.graph.add_edge(GraphEdge {
                    id: edge.id.clone(),
                    relation_kind: edge.relation_kind,
                    source_idx,
                    target_idx,
                });
            }
            _ => {
                tracing::warn!(
                    "Dropping edge {} because {} -> {} is not fully in the graph model",
                    edge.id,
                    edge.from,
                    edge.to
                );
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn index_of(&self, id: &NodeId) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// Recompute parent/child lists from hierarchical edges. Children are
    /// kept in input order; self-loops and repeated pairs are ignored.
    pub fn rebuild_hierarchy(&mut self) {
        let indices: Vec<_> = self.graph.node_indices().collect();
        for node_idx in &indices {
            let node = &mut self.graph[*node_idx];
            node.children.clear();
            node.parents.clear();
        }

        let mut pairs = Vec::new();
        for edge_idx in self.graph.edge_indices() {
            let edge = &self.graph[edge_idx];
            if edge.relation_kind.is_hierarchical() && edge.source_idx != edge.target_idx {
                pairs.push((edge.source_idx, edge.target_idx));
            }
        }

        for (parent, child) in pairs {
            if !self.graph[parent].children.contains(&child) {
                self.graph[parent].children.push(child);
                self.graph[child].parents.push(parent);
            }
        }
        for node_idx in indices {
            self.graph[node_idx].children.sort();
        }
    }

    pub fn has_hierarchy(&self) -> bool {
        self.graph
            .node_indices()
            .any(|idx| !self.graph[idx].children.is_empty())
    }

    /// Nodes without an incoming hierarchical edge, in input order.
    pub fn roots(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph[idx].parents.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgraph_core::NodeKind;

    fn node(id: &str) -> Node {
        Node::new(id, id, NodeKind::Staff)
    }

    #[test]
    fn test_graph_model() {
        let nodes = vec![node("a"), node("b"), node("c")];
        let edges = vec![
            Edge::new("e1", "a", "b", RelationKind::Manager),
            Edge::new("e2", "a", "c", RelationKind::Project),
            Edge::new("e3", "a", "missing", RelationKind::Manager),
        ];
        let model = GraphModel::from_parts(&nodes, &edges);

        assert_eq!(model.node_count(), 3);
        assert_eq!(model.edge_count(), 2);
        assert!(model.has_hierarchy());
        assert_eq!(model.roots(), vec![NodeIndex(0), NodeIndex(2)]);
        assert_eq!(model.graph[NodeIndex(0)].children, vec![NodeIndex(1)]);
    }

    #[test]
    fn test_children_follow_input_order() {
        let nodes = vec![node("root"), node("x"), node("y")];
        let edges = vec![
            Edge::new("e1", "root", "y", RelationKind::Department),
            Edge::new("e2", "root", "x", RelationKind::Department),
            Edge::new("e3", "root", "x", RelationKind::Manager),
        ];
        let model = GraphModel::from_parts(&nodes, &edges);
        assert_eq!(
            model.graph[NodeIndex(0)].children,
            vec![NodeIndex(1), NodeIndex(2)]
        );
    }

    #[test]
    fn test_self_loop_is_not_hierarchy() {
        let nodes = vec![node("a")];
        let edges = vec![Edge::new("e1", "a", "a", RelationKind::Manager)];
        let model = GraphModel::from_parts(&nodes, &edges);
        assert!(!model.has_hierarchy());
        assert_eq!(model.roots(), vec![NodeIndex(0)]);
    }
}
