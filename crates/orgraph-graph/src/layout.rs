use crate::graph::{GraphModel, NodeIndex};
use orgraph_core::{Edge, Node, PositionSource, StructureType, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

pub trait Layouter {
    fn execute(&self, model: &GraphModel) -> HashMap<NodeIndex, Vec2>;
}

/// Spacing constants for automatic placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Vertical distance between tree levels
    pub level_height: f32,
    /// Horizontal distance between nodes of one level
    pub sibling_spacing: f32,
    pub col_width: f32,
    pub row_height: f32,
    /// Columns per row in grid placement
    pub grid_width: usize,
    /// Nodes per row before a tree level wraps
    pub max_row_nodes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            level_height: 180.0,
            sibling_spacing: 280.0,
            col_width: 300.0,
            row_height: 180.0,
            grid_width: 3,
            max_row_nodes: 12,
        }
    }
}

/// Row-major grid starting at `origin`.
pub struct GridLayouter {
    pub config: LayoutConfig,
    pub origin: Vec2,
}

impl GridLayouter {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            origin: Vec2::ZERO,
        }
    }

    fn place(&self, order: &[NodeIndex]) -> HashMap<NodeIndex, Vec2> {
        let columns = self.config.grid_width.max(1);
        order
            .iter()
            .enumerate()
            .map(|(i, &idx)| {
                let col = (i % columns) as f32;
                let row = (i / columns) as f32;
                let pos = Vec2::new(
                    self.origin.x + col * self.config.col_width,
                    self.origin.y + row * self.config.row_height,
                );
                (idx, pos)
            })
            .collect()
    }
}

impl Layouter for GridLayouter {
    fn execute(&self, model: &GraphModel) -> HashMap<NodeIndex, Vec2> {
        let order: Vec<_> = model.graph.node_indices().collect();
        self.place(&order)
    }
}

/// Breadth-first levelling from every root of the hierarchical edges.
///
/// Each level is centred on `x = 0`. Levels wider than `max_row_nodes` wrap
/// onto extra rows. Nodes no root reaches (hierarchy cycles) go on a grid
/// below the deepest row.
pub struct TreeLayouter {
    pub config: LayoutConfig,
}

impl TreeLayouter {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    fn levels(model: &GraphModel) -> (Vec<Vec<NodeIndex>>, Vec<NodeIndex>) {
        let mut depth: HashMap<NodeIndex, usize> = HashMap::new();
        let mut queue = VecDeque::new();
        let mut levels: Vec<Vec<NodeIndex>> = Vec::new();

        for root in model.roots() {
            depth.insert(root, 0);
            queue.push_back(root);
        }

        while let Some(idx) = queue.pop_front() {
            let level = depth[&idx];
            if levels.len() <= level {
                levels.resize_with(level + 1, Vec::new);
            }
            levels[level].push(idx);
            for &child in &model.graph[idx].children {
                if !depth.contains_key(&child) {
                    depth.insert(child, level + 1);
                    queue.push_back(child);
                }
            }
        }

        let unreached = model
            .graph
            .node_indices()
            .filter(|idx| !depth.contains_key(idx))
            .collect();
        (levels, unreached)
    }
}

impl Layouter for TreeLayouter {
    fn execute(&self, model: &GraphModel) -> HashMap<NodeIndex, Vec2> {
        let (levels, unreached) = Self::levels(model);
        let mut positions = HashMap::with_capacity(model.node_count());
        let row_limit = self.config.max_row_nodes.max(1);
        let mut y = 0.0;

        for level in &levels {
            for row in level.chunks(row_limit) {
                let center = (row.len() as f32 - 1.0) / 2.0;
                for (i, &idx) in row.iter().enumerate() {
                    let x = (i as f32 - center) * self.config.sibling_spacing;
                    positions.insert(idx, Vec2::new(x, y));
                }
                y += self.config.level_height;
            }
        }

        if !unreached.is_empty() {
            tracing::debug!(
                "{} nodes unreachable from any root, placing on grid",
                unreached.len()
            );
            let grid = GridLayouter {
                config: self.config,
                origin: Vec2::new(0.0, y),
            };
            positions.extend(grid.place(&unreached));
        }
        positions
    }
}

/// Assigns a position to every node of one structure view. A position saved
/// by the user always wins over the computed one.
pub struct LayoutEngine<S: PositionSource> {
    config: LayoutConfig,
    source: S,
}

impl<S: PositionSource> LayoutEngine<S> {
    pub fn new(config: LayoutConfig, source: S) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn layout(&self, mut nodes: Vec<Node>, edges: &[Edge], structure: StructureType) -> Vec<Node> {
        if nodes.is_empty() {
            return nodes;
        }

        let saved = self.source.load_positions(structure);
        let model = GraphModel::from_parts(&nodes, edges);
        let computed = self.compute(&model);

        for node in &mut nodes {
            if let Some(pos) = saved.get(&node.id) {
                node.position = *pos;
            } else if let Some(pos) = model.index_of(&node.id).and_then(|idx| computed.get(&idx)) {
                node.position = *pos;
            }
        }
        nodes
    }

    /// Computed placement only, ignoring saved positions.
    pub fn compute(&self, model: &GraphModel) -> HashMap<NodeIndex, Vec2> {
        if model.has_hierarchy() && !model.roots().is_empty() {
            TreeLayouter::new(self.config).execute(model)
        } else {
            GridLayouter::new(self.config).execute(model)
        }
    }
}
