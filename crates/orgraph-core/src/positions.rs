use crate::{NodeId, StructureType, Vec2};
use std::collections::HashMap;

pub type PositionMap = HashMap<NodeId, Vec2>;

/// Anything that can answer "where did the user last put this node".
///
/// Implementations must not fail: missing or unreadable data is an empty map.
pub trait PositionSource {
    fn load_positions(&self, structure: StructureType) -> PositionMap;
}

impl PositionSource for PositionMap {
    fn load_positions(&self, _structure: StructureType) -> PositionMap {
        self.clone()
    }
}

impl PositionSource for HashMap<StructureType, PositionMap> {
    fn load_positions(&self, structure: StructureType) -> PositionMap {
        self.get(&structure).cloned().unwrap_or_default()
    }
}

/// No persisted layout at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSavedPositions;

impl PositionSource for NoSavedPositions {
    fn load_positions(&self, _structure: StructureType) -> PositionMap {
        PositionMap::new()
    }
}
