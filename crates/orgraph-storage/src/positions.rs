use crate::{SharedStore, StorageError, positions_key};
use orgraph_core::{NodeId, PositionMap, PositionSource, StructureType, Vec2};
use serde::{Deserialize, Serialize};

/// One entry of the persisted layout blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub id: NodeId,
    pub position: Vec2,
}

impl PositionRecord {
    pub fn new(id: impl Into<NodeId>, position: Vec2) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }
}

/// Last user-chosen coordinates per structure view.
#[derive(Clone)]
pub struct PositionStore {
    kv: SharedStore,
}

impl PositionStore {
    pub fn new(kv: SharedStore) -> Self {
        Self { kv }
    }

    /// Replace the whole layout of `structure`. Entries with non-finite
    /// coordinates are dropped.
    pub fn save(
        &self,
        structure: StructureType,
        positions: &[PositionRecord],
    ) -> Result<(), StorageError> {
        let finite: Vec<&PositionRecord> = positions
            .iter()
            .filter(|record| {
                let ok = record.position.x.is_finite() && record.position.y.is_finite();
                if !ok {
                    tracing::warn!("Dropping non-finite position for node {}", record.id);
                }
                ok
            })
            .collect();
        let blob = serde_json::to_string(&finite)?;
        self.kv.set(&positions_key(structure), &blob)
    }

    pub fn save_map(
        &self,
        structure: StructureType,
        positions: &PositionMap,
    ) -> Result<(), StorageError> {
        let mut records: Vec<PositionRecord> = positions
            .iter()
            .map(|(id, pos)| PositionRecord::new(id.clone(), *pos))
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        self.save(structure, &records)
    }

    /// Never fails: a missing, unreadable or corrupt blob is an empty map.
    pub fn load(&self, structure: StructureType) -> PositionMap {
        let key = positions_key(structure);
        let blob = match self.kv.get(&key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return PositionMap::new(),
            Err(e) => {
                tracing::warn!("Failed to read saved positions for {}: {}", structure, e);
                return PositionMap::new();
            }
        };
        match serde_json::from_str::<Vec<PositionRecord>>(&blob) {
            Ok(records) => records
                .into_iter()
                .map(|record| (record.id, record.position))
                .collect(),
            Err(e) => {
                tracing::warn!("Ignoring corrupt saved positions for {}: {}", structure, e);
                PositionMap::new()
            }
        }
    }

    pub fn clear(&self, structure: StructureType) -> Result<(), StorageError> {
        self.kv.remove(&positions_key(structure))
    }
}

impl PositionSource for PositionStore {
    fn load_positions(&self, structure: StructureType) -> PositionMap {
        self.load(structure)
    }
}
