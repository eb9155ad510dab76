use orgraph_api::{FunctionalRelationDto, Record};
use orgraph_core::{RecordKind, RecordRef, StructureType};
use orgraph_graph::{GraphSnapshot, refresh_functional_connections};
use std::collections::HashMap;

/// The loaded view plus the backend records it was built from. Records are
/// kept so updates can send a full body without refetching.
#[derive(Debug, Clone, Default)]
pub struct GraphState {
    pub view: GraphSnapshot,
    pub organization_id: Option<i64>,
    records: HashMap<RecordRef, Record>,
}

impl GraphState {
    pub fn new(view: GraphSnapshot, organization_id: Option<i64>, records: Vec<Record>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.record_ref(), record))
            .collect();
        Self {
            view,
            organization_id,
            records,
        }
    }

    pub fn structure(&self) -> StructureType {
        self.view.structure
    }

    pub fn record(&self, target: &RecordRef) -> Option<&Record> {
        self.records.get(target)
    }

    pub fn cache_record(&mut self, record: Record) {
        self.records.insert(record.record_ref(), record);
    }

    pub fn forget_record(&mut self, target: &RecordRef) -> Option<Record> {
        self.records.remove(target)
    }

    /// Drop a staff record together with every cached relation touching it.
    pub fn forget_staff(&mut self, staff_id: i64) {
        self.records.retain(|target, record| match record {
            Record::Staff(_) => target.id != staff_id,
            Record::FunctionalRelation(relation) => {
                relation.manager_id != staff_id && relation.subordinate_id != staff_id
            }
            _ => true,
        });
    }

    pub fn relations(&self) -> Vec<FunctionalRelationDto> {
        let mut relations: Vec<FunctionalRelationDto> = self
            .records
            .iter()
            .filter(|(target, _)| target.kind == RecordKind::FunctionalRelation)
            .filter_map(|(_, record)| record.as_relation().cloned())
            .collect();
        relations.sort_by_key(|relation| relation.id);
        relations
    }

    /// Recompute connection badges after a relation was added or removed.
    pub fn refresh_connections(&mut self) {
        let relations = self.relations();
        refresh_functional_connections(&mut self.view.nodes, &relations);
    }
}
