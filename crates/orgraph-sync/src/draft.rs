//! Record bodies sent for node creation, edits and link removal.

use orgraph_api::{DivisionDto, OrgType, OrganizationDto, Record, StaffDto};
use orgraph_core::{
    EdgeId, EdgeOrigin, NodeId, NodeKind, NodePatch, RecordKind, RecordRef, RelationKind,
    StructureType, Vec2,
};
use orgraph_graph::{division_node_id, organization_node_id, staff_node_id};

pub const DEFAULT_DIVISION_CODE: &str = "DIV";

/// Label given to nodes created from the toolbar.
pub fn default_label(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Staff => "New employee",
        NodeKind::OrganizationalUnit => "New division",
        NodeKind::LegalEntity => "New legal entity",
        NodeKind::Location => "New location",
    }
}

/// A node the user asked to create.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDraft {
    pub kind: NodeKind,
    pub label: String,
    pub secondary_label: Option<String>,
    pub position: Vec2,
    pub parent: Option<NodeId>,
    /// Seeded as the node's first comment.
    pub comment: Option<String>,
}

impl NodeDraft {
    pub fn new(kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            secondary_label: None,
            position: Vec2::ZERO,
            parent: None,
            comment: None,
        }
    }

    /// Defaults of the "add node" control: the view's node kind, a placeholder
    /// label and an "added" comment.
    pub fn new_at(structure: StructureType, position: Vec2) -> Self {
        let kind = NodeKind::default_for(structure);
        let label = default_label(kind);
        Self {
            comment: Some(format!("{label} added")),
            position,
            ..Self::new(kind, label)
        }
    }

    pub fn with_parent(mut self, parent: impl Into<NodeId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_secondary_label(mut self, label: impl Into<String>) -> Self {
        self.secondary_label = Some(label.into());
        self
    }
}

/// Relation kind of the edge a new node hangs from, if `parent` can be its
/// parent at all.
pub(crate) fn parent_relation(child: NodeKind, parent: RecordRef) -> Option<RelationKind> {
    match (child, parent.kind) {
        (NodeKind::Staff, RecordKind::Division) => Some(RelationKind::Department),
        (NodeKind::Staff, RecordKind::Staff) => Some(RelationKind::Manager),
        (NodeKind::OrganizationalUnit, RecordKind::Division) => Some(RelationKind::Department),
        (NodeKind::LegalEntity, RecordKind::Organization) => Some(RelationKind::Department),
        (NodeKind::Location, RecordKind::Organization) => Some(RelationKind::Territorial),
        _ => None,
    }
}

pub(crate) fn draft_record(
    draft: &NodeDraft,
    parent: Option<RecordRef>,
    organization_id: Option<i64>,
) -> Record {
    let parent_of = |kind: RecordKind| parent.filter(|p| p.kind == kind).map(|p| p.id);
    let label = draft.label.trim().to_string();

    match draft.kind {
        NodeKind::Staff => {
            let mut staff = StaffDto::from_display_name(&label);
            staff.position = draft.secondary_label.clone();
            staff.organization_id = organization_id;
            staff.division_id = parent_of(RecordKind::Division);
            staff.manager_id = parent_of(RecordKind::Staff);
            Record::Staff(staff)
        }
        NodeKind::OrganizationalUnit => Record::Division(DivisionDto {
            id: 0,
            name: label,
            code: Some(
                draft
                    .secondary_label
                    .clone()
                    .unwrap_or_else(|| DEFAULT_DIVISION_CODE.to_string()),
            ),
            description: None,
            organization_id,
            parent_id: parent_of(RecordKind::Division),
            is_active: true,
        }),
        NodeKind::LegalEntity | NodeKind::Location => Record::Organization(OrganizationDto {
            id: 0,
            name: label,
            code: draft.secondary_label.clone(),
            description: None,
            org_type: if draft.kind == NodeKind::Location {
                OrgType::Location
            } else {
                OrgType::LegalEntity
            },
            is_active: true,
            parent_id: parent_of(RecordKind::Organization),
        }),
    }
}

/// Id, origin and parent node of the parent-link edge a persisted record
/// implies, named the way the mapper names it on reload.
pub(crate) fn parent_edge_identity(
    record: &Record,
    structure: StructureType,
) -> Option<(EdgeId, EdgeOrigin, NodeId)> {
    match record {
        Record::Staff(staff) => {
            if let Some(division) = staff.division_id {
                Some((
                    EdgeId(format!("staff_div_{}", staff.id)),
                    EdgeOrigin::StaffDivision { staff: staff.id },
                    division_node_id(division),
                ))
            } else {
                staff.manager_id.map(|manager| {
                    (
                        EdgeId(format!("staff_manager_{}", staff.id)),
                        EdgeOrigin::StaffManager { staff: staff.id },
                        staff_node_id(manager),
                    )
                })
            }
        }
        Record::Division(division) => division.parent_id.map(|parent| {
            (
                EdgeId(format!("div_edge_{}", division.id)),
                EdgeOrigin::DivisionParent { child: division.id },
                division_node_id(parent),
            )
        }),
        Record::Organization(org) => {
            let prefix = match structure {
                StructureType::Territorial => "location_edge",
                _ => "legal_edge",
            };
            org.parent_id.map(|parent| {
                (
                    EdgeId(format!("{prefix}_{}", org.id)),
                    EdgeOrigin::OrganizationParent { child: org.id },
                    organization_node_id(parent),
                )
            })
        }
        Record::FunctionalRelation(_) => None,
    }
}

/// Copy edited node fields onto the backing record.
pub(crate) fn apply_patch(record: &mut Record, patch: &NodePatch) {
    match record {
        Record::Staff(staff) => {
            if let Some(label) = &patch.label {
                let names = StaffDto::from_display_name(label);
                staff.last_name = names.last_name;
                staff.first_name = names.first_name;
                staff.middle_name = names.middle_name;
            }
            if let Some(position) = &patch.secondary_label {
                staff.position = Some(position.clone());
            }
            if let Some(active) = patch.is_active {
                staff.is_active = active;
            }
        }
        Record::Division(division) => {
            if let Some(label) = &patch.label {
                division.name = label.trim().to_string();
            }
            if let Some(code) = &patch.secondary_label {
                division.code = Some(code.clone());
            }
            if let Some(active) = patch.is_active {
                division.is_active = active;
            }
        }
        Record::Organization(org) => {
            if let Some(label) = &patch.label {
                org.name = label.trim().to_string();
            }
            if let Some(code) = &patch.secondary_label {
                org.code = Some(code.clone());
            }
            if let Some(active) = patch.is_active {
                org.is_active = active;
            }
        }
        Record::FunctionalRelation(_) => {}
    }
}

/// Record whose parent link an edge mirrors.
pub(crate) fn link_owner(origin: EdgeOrigin) -> Option<RecordRef> {
    match origin {
        EdgeOrigin::DivisionParent { child } => Some(RecordRef::new(RecordKind::Division, child)),
        EdgeOrigin::StaffDivision { staff } | EdgeOrigin::StaffManager { staff } => {
            Some(RecordRef::new(RecordKind::Staff, staff))
        }
        EdgeOrigin::OrganizationParent { child } => {
            Some(RecordRef::new(RecordKind::Organization, child))
        }
        EdgeOrigin::Relation { .. } | EdgeOrigin::Pending => None,
    }
}

/// Clear the link `origin` mirrors on its owning record. Returns false when
/// the record does not carry that link.
pub(crate) fn clear_parent_link(record: &mut Record, origin: EdgeOrigin) -> bool {
    match (record, origin) {
        (Record::Division(division), EdgeOrigin::DivisionParent { .. }) => {
            division.parent_id.take().is_some()
        }
        (Record::Staff(staff), EdgeOrigin::StaffDivision { .. }) => staff.division_id.take().is_some(),
        (Record::Staff(staff), EdgeOrigin::StaffManager { .. }) => staff.manager_id.take().is_some(),
        (Record::Organization(org), EdgeOrigin::OrganizationParent { .. }) => {
            org.parent_id.take().is_some()
        }
        _ => false,
    }
}
