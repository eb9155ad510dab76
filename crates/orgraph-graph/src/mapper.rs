//! Backend records to canonical graph nodes and edges.
//!
//! Node ids follow the console scheme (`staff_{id}`, `div_{id}`, bare
//! organization ids) so that saved positions and comments keep matching the
//! same entities across reloads.

use orgraph_api::{DivisionDto, FunctionalRelationDto, OrgType, OrganizationDto, Record, StaffDto};
use orgraph_core::{
    Edge, EdgeOrigin, FunctionalConnection, Node, NodeId, NodeKind, RecordKind, RecordRef,
    RelationKind, StructureType,
};
use std::collections::{HashMap, HashSet};

/// Records the mapper turns into nodes. Functional relation records are
/// accepted but produce no node.
pub type BackendRecord = Record;

/// Placeholder name for a connection whose counterpart is not loaded.
pub const UNKNOWN_NAME: &str = "unknown";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// `"Last F."`, or `"Last F. M."` when a middle name is present.
pub fn staff_display_name(staff: &StaffDto) -> String {
    let mut name = staff.last_name.trim().to_string();
    for part in [Some(staff.first_name.as_str()), staff.middle_name.as_deref()]
        .into_iter()
        .flatten()
    {
        if let Some(initial) = part.trim().chars().next() {
            if !name.is_empty() {
                name.push(' ');
            }
            name.push(initial);
            name.push('.');
        }
    }
    name
}

pub fn staff_node_id(id: i64) -> NodeId {
    RecordRef::new(RecordKind::Staff, id).node_id()
}

pub fn division_node_id(id: i64) -> NodeId {
    RecordRef::new(RecordKind::Division, id).node_id()
}

pub fn organization_node_id(id: i64) -> NodeId {
    RecordRef::new(RecordKind::Organization, id).node_id()
}

fn organization_kind(org_type: OrgType) -> NodeKind {
    match org_type {
        OrgType::LegalEntity => NodeKind::LegalEntity,
        OrgType::Location => NodeKind::Location,
        OrgType::Board | OrgType::Holding | OrgType::Unknown => NodeKind::OrganizationalUnit,
    }
}

fn map_organization(org: &OrganizationDto) -> Option<Node> {
    if org.name.trim().is_empty() {
        tracing::warn!("Skipping organization {} with empty name", org.id);
        return None;
    }
    let mut node = Node::new(
        organization_node_id(org.id),
        org.name.trim(),
        organization_kind(org.org_type),
    )
    .with_origin(RecordRef::new(RecordKind::Organization, org.id));
    node.secondary_label = org.code.clone();
    node.is_active = org.is_active;
    Some(node)
}

fn map_division(division: &DivisionDto) -> Option<Node> {
    if division.name.trim().is_empty() {
        tracing::warn!("Skipping division {} with empty name", division.id);
        return None;
    }
    let mut node = Node::new(
        division_node_id(division.id),
        division.name.trim(),
        NodeKind::OrganizationalUnit,
    )
    .with_origin(RecordRef::new(RecordKind::Division, division.id));
    node.secondary_label = division.code.clone();
    node.is_active = division.is_active;
    Some(node)
}

fn map_staff(staff: &StaffDto, divisions: &HashMap<i64, &DivisionDto>) -> Option<Node> {
    let label = staff_display_name(staff);
    if label.is_empty() {
        tracing::warn!("Skipping staff {} with empty name", staff.id);
        return None;
    }
    let mut node = Node::new(staff_node_id(staff.id), label, NodeKind::Staff)
        .with_origin(RecordRef::new(RecordKind::Staff, staff.id));
    node.secondary_label = staff.position.clone().filter(|p| !p.trim().is_empty());
    node.tertiary_label = staff
        .division_id
        .and_then(|id| divisions.get(&id))
        .map(|division| division.name.clone());
    node.avatar_ref = staff.avatar_url.clone();
    node.is_active = staff.is_active;
    Some(node)
}

fn active_relations(relations: &[FunctionalRelationDto]) -> impl Iterator<Item = &FunctionalRelationDto> {
    relations.iter().filter(|relation| relation.is_active)
}

/// Convert backend records into nodes, in record order. Staff nodes get
/// their functional connections from `relations`.
pub fn map_to_nodes(records: &[BackendRecord], relations: &[FunctionalRelationDto]) -> Vec<Node> {
    let divisions: HashMap<i64, &DivisionDto> = records
        .iter()
        .filter_map(|record| match record {
            Record::Division(division) => Some((division.id, division)),
            _ => None,
        })
        .collect();

    let mut nodes: Vec<Node> = records
        .iter()
        .filter_map(|record| match record {
            Record::Organization(org) => map_organization(org),
            Record::Division(division) => map_division(division),
            Record::Staff(staff) => map_staff(staff, &divisions),
            Record::FunctionalRelation(_) => None,
        })
        .collect();

    refresh_functional_connections(&mut nodes, relations);
    nodes
}

/// Recompute the display-only connection badges of every staff node. The
/// counterpart name is its node label, or `"unknown"` when not loaded.
pub fn refresh_functional_connections(nodes: &mut [Node], relations: &[FunctionalRelationDto]) {
    let labels: HashMap<NodeId, String> = nodes
        .iter()
        .map(|node| (node.id.clone(), node.label.clone()))
        .collect();

    for node in nodes.iter_mut().filter(|node| node.kind == NodeKind::Staff) {
        let Some(RecordRef {
            kind: RecordKind::Staff,
            id: staff_id,
        }) = node.origin
        else {
            continue;
        };
        node.functional_connections = active_relations(relations)
            .filter_map(|relation| {
                let counterpart = if relation.manager_id == staff_id {
                    relation.subordinate_id
                } else if relation.subordinate_id == staff_id {
                    relation.manager_id
                } else {
                    return None;
                };
                let name = labels
                    .get(&staff_node_id(counterpart))
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_NAME.to_string());
                Some(FunctionalConnection {
                    id: relation.id,
                    kind: RelationKind::parse(&relation.relation_type),
                    name,
                })
            })
            .collect();
    }
}

/// One edge per active functional relation, manager to subordinate.
pub fn map_to_edges(relations: &[FunctionalRelationDto]) -> Vec<Edge> {
    active_relations(relations)
        .map(|relation| {
            let mut edge = Edge::new(
                relation.id.to_string(),
                staff_node_id(relation.manager_id),
                staff_node_id(relation.subordinate_id),
                RelationKind::parse(&relation.relation_type),
            )
            .with_origin(EdgeOrigin::Relation { id: relation.id });
            edge.label = relation.description.clone();
            edge
        })
        .collect()
}

fn business_graph(records: &[BackendRecord], relations: &[FunctionalRelationDto]) -> MappedGraph {
    let divisions: Vec<&DivisionDto> = records
        .iter()
        .filter_map(|r| match r {
            Record::Division(d) => Some(d),
            _ => None,
        })
        .collect();
    let staff: Vec<&StaffDto> = records
        .iter()
        .filter_map(|r| match r {
            Record::Staff(s) => Some(s),
            _ => None,
        })
        .collect();

    let ordered: Vec<BackendRecord> = divisions
        .iter()
        .map(|d| Record::Division((*d).clone()))
        .chain(staff.iter().map(|s| Record::Staff((*s).clone())))
        .collect();
    let nodes = map_to_nodes(&ordered, relations);

    let mut edges = Vec::new();
    for division in &divisions {
        if let Some(parent) = division.parent_id {
            edges.push(
                Edge::new(
                    format!("div_edge_{}", division.id),
                    division_node_id(parent),
                    division_node_id(division.id),
                    RelationKind::Department,
                )
                .with_origin(EdgeOrigin::DivisionParent { child: division.id }),
            );
        }
    }

    let relation_edges = map_to_edges(relations);
    let related_pairs: HashSet<(NodeId, NodeId)> = relation_edges
        .iter()
        .map(|edge| (edge.from.clone(), edge.to.clone()))
        .collect();
    edges.extend(relation_edges);

    for member in &staff {
        if let Some(division) = member.division_id {
            edges.push(
                Edge::new(
                    format!("staff_div_{}", member.id),
                    division_node_id(division),
                    staff_node_id(member.id),
                    RelationKind::Department,
                )
                .with_origin(EdgeOrigin::StaffDivision { staff: member.id }),
            );
        }
    }

    for member in &staff {
        let Some(manager) = member.manager_id else {
            continue;
        };
        let pair = (staff_node_id(manager), staff_node_id(member.id));
        if related_pairs.contains(&pair) {
            continue;
        }
        edges.push(
            Edge::new(
                format!("staff_manager_{}", member.id),
                pair.0,
                pair.1,
                RelationKind::Manager,
            )
            .with_origin(EdgeOrigin::StaffManager { staff: member.id }),
        );
    }

    MappedGraph { nodes, edges }
}

fn organization_graph(records: &[BackendRecord], structure: StructureType) -> MappedGraph {
    let (wanted, edge_prefix, relation_kind) = match structure {
        StructureType::Territorial => (OrgType::Location, "location_edge", RelationKind::Territorial),
        _ => (OrgType::LegalEntity, "legal_edge", RelationKind::Department),
    };

    let organizations: Vec<BackendRecord> = records
        .iter()
        .filter(|r| matches!(r, Record::Organization(org) if org.org_type == wanted))
        .cloned()
        .collect();
    let nodes = map_to_nodes(&organizations, &[]);

    let edges = organizations
        .iter()
        .filter_map(|r| match r {
            Record::Organization(org) => org.parent_id.map(|parent| (org.id, parent)),
            _ => None,
        })
        .map(|(child, parent)| {
            Edge::new(
                format!("{edge_prefix}_{child}"),
                organization_node_id(parent),
                organization_node_id(child),
                relation_kind,
            )
            .with_origin(EdgeOrigin::OrganizationParent { child })
        })
        .collect();

    MappedGraph { nodes, edges }
}

/// Build the full graph of one structure view, parent links included.
/// Edges pointing at records outside the view are dropped.
pub fn map_structure(
    structure: StructureType,
    records: &[BackendRecord],
    relations: &[FunctionalRelationDto],
) -> MappedGraph {
    let mut graph = match structure {
        StructureType::Business => business_graph(records, relations),
        StructureType::Legal | StructureType::Territorial => organization_graph(records, structure),
    };

    let ids: HashSet<&NodeId> = graph.nodes.iter().map(|node| &node.id).collect();
    let before = graph.edges.len();
    let mut seen = HashSet::new();
    let edges: Vec<Edge> = graph
        .edges
        .drain(..)
        .filter(|edge| {
            let keep = ids.contains(&edge.from) && ids.contains(&edge.to);
            if !keep {
                tracing::warn!(
                    "Dropping edge {} ({} -> {}): endpoint not in {} view",
                    edge.id,
                    edge.from,
                    edge.to,
                    structure
                );
            }
            keep && seen.insert(edge.id.clone())
        })
        .collect();
    if edges.len() != before {
        tracing::debug!("{} of {} edges kept for {}", edges.len(), before, structure);
    }
    graph.edges = edges;
    graph
}
