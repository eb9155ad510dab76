use crate::{Comment, EdgeId, NodeId, NodeKind, RelationKind, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend resource collections the graph reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Organization,
    Division,
    Staff,
    FunctionalRelation,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Organization => "organization",
            RecordKind::Division => "division",
            RecordKind::Staff => "staff",
            RecordKind::FunctionalRelation => "functional_relation",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pointer to one persisted backend record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    pub kind: RecordKind,
    pub id: i64,
}

impl RecordRef {
    pub fn new(kind: RecordKind, id: i64) -> Self {
        Self { kind, id }
    }

    /// Node id under the console's id scheme.
    pub fn node_id(&self) -> NodeId {
        match self.kind {
            RecordKind::Staff => NodeId(format!("staff_{}", self.id)),
            RecordKind::Division => NodeId(format!("div_{}", self.id)),
            RecordKind::Organization | RecordKind::FunctionalRelation => {
                NodeId(self.id.to_string())
            }
        }
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

/// Summary of a functional relation touching a staff node, used for badges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionalConnection {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: RelationKind,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tertiary_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_ref: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub is_active: bool,
    #[serde(default)]
    pub position: Vec2,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functional_connections: Vec<FunctionalConnection>,
    /// Backend record mirrored by this node; `None` while pending create.
    #[serde(default)]
    pub origin: Option<RecordRef>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            secondary_label: None,
            tertiary_label: None,
            avatar_ref: None,
            comments: Vec::new(),
            is_active: true,
            position: Vec2::ZERO,
            functional_connections: Vec::new(),
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: RecordRef) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_secondary_label(mut self, label: impl Into<String>) -> Self {
        self.secondary_label = Some(label.into());
        self
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn is_pending(&self) -> bool {
        self.origin.is_none()
    }
}

/// Field changes from the node edit form. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tertiary_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl NodePatch {
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.secondary_label.is_none()
            && self.tertiary_label.is_none()
            && self.is_active.is_none()
    }

    pub fn apply(&self, node: &mut Node) {
        if let Some(label) = &self.label {
            node.label = label.clone();
        }
        if let Some(secondary) = &self.secondary_label {
            node.secondary_label = Some(secondary.clone());
        }
        if let Some(tertiary) = &self.tertiary_label {
            node.tertiary_label = Some(tertiary.clone());
        }
        if let Some(active) = self.is_active {
            node.is_active = active;
        }
    }
}

/// Which backend fact an edge mirrors. Deleting an edge means undoing that
/// fact: a relation record is deleted, a parent link is cleared on the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EdgeOrigin {
    Relation { id: i64 },
    DivisionParent { child: i64 },
    StaffDivision { staff: i64 },
    StaffManager { staff: i64 },
    OrganizationParent { child: i64 },
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub relation_kind: RelationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub origin: EdgeOrigin,
}

impl Edge {
    pub fn new(
        id: impl Into<EdgeId>,
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        relation_kind: RelationKind,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            relation_kind,
            label: None,
            origin: EdgeOrigin::Pending,
        }
    }

    pub fn with_origin(mut self, origin: EdgeOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn touches(&self, node: &NodeId) -> bool {
        &self.from == node || &self.to == node
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_ref_node_ids_follow_console_scheme() {
        assert_eq!(RecordRef::new(RecordKind::Staff, 7).node_id().0, "staff_7");
        assert_eq!(RecordRef::new(RecordKind::Division, 3).node_id().0, "div_3");
        assert_eq!(RecordRef::new(RecordKind::Organization, 12).node_id().0, "12");
    }

    #[test]
    fn test_node_without_origin_is_pending() {
        let node = Node::new("tmp_1", "New employee", NodeKind::Staff);
        assert!(node.is_pending());
        let node = node.with_origin(RecordRef::new(RecordKind::Staff, 1));
        assert!(!node.is_pending());
    }

    #[test]
    fn test_patch_only_touches_set_fields() {
        let mut node = Node::new("staff_1", "Ivanov I.", NodeKind::Staff).with_secondary_label("Engineer");
        let patch = NodePatch {
            label: Some("Ivanov I. P.".to_string()),
            ..NodePatch::default()
        };
        assert!(!patch.is_empty());
        patch.apply(&mut node);
        assert_eq!(node.label, "Ivanov I. P.");
        assert_eq!(node.secondary_label.as_deref(), Some("Engineer"));
        assert!(NodePatch::default().is_empty());
    }

    #[test]
    fn test_edge_touches_and_self_loop() {
        let edge = Edge::new("e1", "a", "b", RelationKind::Manager);
        assert!(edge.touches(&NodeId::from("a")));
        assert!(edge.touches(&NodeId::from("b")));
        assert!(!edge.touches(&NodeId::from("c")));
        assert!(!edge.is_self_loop());
        assert!(Edge::new("e2", "a", "a", RelationKind::Other).is_self_loop());
    }

    #[test]
    fn test_edge_origin_serializes_tagged() {
        let json = serde_json::to_value(EdgeOrigin::Relation { id: 4 }).unwrap();
        assert_eq!(json["type"], "relation");
        assert_eq!(json["id"], 4);
    }
}
