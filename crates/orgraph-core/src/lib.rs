use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod comment;
pub mod geometry;
pub mod model;
pub mod positions;

pub use comment::Comment;
pub use geometry::Vec2;
pub use model::{
    Edge, EdgeOrigin, FunctionalConnection, Node, NodePatch, RecordKind, RecordRef,
};
pub use positions::{NoSavedPositions, PositionMap, PositionSource};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EdgeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Error type for enum conversion failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnumConversionError {
    #[error("Invalid StructureType value: {0}")]
    InvalidStructureType(String),
    #[error("Invalid NodeKind value: {0}")]
    InvalidNodeKind(String),
}

/// A partition of the node/edge id space. Each view has its own layout and
/// local storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StructureType {
    #[default]
    Business,
    Legal,
    Territorial,
}

impl StructureType {
    pub const ALL: [StructureType; 3] = [
        StructureType::Business,
        StructureType::Legal,
        StructureType::Territorial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StructureType::Business => "business",
            StructureType::Legal => "legal",
            StructureType::Territorial => "territorial",
        }
    }
}

impl fmt::Display for StructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StructureType {
    type Err = EnumConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "business" => Ok(StructureType::Business),
            "legal" => Ok(StructureType::Legal),
            "territorial" => Ok(StructureType::Territorial),
            _ => Err(EnumConversionError::InvalidStructureType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    OrganizationalUnit,
    Staff,
    LegalEntity,
    Location,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::OrganizationalUnit => "organizational_unit",
            NodeKind::Staff => "staff",
            NodeKind::LegalEntity => "legal_entity",
            NodeKind::Location => "location",
        }
    }

    /// Kind used for nodes created from the "add node" control in a view.
    pub fn default_for(structure: StructureType) -> Self {
        match structure {
            StructureType::Business => NodeKind::Staff,
            StructureType::Legal => NodeKind::LegalEntity,
            StructureType::Territorial => NodeKind::Location,
        }
    }
}

impl FromStr for NodeKind {
    type Err = EnumConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "organizational_unit" | "division" | "business" => Ok(NodeKind::OrganizationalUnit),
            "staff" => Ok(NodeKind::Staff),
            "legal_entity" | "legal" => Ok(NodeKind::LegalEntity),
            "location" | "territorial" => Ok(NodeKind::Location),
            _ => Err(EnumConversionError::InvalidNodeKind(s.to_string())),
        }
    }
}

/// Category of an edge. The generic organization graph uses `Manager`,
/// `Department`, `Functional` and `Other`; staff functional relations add
/// the remaining kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Manager,
    Department,
    Functional,
    Administrative,
    Project,
    Territorial,
    Mentoring,
    Strategic,
    Governance,
    Advisory,
    Supervisory,
    #[default]
    #[serde(other)]
    Other,
}

/// Which visibility overlay an edge belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeCategory {
    Administrative,
    Functional,
}

impl RelationKind {
    pub const ALL: [RelationKind; 12] = [
        RelationKind::Manager,
        RelationKind::Department,
        RelationKind::Functional,
        RelationKind::Administrative,
        RelationKind::Project,
        RelationKind::Territorial,
        RelationKind::Mentoring,
        RelationKind::Strategic,
        RelationKind::Governance,
        RelationKind::Advisory,
        RelationKind::Supervisory,
        RelationKind::Other,
    ];

    /// Lenient parse of backend strings (`"FUNCTIONAL"`, `"manager"`, ...).
    /// Unknown values fall back to `Other`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "manager" => RelationKind::Manager,
            "department" => RelationKind::Department,
            "functional" => RelationKind::Functional,
            "administrative" => RelationKind::Administrative,
            "project" => RelationKind::Project,
            "territorial" => RelationKind::Territorial,
            "mentoring" => RelationKind::Mentoring,
            "strategic" => RelationKind::Strategic,
            "governance" => RelationKind::Governance,
            "advisory" => RelationKind::Advisory,
            "supervisory" => RelationKind::Supervisory,
            _ => RelationKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Manager => "manager",
            RelationKind::Department => "department",
            RelationKind::Functional => "functional",
            RelationKind::Administrative => "administrative",
            RelationKind::Project => "project",
            RelationKind::Territorial => "territorial",
            RelationKind::Mentoring => "mentoring",
            RelationKind::Strategic => "strategic",
            RelationKind::Governance => "governance",
            RelationKind::Advisory => "advisory",
            RelationKind::Supervisory => "supervisory",
            RelationKind::Other => "other",
        }
    }

    pub fn category(&self) -> EdgeCategory {
        match self {
            RelationKind::Manager
            | RelationKind::Department
            | RelationKind::Administrative
            | RelationKind::Territorial
            | RelationKind::Governance => EdgeCategory::Administrative,
            RelationKind::Functional
            | RelationKind::Project
            | RelationKind::Mentoring
            | RelationKind::Strategic
            | RelationKind::Advisory
            | RelationKind::Supervisory
            | RelationKind::Other => EdgeCategory::Functional,
        }
    }

    /// Hierarchical kinds read as "source manages/contains target" and drive
    /// the tree layout.
    pub fn is_hierarchical(&self) -> bool {
        self.category() == EdgeCategory::Administrative
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_kind_parse_is_lenient() {
        assert_eq!(RelationKind::parse("FUNCTIONAL"), RelationKind::Functional);
        assert_eq!(RelationKind::parse(" manager "), RelationKind::Manager);
        assert_eq!(RelationKind::parse("ADVISORY"), RelationKind::Advisory);
        assert_eq!(RelationKind::parse("supervisory"), RelationKind::Supervisory);
        assert_eq!(RelationKind::parse("sideways"), RelationKind::Other);
        assert_eq!(RelationKind::parse(""), RelationKind::Other);
    }

    #[test]
    fn test_relation_kind_round_trips_through_as_str() {
        for kind in RelationKind::ALL {
            assert_eq!(RelationKind::parse(kind.as_str()), kind);
        }
    }

    #[test]
    fn test_relation_kind_serde_unknown_is_other() {
        let kind: RelationKind = serde_json::from_str("\"whatever\"").unwrap();
        assert_eq!(kind, RelationKind::Other);
        let kind: RelationKind = serde_json::from_str("\"mentoring\"").unwrap();
        assert_eq!(kind, RelationKind::Mentoring);
    }

    #[test]
    fn test_relation_categories() {
        assert_eq!(RelationKind::Manager.category(), EdgeCategory::Administrative);
        assert_eq!(RelationKind::Territorial.category(), EdgeCategory::Administrative);
        assert_eq!(RelationKind::Functional.category(), EdgeCategory::Functional);
        assert_eq!(RelationKind::Other.category(), EdgeCategory::Functional);
        assert_eq!(RelationKind::Supervisory.category(), EdgeCategory::Functional);
        assert!(RelationKind::Department.is_hierarchical());
        assert!(!RelationKind::Mentoring.is_hierarchical());
    }

    #[test]
    fn test_structure_type_from_str() {
        assert_eq!("Legal".parse::<StructureType>(), Ok(StructureType::Legal));
        assert!("nope".parse::<StructureType>().is_err());
        assert_eq!(StructureType::Territorial.to_string(), "territorial");
    }

    #[test]
    fn test_node_kind_default_for_structure() {
        assert_eq!(NodeKind::default_for(StructureType::Business), NodeKind::Staff);
        assert_eq!(NodeKind::default_for(StructureType::Legal), NodeKind::LegalEntity);
        assert_eq!("division".parse::<NodeKind>(), Ok(NodeKind::OrganizationalUnit));
    }
}
