use crate::{DivisionDto, FunctionalRelationDto, OrganizationDto, StaffDto};
use orgraph_core::{RecordKind, RecordRef};
use serde::{Deserialize, Serialize};

/// Any record the graph layer exchanges with the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    Organization(OrganizationDto),
    Division(DivisionDto),
    Staff(StaffDto),
    FunctionalRelation(FunctionalRelationDto),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Organization(_) => RecordKind::Organization,
            Record::Division(_) => RecordKind::Division,
            Record::Staff(_) => RecordKind::Staff,
            Record::FunctionalRelation(_) => RecordKind::FunctionalRelation,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Record::Organization(r) => r.id,
            Record::Division(r) => r.id,
            Record::Staff(r) => r.id,
            Record::FunctionalRelation(r) => r.id,
        }
    }

    pub fn set_id(&mut self, id: i64) {
        match self {
            Record::Organization(r) => r.id = id,
            Record::Division(r) => r.id = id,
            Record::Staff(r) => r.id = id,
            Record::FunctionalRelation(r) => r.id = id,
        }
    }

    pub fn record_ref(&self) -> RecordRef {
        RecordRef::new(self.kind(), self.id())
    }

    /// Decode a JSON body knowing which collection it came from. The untagged
    /// representation alone is ambiguous between some shapes.
    pub fn from_json(kind: RecordKind, value: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match kind {
            RecordKind::Organization => Record::Organization(serde_json::from_value(value)?),
            RecordKind::Division => Record::Division(serde_json::from_value(value)?),
            RecordKind::Staff => Record::Staff(serde_json::from_value(value)?),
            RecordKind::FunctionalRelation => {
                Record::FunctionalRelation(serde_json::from_value(value)?)
            }
        })
    }

    pub fn as_staff(&self) -> Option<&StaffDto> {
        match self {
            Record::Staff(staff) => Some(staff),
            _ => None,
        }
    }

    pub fn as_relation(&self) -> Option<&FunctionalRelationDto> {
        match self {
            Record::FunctionalRelation(relation) => Some(relation),
            _ => None,
        }
    }
}
