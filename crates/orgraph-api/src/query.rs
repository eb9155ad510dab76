use crate::OrgType;
use serde::{Deserialize, Serialize};

/// Filters supported by the backend list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub organization_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub include_inactive: bool,
    pub org_type: Option<OrgType>,
}

impl ListQuery {
    pub fn for_organization(organization_id: i64) -> Self {
        Self {
            organization_id: Some(organization_id),
            ..Self::default()
        }
    }

    pub fn with_org_type(mut self, org_type: OrgType) -> Self {
        self.org_type = Some(org_type);
        self
    }

    pub fn including_inactive(mut self) -> Self {
        self.include_inactive = true;
        self
    }

    /// Query-string pairs, in a stable order.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.organization_id {
            pairs.push(("organization_id", id.to_string()));
        }
        if let Some(id) = self.parent_id {
            pairs.push(("parent_id", id.to_string()));
        }
        if self.include_inactive {
            pairs.push(("include_inactive", "true".to_string()));
        }
        if let Some(org_type) = self.org_type {
            pairs.push(("org_type", org_type.as_query().to_string()));
        }
        pairs
    }
}
