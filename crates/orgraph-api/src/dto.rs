//! Wire shapes of the console's REST backend.
//!
//! Ids are assigned by the server. Creation payloads reuse the same structs
//! with `id == 0`, which is left out of the serialized body.

use serde::{Deserialize, Serialize};

fn is_unset(id: &i64) -> bool {
    *id == 0
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgType {
    #[serde(alias = "BOARD")]
    Board,
    #[serde(alias = "HOLDING")]
    Holding,
    #[serde(alias = "LEGAL_ENTITY")]
    LegalEntity,
    #[serde(alias = "LOCATION")]
    Location,
    #[serde(other)]
    Unknown,
}

impl OrgType {
    /// Query-parameter form accepted by the backend filter.
    pub fn as_query(&self) -> &'static str {
        match self {
            OrgType::Board => "BOARD",
            OrgType::Holding => "HOLDING",
            OrgType::LegalEntity => "LEGAL_ENTITY",
            OrgType::Location => "LOCATION",
            OrgType::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationDto {
    #[serde(default, skip_serializing_if = "is_unset")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub org_type: OrgType,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionDto {
    #[serde(default, skip_serializing_if = "is_unset")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i64>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffDto {
    #[serde(default, skip_serializing_if = "is_unset")]
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default)]
    pub division_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i64>,
    #[serde(default)]
    pub manager_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl StaffDto {
    /// Empty record for a new employee, split from a display name of the
    /// form `"Last First"`.
    pub fn from_display_name(name: &str) -> Self {
        let mut parts = name.split_whitespace();
        let last_name = parts.next().unwrap_or("").to_string();
        let first_name = parts.next().unwrap_or("").to_string();
        let middle_name = parts.next().map(str::to_string);
        Self {
            id: 0,
            first_name,
            last_name,
            middle_name,
            email: None,
            position: None,
            division_id: None,
            organization_id: None,
            manager_id: None,
            avatar_url: None,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalRelationDto {
    #[serde(default, skip_serializing_if = "is_unset")]
    pub id: i64,
    pub manager_id: i64,
    pub subordinate_id: i64,
    /// Kept as the raw backend string; parsed leniently by the mapper.
    pub relation_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}
