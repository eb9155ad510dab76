mod dto;
mod errors;
mod query;
mod record;

pub use dto::{DivisionDto, FunctionalRelationDto, OrgType, OrganizationDto, StaffDto};
pub use errors::ApiError;
pub use query::ListQuery;
pub use record::Record;
