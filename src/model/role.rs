use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Employee,
    Admin,
}

impl Role {
    /// Signup accepts an optional free-form role; anything outside
    /// employee/admin silently becomes employee.
    pub fn parse_or_employee(value: Option<&str>) -> Self {
        value
            .and_then(|v| Role::from_str(v).ok())
            .unwrap_or(Role::Employee)
    }
}
