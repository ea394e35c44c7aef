use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// pending is the only non-terminal state; approved/rejected never
/// transition again.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 7)]
    pub user_id: i64,
    #[schema(example = "2026-03-01", format = "date", value_type = String)]
    pub start_date: String,
    #[schema(example = "2026-03-03", format = "date", value_type = String)]
    pub end_date: String,
    #[schema(example = "Test leave")]
    pub reason: String,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(example = "2026-03-01 09:00:00")]
    pub created_at: String,
}

/// Pending row joined with the owner's email, as served to admins.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PendingLeave {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 7)]
    pub user_id: i64,
    #[schema(example = "2026-03-01", format = "date", value_type = String)]
    pub start_date: String,
    #[schema(example = "2026-03-03", format = "date", value_type = String)]
    pub end_date: String,
    #[schema(example = "Test leave")]
    pub reason: String,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(example = "2026-03-01 09:00:00")]
    pub created_at: String,
    #[schema(example = "e1@example.com")]
    pub email: String,
}
