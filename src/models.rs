use crate::model::role::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct SignupReq {
    #[schema(example = "e1@example.com", format = "email")]
    pub email: String,
    #[schema(example = "secret")]
    pub password: String,
    /// Optional; anything outside employee/admin becomes employee.
    #[schema(example = "employee")]
    pub role: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReq {
    #[schema(example = "e1@example.com", format = "email")]
    pub email: String,
    #[schema(example = "secret")]
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}
