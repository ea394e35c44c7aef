use serde::{Deserialize, Serialize};

/// Row shape of the `users` table. The Any driver only decodes
/// i64/String-like columns, so role stays a string here and is parsed
/// where it matters.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}
