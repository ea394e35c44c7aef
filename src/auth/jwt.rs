use std::time::{SystemTime, UNIX_EPOCH};

use crate::{model::role::Role, models::Claims};
use jsonwebtoken::{decode, encode, errors::Error, DecodingKey, EncodingKey, Header, Validation};

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

/// Signs a stateless access token. There is no refresh mechanism; a new
/// login is required after expiry.
pub fn issue_token(
    user_id: i64,
    email: &str,
    role: Role,
    secret: &str,
    ttl: usize,
) -> Result<String, Error> {
    let claims = Claims {
        sub: user_id,
        email: email.to_owned(),
        role,
        exp: now() + ttl,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Expiry is enforced here and nowhere else.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}
