use crate::{auth::jwt::verify_token, config::Config, model::role::Role};
use actix_web::{
    dev::Payload, error::InternalError, web::Data, FromRequest, HttpRequest, HttpResponse,
};
use futures::future::{ready, Ready};
use serde_json::json;

/// Verified caller identity, extracted per call. This is the access gate:
/// extraction answers "who is calling", `require_admin` answers "may they".
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

fn unauthorized(msg: &str) -> actix_web::Error {
    InternalError::from_response(
        msg.to_owned(),
        HttpResponse::Unauthorized().json(json!({ "error": msg })),
    )
    .into()
}

fn forbidden(msg: &str) -> actix_web::Error {
    InternalError::from_response(
        msg.to_owned(),
        HttpResponse::Forbidden().json(json!({ "error": msg })),
    )
    .into()
}

pub fn internal_error() -> actix_web::Error {
    InternalError::from_response(
        "Internal Server Error".to_owned(),
        HttpResponse::InternalServerError().json(json!({ "error": "Internal Server Error" })),
    )
    .into()
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let header = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
        {
            Some(h) => h,
            None => return ready(Err(unauthorized("Missing authorization header"))),
        };

        let token = match header.strip_prefix("Bearer ") {
            Some(t) if !t.is_empty() => t,
            _ => return ready(Err(unauthorized("Malformed authorization header"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )))
            }
        };

        match verify_token(token, &config.jwt_secret) {
            Ok(claims) => ready(Ok(AuthUser {
                id: claims.sub,
                email: claims.email,
                role: claims.role,
            })),
            Err(_) => ready(Err(unauthorized("Invalid token"))),
        }
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(forbidden("Admin only"))
        }
    }
}
