use crate::{
    auth::{
        jwt::issue_token,
        password::{hash_password, verify_password},
    },
    config::Config,
    db::{Store, StoreError},
    model::role::Role,
    models::{LoginReq, SignupReq, TokenResponse},
};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tracing::{debug, error, info, instrument};

/// User signup handler
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupReq,
    responses(
        (status = 201, description = "User created", body = Object, example = json!({
            "id": 1,
            "role": "employee"
        })),
        (status = 400, description = "Missing email or password"),
        (status = 409, description = "Email already exists"),
        (status = 500, description = "Storage error")
    ),
    tag = "Auth"
)]
pub async fn signup(body: web::Json<SignupReq>, store: web::Data<Store>) -> impl Responder {
    let email = body.email.trim();

    if email.is_empty() || body.password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Email and password required"
        }));
    }

    let role = Role::parse_or_employee(body.role.as_deref());

    let hashed = match hash_password(&body.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Password hashing failed");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Internal Server Error"
            }));
        }
    };

    match store.insert_user(email, &hashed, role).await {
        Ok(id) => HttpResponse::Created().json(json!({ "id": id, "role": role })),
        Err(StoreError::DuplicateEmail) => HttpResponse::Conflict().json(json!({
            "error": "Email already exists"
        })),
        Err(StoreError::Sqlx(e)) => {
            error!(error = %e, "Failed to register user");
            HttpResponse::InternalServerError().json(json!({
                "error": "Internal Server Error"
            }))
        }
    }
}

/// User login handler
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Storage error")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(store, config, body),
    fields(email = %body.email)
)]
pub async fn login(
    body: web::Json<LoginReq>,
    store: web::Data<Store>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if body.email.trim().is_empty() || body.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().json(json!({
            "error": "Email and password required"
        }));
    }

    debug!("Fetching user from storage");

    let user = match store.find_user_by_email(&body.email).await {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().json(json!({ "error": "Invalid credentials" }));
        }
        Err(e) => {
            error!(error = %e, "Storage error while fetching user");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Internal Server Error"
            }));
        }
    };

    debug!("Verifying password");

    if let Err(e) = verify_password(&body.password, &user.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().json(json!({ "error": "Invalid credentials" }));
    }

    debug!("Issuing access token");

    let role = Role::parse_or_employee(Some(&user.role));
    let token = match issue_token(
        user.id,
        &user.email,
        role,
        &config.jwt_secret,
        config.token_ttl,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to sign token");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Internal Server Error"
            }));
        }
    };

    info!("Login successful");

    HttpResponse::Ok().json(TokenResponse { token })
}
