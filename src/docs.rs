use crate::api::leave_request::{CreateLeave, ResolveAction, ResolveLeave};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, PendingLeave};
use crate::model::role::Role;
use crate::models::{LoginReq, SignupReq, TokenResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Management API",
        version = "1.0.0",
        description = r#"
## Leave Management System

Employees sign up, log in, and submit leave requests; admins review the
pending queue and approve or reject them.

### 🔐 Security
All `/requests` endpoints are protected with **JWT Bearer authentication**.
The `/admin/requests` endpoints additionally require the **admin** role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::signup,
        crate::auth::handlers::login,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::my_requests,
        crate::api::leave_request::pending_requests,
        crate::api::leave_request::resolve_request
    ),
    components(
        schemas(
            SignupReq,
            LoginReq,
            TokenResponse,
            CreateLeave,
            ResolveLeave,
            ResolveAction,
            LeaveRequest,
            PendingLeave,
            LeaveStatus,
            Role
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Signup and login APIs"),
        (name = "Leave", description = "Leave request lifecycle APIs"),
    )
)]
pub struct ApiDoc;
