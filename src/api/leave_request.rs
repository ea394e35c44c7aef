use crate::auth::auth::{internal_error, AuthUser};
use crate::db::Store;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, PendingLeave};
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2026-03-01", format = "date", value_type = String)]
    pub start_date: chrono::NaiveDate,
    #[schema(example = "2026-03-03", format = "date", value_type = String)]
    pub end_date: chrono::NaiveDate,
    #[schema(example = "Test leave")]
    pub reason: String,
}

#[derive(Serialize, Deserialize, Copy, Clone, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResolveAction {
    Approve,
    Reject,
}

impl ResolveAction {
    fn target_status(self) -> LeaveStatus {
        match self {
            ResolveAction::Approve => LeaveStatus::Approved,
            ResolveAction::Reject => LeaveStatus::Rejected,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct ResolveLeave {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "approve")]
    pub action: ResolveAction,
}

/* =========================
Create leave request
========================= */
/// Any authenticated user may file a request; it always starts pending.
#[utoipa::path(
    post,
    path = "/requests",
    request_body = CreateLeave,
    responses(
        (status = 201, description = "Leave request created", body = Object, example = json!({
            "id": 1
        })),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Storage error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    store: web::Data<Store>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    if payload.reason.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Reason is required"
        })));
    }

    if payload.end_date < payload.start_date {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "end_date cannot be before start_date"
        })));
    }

    let id = store
        .insert_leave_request(
            auth.id,
            &payload.start_date.to_string(),
            &payload.end_date.to_string(),
            payload.reason.trim(),
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = auth.id, "Failed to create leave request");
            internal_error()
        })?;

    Ok(HttpResponse::Created().json(serde_json::json!({ "id": id })))
}

/* =========================
List own requests
========================= */
/// Every request the caller owns, any status, insertion order.
#[utoipa::path(
    get,
    path = "/requests",
    responses(
        (status = 200, description = "Caller's leave requests", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Storage error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_requests(
    auth: AuthUser,
    store: web::Data<Store>,
) -> actix_web::Result<impl Responder> {
    let requests = store
        .find_leave_requests_by_owner(auth.id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = auth.id, "Failed to list leave requests");
            internal_error()
        })?;

    Ok(HttpResponse::Ok().json(requests))
}

/* =========================
List pending requests (Admin)
========================= */
/// Admin view: pending requests across all owners, joined with the
/// owner's email. Resolved requests never show up here.
#[utoipa::path(
    get,
    path = "/admin/requests",
    responses(
        (status = 200, description = "Pending leave requests", body = [PendingLeave]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Storage error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn pending_requests(
    auth: AuthUser,
    store: web::Data<Store>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let requests = store
        .find_pending_leave_requests_with_owner_email()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list pending leave requests");
            internal_error()
        })?;

    Ok(HttpResponse::Ok().json(requests))
}

/* =========================
Resolve request (Admin)
========================= */
/// Moves a pending request to its terminal status. The update is guarded
/// on the current status, so a concurrent or repeated resolution affects
/// zero rows and reports a conflict.
#[utoipa::path(
    post,
    path = "/admin/requests",
    request_body = ResolveLeave,
    responses(
        (status = 200, description = "Request resolved", body = Object, example = json!({
            "status": "approved"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Request not found or already processed"),
        (status = 500, description = "Storage error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn resolve_request(
    auth: AuthUser,
    store: web::Data<Store>,
    payload: web::Json<ResolveLeave>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let status = payload.action.target_status();

    let rows = store
        .update_leave_request_status(payload.id, status)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id = payload.id, "Failed to resolve leave request");
            internal_error()
        })?;

    if rows == 0 {
        return Ok(HttpResponse::Conflict().json(serde_json::json!({
            "error": "Leave request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": status })))
}
