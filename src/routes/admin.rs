use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{post, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        field::{FieldRequest, FieldSummary},
        profile::{ProfileSummary, RoleRequest},
    },
    error::AppError,
    routes::session::{CurrentSession, require_admin},
    services::{field_service, profile_service},
    state::SharedState,
};

/// Administration endpoints. Every route requires an administrator session.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/fields", post(create_field))
        .route("/admin/fields/{id}", put(update_field).delete(delete_field))
        .route("/admin/profiles/{id}/role", put(set_role))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

#[utoipa::path(
    post,
    path = "/admin/fields",
    tag = "admin",
    params(("X-Profile-Id" = Uuid, Header, description = "Profile id of an administrator")),
    request_body = FieldRequest,
    responses(
        (status = 200, description = "Field created", body = FieldSummary),
        (status = 403, description = "Caller is not an administrator")
    )
)]
pub async fn create_field(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Valid(Json(payload)): Valid<Json<FieldRequest>>,
) -> Result<Json<FieldSummary>, AppError> {
    Ok(Json(
        field_service::create_field(&state, &session, payload).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/admin/fields/{id}",
    tag = "admin",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of an administrator"),
        ("id" = Uuid, Path, description = "Field identifier")
    ),
    request_body = FieldRequest,
    responses((status = 200, description = "Field updated", body = FieldSummary))
)]
pub async fn update_field(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<FieldRequest>>,
) -> Result<Json<FieldSummary>, AppError> {
    Ok(Json(
        field_service::update_field(&state, &session, id, payload).await?,
    ))
}

/// Delete a field that has no matches scheduled.
#[utoipa::path(
    delete,
    path = "/admin/fields/{id}",
    tag = "admin",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of an administrator"),
        ("id" = Uuid, Path, description = "Field identifier")
    ),
    responses(
        (status = 204, description = "Field deleted"),
        (status = 409, description = "Matches are still scheduled on the field")
    )
)]
pub async fn delete_field(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    field_service::delete_field(&state, &session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Grant or revoke the administrator role. Super administrators only.
#[utoipa::path(
    put,
    path = "/admin/profiles/{id}/role",
    tag = "admin",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of a super administrator"),
        ("id" = Uuid, Path, description = "Profile to update")
    ),
    request_body = RoleRequest,
    responses((status = 200, description = "Role updated", body = ProfileSummary))
)]
pub async fn set_role(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<RoleRequest>,
) -> Result<Json<ProfileSummary>, AppError> {
    Ok(Json(
        profile_service::set_role(&state, &session, id, payload.is_admin).await?,
    ))
}
