use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::field::{FieldSummary, QuotaResponse},
    error::AppError,
    services::field_service,
    state::SharedState,
};

/// Public field catalogue.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/fields", get(list_fields))
        .route("/fields/{id}", get(get_field))
        .route("/fields/{id}/quota", get(field_quota))
}

/// List every field, ordered by name.
#[utoipa::path(
    get,
    path = "/fields",
    tag = "fields",
    responses((status = 200, description = "Known fields", body = [FieldSummary]))
)]
pub async fn list_fields(
    State(state): State<SharedState>,
) -> Result<Json<Vec<FieldSummary>>, AppError> {
    Ok(Json(field_service::list_fields(&state).await?))
}

#[utoipa::path(
    get,
    path = "/fields/{id}",
    tag = "fields",
    params(("id" = Uuid, Path, description = "Field identifier")),
    responses(
        (status = 200, description = "Field found", body = FieldSummary),
        (status = 404, description = "Unknown field")
    )
)]
pub async fn get_field(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FieldSummary>, AppError> {
    Ok(Json(field_service::get_field(&state, id).await?))
}

/// Suggested per-player quota for one hour on the field.
#[utoipa::path(
    get,
    path = "/fields/{id}/quota",
    tag = "fields",
    params(("id" = Uuid, Path, description = "Field identifier")),
    responses((status = 200, description = "Suggested quota", body = QuotaResponse))
)]
pub async fn field_quota(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuotaResponse>, AppError> {
    Ok(Json(field_service::field_quota(&state, id).await?))
}
