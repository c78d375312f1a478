use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::profile::{ProfileSummary, RankingEntry, UpdateProfileRequest},
    error::AppError,
    routes::session::CurrentSession,
    services::profile_service,
    state::SharedState,
};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/profiles/me", get(me).put(update_me))
        .route("/profiles/me/refresh", post(refresh))
        .route("/profiles/ranking", get(ranking))
}

#[utoipa::path(
    get,
    path = "/profiles/me",
    tag = "profiles",
    params(("X-Profile-Id" = Uuid, Header, description = "Profile id of the caller")),
    responses(
        (status = 200, description = "Caller profile", body = ProfileSummary),
        (status = 401, description = "Missing or unknown profile")
    )
)]
pub async fn me(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<ProfileSummary>, AppError> {
    Ok(Json(profile_service::me(&state, &session).await?))
}

/// Reload the caller's profile and role from storage.
#[utoipa::path(
    post,
    path = "/profiles/me/refresh",
    tag = "profiles",
    params(("X-Profile-Id" = Uuid, Header, description = "Profile id of the caller")),
    responses((status = 200, description = "Fresh profile", body = ProfileSummary))
)]
pub async fn refresh(
    State(state): State<SharedState>,
    CurrentSession(mut session): CurrentSession,
) -> Result<Json<ProfileSummary>, AppError> {
    Ok(Json(profile_service::refresh(&state, &mut session).await?))
}

#[utoipa::path(
    put,
    path = "/profiles/me",
    tag = "profiles",
    params(("X-Profile-Id" = Uuid, Header, description = "Profile id of the caller")),
    request_body = UpdateProfileRequest,
    responses((status = 200, description = "Profile updated", body = ProfileSummary))
)]
pub async fn update_me(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Valid(Json(payload)): Valid<Json<UpdateProfileRequest>>,
) -> Result<Json<ProfileSummary>, AppError> {
    Ok(Json(
        profile_service::update_me(&state, &session, payload).await?,
    ))
}

/// Community ranking by display rating.
#[utoipa::path(
    get,
    path = "/profiles/ranking",
    tag = "profiles",
    responses((status = 200, description = "Ranking", body = [RankingEntry]))
)]
pub async fn ranking(State(state): State<SharedState>) -> Result<Json<Vec<RankingEntry>>, AppError> {
    Ok(Json(profile_service::ranking(&state).await?))
}
