use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::game::{GameRequest, GameSummary},
    error::AppError,
    routes::session::CurrentSession,
    services::game_service,
    state::SharedState,
};

/// Routes recording and correcting game results.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/matches/{id}/games", get(list_games).post(record_game))
        .route("/games/{id}", put(update_game).delete(delete_game))
}

#[utoipa::path(
    get,
    path = "/matches/{id}/games",
    tag = "games",
    params(("id" = Uuid, Path, description = "Match identifier")),
    responses((status = 200, description = "Recorded games", body = [GameSummary]))
)]
pub async fn list_games(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<GameSummary>>, AppError> {
    Ok(Json(game_service::list_games(&state, id).await?))
}

/// Record a finished game, optionally linked to a fixture.
#[utoipa::path(
    post,
    path = "/matches/{id}/games",
    tag = "games",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier")
    ),
    request_body = GameRequest,
    responses(
        (status = 200, description = "Game recorded", body = GameSummary),
        (status = 400, description = "Teams, scores or scorers are inconsistent")
    )
)]
pub async fn record_game(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<GameRequest>>,
) -> Result<Json<GameSummary>, AppError> {
    let summary = game_service::record_game(&state, &session, id, payload).await?;
    Ok(Json(summary))
}

#[utoipa::path(
    put,
    path = "/games/{id}",
    tag = "games",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Game identifier")
    ),
    request_body = GameRequest,
    responses((status = 200, description = "Game corrected", body = GameSummary))
)]
pub async fn update_game(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<GameRequest>>,
) -> Result<Json<GameSummary>, AppError> {
    let summary = game_service::update_game(&state, &session, id, payload).await?;
    Ok(Json(summary))
}

#[utoipa::path(
    delete,
    path = "/games/{id}",
    tag = "games",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Game identifier")
    ),
    responses((status = 204, description = "Game deleted"))
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    game_service::delete_game(&state, &session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
