use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        board::MatchBoard,
        matches::{
            CreateMatchRequest, MatchListQuery, MatchModeRequest, MatchSummary, ResizeResponse,
            UpdateMatchRequest,
        },
        tournament::PhaseStandings,
    },
    error::AppError,
    routes::session::CurrentSession,
    services::{board_service, match_service},
    state::SharedState,
};

/// Match scheduling, lifecycle and read models.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/matches", get(list_matches).post(create_match))
        .route(
            "/matches/{id}",
            get(match_board).put(update_match).delete(delete_match),
        )
        .route("/matches/{id}/standings", get(match_standings))
        .route("/matches/{id}/lock", post(lock_match))
        .route("/matches/{id}/unlock", post(unlock_match))
        .route("/matches/{id}/cancel", post(cancel_match))
        .route("/matches/{id}/mode", put(set_mode))
        .route("/matches/{id}/teams", post(expand_teams).delete(shrink_teams))
        .route("/matches/{id}/teams/balance", post(balance_teams))
        .route("/matches/{id}/kits/shuffle", post(shuffle_kits))
}

#[utoipa::path(
    get,
    path = "/matches",
    tag = "matches",
    params(MatchListQuery),
    responses((status = 200, description = "Matches ordered by kick-off", body = [MatchSummary]))
)]
pub async fn list_matches(
    State(state): State<SharedState>,
    Query(query): Query<MatchListQuery>,
) -> Result<Json<Vec<MatchSummary>>, AppError> {
    Ok(Json(
        match_service::list_matches(&state, query.upcoming).await?,
    ))
}

/// Everything shown on a match page: teams, bench, capacity, fixtures and games.
#[utoipa::path(
    get,
    path = "/matches/{id}",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    responses(
        (status = 200, description = "Match board", body = MatchBoard),
        (status = 404, description = "Unknown match")
    )
)]
pub async fn match_board(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchBoard>, AppError> {
    Ok(Json(board_service::match_board(&state, id).await?))
}

/// League tables, one per phase when the match has fixtures.
#[utoipa::path(
    get,
    path = "/matches/{id}/standings",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    responses((status = 200, description = "Standings", body = [PhaseStandings]))
)]
pub async fn match_standings(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PhaseStandings>>, AppError> {
    Ok(Json(board_service::match_standings(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/matches",
    tag = "matches",
    params(("X-Profile-Id" = Uuid, Header, description = "Profile id of the caller")),
    request_body = CreateMatchRequest,
    responses(
        (status = 200, description = "Match scheduled", body = MatchSummary),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_match(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Valid(Json(payload)): Valid<Json<CreateMatchRequest>>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(
        match_service::create_match(&state, &session, payload).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/matches/{id}",
    tag = "matches",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier")
    ),
    request_body = UpdateMatchRequest,
    responses((status = 200, description = "Match updated", body = MatchSummary))
)]
pub async fn update_match(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpdateMatchRequest>>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(
        match_service::update_match(&state, &session, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/matches/{id}",
    tag = "matches",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier")
    ),
    responses((status = 204, description = "Match deleted"))
)]
pub async fn delete_match(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    match_service::delete_match(&state, &session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Close enrollment.
#[utoipa::path(
    post,
    path = "/matches/{id}/lock",
    tag = "matches",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier")
    ),
    responses((status = 200, description = "Match locked", body = MatchSummary))
)]
pub async fn lock_match(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(
        match_service::set_locked(&state, &session, id, true).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/matches/{id}/unlock",
    tag = "matches",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier")
    ),
    responses(
        (status = 200, description = "Match unlocked", body = MatchSummary),
        (status = 409, description = "Canceled matches stay locked")
    )
)]
pub async fn unlock_match(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(
        match_service::set_locked(&state, &session, id, false).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/matches/{id}/cancel",
    tag = "matches",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier")
    ),
    responses((status = 200, description = "Match canceled", body = MatchSummary))
)]
pub async fn cancel_match(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(
        match_service::cancel_match(&state, &session, id).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/matches/{id}/mode",
    tag = "matches",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier")
    ),
    request_body = MatchModeRequest,
    responses((status = 200, description = "Mode updated", body = MatchSummary))
)]
pub async fn set_mode(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<MatchModeRequest>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(
        match_service::set_mode(&state, &session, id, payload.mode).await?,
    ))
}

/// Add one team and the capacity to fill it.
#[utoipa::path(
    post,
    path = "/matches/{id}/teams",
    tag = "matches",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier")
    ),
    responses((status = 200, description = "Team added", body = ResizeResponse))
)]
pub async fn expand_teams(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
) -> Result<Json<ResizeResponse>, AppError> {
    Ok(Json(
        match_service::expand_teams(&state, &session, id).await?,
    ))
}

/// Remove the last team; its players go to the bench.
#[utoipa::path(
    delete,
    path = "/matches/{id}/teams",
    tag = "matches",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier")
    ),
    responses((status = 200, description = "Team removed", body = ResizeResponse))
)]
pub async fn shrink_teams(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
) -> Result<Json<ResizeResponse>, AppError> {
    Ok(Json(
        match_service::shrink_teams(&state, &session, id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/matches/{id}/teams/balance",
    tag = "matches",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier")
    ),
    responses((status = 200, description = "Teams balanced by rating", body = MatchBoard))
)]
pub async fn balance_teams(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchBoard>, AppError> {
    Ok(Json(
        match_service::balance_teams(&state, &session, id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/matches/{id}/kits/shuffle",
    tag = "matches",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier")
    ),
    responses((status = 200, description = "Kits shuffled", body = MatchSummary))
)]
pub async fn shuffle_kits(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(
        match_service::shuffle_kits(&state, &session, id).await?,
    ))
}
