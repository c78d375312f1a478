use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::tournament::{FixtureView, GenerateFixturesRequest, ManualFixtureRequest},
    error::AppError,
    routes::session::CurrentSession,
    services::tournament_service,
    state::SharedState,
};

/// Fixture list endpoints. Every route answers with the full, resolved fixture list.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/matches/{id}/fixtures", post(add_fixture))
        .route("/matches/{id}/fixtures/generate", post(generate_fixtures))
        .route("/matches/{id}/fixtures/resolve", post(resolve_fixtures))
        .route("/matches/{id}/fixtures/next", post(next_fixture))
        .route("/matches/{id}/fixtures/{fid}", delete(delete_fixture))
}

/// Generate the fixtures of a format, replacing earlier fixtures of the same phase.
#[utoipa::path(
    post,
    path = "/matches/{id}/fixtures/generate",
    tag = "tournament",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier")
    ),
    request_body = GenerateFixturesRequest,
    responses((status = 200, description = "Fixture list", body = [FixtureView]))
)]
pub async fn generate_fixtures(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<GenerateFixturesRequest>,
) -> Result<Json<Vec<FixtureView>>, AppError> {
    Ok(Json(
        tournament_service::generate(&state, &session, id, payload.format).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/matches/{id}/fixtures",
    tag = "tournament",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier")
    ),
    request_body = ManualFixtureRequest,
    responses((status = 200, description = "Fixture list", body = [FixtureView]))
)]
pub async fn add_fixture(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<ManualFixtureRequest>>,
) -> Result<Json<Vec<FixtureView>>, AppError> {
    Ok(Json(
        tournament_service::add_fixture(&state, &session, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/matches/{id}/fixtures/{fid}",
    tag = "tournament",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier"),
        ("fid" = Uuid, Path, description = "Fixture identifier")
    ),
    responses((status = 200, description = "Fixture list", body = [FixtureView]))
)]
pub async fn delete_fixture(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path((id, fid)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<FixtureView>>, AppError> {
    Ok(Json(
        tournament_service::delete_fixture(&state, &session, id, fid).await?,
    ))
}

/// Store the teams that recorded games already determine in place of placeholders.
#[utoipa::path(
    post,
    path = "/matches/{id}/fixtures/resolve",
    tag = "tournament",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier")
    ),
    responses((status = 200, description = "Fixture list", body = [FixtureView]))
)]
pub async fn resolve_fixtures(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<FixtureView>>, AppError> {
    Ok(Json(
        tournament_service::persist_resolution(&state, &session, id).await?,
    ))
}

/// Append the next winner stays fixture.
#[utoipa::path(
    post,
    path = "/matches/{id}/fixtures/next",
    tag = "tournament",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier")
    ),
    responses(
        (status = 200, description = "Fixture list", body = [FixtureView]),
        (status = 409, description = "The last rotation fixture has no winner yet")
    )
)]
pub async fn next_fixture(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<FixtureView>>, AppError> {
    Ok(Json(
        tournament_service::next_winner_stays(&state, &session, id).await?,
    ))
}
