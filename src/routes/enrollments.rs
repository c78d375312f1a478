use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::enrollment::{EnrollRequest, EnrollmentSummary, FlagRequest, TeamAssignmentRequest},
    error::AppError,
    routes::session::CurrentSession,
    services::enrollment_service,
    state::SharedState,
};

/// Enrollment, payment and attendance endpoints of a match.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/matches/{id}/enrollments", post(enroll))
        .route("/matches/{id}/enrollments/me", delete(leave))
        .route("/matches/{id}/enrollments/{eid}", delete(remove))
        .route("/matches/{id}/enrollments/{eid}/paid", put(set_paid))
        .route("/matches/{id}/enrollments/{eid}/present", put(set_present))
        .route("/matches/{id}/enrollments/{eid}/excluded", put(set_excluded))
        .route("/matches/{id}/enrollments/{eid}/team", put(set_team))
}

/// Enroll the caller, or another player when the caller manages the match.
#[utoipa::path(
    post,
    path = "/matches/{id}/enrollments",
    tag = "enrollments",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the caller"),
        ("id" = Uuid, Path, description = "Match identifier")
    ),
    request_body = EnrollRequest,
    responses(
        (status = 200, description = "Player enrolled", body = EnrollmentSummary),
        (status = 409, description = "Match is locked, canceled or full, or the player is already enrolled")
    )
)]
pub async fn enroll(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
    payload: Option<Json<EnrollRequest>>,
) -> Result<Json<EnrollmentSummary>, AppError> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    Ok(Json(
        enrollment_service::enroll(&state, &session, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/matches/{id}/enrollments/me",
    tag = "enrollments",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the caller"),
        ("id" = Uuid, Path, description = "Match identifier")
    ),
    responses((status = 204, description = "Caller left the match"))
)]
pub async fn leave(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    enrollment_service::leave(&state, &session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/matches/{id}/enrollments/{eid}",
    tag = "enrollments",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier"),
        ("eid" = Uuid, Path, description = "Enrollment identifier")
    ),
    responses((status = 204, description = "Enrollment removed"))
)]
pub async fn remove(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path((id, eid)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    enrollment_service::remove(&state, &session, id, eid).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark the player as paid; unpaying also clears attendance.
#[utoipa::path(
    put,
    path = "/matches/{id}/enrollments/{eid}/paid",
    tag = "enrollments",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier"),
        ("eid" = Uuid, Path, description = "Enrollment identifier")
    ),
    request_body = FlagRequest,
    responses((status = 200, description = "Payment updated", body = EnrollmentSummary))
)]
pub async fn set_paid(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path((id, eid)): Path<(Uuid, Uuid)>,
    Json(payload): Json<FlagRequest>,
) -> Result<Json<EnrollmentSummary>, AppError> {
    Ok(Json(
        enrollment_service::set_paid(&state, &session, id, eid, payload.value).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/matches/{id}/enrollments/{eid}/present",
    tag = "enrollments",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier"),
        ("eid" = Uuid, Path, description = "Enrollment identifier")
    ),
    request_body = FlagRequest,
    responses(
        (status = 200, description = "Attendance updated", body = EnrollmentSummary),
        (status = 409, description = "Only paid players can be marked present")
    )
)]
pub async fn set_present(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path((id, eid)): Path<(Uuid, Uuid)>,
    Json(payload): Json<FlagRequest>,
) -> Result<Json<EnrollmentSummary>, AppError> {
    Ok(Json(
        enrollment_service::set_present(&state, &session, id, eid, payload.value).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/matches/{id}/enrollments/{eid}/excluded",
    tag = "enrollments",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier"),
        ("eid" = Uuid, Path, description = "Enrollment identifier")
    ),
    request_body = FlagRequest,
    responses((status = 200, description = "Exclusion updated", body = EnrollmentSummary))
)]
pub async fn set_excluded(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path((id, eid)): Path<(Uuid, Uuid)>,
    Json(payload): Json<FlagRequest>,
) -> Result<Json<EnrollmentSummary>, AppError> {
    Ok(Json(
        enrollment_service::set_excluded(&state, &session, id, eid, payload.value).await?,
    ))
}

/// Move a player to a team, or to the bench with `null` or `0`.
#[utoipa::path(
    put,
    path = "/matches/{id}/enrollments/{eid}/team",
    tag = "enrollments",
    params(
        ("X-Profile-Id" = Uuid, Header, description = "Profile id of the match manager"),
        ("id" = Uuid, Path, description = "Match identifier"),
        ("eid" = Uuid, Path, description = "Enrollment identifier")
    ),
    request_body = TeamAssignmentRequest,
    responses(
        (status = 200, description = "Team updated", body = EnrollmentSummary),
        (status = 409, description = "Team is full or the player is excluded")
    )
)]
pub async fn set_team(
    State(state): State<SharedState>,
    CurrentSession(session): CurrentSession,
    Path((id, eid)): Path<(Uuid, Uuid)>,
    Valid(Json(payload)): Valid<Json<TeamAssignmentRequest>>,
) -> Result<Json<EnrollmentSummary>, AppError> {
    Ok(Json(
        enrollment_service::set_team(&state, &session, id, eid, payload.team()).await?,
    ))
}
