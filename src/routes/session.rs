use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{HeaderMap, Request, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    state::{SharedState, session::Session},
};

/// Header carrying the caller's profile id, issued by the auth provider.
pub const PROFILE_HEADER: &str = "x-profile-id";

/// Session of the caller, resolved from the `X-Profile-Id` header.
pub struct CurrentSession(pub Session);

async fn resolve(headers: &HeaderMap, state: &SharedState) -> Result<Session, AppError> {
    let raw = headers
        .get(PROFILE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing header `X-Profile-Id`".into()))?;
    let profile_id = Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::Unauthorized("header `X-Profile-Id` is not a valid id".into()))?;

    let repository = state.repository().await?;
    Ok(Session::load(&repository, profile_id).await?)
}

impl FromRequestParts<SharedState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(Self(session.clone()));
        }
        resolve(&parts.headers, state).await.map(Self)
    }
}

/// Reject callers that are not administrators and hand the loaded session to the handler.
pub async fn require_admin(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let session = resolve(req.headers(), &state).await?;
    session.require_admin()?;
    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}
