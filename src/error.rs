use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    services::{capacity::CapacityError, fixtures::FixtureError},
    state::board::{CommitError, PlanError, RollbackError},
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Caller could not be identified.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Caller is known but lacks the required role.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// The backend answered with something the service cannot use.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable { .. } => ServiceError::Unavailable(err),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<FixtureError> for ServiceError {
    fn from(err: FixtureError) -> Self {
        match err {
            FixtureError::NoRotation | FixtureError::Undecided(_) => {
                ServiceError::InvalidState(err.to_string())
            }
            other => ServiceError::InvalidInput(other.to_string()),
        }
    }
}

impl From<CapacityError> for ServiceError {
    fn from(err: CapacityError) -> Self {
        match err {
            CapacityError::NoPlayersPerTeam => ServiceError::Internal(err.to_string()),
            other => ServiceError::InvalidState(other.to_string()),
        }
    }
}

impl From<PlanError> for ServiceError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::UnknownBoard(match_id) => {
                ServiceError::InvalidState(format!("board of match {match_id} is not loaded"))
            }
            PlanError::UnknownEnrollment(id) => {
                ServiceError::NotFound(format!("enrollment {id} not found"))
            }
            PlanError::AlreadyPending(id) => {
                ServiceError::InvalidState(format!("enrollment {id} has an update in flight"))
            }
        }
    }
}

impl From<CommitError> for ServiceError {
    fn from(err: CommitError) -> Self {
        match err {
            CommitError::UnknownBoard(match_id) => {
                ServiceError::InvalidState(format!("board of match {match_id} was dropped"))
            }
            CommitError::UnknownPlan(_) => {
                ServiceError::InvalidState("pending update does not exist anymore".into())
            }
        }
    }
}

impl From<RollbackError> for ServiceError {
    fn from(err: RollbackError) -> Self {
        match err {
            RollbackError::UnknownBoard(match_id) => {
                ServiceError::InvalidState(format!("board of match {match_id} was dropped"))
            }
            RollbackError::UnknownPlan(_) => {
                ServiceError::InvalidState("pending update does not exist anymore".into())
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Authenticated caller without the required role.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("storage unavailable".into()),
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::Forbidden(message) => AppError::Forbidden(message),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Internal(message) => AppError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_status_codes() {
        let cases = [
            (ServiceError::Degraded, StatusCode::SERVICE_UNAVAILABLE),
            (
                ServiceError::Forbidden("admins only".into()),
                StatusCode::FORBIDDEN,
            ),
            (
                FixtureError::SameTeam.into(),
                StatusCode::BAD_REQUEST,
            ),
            (FixtureError::NoRotation.into(), StatusCode::CONFLICT),
            (CapacityError::AtMaximum.into(), StatusCode::CONFLICT),
            (
                PlanError::AlreadyPending(uuid::Uuid::nil()).into(),
                StatusCode::CONFLICT,
            ),
        ];

        for (err, expected) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
