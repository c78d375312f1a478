use std::future::Future;

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::models::{EnrollmentEntity, GameEntity},
    dto::sse::{
        BannerEvent, BannerLevel, EnrollmentUpdatedEvent, GameRecordedEvent, MatchChange,
        MatchUpdatedEvent, ServerEvent,
    },
    error::ServiceError,
    state::SharedState,
};

pub(crate) const EVENT_SYSTEM_STATUS: &str = "system_status";
const EVENT_BANNER: &str = "banner";
const EVENT_MATCH_UPDATED: &str = "match.updated";
const EVENT_ENROLLMENT_UPDATED: &str = "enrollment.updated";
const EVENT_GAME_RECORDED: &str = "game.recorded";

/// Broadcast a status banner that clients hide after the configured delay.
pub fn broadcast_banner(
    state: &SharedState,
    level: BannerLevel,
    match_id: Option<Uuid>,
    message: impl Into<String>,
) {
    let dismiss_ms = u64::try_from(state.config().banner_dismiss().as_millis()).unwrap_or(u64::MAX);
    let payload = BannerEvent {
        level,
        message: message.into(),
        match_id,
        dismiss_ms,
    };
    send_public_event(state, EVENT_BANNER, &payload);
}

/// Surface a failed match operation as an error banner and hand the error back.
pub fn banner_on_error(state: &SharedState, match_id: Uuid, err: ServiceError) -> ServiceError {
    broadcast_banner(state, BannerLevel::Error, Some(match_id), err.to_string());
    err
}

/// Await a match operation, turning its failure into an error banner.
pub async fn reported<T, F>(state: &SharedState, match_id: Uuid, operation: F) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    operation
        .await
        .map_err(|err| banner_on_error(state, match_id, err))
}

/// Tell clients to refetch a match board.
pub fn broadcast_match_updated(state: &SharedState, match_id: Uuid, change: MatchChange) {
    send_public_event(
        state,
        EVENT_MATCH_UPDATED,
        &MatchUpdatedEvent { match_id, change },
    );
}

/// Broadcast the new state of one enrollment.
pub fn broadcast_enrollment_updated(state: &SharedState, enrollment: &EnrollmentEntity) {
    send_public_event(
        state,
        EVENT_ENROLLMENT_UPDATED,
        &EnrollmentUpdatedEvent::new(enrollment, false),
    );
}

/// Broadcast that an enrollment was removed from its match.
pub fn broadcast_enrollment_removed(state: &SharedState, enrollment: &EnrollmentEntity) {
    send_public_event(
        state,
        EVENT_ENROLLMENT_UPDATED,
        &EnrollmentUpdatedEvent::new(enrollment, true),
    );
}

/// Broadcast a recorded, corrected or deleted game.
pub fn broadcast_game(state: &SharedState, game: &GameEntity, deleted: bool) {
    let payload = GameRecordedEvent {
        match_id: game.match_id,
        game: game.clone().into(),
        deleted,
    };
    send_public_event(state, EVENT_GAME_RECORDED, &payload);
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.public_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize public SSE payload"),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::Value;

    use super::*;
    use crate::{config::AppConfig, state::AppState};

    #[tokio::test]
    async fn error_banner_carries_message_and_delay() {
        let state = AppState::new(AppConfig::default());
        let mut events = state.public_sse().subscribe();
        let match_id = Uuid::new_v4();

        let err = banner_on_error(
            &state,
            match_id,
            ServiceError::InvalidState("match is locked".into()),
        );
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let event = events.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some(EVENT_BANNER));
        let payload: Value = serde_json::from_str(&event.data).unwrap();
        assert_eq!(payload["level"], "error");
        assert_eq!(payload["message"], "invalid state: match is locked");
        assert_eq!(payload["match_id"], match_id.to_string());
        assert_eq!(
            payload["dismiss_ms"],
            AppConfig::default().banner_dismiss().as_millis() as u64
        );
        assert_ne!(AppConfig::default().banner_dismiss(), Duration::ZERO);
    }
}
