use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::EnrollmentEntity,
    dto::game::GameSummary,
    state::kits::TeamId,
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream.
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}

/// Severity of a status banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BannerLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Serialize, ToSchema)]
/// Transient message clients show on top of the match screen.
pub struct BannerEvent {
    pub level: BannerLevel,
    pub message: String,
    /// Match the banner refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<Uuid>,
    /// Milliseconds after which clients hide the banner.
    pub dismiss_ms: u64,
}

/// What happened to a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchChange {
    Created,
    Updated,
    Deleted,
    Teams,
    Fixtures,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a match or its structure changed; clients refetch the board.
pub struct MatchUpdatedEvent {
    pub match_id: Uuid,
    pub change: MatchChange,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a single enrollment changed.
pub struct EnrollmentUpdatedEvent {
    pub match_id: Uuid,
    pub enrollment_id: Uuid,
    pub player_id: Uuid,
    pub paid: bool,
    pub is_present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamId>,
    pub is_excluded: bool,
    /// Set when the enrollment was removed.
    pub removed: bool,
}

impl EnrollmentUpdatedEvent {
    pub fn new(enrollment: &EnrollmentEntity, removed: bool) -> Self {
        Self {
            match_id: enrollment.match_id,
            enrollment_id: enrollment.id,
            player_id: enrollment.player_id,
            paid: enrollment.paid,
            is_present: enrollment.is_present,
            team: enrollment.team(),
            is_excluded: enrollment.is_excluded,
            removed,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a game was recorded, corrected or deleted.
pub struct GameRecordedEvent {
    pub match_id: Uuid,
    pub game: GameSummary,
    pub deleted: bool,
}
