use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{FieldEntity, FieldValues},
    dto::{format_timestamp, validation::validate_not_blank},
};

/// Payload used to create or replace a field.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct FieldRequest {
    #[validate(length(min = 1, max = 80), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(range(min = 1, max = 11))]
    pub players_per_team: u8,
    pub price_per_hour: u32,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[serde(default)]
    #[validate(length(max = 120))]
    pub contact: Option<String>,
}

impl From<FieldRequest> for FieldValues {
    fn from(request: FieldRequest) -> Self {
        Self {
            name: request.name.trim().to_owned(),
            players_per_team: request.players_per_team,
            price_per_hour: request.price_per_hour,
            address: request.address,
            contact: request.contact,
        }
    }
}

/// Field as exposed by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldSummary {
    pub id: Uuid,
    pub name: String,
    pub players_per_team: u8,
    pub price_per_hour: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub created_at: String,
}

impl From<FieldEntity> for FieldSummary {
    fn from(field: FieldEntity) -> Self {
        Self {
            id: field.id,
            name: field.name,
            players_per_team: field.players_per_team,
            price_per_hour: field.price_per_hour,
            address: field.address,
            contact: field.contact,
            created_at: format_timestamp(field.created_at),
        }
    }
}

/// Suggested per-player share of one hour on a field.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuotaResponse {
    pub field_id: Uuid,
    pub players_per_team: u8,
    pub price_per_hour: u32,
    /// `ceil(price_per_hour / (2 * players_per_team))`.
    pub suggested_quota: u32,
}
