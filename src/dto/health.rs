use serde::Serialize;
use utoipa::ToSchema;

/// Body of `/healthcheck`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" while storage answers, "degraded" otherwise.
    pub status: String,
    /// Whether the last storage probe succeeded.
    pub storage_reachable: bool,
}

impl HealthResponse {
    pub fn from_probe(storage_reachable: bool) -> Self {
        let status = if storage_reachable { "ok" } else { "degraded" };
        Self {
            status: status.to_owned(),
            storage_reachable,
        }
    }
}
