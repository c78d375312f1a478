/// Team balancing by snake draft.
pub mod balance;
/// Read model combining everything shown on a match page.
pub mod board_service;
/// Capacity, quota and cost arithmetic.
pub mod capacity;
/// OpenAPI documentation generation.
pub mod documentation;
/// Enrollment flows and the optimistic payment and attendance toggles.
pub mod enrollment_service;
/// Field catalogue.
pub mod field_service;
/// Fixture generation for every tournament format.
pub mod fixtures;
/// Recording and correcting games.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Match lifecycle, capacity changes and kits.
pub mod match_service;
/// Placeholder resolution against recorded games.
pub mod placeholders;
/// Profiles, ranking and roles.
pub mod profile_service;
/// ELO to display rating mapping.
pub mod rating;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// League tables.
pub mod standings;
/// Storage connection supervisor with degraded mode handling.
pub mod storage_supervisor;
/// Fixture list maintenance.
pub mod tournament_service;
