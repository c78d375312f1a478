use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for Pichanga Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::fields::list_fields,
        crate::routes::fields::get_field,
        crate::routes::fields::field_quota,
        crate::routes::matches::list_matches,
        crate::routes::matches::match_board,
        crate::routes::matches::match_standings,
        crate::routes::matches::create_match,
        crate::routes::matches::update_match,
        crate::routes::matches::delete_match,
        crate::routes::matches::lock_match,
        crate::routes::matches::unlock_match,
        crate::routes::matches::cancel_match,
        crate::routes::matches::set_mode,
        crate::routes::matches::expand_teams,
        crate::routes::matches::shrink_teams,
        crate::routes::matches::balance_teams,
        crate::routes::matches::shuffle_kits,
        crate::routes::enrollments::enroll,
        crate::routes::enrollments::leave,
        crate::routes::enrollments::remove,
        crate::routes::enrollments::set_paid,
        crate::routes::enrollments::set_present,
        crate::routes::enrollments::set_excluded,
        crate::routes::enrollments::set_team,
        crate::routes::games::list_games,
        crate::routes::games::record_game,
        crate::routes::games::update_game,
        crate::routes::games::delete_game,
        crate::routes::tournament::generate_fixtures,
        crate::routes::tournament::add_fixture,
        crate::routes::tournament::delete_fixture,
        crate::routes::tournament::resolve_fixtures,
        crate::routes::tournament::next_fixture,
        crate::routes::profiles::me,
        crate::routes::profiles::refresh,
        crate::routes::profiles::update_me,
        crate::routes::profiles::ranking,
        crate::routes::admin::create_field,
        crate::routes::admin::update_field,
        crate::routes::admin::delete_field,
        crate::routes::admin::set_role,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::field::FieldRequest,
            crate::dto::field::FieldSummary,
            crate::dto::field::QuotaResponse,
            crate::dto::matches::CreateMatchRequest,
            crate::dto::matches::UpdateMatchRequest,
            crate::dto::matches::MatchModeRequest,
            crate::dto::matches::MatchSummary,
            crate::dto::matches::TeamKit,
            crate::dto::matches::ResizeResponse,
            crate::dto::board::MatchBoard,
            crate::dto::board::TeamView,
            crate::dto::board::CapacityView,
            crate::dto::enrollment::EnrollRequest,
            crate::dto::enrollment::FlagRequest,
            crate::dto::enrollment::TeamAssignmentRequest,
            crate::dto::enrollment::EnrollmentSummary,
            crate::dto::game::GoalInput,
            crate::dto::game::GameRequest,
            crate::dto::game::GameSummary,
            crate::dto::tournament::GenerateFixturesRequest,
            crate::dto::tournament::ManualFixtureRequest,
            crate::dto::tournament::FixtureView,
            crate::dto::tournament::SlotView,
            crate::dto::tournament::StandingView,
            crate::dto::tournament::PhaseStandings,
            crate::dto::profile::ProfileSummary,
            crate::dto::profile::UpdateProfileRequest,
            crate::dto::profile::RoleRequest,
            crate::dto::profile::RankingEntry,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::BannerLevel,
            crate::dto::sse::BannerEvent,
            crate::dto::sse::MatchChange,
            crate::dto::sse::MatchUpdatedEvent,
            crate::dto::sse::EnrollmentUpdatedEvent,
            crate::dto::sse::GameRecordedEvent,
            crate::services::fixtures::FixtureFormat,
            crate::state::kits::Kit,
            crate::state::tournament::MatchMode,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "events", description = "Server-sent events streams"),
        (name = "fields", description = "Field catalogue"),
        (name = "matches", description = "Match scheduling, lifecycle and read models"),
        (name = "enrollments", description = "Enrollment, payment and attendance"),
        (name = "games", description = "Game results"),
        (name = "tournament", description = "Fixture lists and placeholders"),
        (name = "profiles", description = "Profiles and ranking"),
        (name = "admin", description = "Administration"),
    )
)]
pub struct ApiDoc;
