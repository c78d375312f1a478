use axum::Router;

use crate::state::SharedState;

pub mod admin;
pub mod docs;
pub mod enrollments;
pub mod fields;
pub mod games;
pub mod health;
pub mod matches;
pub mod profiles;
pub mod session;
pub mod sse;
pub mod tournament;

/// Compose every route tree and bind the shared state.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(fields::router())
        .merge(matches::router())
        .merge(enrollments::router())
        .merge(games::router())
        .merge(tournament::router())
        .merge(profiles::router())
        .merge(admin::router(state.clone()));

    api_router.merge(docs::router()).with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::services::field_service::tests::{memory_state, session};

    async fn send(
        app: Router<()>,
        method: &str,
        uri: &str,
        profile: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(profile) = profile {
            builder = builder.header(session::PROFILE_HEADER, profile.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn field_body(name: &str) -> Value {
        json!({ "name": name, "players_per_team": 5, "price_per_hour": 1000 })
    }

    #[tokio::test]
    async fn healthcheck_reports_storage() {
        let state = memory_state().await;
        let (status, body) = send(router(state), "GET", "/healthcheck", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn profile_header_is_required() {
        let state = memory_state().await;
        let (status, _) = send(router(state.clone()), "GET", "/profiles/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            router(state),
            "GET",
            "/profiles/me",
            Some(Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_routes_reject_players() {
        let state = memory_state().await;
        let admin = session(&state, "Ana Torres", true).await;
        let player = session(&state, "Beto Ruiz", false).await;

        let (status, _) = send(
            router(state.clone()),
            "POST",
            "/admin/fields",
            Some(player.profile_id()),
            Some(field_body("Cancha Sur")),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            router(state.clone()),
            "POST",
            "/admin/fields",
            Some(admin.profile_id()),
            Some(field_body("   ")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, created) = send(
            router(state.clone()),
            "POST",
            "/admin/fields",
            Some(admin.profile_id()),
            Some(field_body("Cancha Sur")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["name"], "Cancha Sur");

        let (status, listed) = send(router(state), "GET", "/fields", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn players_enroll_through_the_api() {
        let state = memory_state().await;
        let admin = session(&state, "Ana Torres", true).await;
        let player = session(&state, "Beto Ruiz", false).await;

        let (_, field) = send(
            router(state.clone()),
            "POST",
            "/admin/fields",
            Some(admin.profile_id()),
            Some(field_body("Cancha Sur")),
        )
        .await;
        let (status, scheduled) = send(
            router(state.clone()),
            "POST",
            "/matches",
            Some(player.profile_id()),
            Some(json!({
                "field_id": field["id"],
                "starts_at": "2030-05-01T20:00:00Z",
                "duration_minutes": 60,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(scheduled["max_players"], 10);
        let match_id = scheduled["id"].as_str().unwrap().to_owned();

        let (status, enrollment) = send(
            router(state.clone()),
            "POST",
            &format!("/matches/{match_id}/enrollments"),
            Some(player.profile_id()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(enrollment["display_name"], "Beto");

        let (status, _) = send(
            router(state.clone()),
            "POST",
            &format!("/matches/{match_id}/enrollments"),
            Some(player.profile_id()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, board) = send(
            router(state),
            "GET",
            &format!("/matches/{match_id}"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(board["bench"].as_array().map(Vec::len), Some(1));
    }
}
