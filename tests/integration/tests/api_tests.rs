//! API Integration Tests
//!
//! Every test starts its own server over the scripted directory, static
//! content and an in-memory settings store; no external services are needed.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use std::time::Duration;

use integration_tests::{
    assert_json, assert_status, error_code, TestServer, TestSetup, SCENARIO_DAY_KEY,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

fn ids(view: &Value, field: &str) -> Vec<String> {
    view[field]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().or_else(|| item["id"].as_str()))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

async fn open_panel(server: &TestServer, team: &str) -> (String, Value) {
    let response = server
        .post("/api/v1/panels", &json!({ "projectId": "proj", "contextTeamId": team }))
        .await
        .unwrap();
    let view: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    (view["sessionId"].as_str().unwrap().to_string(), view)
}

async fn open_settings(server: &TestServer, team: &str) -> (String, Value) {
    let response = server
        .post("/api/v1/settings", &json!({ "projectId": "proj", "teamId": team }))
        .await
        .unwrap();
    let view: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    (view["sessionId"].as_str().unwrap().to_string(), view)
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Team Tests
// ============================================================================

#[tokio::test]
async fn test_teams_sorted_with_default() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/api/v1/projects/proj/teams").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(ids(&body, "teams"), vec!["team-design", "team-platform"]);
    assert_eq!(body["defaultTeamId"], "team-design");

    let response = server
        .get("/api/v1/projects/proj/teams?contextTeamId=team-platform")
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["defaultTeamId"], "team-platform");
}

// ============================================================================
// Panel Tests
// ============================================================================

#[tokio::test]
async fn test_panel_opens_with_expanded_roster_and_daily_content() {
    let server = TestServer::start().await.unwrap();
    let (_, view) = open_panel(&server, "team-platform").await;

    assert_eq!(view["teamId"], "team-platform");
    assert_eq!(view["dayKey"], SCENARIO_DAY_KEY);
    assert_eq!(ids(&view, "members"), vec!["u-ann", "u-ben", "u-cat"]);
    assert_eq!(view["totalMembers"], 3);
    assert_eq!(view["question"]["text"], "Favourite snack?");
    assert_eq!(view["holiday"], "World Food Day");

    let stored = server.stored_settings();
    assert_eq!(stored["_randomizerData"][SCENARIO_DAY_KEY]["question"]["id"], 1);
    assert_eq!(stored["_randomizerData"][SCENARIO_DAY_KEY]["hotd"], "World Food Day");
}

#[tokio::test]
async fn test_panel_selection_cycle() {
    let server = TestServer::start().await.unwrap();
    let (id, _) = open_panel(&server, "team-platform").await;
    let path = |action: &str| format!("/api/v1/panels/{id}/{action}");

    let response = server.post_empty(&path("randomize")).await.unwrap();
    let view: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(view["currentMember"]["id"], "u-ann");

    let response = server.post_empty(&path("randomize")).await.unwrap();
    let view: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(view["currentMember"]["id"], "u-ben");
    assert_eq!(ids(&view, "completedIds"), vec!["u-ann"]);
    assert_eq!(view["remainingCount"], 1);

    let day = &server.stored_settings()["_randomizerData"][SCENARIO_DAY_KEY];
    assert_eq!(day["teamMembers"]["team-platform"], json!(["u-ann"]));
    assert_eq!(day["activeMembers"]["team-platform"], "u-ben");

    let response = server.post_empty(&path("previous")).await.unwrap();
    let view: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(view["currentMember"]["id"], "u-ann");
    assert!(ids(&view, "completedIds").is_empty());

    let response = server.post_empty(&path("reset")).await.unwrap();
    let view: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(view["currentMember"].is_null());
    assert!(ids(&view, "history").is_empty());
    assert_eq!(view["disableReset"], true);
}

#[tokio::test]
async fn test_panel_cycle_complete_is_reported_in_status() {
    let server = TestServer::start().await.unwrap();
    let (id, _) = open_panel(&server, "team-design").await;
    let randomize = format!("/api/v1/panels/{id}/randomize");

    for _ in 0..2 {
        let response = server.post_empty(&randomize).await.unwrap();
        assert_status(response, StatusCode::OK).await.unwrap();
    }

    let response = server.post_empty(&randomize).await.unwrap();
    let view: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(view["isCycleComplete"], true);
    assert_eq!(view["status"]["type"], "info");
    assert_eq!(ids(&view, "completedIds"), vec!["u-dan"]);
}

#[tokio::test]
async fn test_panel_rolls_back_when_the_write_fails() {
    let server = TestServer::start().await.unwrap();
    let (id, _) = open_panel(&server, "team-platform").await;

    server.store.set_fail_writes(true);
    let response = server
        .post_empty(&format!("/api/v1/panels/{id}/randomize"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(response).await.unwrap(), "PERSISTENCE_WRITE_ERROR");

    let response = server.get(&format!("/api/v1/panels/{id}")).await.unwrap();
    let view: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(view["currentMember"].is_null());
    assert_eq!(view["status"]["type"], "error");
}

#[tokio::test]
async fn test_panel_refreshes_daily_content() {
    let server = TestServer::start().await.unwrap();
    let (id, _) = open_panel(&server, "team-platform").await;

    let response = server
        .post_empty(&format!("/api/v1/panels/{id}/question"))
        .await
        .unwrap();
    let view: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(view["question"]["text"], "Best trip so far?");

    let response = server
        .post_empty(&format!("/api/v1/panels/{id}/holiday"))
        .await
        .unwrap();
    let view: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(view["holiday"], "Boss's Day: Thank a manager");
}

#[tokio::test]
async fn test_panel_switches_team_and_closes() {
    let server = TestServer::start().await.unwrap();
    let (id, _) = open_panel(&server, "team-platform").await;

    let response = server
        .put(&format!("/api/v1/panels/{id}/team"), &json!({ "teamId": "team-design" }))
        .await
        .unwrap();
    let view: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(ids(&view, "members"), vec!["u-dan"]);

    let response = server
        .put(&format!("/api/v1/panels/{id}/team"), &json!({ "teamId": "" }))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await.unwrap(), "VALIDATION_ERROR");

    let response = server.delete(&format!("/api/v1/panels/{id}")).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
    let response = server.get(&format!("/api/v1/panels/{id}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_panel_open_errors() {
    let server = TestServer::start().await.unwrap();

    let response = server.post("/api/v1/panels", &json!({})).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await.unwrap(), "INVALID_REQUEST_BODY");

    let response = server.get("/api/v1/panels/not-a-session").await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    server.directory.set_offline(true);
    let response = server
        .post("/api/v1/panels", &json!({ "projectId": "proj" }))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(response).await.unwrap(), "ROSTER_LOAD_ERROR");
}

#[tokio::test]
async fn test_panel_uses_configured_project_and_team() {
    let server = TestServer::start().await.unwrap();
    let response = server
        .post(
            "/api/v1/panels",
            &json!({
                "projectId": "host",
                "configuration": { "project": { "id": "proj" }, "team": { "id": "team-design" } }
            }),
        )
        .await
        .unwrap();
    let view: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(view["projectId"], "proj");
    assert_eq!(view["teamId"], "team-design");
}

// ============================================================================
// Settings Tests
// ============================================================================

#[tokio::test]
async fn test_settings_edit_and_save() {
    let server = TestServer::start_with(TestSetup {
        seed: Some(json!({
            "team-design": ["u-dan"],
            "_randomizerData": { "10152026": { "hotd": "Yesterday Day" } }
        })),
        ..TestSetup::default()
    })
    .await
    .unwrap();
    let (id, view) = open_settings(&server, "team-platform").await;
    let path = |action: &str| format!("/api/v1/settings/{id}/{action}");

    assert_eq!(ids(&view, "selectedIds"), vec!["u-ann", "u-ben", "u-cat"]);
    assert_eq!(view["isDirty"], false);

    let response = server
        .post(&path("toggle"), &json!({ "memberId": "u-cat", "selected": false }))
        .await
        .unwrap();
    let view: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(view["isDirty"], true);

    let response = server.post_empty(&path("save")).await.unwrap();
    let view: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(view["isDirty"], false);
    assert_eq!(view["status"]["type"], "success");

    let stored = server.stored_settings();
    assert_eq!(stored["team-platform"], json!(["u-ann", "u-ben"]));
    assert_eq!(stored["team-design"], json!(["u-dan"]));
    assert_eq!(stored["_randomizerData"]["10152026"]["hotd"], "Yesterday Day");
}

#[tokio::test]
async fn test_settings_custom_members() {
    let server = TestServer::start().await.unwrap();
    let (id, _) = open_settings(&server, "team-platform").await;
    let path = |action: &str| format!("/api/v1/settings/{id}/{action}");

    let response = server.post(&path("members"), &json!({ "input": "Zoe Q" })).await.unwrap();
    let view: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert!(ids(&view, "members").contains(&"custom-zoe-q".to_string()));
    assert!(ids(&view, "selectedIds").contains(&"custom-zoe-q".to_string()));

    let response = server
        .post(&path("members"), &json!({ "input": "ann@example.com" }))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(error_code(response).await.unwrap(), "MEMBER_ALREADY_EXISTS");

    let response = server
        .post(&path("suggestions"), &json!({ "query": "eve" }))
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    let suggested: Vec<&str> = body["identities"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|identity| identity["entityId"].as_str())
        .collect();
    assert_eq!(suggested, vec!["custom-eve", "u-eve"]);

    let eve = body["identities"][1].clone();
    let response = server.post(&path("members"), &json!({ "identity": eve })).await.unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let response = server.delete(&path("members/custom-zoe-q")).await.unwrap();
    let view: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!ids(&view, "members").contains(&"custom-zoe-q".to_string()));

    let response = server.delete(&path("members/u-ann")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server.post_empty(&path("save")).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
    let stored = server.stored_settings();
    assert_eq!(stored["_customMembers"]["team-platform"][0]["identity"]["id"], "u-eve");
    assert_eq!(stored["_customMembers"]["team-platform"][0]["source"], "directory");

    // The panel now includes the directory member
    let (_, panel) = open_panel(&server, "team-platform").await;
    assert!(ids(&panel, "members").contains(&"u-eve".to_string()));
}

#[tokio::test]
async fn test_settings_save_is_throttled() {
    let server = TestServer::start_with(TestSetup {
        save_min_interval: Duration::from_secs(60),
        ..TestSetup::default()
    })
    .await
    .unwrap();
    let (id, _) = open_settings(&server, "team-platform").await;
    let save = format!("/api/v1/settings/{id}/save");

    let response = server.post_empty(&save).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.post_empty(&save).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(server.store.write_count(), 1);
}

#[tokio::test]
async fn test_settings_select_all_and_sort() {
    let server = TestServer::start().await.unwrap();
    let (id, _) = open_settings(&server, "team-platform").await;
    let path = |action: &str| format!("/api/v1/settings/{id}/{action}");

    let response = server.post_empty(&path("deselect-all")).await.unwrap();
    let view: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(ids(&view, "selectedIds").is_empty());

    let response = server.post_empty(&path("select-all")).await.unwrap();
    let view: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(ids(&view, "selectedIds").len(), 3);

    let response = server
        .put(&path("sort"), &json!({ "column": "member", "direction": "desc" }))
        .await
        .unwrap();
    let view: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(ids(&view, "members"), vec!["u-cat", "u-ben", "u-ann"]);

    let response = server
        .post(&path("toggle"), &json!({ "memberId": "nobody", "selected": true }))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
