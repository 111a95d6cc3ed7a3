//! In-process API tests: the full router over a scratch library directory.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use asset_library_backend::config::StorageBackendKind;
use common::fixtures;
use common::TestApp;

#[tokio::test]
async fn test_health_and_ping() {
    let app = TestApp::new().await;
    for uri in ["/health", "/ping"] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "alive");
        assert_eq!(body["backend"], "filesystem");
    }
}

#[tokio::test]
async fn test_health_reports_environment() {
    let app = TestApp::new().await;
    let (_, body) = app.get("/health").await;
    assert!(body.get("environment").is_none());

    let app = TestApp::configured(StorageBackendKind::Filesystem, |config| {
        config.environment = "staging".into()
    })
    .await;
    let (_, body) = app.get("/health").await;
    assert_eq!(body["environment"], "staging");
}

#[tokio::test]
async fn test_checkout_scenario() {
    let app = TestApp::new().await;

    let (status, body) = app.post_json("/add_asset", fixtures::fire_sword()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["asset"]["available"], true);
    let id = body["asset"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post_json("/checkout", json!({"asset_id": id, "borrower": "p1"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["asset"]["available"], false);
    assert_eq!(body["asset"]["current_borrower"], "p1");

    let (status, body) = app
        .post_json("/checkout", json!({"asset_id": id, "borrower": "p2"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (_, body) = app.get(&format!("/assets/{id}")).await;
    assert_eq!(body["current_borrower"], "p1");

    let (status, body) = app.get("/search?q=fire").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["id"].as_str())
        .collect();
    assert!(ids.contains(&id.as_str()));

    let (_, body) = app.get("/search?q=ice").await;
    assert_eq!(body["total_results"], 0);
}

#[tokio::test]
async fn test_add_asset_validation() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json("/add_asset", json!({"name": "Nameless"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("type") && message.contains("author"));

    let (status, _) = app
        .post_json(
            "/add_asset",
            json!({"name": "Orb", "type": "spaceship", "author": "a"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get("/browse").await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_malformed_bodies_are_validation_errors() {
    use axum::body::Body;
    use axum::http::Request;

    let app = TestApp::new().await;

    // Wrong field type
    let (status, body) = app
        .post_json(
            "/add_asset",
            json!({"name": "Orb", "type": "item", "author": "a", "tags": "fire"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["message"].is_string());

    // Broken syntax
    let (status, body) = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/checkout")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    // No content type
    let (status, body) = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/checkout")
                .body(Body::from(r#"{"asset_id": "x", "borrower": "p1"}"#))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .post_json("/batch/import", json!({"assets": "none"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, body) = app.get("/browse").await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_add_asset_defaults_and_media() {
    let app = TestApp::new().await;
    let (_, body) = app
        .post_json(
            "/add_asset",
            json!({
                "name": "Fire Drake",
                "type": "creature",
                "author": "alice",
                "attributes": {"power": 80},
                "media_files": {"image": "drake.png"}
            }),
        )
        .await;
    let asset = &body["asset"];
    assert_eq!(asset["attributes"]["power"], 80);
    assert_eq!(asset["attributes"]["health"], 100);
    assert_eq!(asset["rarity"], "common");
    assert_eq!(
        asset["media"]["image"],
        format!("{}/drake.png", app.config.media_base_url)
    );
}

#[tokio::test]
async fn test_unknown_ids_and_routes_are_404() {
    let app = TestApp::new().await;
    let missing = uuid::Uuid::new_v4();

    let (status, body) = app.get(&format!("/assets/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = app.get("/assets/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get(&format!("/history/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post_json("/checkout", json!({"asset_id": missing, "borrower": "p1"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/no/such/route").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_checkout_requires_fields() {
    let app = TestApp::new().await;
    let id = app.add(fixtures::fire_sword()).await;

    let (status, _) = app.post_json("/checkout", json!({"asset_id": id})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post_json("/return", json!({"borrower": "p1"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_return_flows() {
    let app = TestApp::new().await;
    let id = app.add(fixtures::fire_sword()).await;

    // Not checked out yet
    let (status, _) = app
        .post_json("/return", json!({"asset_id": id, "borrower": "p1"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    app.post_json(
        "/checkout",
        json!({"asset_id": id, "borrower": "p1", "game_context": "raid"}),
    )
    .await;

    let (status, _) = app
        .post_json("/return", json!({"asset_id": id, "borrower": "p2"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .post_json(
            "/return",
            json!({"asset_id": id, "borrower": "p1", "notes": "slightly chipped"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["return_details"]["condition"], "good");
    assert_eq!(body["return_details"]["notes"], "slightly chipped");
    assert_eq!(body["asset"]["available"], true);

    let (_, history) = app.get(&format!("/history/{id}")).await;
    assert_eq!(history["statistics"]["total_checkouts"], 1);
    assert_eq!(history["statistics"]["currently_checked_out"], false);
    assert_eq!(history["asset"]["current_status"], "available");
    assert_eq!(history["checkout_history"][0]["game_context"], "raid");
}

#[tokio::test]
async fn test_browse_filters() {
    let app = TestApp::new().await;
    let sword = app.add(fixtures::fire_sword()).await;
    app.add(fixtures::ice_wyrm()).await;
    app.add(fixtures::health_potion()).await;
    app.post_json("/checkout", json!({"asset_id": sword, "borrower": "p1"}))
        .await;

    let (_, body) = app.get("/browse").await;
    assert_eq!(body["total"], 3);
    let names: Vec<&str> = body["assets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Ice Wyrm", "Fire Sword", "Health Potion"]);

    let (_, body) = app.get("/browse?type=item&available=true").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["assets"][0]["name"], "Health Potion");

    let (_, body) = app.get("/browse?tag=weapon&tag=fire").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["filters"]["tags"], json!(["weapon", "fire"]));

    let (_, body) = app.get("/browse?tag=weapon&tag=ice").await;
    assert_eq!(body["total"], 0);

    let (_, body) = app.get("/browse?game=survival_game&rarity=rare").await;
    assert_eq!(body["assets"][0]["name"], "Ice Wyrm");

    let (status, _) = app.get("/browse?rarity=mythic").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_available_only() {
    let app = TestApp::new().await;
    let sword = app.add(fixtures::fire_sword()).await;
    app.post_json("/checkout", json!({"asset_id": sword, "borrower": "p1"}))
        .await;

    let (_, body) = app.get("/search?q=FIRE").await;
    assert_eq!(body["total_results"], 1);
    assert_eq!(body["query"], "fire");

    let (_, body) = app.get("/search?q=fire&available_only=true").await;
    assert_eq!(body["total_results"], 0);
}

#[tokio::test]
async fn test_stats_groupings_sum_to_total() {
    let app = TestApp::new().await;
    let sword = app.add(fixtures::fire_sword()).await;
    app.add(fixtures::ice_wyrm()).await;
    app.add(fixtures::health_potion()).await;
    app.post_json("/checkout", json!({"asset_id": sword, "borrower": "p1"}))
        .await;

    for uri in ["/stats", "/history"] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::OK);
        let stats = &body["library_statistics"];
        assert_eq!(stats["total_assets"], 3);
        assert_eq!(stats["available"], 2);
        assert_eq!(stats["checked_out"], 1);
        for grouping in ["by_type", "by_rarity", "by_author", "by_game"] {
            let sum: u64 = stats[grouping]
                .as_object()
                .unwrap()
                .values()
                .map(|v| v.as_u64().unwrap())
                .sum();
            assert_eq!(sum, 3, "{grouping} does not sum to total");
        }
        assert_eq!(stats["by_game"]["unknown"], 1);
    }
}

#[tokio::test]
async fn test_popular() {
    let app = TestApp::new().await;
    let sword = app.add(fixtures::fire_sword()).await;
    let wyrm = app.add(fixtures::ice_wyrm()).await;
    app.add(fixtures::health_potion()).await;

    for borrower in ["p1", "p2"] {
        app.post_json("/checkout", json!({"asset_id": sword, "borrower": borrower}))
            .await;
        app.post_json("/return", json!({"asset_id": sword, "borrower": borrower}))
            .await;
    }
    app.post_json("/checkout", json!({"asset_id": wyrm, "borrower": "p3"}))
        .await;

    let (status, body) = app.get("/popular").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period_days"], 30);
    let popular = body["popular_assets"].as_array().unwrap();
    assert_eq!(popular.len(), 2);
    assert_eq!(popular[0]["name"], "Fire Sword");
    assert_eq!(popular[0]["recent_checkouts"], 2);

    let (_, body) = app.get("/popular?limit=1").await;
    assert_eq!(body["popular_assets"].as_array().unwrap().len(), 1);

    let (status, _) = app.get("/popular?days=-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get("/popular?days=36500").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["popular_assets"].as_array().unwrap().len(), 2);

    let (status, body) = app.get("/popular?days=100000000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_batch_import_partial_failure() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post_json(
            "/batch/import",
            json!({"assets": [
                fixtures::fire_sword(),
                {"name": "Broken", "type": "item"},
                fixtures::ice_wyrm()
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], 2);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["errors"][0]["asset_name"], "Broken");

    let (_, body) = app.get("/browse").await;
    assert_eq!(body["total"], 2);

    let (status, _) = app.post_json("/batch/import", json!({"assets": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_batch_checkout() {
    let app = TestApp::new().await;
    let sword = app.add(fixtures::fire_sword()).await;
    let wyrm = app.add(fixtures::ice_wyrm()).await;
    app.post_json("/checkout", json!({"asset_id": wyrm, "borrower": "other"}))
        .await;

    let (status, body) = app
        .post_json(
            "/batch/checkout",
            json!({"asset_ids": [sword, wyrm], "borrower": "guild"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], 1);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["errors"][0]["asset_id"], wyrm);

    let (status, _) = app
        .post_json("/batch/checkout", json!({"asset_ids": [sword]}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_export_strips_lending_state_and_reimports() {
    let app = TestApp::new().await;
    let sword = app.add(fixtures::fire_sword()).await;
    app.add(fixtures::ice_wyrm()).await;
    app.post_json("/checkout", json!({"asset_id": sword, "borrower": "p1"}))
        .await;

    let (status, export) = app.get("/export?type=item").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(export["asset_count"], 1);
    let exported = &export["assets"][0];
    assert_eq!(exported["available"], true);
    assert!(exported["current_borrower"].is_null());
    assert_eq!(exported["checkout_history"], json!([]));

    let target = TestApp::new().await;
    let (status, body) = target
        .post_json("/batch/import", json!({"assets": export["assets"]}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], 1);
}

#[tokio::test]
async fn test_generate_and_cleanup() {
    let app = TestApp::new().await;
    let keep = app.add(fixtures::fire_sword()).await;
    app.add(fixtures::test_authored("Scratch")).await;

    let (status, body) = app.post_json("/utils/generate?count=4", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assets"].as_array().unwrap().len(), 4);

    let (_, body) = app.get("/browse").await;
    assert_eq!(body["total"], 6);

    let (status, body) = app.post_json("/utils/cleanup", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assets"].as_array().unwrap().len(), 5);

    let (_, body) = app.get("/browse").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["assets"][0]["id"], keep);

    let (status, _) = app.post_json("/utils/generate?count=0", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_git_status_unavailable_without_git() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/utils/git-status").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "UNAVAILABLE");
}

#[tokio::test]
async fn test_git_backend_records_revisions() {
    let git_available = std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if !git_available {
        return;
    }

    let app = TestApp::with_backend(StorageBackendKind::Git, true).await;
    let (_, body) = app.get("/browse").await;
    assert_eq!(body["assets"][0]["name"], "Mithril Sword");

    let id = app.add(fixtures::fire_sword()).await;
    app.post_json("/checkout", json!({"asset_id": id, "borrower": "p1"}))
        .await;

    let (_, history) = app.get(&format!("/history/{id}")).await;
    let messages: Vec<&str> = history["revisions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["message"].as_str().unwrap())
        .collect();
    assert_eq!(
        messages,
        ["Checkout: Fire Sword to p1", "Added item: Fire Sword by smith"]
    );

    let (status, body) = app.get("/utils/git-status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["uncommitted_changes"], 0);
    assert_eq!(body["recent_commits"].as_array().unwrap().len(), 3);

    let (_, stats) = app.get("/stats").await;
    assert_eq!(
        stats["library_statistics"]["recent_commits"]
            .as_array()
            .unwrap()
            .len(),
        3
    );
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Asset Library API");
    assert!(body["paths"]["/checkout"].is_object());

    let id_param = &body["paths"]["/assets/{id}"]["get"]["parameters"][0];
    assert_eq!(id_param["name"], "id");
    assert_eq!(id_param["schema"]["format"], "uuid");
}
