//! HTTP-level integration tests for the template endpoints: CRUD,
//! filtering, tag membership and bulk operations.

mod common;

use axum::http::StatusCode;
use common::{admin_token, body_json, delete_auth, get_auth, post_json_auth, put_json_auth};
use serde_json::{json, Value};
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create(app: &axum::Router, token: &str, uri: &str, body: Value) -> Value {
    let response = post_json_auth(app.clone(), uri, body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED, "creating via {uri}");
    body_json(response).await
}

async fn create_category(app: &axum::Router, token: &str, name: &str) -> i64 {
    let json = create(app, token, "/api/categories", json!({ "name": name })).await;
    json["id"].as_i64().unwrap()
}

async fn create_tag(app: &axum::Router, token: &str, name: &str, category_id: i64) -> i64 {
    let body = json!({ "name": name, "category_id": category_id });
    let json = create(app, token, "/api/tags", body).await;
    json["id"].as_i64().unwrap()
}

async fn create_template(app: &axum::Router, token: &str, body: Value) -> Value {
    create(app, token, "/api/templates", body).await
}

fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Create / read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_defaults_subject_and_sanitizes_html(pool: SqlitePool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let json = create_template(
        &app,
        &token,
        json!({
            "title": "Welcome",
            "html": "<p onclick=\"x()\">Hi {{name}}</p><script>alert(1)</script>"
        }),
    )
    .await;

    assert_eq!(json["title"], "Welcome");
    assert_eq!(json["email_subject"], "Welcome");
    assert_eq!(json["description"], "");
    assert_eq!(json["html"], "<p>Hi {{name}}</p>");
    assert_eq!(json["category_id"], Value::Null);
    assert_eq!(json["tags"], json!([]));
    assert_eq!(json["created_at"], json["updated_at"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_accepts_name_alias_and_explicit_subject(pool: SqlitePool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let json = create_template(
        &app,
        &token,
        json!({ "name": "Legacy", "html": "<p>x</p>", "email_subject": "Custom" }),
    )
    .await;
    assert_eq!(json["title"], "Legacy");
    assert_eq!(json["email_subject"], "Custom");

    let json = create_template(
        &app,
        &token,
        json!({ "title": "Wins", "name": "Loses", "html": "<p>x</p>" }),
    )
    .await;
    assert_eq!(json["title"], "Wins");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_rejects_invalid_input(pool: SqlitePool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let missing_title = json!({ "html": "<p>x</p>" });
    let response = post_json_auth(app.clone(), "/api/templates", missing_title, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let long_title = json!({ "title": "t".repeat(101), "html": "<p>x</p>" });
    let response = post_json_auth(app.clone(), "/api/templates", long_title, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let no_html = json!({ "title": "Empty" });
    let response = post_json_auth(app.clone(), "/api/templates", no_html, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let unknown_category = json!({ "title": "Orphan", "html": "<p>x</p>", "category_id": 999 });
    let response = post_json_auth(app, "/api/templates", unknown_category, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_string_category_means_none(pool: SqlitePool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let json = create_template(
        &app,
        &token,
        json!({ "title": "Loose", "html": "<p>x</p>", "category_id": "" }),
    )
    .await;

    assert_eq!(json["category_id"], Value::Null);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_includes_category_and_tags(pool: SqlitePool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let category_id = create_category(&app, &token, "Marketing").await;
    let tag_id = create_tag(&app, &token, "Promo", category_id).await;
    let template = create_template(
        &app,
        &token,
        json!({ "title": "Sale", "html": "<p>Hi</p>", "category_id": category_id }),
    )
    .await;
    let id = template["id"].as_i64().unwrap();

    let uri = format!("/api/templates/{id}/tags");
    let response = post_json_auth(app.clone(), &uri, json!({ "tagIds": [tag_id] }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app.clone(), &format!("/api/templates/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["category_name"], "Marketing");
    assert_eq!(json["category_color"], "#6366f1");
    assert_eq!(json["tags"][0]["name"], "Promo");

    let response = get_auth(app, "/api/templates/999", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn title_change_moves_subject_unless_given(pool: SqlitePool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let template = create_template(&app, &token, json!({ "title": "Old", "html": "<p>x</p>" })).await;
    let uri = format!("/api/templates/{}", template["id"]);

    let response = put_json_auth(app.clone(), &uri, json!({ "title": "New" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["title"], "New");
    assert_eq!(json["email_subject"], "New");

    let response = put_json_auth(
        app.clone(),
        &uri,
        json!({ "title": "Newer", "email_subject": "Kept" }),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["email_subject"], "Kept");

    let response = put_json_auth(app, &uri, json!({ "description": "only" }), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["title"], "Newer");
    assert_eq!(json["email_subject"], "Kept");
    assert_eq!(json["description"], "only");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_resanitizes_and_handles_category(pool: SqlitePool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let category_id = create_category(&app, &token, "Ops").await;
    let template = create_template(
        &app,
        &token,
        json!({ "title": "T", "html": "<p>x</p>", "category_id": category_id }),
    )
    .await;
    let uri = format!("/api/templates/{}", template["id"]);

    let response = put_json_auth(
        app.clone(),
        &uri,
        json!({ "html": "<strong>ok</strong><iframe src=\"x\"></iframe>" }),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["html"], "<strong>ok</strong>");
    assert_eq!(json["category_id"], category_id);

    let response = put_json_auth(app.clone(), &uri, json!({ "category_id": 999 }), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = put_json_auth(app.clone(), &uri, json!({ "category_id": null }), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["category_id"], Value::Null);
    assert_eq!(json["category_name"], Value::Null);

    let response = put_json_auth(app, "/api/templates/999", json!({ "title": "x" }), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_returns_no_content_then_not_found(pool: SqlitePool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let template = create_template(&app, &token, json!({ "title": "Gone", "html": "<p>x</p>" })).await;
    let uri = format!("/api/templates/{}", template["id"]);

    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_category_and_any_tag(pool: SqlitePool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let cat_a = create_category(&app, &token, "A").await;
    let cat_b = create_category(&app, &token, "B").await;
    let tag_x = create_tag(&app, &token, "x", cat_a).await;
    let tag_y = create_tag(&app, &token, "y", cat_a).await;

    let t1 = create_template(
        &app,
        &token,
        json!({ "title": "one", "html": "<p>1</p>", "category_id": cat_a }),
    )
    .await["id"]
        .as_i64()
        .unwrap();
    let t2 = create_template(
        &app,
        &token,
        json!({ "title": "two", "html": "<p>2</p>", "category_id": cat_b }),
    )
    .await["id"]
        .as_i64()
        .unwrap();
    let t3 = create_template(&app, &token, json!({ "title": "three", "html": "<p>3</p>" })).await
        ["id"]
        .as_i64()
        .unwrap();

    for (id, tags) in [(t1, vec![tag_x]), (t2, vec![tag_y]), (t3, vec![])] {
        let uri = format!("/api/templates/{id}/tags");
        let response = post_json_auth(app.clone(), &uri, json!({ "tagIds": tags }), &token).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get_auth(app.clone(), "/api/templates", &token).await;
    let all = body_json(response).await;
    assert_eq!(ids(&all).len(), 3);

    let uri = format!("/api/templates?category={cat_a}");
    let response = get_auth(app.clone(), &uri, &token).await;
    assert_eq!(ids(&body_json(response).await), vec![t1]);

    let uri = format!("/api/templates?tags={tag_x},{tag_y}");
    let response = get_auth(app.clone(), &uri, &token).await;
    let mut matched = ids(&body_json(response).await);
    matched.sort_unstable();
    assert_eq!(matched, vec![t1, t2]);

    let uri = format!("/api/templates?category={cat_b}&tags={tag_x}");
    let response = get_auth(app.clone(), &uri, &token).await;
    assert!(ids(&body_json(response).await).is_empty());

    let response = get_auth(app, "/api/templates?category=abc", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_orders_most_recently_touched_first(pool: SqlitePool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let first = create_template(&app, &token, json!({ "title": "first", "html": "<p>1</p>" })).await;
    let second = create_template(&app, &token, json!({ "title": "second", "html": "<p>2</p>" })).await;
    let first_id = first["id"].as_i64().unwrap();
    let second_id = second["id"].as_i64().unwrap();

    let response = get_auth(app.clone(), "/api/templates", &token).await;
    assert_eq!(ids(&body_json(response).await), vec![second_id, first_id]);

    let uri = format!("/api/templates/{first_id}");
    put_json_auth(app.clone(), &uri, json!({ "description": "edited" }), &token).await;

    let response = get_auth(app, "/api/templates", &token).await;
    assert_eq!(ids(&body_json(response).await), vec![first_id, second_id]);
}

// ---------------------------------------------------------------------------
// Tags and bulk operations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn set_tags_replaces_and_deduplicates(pool: SqlitePool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let category_id = create_category(&app, &token, "Cat").await;
    let tag_a = create_tag(&app, &token, "alpha", category_id).await;
    let tag_b = create_tag(&app, &token, "beta", category_id).await;
    let template = create_template(&app, &token, json!({ "title": "T", "html": "<p>x</p>" })).await;
    let uri = format!("/api/templates/{}/tags", template["id"]);

    let body = json!({ "tagIds": [tag_b, tag_a, tag_a, 999] });
    let response = post_json_auth(app.clone(), &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let names: Vec<&str> = json["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alpha", "beta"]);

    let response = post_json_auth(app.clone(), &uri, json!({ "tagIds": [tag_b] }), &token).await;
    assert_eq!(body_json(response).await["tags"].as_array().unwrap().len(), 1);

    let response = get_auth(app.clone(), &uri, &token).await;
    let json = body_json(response).await;
    assert_eq!(json["tags"][0]["id"], tag_b);

    let response = post_json_auth(
        app.clone(),
        "/api/templates/999/tags",
        json!({ "tagIds": [tag_a] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app, "/api/templates/999/tags", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn assign_category_counts_existing_templates(pool: SqlitePool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let category_id = create_category(&app, &token, "Target").await;
    let t1 = create_template(&app, &token, json!({ "title": "a", "html": "<p>a</p>" })).await;
    let t2 = create_template(&app, &token, json!({ "title": "b", "html": "<p>b</p>" })).await;

    let body = json!({ "templateIds": [t1["id"], t2["id"], 999], "categoryId": category_id });
    let response = post_json_auth(app.clone(), "/api/templates/assign-category", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["affected"], 2);

    let uri = format!("/api/templates?category={category_id}");
    let response = get_auth(app.clone(), &uri, &token).await;
    assert_eq!(ids(&body_json(response).await).len(), 2);

    let body = json!({ "templateIds": [t1["id"]], "categoryId": null });
    let response = post_json_auth(app.clone(), "/api/templates/assign-category", body, &token).await;
    assert_eq!(body_json(response).await["affected"], 1);

    let body = json!({ "templateIds": [], "categoryId": category_id });
    let response = post_json_auth(app.clone(), "/api/templates/assign-category", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json!({ "templateIds": [t1["id"]], "categoryId": 999 });
    let response = post_json_auth(app, "/api/templates/assign-category", body, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bulk_delete_reports_deleted_count(pool: SqlitePool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let t1 = create_template(&app, &token, json!({ "title": "a", "html": "<p>a</p>" })).await;
    let t2 = create_template(&app, &token, json!({ "title": "b", "html": "<p>b</p>" })).await;
    create_template(&app, &token, json!({ "title": "c", "html": "<p>c</p>" })).await;

    let body = json!({ "templateIds": [t1["id"], t2["id"], 999] });
    let response = post_json_auth(app.clone(), "/api/templates/bulk-delete", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["deleted"], 2);

    let response = get_auth(app.clone(), "/api/templates", &token).await;
    assert_eq!(ids(&body_json(response).await).len(), 1);

    let response = post_json_auth(
        app,
        "/api/templates/bulk-delete",
        json!({ "templateIds": [] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stats_summarize_the_library(pool: SqlitePool) {
    let token = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/stats", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["total"], 0);
    assert_eq!(json["lastUpdate"], Value::Null);
    assert_eq!(json["totalSize"], 0);

    create_template(&app, &token, json!({ "title": "a", "html": "<p>ab</p>" })).await;

    let response = get_auth(app, "/api/stats", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert!(json["lastUpdate"].is_string());
    assert_eq!(json["totalSize"], 9);
}
