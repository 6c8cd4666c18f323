mod common;

use chrono::{Duration, Utc};
use common::TestApp;
use http::{Method, StatusCode};
use serde_json::{json, Value};

fn article(term: &str, age: Duration) -> Value {
    json!({
        "title": format!("{term} news"),
        "link": format!("https://example.com/{term}"),
        "source": "example",
        "datetime": (Utc::now() - age).to_rfc3339(),
        "searchTerm": term,
    })
}

async fn create(app: &TestApp, uri: &str, body: Value) -> Value {
    let (status, created) = app.authed(Method::POST, uri, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    created
}

fn titles(records: &Value) -> Vec<String> {
    records
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn listing_requires_a_session() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/posts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing Bearer token");

    let (status, _) = app
        .send(Method::GET, "/api/posts", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_validates_required_fields() {
    let app = TestApp::new();
    let (status, body) = app
        .authed(Method::POST, "/api/posts", Some(json!({"title": "only a title"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("missing field"));
}

#[tokio::test]
async fn article_lifecycle() {
    let app = TestApp::new();
    let created = create(&app, "/api/posts", article("rust", Duration::hours(1))).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["used"], false);

    let (status, updated) = app
        .authed(
            Method::PATCH,
            "/api/posts",
            Some(json!({"postId": id, "used": true})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["used"], true);
    for field in ["title", "link", "source", "datetime", "searchTerm", "createdAt"] {
        assert_eq!(updated[field], created[field], "{field} changed");
    }

    let (status, body) = app
        .authed(Method::DELETE, &format!("/api/posts?postId={id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (status, body) = app
        .authed(Method::DELETE, &format!("/api/posts?postId={id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Post not found");
}

#[tokio::test]
async fn update_and_delete_require_an_id() {
    let app = TestApp::new();

    let (status, body) = app
        .authed(Method::PATCH, "/api/posts", Some(json!({"used": true})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Post ID is required");

    let (status, body) = app.authed(Method::DELETE, "/api/tools?toolId=", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Tool ID is required");

    let (status, body) = app
        .authed(
            Method::PATCH,
            "/api/news",
            Some(json!({"newsId": "missing", "active": false})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "News article not found");

    let (status, _) = app
        .authed(
            Method::PATCH,
            "/api/posts",
            Some(json!({"postId": "x", "used": "yes"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_keeps_fields_well_formed() {
    let app = TestApp::new();
    let created = create(&app, "/api/posts", article("rust", Duration::hours(1))).await;
    let id = created["id"].as_str().unwrap().to_string();

    for (patch, message) in [
        (json!({"postId": id, "datetime": "last tuesday"}), "datetime must be an RFC 3339 timestamp"),
        (json!({"postId": id, "rank": 3}), "rank cannot be updated"),
        (json!({"postId": id, "title": ""}), "title must be a non-empty string"),
    ] {
        let (status, body) = app.authed(Method::PATCH, "/api/posts", Some(patch)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], message);
    }

    let (status, updated) = app
        .authed(
            Method::PATCH,
            "/api/posts",
            Some(json!({"postId": id, "datetime": "2024-06-01T08:00:00Z"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["datetime"], "2024-06-01T08:00:00Z");
    assert!(updated.get("rank").is_none());
}

#[tokio::test]
async fn listing_is_newest_first_and_limited() {
    let app = TestApp::new();
    create(&app, "/api/posts", article("b", Duration::days(2))).await;
    create(&app, "/api/posts", article("a", Duration::hours(1))).await;
    create(&app, "/api/posts", article("c", Duration::days(5))).await;

    let (status, records) = app.authed(Method::GET, "/api/posts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&records), vec!["a news", "b news", "c news"]);

    let (_, records) = app.authed(Method::GET, "/api/posts?limit=2", None).await;
    assert_eq!(titles(&records), vec!["a news", "b news"]);

    let (_, records) = app.authed(Method::GET, "/api/posts?limit=lots", None).await;
    assert_eq!(records.as_array().unwrap().len(), 3);

    let (status, body) = app.authed(Method::GET, "/api/posts?limit=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("limit"));
}

#[tokio::test]
async fn listing_buckets_by_date_range() {
    let app = TestApp::new();
    create(&app, "/api/posts", article("now", Duration::seconds(1))).await;
    create(&app, "/api/posts", article("recent", Duration::days(3))).await;
    create(&app, "/api/posts", article("older", Duration::days(10))).await;
    create(&app, "/api/posts", article("ancient", Duration::days(60))).await;

    let (_, today) = app
        .authed(Method::GET, "/api/posts?dateRange=today", None)
        .await;
    let today = titles(&today);
    assert!(!today.contains(&"recent news".to_string()));
    assert!(!today.contains(&"older news".to_string()));

    let (_, week) = app
        .authed(Method::GET, "/api/posts?dateRange=week", None)
        .await;
    assert_eq!(titles(&week), vec!["now news", "recent news"]);

    let (_, month) = app
        .authed(Method::GET, "/api/posts?dateRange=month", None)
        .await;
    assert_eq!(titles(&month), vec!["now news", "recent news", "older news"]);

    let (status, _) = app
        .authed(Method::GET, "/api/posts?dateRange=fortnight", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn filter_options_lists_each_term_once() {
    let app = TestApp::new();
    for term in ["rust", "go", "rust", "rust"] {
        create(&app, "/api/posts", article(term, Duration::hours(1))).await;
    }

    let (status, body) = app
        .authed(Method::GET, "/api/posts?filterOptions=true", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"searchTerms": ["go", "rust"]}));

    let (_, used) = app.authed(Method::GET, "/api/posts?used=false", None).await;
    assert_eq!(used.as_array().unwrap().len(), 4);
    let (_, used) = app.authed(Method::GET, "/api/posts?used=true", None).await;
    assert!(used.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn news_and_tools_filter_by_category_tag_and_active() {
    let app = TestApp::new();
    create(
        &app,
        "/api/news",
        json!({"title": "LLM launch", "link": "https://n/1", "category": "ai", "tags": ["llm"]}),
    )
    .await;
    create(
        &app,
        "/api/news",
        json!({"title": "Crate release", "link": "https://n/2", "category": "rust", "tags": ["release"], "active": false}),
    )
    .await;
    let tool = create(
        &app,
        "/api/tools",
        json!({"name": "cargo", "link": "https://t/1", "description": "build tool", "category": "rust", "tags": ["build"]}),
    )
    .await;

    let (_, by_tag) = app.authed(Method::GET, "/api/news?tag=llm", None).await;
    assert_eq!(titles(&by_tag), vec!["LLM launch"]);

    let (_, inactive) = app.authed(Method::GET, "/api/news?active=false", None).await;
    assert_eq!(titles(&inactive), vec!["Crate release"]);

    let (_, categories) = app
        .authed(Method::GET, "/api/news?filterOptions=true", None)
        .await;
    assert_eq!(categories, json!({"categories": ["ai", "rust"]}));

    let (_, tools) = app
        .authed(Method::GET, "/api/tools?category=rust&tag=build", None)
        .await;
    assert_eq!(tools.as_array().unwrap().len(), 1);
    assert_eq!(tools[0]["id"], tool["id"]);
    assert_eq!(tools[0]["active"], true);
}
