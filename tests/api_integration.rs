//! End-to-end tests against a running server.

use std::time::Duration;

use greenlight::config::ApiConfig;
use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

use common::{spawn_app, spawn_default_app, CASABLANCA};

#[tokio::test]
async fn test_movie_lifecycle() {
    let app = spawn_default_app().await;

    let response = app.post("/v1/movies", CASABLANCA).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()["location"], "/v1/movies/1");
    assert_eq!(response.headers()["content-type"], "application/json");
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["movie"]["id"], 1);
    assert_eq!(created["movie"]["version"], 1);

    let response = app.get("/v1/movies/1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let shown: Value = response.json().await.unwrap();
    assert_eq!(shown, created);

    let response = app
        .patch("/v1/movies/1", r#"{"runtime":"103 mins","genres":["drama"]}"#)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(
        updated,
        json!({"movie": {
            "id": 1,
            "title": "Casablanca",
            "year": 1942,
            "runtime": "103 mins",
            "genres": ["drama"],
            "version": 2
        }})
    );

    let response = app.delete("/v1/movies/1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let deleted: Value = response.json().await.unwrap();
    assert_eq!(deleted, json!({"message": "movie successfully deleted"}));

    assert_eq!(app.get("/v1/movies/1").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.delete("/v1/movies/1").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        app.patch("/v1/movies/1", "{}").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_responses_are_tab_indented() {
    let app = spawn_default_app().await;

    let response = app.delete("/v1/movies/42").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.text().await.unwrap(),
        "{\n\t\"error\": \"the requested resource could not be found\"\n}"
    );
}

#[tokio::test]
async fn test_validation_failure_lists_invalid_fields_only() {
    let app = spawn_default_app().await;

    let response = app
        .post(
            "/v1/movies",
            r#"{"title":"","year":1942,"runtime":"102 mins","genres":["drama","drama"]}"#,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({"error": {
            "genres": "must not contain duplicate values",
            "title": "must be provided"
        }})
    );
}

#[tokio::test]
async fn test_year_bounds() {
    let app = spawn_default_app().await;

    let body = |year: i32| {
        format!(
            r#"{{"title":"Roundhay Garden Scene","year":{year},"runtime":"1 mins","genres":["short"]}}"#
        )
    };

    assert_eq!(app.post("/v1/movies", body(1888)).await.status(), StatusCode::CREATED);

    let response = app.post("/v1/movies", body(1887)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors: Value = response.json().await.unwrap();
    assert_eq!(errors["error"]["year"], "must be greater than 1888");

    let response = app.post("/v1/movies", body(2027)).await;
    let errors: Value = response.json().await.unwrap();
    assert_eq!(errors["error"]["year"], "must not be in the future");
}

#[tokio::test]
async fn test_decode_errors() {
    let app = spawn_default_app().await;

    let cases: [(&str, &str); 6] = [
        ("", "body must not be empty"),
        (r#"{"title":"Casablanca"}{}"#, "body must only contain a single JSON value"),
        (r#"{"title":"Casablanca","rating":"PG"}"#, "body contains unknown key \"rating\""),
        (r#"{"title":"Casablanca""#, "body contains badly-formed JSON"),
        (r#"{"year":"1942"}"#, "body contains incorrect JSON type for field \"year\""),
        (
            r#"{"runtime":"102 minutes"}"#,
            "body contains invalid value for field \"runtime\": invalid runtime format",
        ),
    ];

    for (body, message) in cases {
        let response = app.post("/v1/movies", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        let error: Value = response.json().await.unwrap();
        assert_eq!(error["error"], message, "{body}");
    }

    let response = app.post("/v1/movies", r#"{"title":}"#).await;
    let error: Value = response.json().await.unwrap();
    assert!(error["error"]
        .as_str()
        .unwrap()
        .starts_with("body contains badly-formed JSON (at character "));
}

#[tokio::test]
async fn test_oversized_body() {
    let mut config = ApiConfig::default();
    config.limits.max_body_bytes = 64;
    let app = spawn_app(config).await;

    let title = "x".repeat(100);
    let response = app
        .post("/v1/movies", format!(r#"{{"title":"{title}"}}"#))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error"], "body must not be larger than 64 bytes");
}

#[tokio::test]
async fn test_routing_errors() {
    let app = spawn_default_app().await;

    let response = app.get("/v1/nothing-here").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/v1/movies/not-a-number").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.client.put(app.url("/v1/healthcheck")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let error: Value = response.json().await.unwrap();
    assert_eq!(
        error["error"],
        "the PUT method is not supported for this resource"
    );
}

#[tokio::test]
async fn test_request_id_propagated() {
    let app = spawn_default_app().await;

    let response = app
        .client
        .get(app.url("/v1/healthcheck"))
        .header("x-request-id", "test-123")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "test-123");

    let response = app.get("/v1/healthcheck").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_graceful_shutdown() {
    let app = spawn_default_app().await;
    assert_eq!(app.get("/v1/healthcheck").await.status(), StatusCode::OK);

    app.shutdown.trigger();

    let result = tokio::time::timeout(Duration::from_secs(5), app.handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}
