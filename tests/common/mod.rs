use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

pub async fn create_test_app() -> Router {
    std::env::set_var("DATABASE_URL", "sqlite::memory:");
    std::env::set_var("AUTH_SECRET", "integration-test-secret");

    flashdeck_backend::create_app()
        .await
        .expect("test app setup failed")
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send_json(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Value) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    app.clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

pub async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Registers a fresh user and returns their auth token.
pub async fn register_user(app: &Router, email: &str, username: &str) -> String {
    let response = send_json(
        app,
        "POST",
        "/api/auth/register",
        None,
        serde_json::json!({
            "email": email,
            "username": username,
            "password": "correct horse battery",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["token"].as_str().unwrap().to_string()
}

/// Creates a deck with the given cards and returns its id.
pub async fn create_deck(
    app: &Router,
    token: &str,
    name: &str,
    visibility: &str,
    cards: &[(&str, &str)],
) -> String {
    let flashcards: Vec<Value> = cards
        .iter()
        .map(|(q, a)| serde_json::json!({ "question": q, "answer": a }))
        .collect();
    let response = send_json(
        app,
        "POST",
        "/api/decks",
        Some(token),
        serde_json::json!({
            "name": name,
            "visibility": visibility,
            "flashcards": flashcards,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_str().unwrap().to_string()
}
