use axum::http::StatusCode;

mod common;

use common::{body_json, create_deck, create_test_app, register_user, send, send_json};

#[tokio::test]
async fn test_health_root() {
    let app = create_test_app().await;
    let response = send(&app, "GET", "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "ok");
}

#[tokio::test]
async fn test_health_live() {
    let app = create_test_app().await;
    let response = send(&app, "GET", "/health/live", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_info() {
    let app = create_test_app().await;
    let response = send(&app, "GET", "/health/info", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_404_not_found() {
    let app = create_test_app().await;
    let response = send(&app, "GET", "/nonexistent/path", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_me_unauthorized_without_token() {
    let app = create_test_app().await;
    let response = send(&app, "GET", "/api/users/me", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_then_login() {
    let app = create_test_app().await;
    let token = register_user(&app, "ada@example.com", "ada").await;
    assert!(!token.is_empty());

    let response = send_json(
        &app,
        "POST",
        "/api/auth/login",
        None,
        serde_json::json!({ "email": "ada@example.com", "password": "correct horse battery" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["user"]["username"], "ada");
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let app = create_test_app().await;
    register_user(&app, "dup@example.com", "first").await;

    let response = send_json(
        &app,
        "POST",
        "/api/auth/register",
        None,
        serde_json::json!({
            "email": "dup@example.com",
            "username": "second",
            "password": "another password",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = create_test_app().await;
    register_user(&app, "bob@example.com", "bob").await;

    let response = send_json(
        &app,
        "POST",
        "/api/auth/login",
        None,
        serde_json::json!({ "email": "bob@example.com", "password": "wrong password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_grants_starting_energy() {
    let app = create_test_app().await;
    let token = register_user(&app, "nrg@example.com", "nrg").await;

    let response = send(&app, "GET", "/api/users/me/energy", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["amount"], 5);
}

#[tokio::test]
async fn test_deck_create_list_get() {
    let app = create_test_app().await;
    let token = register_user(&app, "deck@example.com", "decker").await;

    let deck_id = create_deck(
        &app,
        &token,
        "Spanish basics",
        "private",
        &[("hola", "hello"), ("adios", "goodbye")],
    )
    .await;

    let response = send(&app, "GET", "/api/decks", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["cardCount"], 2);

    let response = send(&app, "GET", &format!("/api/decks/{deck_id}"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Spanish basics");
    assert_eq!(json["data"]["flashcards"].as_array().unwrap().len(), 2);
    assert_eq!(json["data"]["mastery"], 0.0);
}

#[tokio::test]
async fn test_private_deck_hidden_from_other_users() {
    let app = create_test_app().await;
    let owner = register_user(&app, "owner@example.com", "owner").await;
    let other = register_user(&app, "other@example.com", "other").await;

    let deck_id = create_deck(&app, &owner, "secrets", "private", &[("q", "a")]).await;

    let response = send(&app, "GET", &format!("/api/decks/{deck_id}"), Some(&other)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_deck_create_rejects_blank_card() {
    let app = create_test_app().await;
    let token = register_user(&app, "blank@example.com", "blank").await;

    let response = send_json(
        &app,
        "POST",
        "/api/decks",
        Some(&token),
        serde_json::json!({
            "name": "broken",
            "flashcards": [{ "question": " ", "answer": "a" }],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_flip_session_full_flow() {
    let app = create_test_app().await;
    let token = register_user(&app, "study@example.com", "learner").await;
    let deck_id = create_deck(
        &app,
        &token,
        "flow deck",
        "private",
        &[("one", "uno"), ("two", "dos"), ("three", "tres")],
    )
    .await;

    let response = send_json(
        &app,
        "POST",
        "/api/study/sessions",
        Some(&token),
        serde_json::json!({ "deckId": deck_id, "mode": "flip" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let session_id = json["data"]["session"]["sessionId"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(json["data"]["session"]["cardCount"], 3);
    assert_eq!(json["data"]["flashcards"].as_array().unwrap().len(), 3);

    // Card navigation wraps around and flipping resets on movement.
    let base = format!("/api/study/sessions/{session_id}");
    let response = send(&app, "POST", &format!("{base}/flip"), Some(&token)).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["isFlipped"], true);

    let response = send(&app, "POST", &format!("{base}/next"), Some(&token)).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["currentIndex"], 1);
    assert_eq!(json["data"]["isFlipped"], false);

    let response = send(&app, "POST", &format!("{base}/prev"), Some(&token)).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["currentIndex"], 0);

    let response = send(&app, "POST", &format!("{base}/tick"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", &base, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["preview"]["capReached"], false);

    // Ending immediately studies under a minute, so mastery is unchanged.
    let response = send(&app, "POST", &format!("{base}/end"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["finalMastery"], 0.0);
    assert_eq!(json["data"]["masteryGain"], 0.0);

    // The ended session is gone.
    let response = send(&app, "GET", &base, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_second_session_for_same_deck_conflicts() {
    let app = create_test_app().await;
    let token = register_user(&app, "twice@example.com", "twice").await;
    let deck_id = create_deck(&app, &token, "dup deck", "private", &[("q", "a")]).await;

    let body = serde_json::json!({ "deckId": deck_id, "mode": "flip" });
    let response = send_json(&app, "POST", "/api/study/sessions", Some(&token), body.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send_json(&app, "POST", "/api/study/sessions", Some(&token), body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_abandon_discards_session() {
    let app = create_test_app().await;
    let token = register_user(&app, "quit@example.com", "quitter").await;
    let deck_id = create_deck(&app, &token, "quit deck", "private", &[("q", "a")]).await;

    let response = send_json(
        &app,
        "POST",
        "/api/study/sessions",
        Some(&token),
        serde_json::json!({ "deckId": deck_id, "mode": "flip" }),
    )
    .await;
    let json = body_json(response).await;
    let session_id = json["data"]["session"]["sessionId"]
        .as_str()
        .unwrap()
        .to_string();

    let uri = format!("/api/study/sessions/{session_id}");
    let response = send(&app, "DELETE", &uri, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", &uri, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_start_requires_auth() {
    let app = create_test_app().await;
    let response = send_json(
        &app,
        "POST",
        "/api/study/sessions",
        None,
        serde_json::json!({ "deckId": "whatever", "mode": "flip" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_start_rejects_missing_deck() {
    let app = create_test_app().await;
    let token = register_user(&app, "lost@example.com", "lost").await;

    let response = send_json(
        &app,
        "POST",
        "/api/study/sessions",
        Some(&token),
        serde_json::json!({ "mode": "flip" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send_json(
        &app,
        "POST",
        "/api/study/sessions",
        Some(&token),
        serde_json::json!({ "deckId": "no-such-deck", "mode": "flip" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_start_blocked_on_empty_deck() {
    let app = create_test_app().await;
    let token = register_user(&app, "empty@example.com", "empty").await;
    let deck_id = create_deck(&app, &token, "empty deck", "private", &[]).await;

    let response = send_json(
        &app,
        "POST",
        "/api/study/sessions",
        Some(&token),
        serde_json::json!({ "deckId": deck_id, "mode": "flip" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_session_start_blocked_on_foreign_private_deck() {
    let app = create_test_app().await;
    let owner = register_user(&app, "po@example.com", "po").await;
    let intruder = register_user(&app, "pi@example.com", "pi").await;
    let deck_id = create_deck(&app, &owner, "mine", "private", &[("q", "a")]).await;

    let response = send_json(
        &app,
        "POST",
        "/api/study/sessions",
        Some(&intruder),
        serde_json::json!({ "deckId": deck_id, "mode": "flip" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_public_deck_studyable_by_anyone() {
    let app = create_test_app().await;
    let owner = register_user(&app, "pub@example.com", "pub").await;
    let reader = register_user(&app, "reader@example.com", "reader").await;
    let deck_id = create_deck(&app, &owner, "shared", "public", &[("q", "a")]).await;

    let response = send_json(
        &app,
        "POST",
        "/api/study/sessions",
        Some(&reader),
        serde_json::json!({ "deckId": deck_id, "mode": "quiz" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_card_navigation_rejected_outside_flip_mode() {
    let app = create_test_app().await;
    let token = register_user(&app, "qm@example.com", "qm").await;
    let deck_id = create_deck(&app, &token, "quiz deck", "private", &[("q", "a")]).await;

    let response = send_json(
        &app,
        "POST",
        "/api/study/sessions",
        Some(&token),
        serde_json::json!({ "deckId": deck_id, "mode": "quiz" }),
    )
    .await;
    let json = body_json(response).await;
    let session_id = json["data"]["session"]["sessionId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = send(
        &app,
        "POST",
        &format!("/api/study/sessions/{session_id}/next"),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_quiz_token_issue_and_redeem_once() {
    let app = create_test_app().await;
    let token = register_user(&app, "qt@example.com", "qt").await;
    let deck_id = create_deck(&app, &token, "quizable", "private", &[("q", "a")]).await;

    let response = send_json(
        &app,
        "POST",
        "/api/quiz/tokens",
        Some(&token),
        serde_json::json!({ "deckId": deck_id, "numQuestions": 10 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let quiz_token = json["data"]["token"].as_str().unwrap().to_string();
    assert_eq!(json["data"]["numQuestions"], 10);

    // Issuance cost one energy unit.
    let response = send(&app, "GET", "/api/users/me/energy", Some(&token)).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["amount"], 4);

    let redeem_body = serde_json::json!({ "token": quiz_token, "deckId": deck_id });
    let response = send_json(&app, "POST", "/api/quiz/tokens/redeem", Some(&token), redeem_body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["granted"], true);

    let response = send_json(&app, "POST", "/api/quiz/tokens/redeem", Some(&token), redeem_body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_quiz_token_rejects_bad_question_count() {
    let app = create_test_app().await;
    let token = register_user(&app, "size@example.com", "size").await;
    let deck_id = create_deck(&app, &token, "sized", "private", &[("q", "a")]).await;

    let response = send_json(
        &app,
        "POST",
        "/api/quiz/tokens",
        Some(&token),
        serde_json::json!({ "deckId": deck_id, "numQuestions": 12 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // An invalid size never touches the balance.
    let response = send(&app, "GET", "/api/users/me/energy", Some(&token)).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["amount"], 5);
}

#[tokio::test]
async fn test_quiz_token_scoped_to_deck() {
    let app = create_test_app().await;
    let token = register_user(&app, "scope@example.com", "scope").await;
    let deck_a = create_deck(&app, &token, "deck a", "private", &[("q", "a")]).await;
    let deck_b = create_deck(&app, &token, "deck b", "private", &[("q", "a")]).await;

    let response = send_json(
        &app,
        "POST",
        "/api/quiz/tokens",
        Some(&token),
        serde_json::json!({ "deckId": deck_a, "numQuestions": 15 }),
    )
    .await;
    let json = body_json(response).await;
    let quiz_token = json["data"]["token"].as_str().unwrap().to_string();

    let response = send_json(
        &app,
        "POST",
        "/api/quiz/tokens/redeem",
        Some(&token),
        serde_json::json!({ "token": quiz_token, "deckId": deck_b }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_quiz_tokens_blocked_when_energy_runs_out() {
    let app = create_test_app().await;
    let token = register_user(&app, "drain@example.com", "drain").await;
    let deck_id = create_deck(&app, &token, "drained", "private", &[("q", "a")]).await;

    let body = serde_json::json!({ "deckId": deck_id, "numQuestions": 10 });
    for _ in 0..5 {
        let response = send_json(&app, "POST", "/api/quiz/tokens", Some(&token), body.clone()).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send_json(&app, "POST", "/api/quiz/tokens", Some(&token), body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INSUFFICIENT_ENERGY");

    let response = send(&app, "GET", "/api/users/me/energy", Some(&token)).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["amount"], 0);
}

#[tokio::test]
async fn test_quiz_token_for_empty_deck_rejected() {
    let app = create_test_app().await;
    let token = register_user(&app, "noq@example.com", "noq").await;
    let deck_id = create_deck(&app, &token, "hollow", "private", &[]).await;

    let response = send_json(
        &app,
        "POST",
        "/api/quiz/tokens",
        Some(&token),
        serde_json::json!({ "deckId": deck_id, "numQuestions": 10 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
