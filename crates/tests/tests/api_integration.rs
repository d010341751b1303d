use axum::http::StatusCode;
use campus_tests::{get, json_body, post_json, test_app};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn home_and_health_respond() {
    let app = test_app().await;

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Welcome to AI Campus Assistant Chatbot");

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-request-id").is_some());
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");
}

#[tokio::test]
async fn courses_are_seeded_in_order() {
    let app = test_app().await;

    let response = app.oneshot(get("/courses")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let codes = body
        .as_array()
        .unwrap()
        .iter()
        .map(|course| course["code"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(codes, vec!["CS102", "ML201", "DL301", "NLP201"]);
    assert_eq!(
        body[0]["keywords"],
        json!(["python", "beginner", "programming", "aiml"])
    );
}

#[tokio::test]
async fn chat_returns_reply_and_intent() {
    let app = test_app().await;

    let response = app
        .oneshot(post_json(
            "/chat",
            json!({ "session_id": "Eve", "user_message": "do you have python courses?" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["intent"], "search_course");
    assert_eq!(body["bot_response"], "CS102 - Python for AI (Dr. Meera Iyer)");
}

#[tokio::test]
async fn chat_greeting_beats_enroll() {
    let app = test_app().await;

    let response = app
        .oneshot(post_json(
            "/chat",
            json!({ "session_id": "Eve", "user_message": "hi, I want to enroll" }),
        ))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["intent"], "greeting");
    assert_eq!(
        body["bot_response"],
        "Hello! I can help you explore AI/ML courses."
    );
}

#[tokio::test]
async fn catalog_search_matches_names_and_returns_404_on_miss() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(get("/courses/search?keyword=Basics"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["code"], "NLP201");

    let response = app
        .oneshot(get("/courses/search?keyword=quantum"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["message"], "No courses found matching that keyword.");
}

#[tokio::test]
async fn session_creation_is_idempotent() {
    let app = test_app().await;
    let payload = json!({ "session_id": "Noon", "user_email": "rahul@gmail.com" });

    let first = app
        .clone()
        .oneshot(post_json("/session", payload.clone()))
        .await
        .unwrap();
    assert_eq!(json_body(first).await["message"], "New session started.");

    let second = app.oneshot(post_json("/session", payload)).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(json_body(second).await["message"], "Session already exists.");
}

#[tokio::test]
async fn enroll_checks_course_and_lists_enrollments() {
    let app = test_app().await;

    let missing = app
        .clone()
        .oneshot(post_json(
            "/enroll",
            json!({
                "session_id": "Eve",
                "student_email": "iyer@gmail.com",
                "student_name": "Iyer",
                "course_code": "XX999"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(missing).await["message"], "Course not found.");

    let enrolled = app
        .clone()
        .oneshot(post_json(
            "/enroll",
            json!({
                "session_id": "Eve",
                "student_email": "iyer@gmail.com",
                "student_name": "Iyer",
                "course_code": "DL301"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(enrolled.status(), StatusCode::OK);
    assert_eq!(
        json_body(enrolled).await["message"],
        "Enrolled successfully in Deep Learning!"
    );

    let listed = app.oneshot(get("/enrollments")).await.unwrap();
    let body = json_body(listed).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["course_code"], "DL301");
}

#[tokio::test]
async fn chat_history_follows_sessions_by_email() {
    let app = test_app().await;

    let missing = app
        .clone()
        .oneshot(get("/chat-history?email=sneha@gmail.com"))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    app.clone()
        .oneshot(post_json(
            "/session",
            json!({ "session_id": "Eve", "user_email": "sneha@gmail.com" }),
        ))
        .await
        .unwrap();
    for message in ["list courses", "bye"] {
        app.clone()
            .oneshot(post_json(
                "/chat",
                json!({ "session_id": "Eve", "user_message": message }),
            ))
            .await
            .unwrap();
    }

    let response = app
        .oneshot(get("/chat-history?email=sneha@gmail.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let intents = body
        .as_array()
        .unwrap()
        .iter()
        .map(|message| message["intent"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(intents, vec!["list_courses", "exit"]);
    assert_eq!(body[0]["session_id"], "Eve");
}

#[tokio::test]
async fn malformed_chat_body_is_rejected() {
    let app = test_app().await;

    let response = app
        .oneshot(post_json("/chat", json!({ "session_id": "Eve" })))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn rate_limit_applies_per_client() {
    let config = campus_api::ApiConfig {
        rate_limit_max: 2,
        ..Default::default()
    };
    let app = campus_api::build_app(&config).await.unwrap();

    for _ in 0..2 {
        let response = app.clone().oneshot(get("/courses")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.clone().oneshot(get("/courses")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json_body(response).await["error"], "rate_limited");

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
