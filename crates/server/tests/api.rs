use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use db::{DBService, models::focus_routine::PlanningField};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use server::{config::ServerConfig, deployment::Deployment, extract::USER_ID_HEADER, routes};
use services::services::{
    claude_api::ClaudeApiError,
    insights::{NOT_ENOUGH_ENTRIES, TextGenerator},
    routine::PlanningNote,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::oneshot,
    time::{sleep, timeout},
};
use tower::ServiceExt;
use utils::time::today;

struct FixedGenerator(Result<String, ClaudeApiError>);

#[async_trait]
impl TextGenerator for FixedGenerator {
    async fn generate(&self, _prompt: &str, _system: Option<&str>) -> Result<String, ClaudeApiError> {
        self.0.clone()
    }
}

fn quote_generator() -> FixedGenerator {
    FixedGenerator(Ok("\"Discipline is remembering what you want.\"".to_string()))
}

async fn deployment_with(generator: FixedGenerator, vars: &[(&str, &str)]) -> Deployment {
    let db = DBService::new_in_memory().await.unwrap();
    let config = ServerConfig::from_lookup(|key| {
        vars.iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.to_string())
    })
    .unwrap();
    Deployment::new(db, Arc::new(generator), &config)
}

async fn app_with(generator: FixedGenerator) -> Router {
    routes::router(deployment_with(generator, &[]).await)
}

async fn app() -> Router {
    app_with(quote_generator()).await
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        request = request.header(USER_ID_HEADER, user);
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn health_needs_no_user() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn requests_without_a_user_are_unauthorized() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/api/routine/today", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn sign_in_seeds_a_routine_that_scores() {
    let app = app().await;
    let (status, _) = send(
        &app,
        "PUT",
        "/api/profile",
        Some("alice"),
        Some(json!({ "email": "alice@example.com", "display_name": "Alice", "photo_url": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, day) = send(&app, "GET", "/api/routine/today", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(day["data"]["tasks"].as_array().unwrap().len(), 4);
    assert_eq!(day["data"]["score"]["possible_points"], 40);

    let task_id = day["data"]["tasks"][0]["id"].as_str().unwrap().to_string();
    let (status, day) = send(
        &app,
        "POST",
        &format!("/api/routine/today/tasks/{task_id}/toggle"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(day["data"]["score"]["earned_points"], 10);
    assert_eq!(day["data"]["score"]["progress_percent"], 25.0);

    // Other users never see alice's tasks.
    let (_, day) = send(&app, "GET", "/api/routine/today", Some("bob"), None).await;
    assert!(day["data"]["tasks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn completing_an_empty_goal_is_a_field_error() {
    let app = app().await;
    let (status, body) = send(
        &app,
        "PUT",
        "/api/routine/today/goals/0",
        Some("alice"),
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error_data"]["completed"].is_string());
}

#[tokio::test]
async fn invalid_goal_is_rejected_with_field_errors() {
    let app = app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/goals",
        Some("alice"),
        Some(json!({ "title": "  ", "due_date": "2000-01-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error_data"]["title"].is_string());
    assert!(body["error_data"]["due_date"].is_string());

    let (_, board) = send(&app, "GET", "/api/goals", Some("alice"), None).await;
    assert!(board["data"]["active"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_an_unknown_goal_is_not_found() {
    let app = app().await;
    let (status, body) = send(
        &app,
        "DELETE",
        "/api/goals/6f1c2d3e-4b5a-4c7d-8e9f-0a1b2c3d4e5f",
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn quote_comes_back_without_quotation_marks() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/api/insights/quote", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["text"], "Discipline is remembering what you want.");
}

#[tokio::test]
async fn generation_failures_use_a_generic_message() {
    let app = app_with(FixedGenerator(Err(ClaudeApiError::RateLimited))).await;
    let (status, body) = send(&app, "GET", "/api/insights/quote", Some("alice"), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "Failed to generate quote.");

    let (status, _) = send(
        &app,
        "POST",
        "/api/journal",
        Some("alice"),
        Some(json!({
            "emotion": "focused",
            "achievements": "Finished the chapter",
            "improvements": "Start earlier tomorrow",
            "learnings": "Focus follows action",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "POST", "/api/journal/analysis", Some("alice"), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "Failed to analyze journal entries.");
}

#[tokio::test]
async fn analysis_without_entries_answers_locally() {
    let app = app_with(FixedGenerator(Err(ClaudeApiError::RateLimited))).await;
    let (status, body) = send(&app, "POST", "/api/journal/analysis", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["summary"], NOT_ENOUGH_ENTRIES);
}

#[tokio::test]
async fn family_checklist_is_seeded_and_toggled() {
    let app = app().await;
    let (status, tasks) = send(&app, "GET", "/api/family/tasks", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tasks["data"].as_array().unwrap().len(), 4);

    let id = tasks["data"][0]["id"].as_str().unwrap().to_string();
    let (status, task) = send(
        &app,
        "POST",
        &format!("/api/family/tasks/{id}/toggle"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["data"]["completed"], true);

    let (status, latest) = send(&app, "GET", "/api/family/events/latest", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(latest["data"].is_null());
}

#[tokio::test]
async fn monthly_progress_defaults_to_six_months() {
    let app = app().await;
    let (status, months) = send(&app, "GET", "/api/progress/monthly", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(months["data"].as_array().unwrap().len(), 6);

    let (_, months) = send(&app, "GET", "/api/progress/monthly?months=2", Some("alice"), None).await;
    assert_eq!(months["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn event_stream_carries_only_the_users_changes() {
    let app = app().await;
    let request = Request::get("/api/events")
        .header(USER_ID_HEADER, "alice")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");
    let mut body = response.into_body();

    let goal = json!({ "title": "Run a marathon", "due_date": "2099-01-01" });
    let (status, _) = send(&app, "POST", "/api/goals", Some("bob"), Some(goal.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "POST", "/api/goals", Some("alice"), Some(goal)).await;
    assert_eq!(status, StatusCode::OK);

    let frame = timeout(Duration::from_secs(5), body.frame())
        .await
        .expect("no event arrived")
        .unwrap()
        .unwrap();
    let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
    assert!(text.starts_with("event: change"), "{text}");
    assert!(text.contains(r#""user_id":"alice""#), "{text}");
    assert!(text.contains(r#""collection":"long_term_goals""#), "{text}");
    assert!(text.contains(r#""op":"created""#), "{text}");
}

#[tokio::test]
async fn rapid_note_edits_persist_only_the_last_value() {
    let app = routes::router(deployment_with(quote_generator(), &[("NOTES_DEBOUNCE_MS", "100")]).await);

    for text in ["Plan", "Plan the", "Plan the week"] {
        let (status, _) = send(
            &app,
            "PUT",
            "/api/routine/today/notes",
            Some("alice"),
            Some(json!({ "field": "morning_plan", "text": text })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    sleep(Duration::from_millis(600)).await;
    let (_, day) = send(&app, "GET", "/api/routine/today", Some("alice"), None).await;
    assert_eq!(day["data"]["routine"]["morning_plan"], "Plan the week");
    assert_eq!(day["data"]["routine"]["evening_review"], "");
}

#[tokio::test]
async fn shutdown_ends_event_streams_and_flushes_pending_notes() {
    let deployment =
        deployment_with(quote_generator(), &[("NOTES_DEBOUNCE_MS", "60000")]).await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(server::serve(listener, deployment.clone(), async {
        let _ = stopped.await;
    }));

    let date = today();
    deployment
        .routine()
        .queue_planning_note(
            "alice",
            date,
            PlanningNote {
                field: PlanningField::EveningReview,
                text: "Held the line".to_string(),
            },
        )
        .await
        .unwrap();

    let mut client = TcpStream::connect(addr).await.unwrap();
    client
        .write_all(
            format!("GET /api/events HTTP/1.1\r\nhost: {addr}\r\n{USER_ID_HEADER}: alice\r\n\r\n")
                .as_bytes(),
        )
        .await
        .unwrap();
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !String::from_utf8_lossy(&head).contains("\r\n\r\n") {
        let read = timeout(Duration::from_secs(5), client.read(&mut buf))
            .await
            .expect("no response head")
            .unwrap();
        assert!(read > 0, "connection closed early");
        head.extend_from_slice(&buf[..read]);
    }
    assert!(String::from_utf8_lossy(&head).starts_with("HTTP/1.1 200"));

    stop.send(()).unwrap();
    timeout(Duration::from_secs(5), server)
        .await
        .expect("server kept running with an open event stream")
        .unwrap()
        .unwrap();

    let day = deployment.routine().day("alice", date).await.unwrap();
    assert_eq!(day.routine.evening_review, "Held the line");
}

#[tokio::test]
async fn achievements_start_locked() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/api/progress/achievements", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    let achievements = body["data"].as_array().unwrap();
    assert_eq!(achievements.len(), 4);
    assert_eq!(achievements[0]["kind"], "in_the_arena");
    assert!(achievements.iter().all(|a| a["unlocked"] == false));

    let (_, dashboard) = send(&app, "GET", "/api/progress/dashboard", Some("alice"), None).await;
    assert_eq!(dashboard["data"]["streak_days"], 0);
}
