use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use chrono::{Duration, TimeZone, Utc};
use course_registration::application::engine::RegistrationEngine;
use course_registration::domain::clock::ManualClock;
use course_registration::domain::course::Course;
use course_registration::domain::ports::Catalog;
use course_registration::domain::student::Student;
use course_registration::infrastructure::in_memory::InMemoryStore;
use course_registration::interfaces::http::router;
use std::sync::Arc;
use tower::ServiceExt;

async fn app() -> (Router, ManualClock) {
    let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let store = InMemoryStore::new();
    store
        .upsert_student(Student::new(1, "a@x.com", "Ada", "Lovelace"))
        .await
        .unwrap();
    store
        .upsert_course(Course::new(
            1,
            "Rust",
            now + Duration::days(1),
            now + Duration::days(2),
            100_000,
        ))
        .await
        .unwrap();

    let clock = ManualClock::new(now);
    let engine = RegistrationEngine::new(Box::new(store), Box::new(clock.clone()));
    (router(Arc::new(engine)), clock)
}

async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_register_returns_upcoming_courses() {
    let (app, _) = app().await;

    let (status, body) = send(&app, Method::POST, "/api/register/1/a@x.com").await;

    assert_eq!(status, StatusCode::OK);
    let courses: Vec<Course> = serde_json::from_str(&body).unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].id, 1);
    assert_eq!(courses[0].price, 100_000);
}

#[tokio::test]
async fn test_register_twice_is_bad_request() {
    let (app, _) = app().await;

    send(&app, Method::POST, "/api/register/1/a@x.com").await;
    let (status, body) = send(&app, Method::POST, "/api/register/1/a@x.com").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid operation: already registered for this course");
}

#[tokio::test]
async fn test_unknown_student_is_bad_request() {
    let (app, _) = app().await;

    let (status, body) = send(&app, Method::POST, "/api/register/1/nobody@x.com").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Student not found");
}

#[tokio::test]
async fn test_unregister_flow() {
    let (app, _) = app().await;

    send(&app, Method::POST, "/api/register/1/a@x.com").await;
    let (status, body) = send(&app, Method::DELETE, "/api/unregister/1/a@x.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Unregistered successfully");

    let (status, body) = send(&app, Method::DELETE, "/api/unregister/1/a@x.com").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Registration not found");
}

#[tokio::test]
async fn test_unregister_after_start_is_bad_request() {
    let (app, clock) = app().await;

    send(&app, Method::POST, "/api/register/1/a@x.com").await;
    clock.advance(Duration::days(1));
    let (status, body) = send(&app, Method::DELETE, "/api/unregister/1/a@x.com").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        "Invalid operation: cannot unregister from a course that has already started"
    );
}

#[tokio::test]
async fn test_non_numeric_course_id_is_rejected() {
    let (app, _) = app().await;

    let (status, _) = send(&app, Method::POST, "/api/register/abc/a@x.com").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
