use chrono::{Duration, Utc};
use course_registration::application::engine::RegistrationEngine;
use course_registration::domain::course::Course;
use course_registration::domain::ports::Catalog;
use course_registration::domain::student::Student;
use course_registration::error::{RegistrationError, Violation};
use course_registration::infrastructure::in_memory::InMemoryStore;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_registrations_leave_one_record() {
    let store = InMemoryStore::new();
    store
        .upsert_student(Student::new(1, "a@x.com", "Ada", "Lovelace"))
        .await
        .unwrap();
    let start = Utc::now() + Duration::days(1);
    store
        .upsert_course(Course::new(1, "Rust", start, start + Duration::days(1), 10))
        .await
        .unwrap();

    let engine = Arc::new(RegistrationEngine::with_system_clock(Box::new(store.clone())));
    let handles: Vec<_> = (0..32)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.register("a@x.com", 1).await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(RegistrationError::InvalidOperation(Violation::AlreadyRegistered)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(store.registrations().await.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_students_do_not_interfere() {
    let store = InMemoryStore::new();
    for id in 1..=8 {
        store
            .upsert_student(Student::new(id, format!("s{id}@x.com"), "First", "Last"))
            .await
            .unwrap();
    }
    let start = Utc::now() + Duration::days(1);
    store
        .upsert_course(Course::new(1, "Rust", start, start + Duration::days(1), 10))
        .await
        .unwrap();

    let engine = Arc::new(RegistrationEngine::with_system_clock(Box::new(store.clone())));
    let handles: Vec<_> = (1..=8)
        .map(|id| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.register(&format!("s{id}@x.com"), 1).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().len(), 1);
    }
    assert_eq!(store.registrations().await.len(), 8);
}
