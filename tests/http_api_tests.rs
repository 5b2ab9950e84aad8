#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use slot_booking::{AvailabilityRow, BookingPolicy, CsvStore, MemoryStore, http_api};
use tempfile::tempdir;
use tower::util::ServiceExt;

fn new_router() -> axum::Router {
    let store = MemoryStore::with_availability([
        AvailabilityRow::new("Choir", "10.03.2025", "09:00 - 18:00"),
        AvailabilityRow::new("Band", "11.03.2025", "14:00 - 20:00"),
    ]);
    let state = http_api::AppState::new(store, BookingPolicy::default());
    http_api::router(state)
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_booking(app: &axum::Router, payload: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/bookings")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn lists_projects_and_slots() {
    let app = new_router();

    let (status, projects) = get_json(&app, "/projects").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(projects, json!(["Band", "Choir"]));

    let (status, dates) = get_json(&app, "/projects/Choir/dates").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dates, json!(["2025-03-10"]));

    let (status, day) = get_json(&app, "/projects/Choir/dates/10.03.2025/slots").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(day["status"], "candidates");
    assert_eq!(day["window"], "09:00 - 18:00");
    assert_eq!(day["candidates"][0], "09:00 - 12:00");
    assert_eq!(day["candidates"].as_array().unwrap().len(), 25);

    let (status, day) = get_json(&app, "/projects/Choir/dates/2025-04-01/slots").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(day["status"], "no_availability");

    let (status, body) = get_json(&app, "/projects/Choir/dates/someday/slots").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn booking_lifecycle_via_http_api() {
    let app = new_router();

    let (status, record) = post_booking(
        &app,
        json!({
            "project": "Choir",
            "date": "10.03.2025",
            "slot": "11:00 - 14:00",
            "instrument": "Viola",
            "person": "Kim",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["slot"], "11:00 - 14:00");
    assert_eq!(record["date"], "2025-03-10");

    let (status, body) = post_booking(
        &app,
        json!({
            "project": "Choir",
            "date": "2025-03-10",
            "slot": "13:00 - 16:00",
            "instrument": "Oboe",
            "person": "Robin",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["rejection"]["reason"], "overlap");
    assert_eq!(body["rejection"]["conflicting"], "11:00 - 14:00");

    let (status, body) = post_booking(
        &app,
        json!({
            "project": "Choir",
            "date": "10.03.2025",
            "slot": "14:00 - 17:00",
            "instrument": "Oboe",
            "person": " ",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");

    let (status, bookings) = get_json(&app, "/projects/Choir/bookings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bookings.as_array().unwrap().len(), 1);

    let (status, report) = get_json(&app, "/free-time").await;
    assert_eq!(status, StatusCode::OK);
    let ranges: Vec<&str> = report
        .as_array()
        .unwrap()
        .iter()
        .filter(|row| row["project"] == "Choir")
        .map(|row| row["gap"].as_str().unwrap())
        .collect();
    assert_eq!(ranges, vec!["09:00 - 11:00", "14:00 - 18:00"]);
}

#[tokio::test]
async fn health_and_policy_endpoints() {
    let app = new_router();
    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (_, policy) = get_json(&app, "/policy").await;
    assert_eq!(policy["slot_minutes"], 180);
    assert_eq!(policy["step_minutes"], 15);
}

#[tokio::test]
async fn off_grid_booking_is_rejected_as_not_offered() {
    let app = new_router();
    let (status, body) = post_booking(
        &app,
        json!({
            "project": "Choir",
            "date": "10.03.2025",
            "slot": "09:07 - 12:07",
            "instrument": "Viola",
            "person": "Kim",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["rejection"]["reason"], "not_offered");
    assert_eq!(body["rejection"]["candidate"], "09:07 - 12:07");
}

async fn book_through(store: http_api::SharedStore) -> StatusCode {
    let app = http_api::router(http_api::AppState::with_shared(store, BookingPolicy::default()));
    let (status, _) = post_booking(
        &app,
        json!({
            "project": "Choir",
            "date": "10.03.2025",
            "slot": "09:00 - 12:00",
            "instrument": "Viola",
            "person": "Kim",
        }),
    )
    .await;
    status
}

fn seed_csv(dir: &std::path::Path) {
    CsvStore::open(dir)
        .unwrap()
        .write_availability(&[AvailabilityRow::new("Choir", "10.03.2025", "09:00 - 18:00")])
        .unwrap();
}

#[tokio::test]
async fn open_store_without_sqlite_path_uses_the_csv_directory() {
    let dir = tempdir().unwrap();
    seed_csv(dir.path());
    let store = http_api::open_store(None, dir.path()).unwrap();
    assert_eq!(book_through(store).await, StatusCode::CREATED);
    assert!(dir.path().join("bookings.csv").exists());
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn open_store_with_sqlite_path_uses_sqlite() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("slots.db");
    let store = http_api::open_store(Some(db.to_str().unwrap()), dir.path()).unwrap();
    assert!(db.exists());
    // the sqlite store has no availability yet
    assert_eq!(book_through(store).await, StatusCode::CONFLICT);
    assert!(!dir.path().join("bookings.csv").exists());
}

#[cfg(not(feature = "sqlite"))]
#[tokio::test]
async fn open_store_falls_back_to_csv_without_the_sqlite_feature() {
    let dir = tempdir().unwrap();
    seed_csv(dir.path());
    let db = dir.path().join("slots.db");
    let store = http_api::open_store(Some(db.to_str().unwrap()), dir.path()).unwrap();
    assert_eq!(book_through(store).await, StatusCode::CREATED);
    assert!(!db.exists());
    assert!(dir.path().join("bookings.csv").exists());
}
