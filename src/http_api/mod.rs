use std::{net::SocketAddr, path::Path as FsPath, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    AvailabilityView, BookingBackend, BookingError, BookingOutcome, BookingPolicy, BookingRecord,
    BookingRequest, CsvStore, FreeTimeRecord, Interval, Rejection, SlotLookup, StoreError,
    StoreResult, parse_date,
};

pub type SharedStore = Arc<dyn BookingBackend + Send + Sync>;

/// Open the SQLite store at `sqlite_path` when one is given, else the CSV
/// directory. Builds without the `sqlite` feature warn and use the CSV store.
pub fn open_store(sqlite_path: Option<&str>, data_dir: &FsPath) -> StoreResult<SharedStore> {
    match sqlite_path {
        #[cfg(feature = "sqlite")]
        Some(path) => {
            log::info!("using sqlite store at {path}");
            Ok(Arc::new(crate::SqliteStore::new(path)?))
        }
        #[cfg(not(feature = "sqlite"))]
        Some(path) => {
            log::warn!(
                "ignoring sqlite store {path}: built without the `sqlite` feature, using csv in {}",
                data_dir.display()
            );
            Ok(Arc::new(CsvStore::open(data_dir)?))
        }
        None => {
            log::info!("using csv store in {}", data_dir.display());
            Ok(Arc::new(CsvStore::open(data_dir)?))
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    store: SharedStore,
    policy: Arc<BookingPolicy>,
}

impl AppState {
    pub fn new<S>(store: S, policy: BookingPolicy) -> Self
    where
        S: BookingBackend + Send + Sync + 'static,
    {
        Self {
            store: Arc::new(store),
            policy: Arc::new(policy),
        }
    }

    pub fn with_shared(store: SharedStore, policy: BookingPolicy) -> Self {
        Self {
            store,
            policy: Arc::new(policy),
        }
    }

    fn view(&self) -> AvailabilityView<'_, dyn BookingBackend + Send + Sync> {
        AvailabilityView::new(self.store.as_ref(), self.policy.as_ref())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    Rejected(Rejection),
    Invalid(String),
    Internal(String),
}

/// Body of `POST /bookings`. `date` accepts `DD.MM.YYYY` as well as ISO dates.
#[derive(Debug, Deserialize)]
struct BookingPayload {
    project: String,
    date: String,
    slot: Interval,
    instrument: String,
    person: String,
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        ApiError::Internal(value.to_string())
    }
}

impl From<BookingError> for ApiError {
    fn from(value: BookingError) -> Self {
        match value {
            BookingError::Form(err) => ApiError::Invalid(err.to_string()),
            BookingError::Store(err) => ApiError::from(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Rejected(rejection) => {
                let body = Json(json!({
                    "error": "rejected",
                    "message": rejection.to_string(),
                    "rejection": rejection,
                }));
                (StatusCode::CONFLICT, body).into_response()
            }
            ApiError::Invalid(message) => {
                let body = Json(ErrorBody {
                    error: "invalid_request",
                    message,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Internal(message) => {
                log::error!("request failed: {message}");
                let body = Json(ErrorBody {
                    error: "internal_error",
                    message,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/policy", get(get_policy))
        .route("/projects", get(list_projects))
        .route("/projects/:project/dates", get(list_dates))
        .route("/projects/:project/dates/:date/slots", get(get_slots))
        .route("/projects/:project/bookings", get(list_bookings))
        .route("/bookings", post(create_booking))
        .route("/free-time", get(get_free_time))
        .route("/free-time/refresh", post(refresh_free_time))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

fn path_date(raw: &str) -> Result<NaiveDate, ApiError> {
    parse_date(raw).ok_or_else(|| ApiError::invalid(format!("invalid date '{raw}'")))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_policy(State(state): State<AppState>) -> Json<BookingPolicy> {
    Json(state.policy.as_ref().clone())
}

async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.view().projects()?))
}

async fn list_dates(
    State(state): State<AppState>,
    Path(project): Path<String>,
) -> Result<Json<Vec<NaiveDate>>, ApiError> {
    Ok(Json(state.view().bookable_dates(&project)?))
}

async fn get_slots(
    State(state): State<AppState>,
    Path((project, date)): Path<(String, String)>,
) -> Result<Json<SlotLookup>, ApiError> {
    let date = path_date(&date)?;
    Ok(Json(state.view().day(&project, date)?))
}

async fn list_bookings(
    State(state): State<AppState>,
    Path(project): Path<String>,
) -> Result<Json<Vec<BookingRecord>>, ApiError> {
    Ok(Json(state.view().project_bookings(&project)?))
}

async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<BookingPayload>,
) -> Result<(StatusCode, Json<BookingRecord>), ApiError> {
    let request = BookingRequest {
        project: payload.project,
        date: path_date(&payload.date)?,
        slot: payload.slot,
        instrument: payload.instrument,
        person: payload.person,
    };
    match state.view().book(&request)? {
        BookingOutcome::Committed(record) => Ok((StatusCode::CREATED, Json(record))),
        BookingOutcome::Rejected(rejection) => Err(ApiError::Rejected(rejection)),
    }
}

async fn get_free_time(
    State(state): State<AppState>,
) -> Result<Json<Vec<FreeTimeRecord>>, ApiError> {
    Ok(Json(state.view().free_time_report()?))
}

async fn refresh_free_time(
    State(state): State<AppState>,
) -> Result<Json<Vec<FreeTimeRecord>>, ApiError> {
    Ok(Json(state.view().refresh_free_time()?))
}
