//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use chrono::Utc;
use futures::stream::{self, Stream};
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::journeys::refine;
use crate::split::{ProgressReporter, ScanEvent};
use crate::vendo::{VendoError, journey_to_wire};

use super::dto::*;
use super::state::AppState;

/// Scan events buffered between the scanner and the response.
const EVENT_BUFFER: usize = 32;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/journeys", get(search_journeys))
        .route("/api/split-journey", post(split_journey))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn not_found() -> AppError {
    AppError::NotFound {
        message: "Not found".to_string(),
    }
}

/// Search journeys between two stations.
async fn search_journeys(
    State(state): State<AppState>,
    params: Result<Query<JourneysParams>, QueryRejection>,
) -> Result<Json<JourneySearchResponse>, AppError> {
    let Query(params) = params.map_err(|e| AppError::BadRequest {
        message: e.body_text(),
    })?;

    let (query, target) = params
        .to_query(Utc::now())
        .map_err(|message| AppError::BadRequest { message })?;

    let journeys = state.vendo.journeys(&query).await?;
    let received = journeys.len();
    let journeys = refine(journeys, &target);

    info!(
        from = %target.origin,
        to = %target.destination,
        received,
        returned = journeys.len(),
        "journey search"
    );

    Ok(Json(JourneySearchResponse {
        journeys: journeys.iter().map(journey_to_wire).collect(),
    }))
}

/// Look for cheaper split tickets for a journey.
///
/// The scan runs in its own task; the response either streams its events
/// or waits for the terminal one.
async fn split_journey(
    State(state): State<AppState>,
    payload: Result<Json<SplitJourneyRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = payload.map_err(|e| AppError::BadRequest {
        message: e.body_text(),
    })?;

    let request = body
        .to_scan_request()
        .map_err(|message| AppError::BadRequest { message })?;

    info!(
        from = %request.journey().origin().id,
        to = %request.journey().destination().id,
        legs = request.journey().leg_count(),
        streaming = body.use_streaming,
        "split scan requested"
    );

    let (reporter, rx) = ProgressReporter::channel(EVENT_BUFFER);
    let scanner = state.scanner.clone();
    tokio::spawn(async move {
        scanner.run(&request, reporter).await;
    });

    if body.use_streaming {
        Ok(Sse::new(event_stream(rx))
            .keep_alive(KeepAlive::default())
            .into_response())
    } else {
        wait_for_outcome(rx).await
    }
}

/// Scan events as Server-Sent Events.
///
/// Dropping the stream (the client went away) drops the receiver, which
/// cancels the scan.
fn event_stream(
    rx: mpsc::Receiver<ScanEvent>,
) -> impl Stream<Item = Result<Event, axum::Error>> {
    stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        let sse = Event::default().json_data(ScanEventDto::from(&event));
        Some((sse, rx))
    })
}

/// Skip progress and answer with the terminal event.
async fn wait_for_outcome(mut rx: mpsc::Receiver<ScanEvent>) -> Result<Response, AppError> {
    while let Some(event) = rx.recv().await {
        match event {
            ScanEvent::Progress(progress) => {
                debug!(checked = progress.checked, total = progress.total, "scan progress");
            }
            ScanEvent::Complete(options) => {
                return Ok(Json(SplitJourneyResponse::new(&options)).into_response());
            }
            ScanEvent::Error(message) => {
                return Err(AppError::BadGateway { message });
            }
        }
    }

    Err(AppError::Internal {
        message: "scan ended without a result".to_string(),
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
    BadGateway { message: String },
}

impl From<VendoError> for AppError {
    fn from(e: VendoError) -> Self {
        match e {
            VendoError::Config(message) => AppError::Internal { message },
            other => AppError::BadGateway {
                message: other.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
