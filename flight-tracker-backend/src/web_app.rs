//! Main web app module containing web routings to the itinerary resolver.

use actix_web::{http::StatusCode, mime, post, web, HttpResponse, ResponseError};
use flight_tracker_shared::itinerary::{self, ItineraryError, RawItinerary};
use thiserror::Error;
use tracing::warn;

/// Everything that can go wrong serving `/calculate`. Rendered to the client as plain text.
#[derive(Debug, Error)]
pub enum CalculateError {
    #[error("{0}")]
    DecodeFailure(serde_json::Error),
    #[error(transparent)]
    Itinerary(#[from] ItineraryError),
    #[error("failed to encode response: {0}")]
    EncodeFailure(serde_json::Error),
}

impl ResponseError for CalculateError {
    // Resolver failures all share one status, callers only get the message to tell them apart
    fn status_code(&self) -> StatusCode {
        match self {
            CalculateError::DecodeFailure(_) => StatusCode::BAD_REQUEST,
            CalculateError::Itinerary(_) | CalculateError::EncodeFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Register the app's routes. Bodies larger than `max_payload_bytes` are refused with 413.
pub fn configure(max_payload_bytes: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::PayloadConfig::new(max_payload_bytes))
            .service(calculate);
    }
}

/// Endpoint resolving the overall source and destination of an unordered list of flights
///
/// The body is read raw rather than through `web::Json` so any content type is accepted and
/// decode errors come back in the same plain-text form as the rest.
#[post("/calculate")]
pub async fn calculate(body: web::Bytes) -> Result<HttpResponse, CalculateError> {
    let flights: RawItinerary =
        serde_json::from_slice(&body).map_err(CalculateError::DecodeFailure)?;

    let endpoints = itinerary::resolve(flights).map_err(|error| {
        warn!(%error, "failed to resolve itinerary");
        error
    })?;

    let body = serde_json::to_vec(&endpoints).map_err(CalculateError::EncodeFailure)?;

    Ok(HttpResponse::Ok()
        .content_type(mime::APPLICATION_JSON)
        .body(body))
}
