//! HTTP transport for the registration engine.
//!
//! Business-rule failures become `400 Bad Request` with the error message as
//! a plain-text body. Anything else is logged and reported as a bare `500`.

use crate::application::engine::RegistrationEngine;
use crate::domain::course::{Course, CourseId};
use crate::error::RegistrationError;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub const UNREGISTERED_MESSAGE: &str = "Unregistered successfully";

pub fn router(engine: Arc<RegistrationEngine>) -> Router {
    Router::new()
        .route("/api/register/{course_id}/{email}", post(register))
        .route("/api/unregister/{course_id}/{email}", delete(unregister))
        .with_state(engine)
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(addr: &str, engine: Arc<RegistrationEngine>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Registration API listening on {}", listener.local_addr()?);
    axum::serve(listener, router(engine)).await
}

async fn register(
    State(engine): State<Arc<RegistrationEngine>>,
    Path((course_id, email)): Path<(CourseId, String)>,
) -> Result<Json<Vec<Course>>, ApiError> {
    let upcoming = engine.register(&email, course_id).await?;
    Ok(Json(upcoming))
}

async fn unregister(
    State(engine): State<Arc<RegistrationEngine>>,
    Path((course_id, email)): Path<(CourseId, String)>,
) -> Result<&'static str, ApiError> {
    engine.unregister(course_id, &email).await?;
    Ok(UNREGISTERED_MESSAGE)
}

pub struct ApiError(RegistrationError);

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_client_error() {
            (StatusCode::BAD_REQUEST, self.0.to_string()).into_response()
        } else {
            tracing::error!(error = %self.0, "Request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}
