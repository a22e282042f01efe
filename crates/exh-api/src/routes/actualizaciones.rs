//! # Actualización Endpoint
//!
//! Status updates appended to a received exhorto.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use exh_exchange::payload::ActualizacionPayload;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::{respond, ApiResponse, AppError};
use crate::extractors::extract_json;
use crate::state::AppState;

/// Actualización of an exhorto.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct ActualizacionRequest(pub ActualizacionPayload);

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/exh_exhortos_actualizaciones", post(create_actualizacion))
}

/// POST /v1/exh_exhortos_actualizaciones: record a status update.
#[utoipa::path(
    post,
    path = "/v1/exh_exhortos_actualizaciones",
    request_body = ActualizacionRequest,
    responses(
        (status = 200, description = "Envelope with {exhortoId, actualizacionOrigenId, fechaHora} or the rejection", body = ApiResponse),
        (status = 400, description = "Unparseable JSON", body = crate::error::ErrorBody),
    ),
    tag = "actualizaciones"
)]
pub async fn create_actualizacion(
    State(state): State<AppState>,
    body: Result<Json<ActualizacionRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let ActualizacionRequest(payload) = extract_json(body)?;
    let result = state.service.record_actualizacion(&payload).await;
    if let Ok(recorded) = &result {
        state.persist(&recorded.changed).await;
    }
    respond(result, "Actualizacion received")
}
