//! # Respuesta Endpoints
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/v1/exh_exhortos_respuestas` | `create_respuesta` |
//! | `POST` | `/v1/exh_exhortos_respuestas_archivos/upload` | `upload_respuesta_file` |
//! | `GET` | `/v1/exh_exhortos_respuestas/{origin_id}` | `get_respuesta` |

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use exh_exchange::payload::RespuestaPayload;
use exh_exchange::{ExchangeError, Received};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{respond, ApiResponse, AppError};
use crate::extractors::{extract_json, UploadForm};
use crate::state::AppState;

/// Respuesta declaration for a received exhorto.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct RespuestaRequest(pub RespuestaPayload);

/// Multipart form of a respuesta file upload.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct RespuestaUpload {
    exhorto_id: String,
    respuesta_origen_id: String,
    #[schema(format = Binary)]
    archivo: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RespuestaCreated {
    respuesta_origen_id: String,
    fecha_hora: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/exh_exhortos_respuestas", post(create_respuesta))
        .route(
            "/v1/exh_exhortos_respuestas_archivos/upload",
            post(upload_respuesta_file),
        )
        .route("/v1/exh_exhortos_respuestas/{origin_id}", get(get_respuesta))
}

/// POST /v1/exh_exhortos_respuestas: declare a respuesta.
///
/// Accepting the respuesta moves its exhorto to `RESPONDED`; both packages
/// are written through.
#[utoipa::path(
    post,
    path = "/v1/exh_exhortos_respuestas",
    request_body = RespuestaRequest,
    responses(
        (status = 200, description = "Envelope with {respuestaOrigenId, fechaHora} or the rejection", body = ApiResponse),
        (status = 400, description = "Unparseable JSON", body = crate::error::ErrorBody),
    ),
    tag = "respuestas"
)]
pub async fn create_respuesta(
    State(state): State<AppState>,
    body: Result<Json<RespuestaRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let RespuestaRequest(payload) = extract_json(body)?;
    let result = state.service.create_respuesta(&payload).await;
    if let Ok(created) = &result {
        state.persist(&created.changed).await;
    }
    respond(
        result.map(|c| RespuestaCreated {
            respuesta_origen_id: c.origin_id,
            fecha_hora: c.fecha_hora,
        }),
        "Respuesta received",
    )
}

/// POST /v1/exh_exhortos_respuestas_archivos/upload: upload one declared file.
#[utoipa::path(
    post,
    path = "/v1/exh_exhortos_respuestas_archivos/upload",
    request_body(content = RespuestaUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Envelope with {archivo, acuse}", body = ApiResponse),
        (status = 400, description = "Malformed multipart body", body = crate::error::ErrorBody),
        (status = 413, description = "Body over the transport limit", body = crate::error::ErrorBody),
    ),
    tag = "respuestas"
)]
pub async fn upload_respuesta_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let form = UploadForm::read(multipart).await?;
    let result = receive(&state, &form).await;
    if let Ok(received) = &result {
        state.persist(&received.changed).await;
    }
    respond(result, "File received")
}

async fn receive(state: &AppState, form: &UploadForm) -> Result<Received, ExchangeError> {
    let exhorto_id = form.field("exhortoId")?;
    let origin = form.field("respuestaOrigenId")?;
    let (name, bytes) = form.file()?;
    state
        .service
        .receive_respuesta_file(exhorto_id, origin, name, bytes)
        .await
}

/// GET /v1/exh_exhortos_respuestas/{origin_id}
#[utoipa::path(
    get,
    path = "/v1/exh_exhortos_respuestas/{origin_id}",
    params(("origin_id" = String, Path, description = "respuestaOrigenId assigned by the sender")),
    responses(
        (status = 200, description = "Envelope with the respuesta projection", body = ApiResponse),
    ),
    tag = "respuestas"
)]
pub async fn get_respuesta(
    State(state): State<AppState>,
    Path(origin_id): Path<String>,
) -> Result<Json<ApiResponse>, AppError> {
    respond(
        state.service.respuesta_by_origin(&origin_id).await,
        "Respuesta found",
    )
}
