//! # Exhorto Endpoints
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/v1/exh_exhortos` | `create_exhorto` |
//! | `POST` | `/v1/exh_exhortos_archivos/upload` | `upload_exhorto_file` |
//! | `GET` | `/v1/exh_exhortos/{folio}` | `get_exhorto` |
//! | `GET` | `/v1/exh_exhortos/origen/{origin_id}` | `get_exhorto_by_origin` |

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use exh_exchange::payload::ExhortoPayload;
use exh_exchange::{ExchangeError, Received};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{respond, ApiResponse, AppError};
use crate::extractors::{extract_json, UploadForm};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Exhorto declaration: case metadata plus the manifest of files to follow.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct ExhortoRequest(pub ExhortoPayload);

/// Multipart form of an exhorto file upload.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct ExhortoUpload {
    exhorto_origen_id: String,
    #[schema(format = Binary)]
    archivo: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExhortoCreated {
    exhorto_origen_id: String,
    fecha_hora: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/exh_exhortos", post(create_exhorto))
        .route("/v1/exh_exhortos_archivos/upload", post(upload_exhorto_file))
        .route("/v1/exh_exhortos/{folio}", get(get_exhorto))
        .route("/v1/exh_exhortos/origen/{origin_id}", get(get_exhorto_by_origin))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/exh_exhortos: declare an exhorto.
#[utoipa::path(
    post,
    path = "/v1/exh_exhortos",
    request_body = ExhortoRequest,
    responses(
        (status = 200, description = "Envelope with {exhortoOrigenId, fechaHora} or the rejection", body = ApiResponse),
        (status = 400, description = "Unparseable JSON", body = crate::error::ErrorBody),
    ),
    tag = "exhortos"
)]
pub async fn create_exhorto(
    State(state): State<AppState>,
    body: Result<Json<ExhortoRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let ExhortoRequest(payload) = extract_json(body)?;
    let result = state.service.create_exhorto(&payload).await;
    if let Ok(created) = &result {
        state.persist(&created.changed).await;
    }
    respond(
        result.map(|c| ExhortoCreated {
            exhorto_origen_id: c.origin_id,
            fecha_hora: c.fecha_hora,
        }),
        "Exhorto received",
    )
}

/// POST /v1/exh_exhortos_archivos/upload: upload one declared exhorto file.
#[utoipa::path(
    post,
    path = "/v1/exh_exhortos_archivos/upload",
    request_body(content = ExhortoUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Envelope with {archivo, acuse}; the acuse is filled only by the final upload", body = ApiResponse),
        (status = 400, description = "Malformed multipart body", body = crate::error::ErrorBody),
        (status = 413, description = "Body over the transport limit", body = crate::error::ErrorBody),
    ),
    tag = "exhortos"
)]
pub async fn upload_exhorto_file(
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
    let origin = form.field("exhortoOrigenId")?;
    let (name, bytes) = form.file()?;
    state.service.receive_exhorto_file(origin, name, bytes).await
}

/// GET /v1/exh_exhortos/{folio}: exhorto by tracking folio.
#[utoipa::path(
    get,
    path = "/v1/exh_exhortos/{folio}",
    params(("folio" = String, Path, description = "Tracking folio issued in the acuse")),
    responses(
        (status = 200, description = "Envelope with the exhorto projection", body = ApiResponse),
    ),
    tag = "exhortos"
)]
pub async fn get_exhorto(
    State(state): State<AppState>,
    Path(folio): Path<String>,
) -> Result<Json<ApiResponse>, AppError> {
    respond(state.service.exhorto_by_folio(&folio).await, "Exhorto found")
}

/// GET /v1/exh_exhortos/origen/{origin_id}: exhorto by the sender's origin id.
#[utoipa::path(
    get,
    path = "/v1/exh_exhortos/origen/{origin_id}",
    params(("origin_id" = String, Path, description = "exhortoOrigenId assigned by the sender")),
    responses(
        (status = 200, description = "Envelope with the exhorto projection", body = ApiResponse),
    ),
    tag = "exhortos"
)]
pub async fn get_exhorto_by_origin(
    State(state): State<AppState>,
    Path(origin_id): Path<String>,
) -> Result<Json<ApiResponse>, AppError> {
    respond(
        state.service.exhorto_by_origin(&origin_id).await,
        "Exhorto found",
    )
}
