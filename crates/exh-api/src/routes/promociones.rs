//! # Promoción Endpoints
//!
//! A promoción is filed against an exhorto identified by its tracking
//! folio and receives its own folio when its last file arrives.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/v1/exh_exhortos_promociones` | `create_promocion` |
//! | `POST` | `/v1/exh_exhortos_promociones_archivos/upload` | `upload_promocion_file` |
//! | `GET` | `/v1/exh_exhortos_promociones/{origin_id}` | `get_promocion` |

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use exh_exchange::payload::PromocionPayload;
use exh_exchange::{ExchangeError, Received};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{respond, ApiResponse, AppError};
use crate::extractors::{extract_json, UploadForm};
use crate::state::AppState;

/// Promoción declaration.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct PromocionRequest(pub PromocionPayload);

/// Multipart form of a promoción file upload.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct PromocionUpload {
    folio_origen_promocion: String,
    #[schema(format = Binary)]
    archivo: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PromocionCreated {
    folio_origen_promocion: String,
    fecha_hora: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/exh_exhortos_promociones", post(create_promocion))
        .route(
            "/v1/exh_exhortos_promociones_archivos/upload",
            post(upload_promocion_file),
        )
        .route("/v1/exh_exhortos_promociones/{origin_id}", get(get_promocion))
}

/// POST /v1/exh_exhortos_promociones: declare a promoción.
#[utoipa::path(
    post,
    path = "/v1/exh_exhortos_promociones",
    request_body = PromocionRequest,
    responses(
        (status = 200, description = "Envelope with {folioOrigenPromocion, fechaHora} or the rejection", body = ApiResponse),
        (status = 400, description = "Unparseable JSON", body = crate::error::ErrorBody),
    ),
    tag = "promociones"
)]
pub async fn create_promocion(
    State(state): State<AppState>,
    body: Result<Json<PromocionRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let PromocionRequest(payload) = extract_json(body)?;
    let result = state.service.create_promocion(&payload).await;
    if let Ok(created) = &result {
        state.persist(&created.changed).await;
    }
    respond(
        result.map(|c| PromocionCreated {
            folio_origen_promocion: c.origin_id,
            fecha_hora: c.fecha_hora,
        }),
        "Promocion received",
    )
}

/// POST /v1/exh_exhortos_promociones_archivos/upload: upload one declared file.
#[utoipa::path(
    post,
    path = "/v1/exh_exhortos_promociones_archivos/upload",
    request_body(content = PromocionUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Envelope with {archivo, acuse}", body = ApiResponse),
        (status = 400, description = "Malformed multipart body", body = crate::error::ErrorBody),
        (status = 413, description = "Body over the transport limit", body = crate::error::ErrorBody),
    ),
    tag = "promociones"
)]
pub async fn upload_promocion_file(
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
    let origin = form.field("folioOrigenPromocion")?;
    let (name, bytes) = form.file()?;
    state.service.receive_promocion_file(origin, name, bytes).await
}

/// GET /v1/exh_exhortos_promociones/{origin_id}
#[utoipa::path(
    get,
    path = "/v1/exh_exhortos_promociones/{origin_id}",
    params(("origin_id" = String, Path, description = "folioOrigenPromocion assigned by the sender")),
    responses(
        (status = 200, description = "Envelope with the promoción projection", body = ApiResponse),
    ),
    tag = "promociones"
)]
pub async fn get_promocion(
    State(state): State<AppState>,
    Path(origin_id): Path<String>,
) -> Result<Json<ApiResponse>, AppError> {
    respond(
        state.service.promocion_by_origin(&origin_id).await,
        "Promocion found",
    )
}
