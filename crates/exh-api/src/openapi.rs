//! # OpenAPI Specification Assembly
//!
//! Collects the utoipa-documented protocol routes into one OpenAPI document
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Exhortos Exchange API",
        version = "0.1.0",
        description = "Inter-state exchange of exhortos, promociones and respuestas: declare a package with its file manifest, upload each file, receive one acuse when the package is complete.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Exhortos
        crate::routes::exhortos::create_exhorto,
        crate::routes::exhortos::upload_exhorto_file,
        crate::routes::exhortos::get_exhorto,
        crate::routes::exhortos::get_exhorto_by_origin,
        // Promociones
        crate::routes::promociones::create_promocion,
        crate::routes::promociones::upload_promocion_file,
        crate::routes::promociones::get_promocion,
        // Respuestas
        crate::routes::respuestas::create_respuesta,
        crate::routes::respuestas::upload_respuesta_file,
        crate::routes::respuestas::get_respuesta,
        // Actualizaciones
        crate::routes::actualizaciones::create_actualizacion,
    ),
    components(schemas(
        crate::error::ApiResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::exhortos::ExhortoRequest,
        crate::routes::exhortos::ExhortoUpload,
        crate::routes::promociones::PromocionRequest,
        crate::routes::promociones::PromocionUpload,
        crate::routes::respuestas::RespuestaRequest,
        crate::routes::respuestas::RespuestaUpload,
        crate::routes::actualizaciones::ActualizacionRequest,
    )),
    tags(
        (name = "exhortos", description = "Exhorto declaration, file upload and queries"),
        (name = "promociones", description = "Promociones filed against an exhorto"),
        (name = "respuestas", description = "Respuestas to a received exhorto"),
        (name = "actualizaciones", description = "Status updates of an exhorto"),
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI JSON document at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
