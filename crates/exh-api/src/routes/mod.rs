//! # Protocol Routes
//!
//! One module per package kind plus actualizaciones. Every handler answers
//! with the [`ApiResponse`](crate::error::ApiResponse) envelope and writes
//! the packages it changed through to the database when one is configured.

pub mod actualizaciones;
pub mod exhortos;
pub mod promociones;
pub mod respuestas;

use axum::Router;

use crate::state::AppState;

/// All protocol routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(exhortos::router())
        .merge(promociones::router())
        .merge(respuestas::router())
        .merge(actualizaciones::router())
}
