//! # exh-exchange: The Exhortos Exchange Core
//!
//! Implements the declare-then-upload protocol shared by the three package
//! kinds (exhorto, promoción, respuesta):
//!
//! 1. The sender posts package metadata with a manifest of declared files.
//!    The [`validation`] pipeline collects every field error in one pass,
//!    references are resolved against the catalog, and the package is
//!    created in its initial state with every declared file `PENDING`.
//! 2. The sender uploads each file. The [`reception`] tracker matches it to
//!    the first pending declaration of the same name, verifies the declared
//!    digests, stores the bytes, and decrements the remaining counter.
//! 3. The upload that brings the counter to zero advances the package
//!    ([`lifecycle`]) and receives the one filled [`acuse`]. Every other
//!    upload receives the empty acuse shape.
//!
//! ## Concurrency
//!
//! Each package lives behind its own `tokio::sync::Mutex` in the
//! [`repository`]. Steps 2 and 3 run entirely under that lock, so of two
//! concurrent final uploads exactly one observes zero remaining. When a
//! respuesta completes, its parent exhorto is locked after it: lock order
//! is always child before parent.
//!
//! ## Entry Point
//!
//! [`ExchangeService`] is the facade used by the HTTP layer and tests.

pub mod acuse;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod payload;
pub mod reception;
pub mod repository;
pub mod service;
pub mod validation;
pub mod view;

pub use acuse::{Acuse, ExhortoAcuse, PromocionAcuse, RespuestaAcuse};
pub use config::ExchangeConfig;
pub use error::ExchangeError;
pub use model::{DeclaredFile, Package, PackageBody};
pub use repository::PackageRepository;
pub use service::{
    ActualizacionRecorded, Created, ExchangeService, FileReceipt, Received,
};
pub use view::PackageView;
