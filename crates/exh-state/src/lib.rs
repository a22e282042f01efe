//! # exh-state: Package Lifecycle State Machines
//!
//! The three exchange package kinds share one engine. What differs between
//! them is data: a static transition table keyed by
//! `(kind, state, trigger)`.
//!
//! ```text
//! Exhorto:    PENDING ──FilesComplete──▶ RECEIVED ──ResponseAccepted──▶ RESPONDED
//!                                                                         │
//!                                                          ResponseFilesComplete
//!                                                                         ▼
//!                                                                     ANSWERED
//!
//! Promoción:  PENDING_FILES ──FilesComplete──▶ SENT
//! Respuesta:  PENDING_FILES ──FilesComplete──▶ ANSWERED
//! ```
//!
//! Declared files run their own one-way machine: `PENDING → RECEIVED`.

pub mod file;
pub mod package;

pub use file::{DeclaredFileState, DocumentType};
pub use package::{
    advance, initial_state, is_terminal, Advance, LifecycleError, PackageKind, PackageState,
    TransitionRecord, Trigger,
};
