//! # Package Lifecycle Engine
//!
//! Creation and state advancement of [`Package`] aggregates. The per-kind
//! rules come from `exh_state`'s transition table; this module applies them
//! to the aggregate and keeps its transition log.

use chrono::{DateTime, Utc};
use exh_core::{OriginId, PackageId};
use exh_state::{initial_state, Advance, PackageState, TransitionRecord, Trigger};

use crate::error::ExchangeError;
use crate::model::{DeclaredFile, DeclaredFileSpec, Package, PackageBody, ParentRef};

/// Build a new package in its kind's initial state with every declared file
/// `PENDING`. The package is not visible to anyone until inserted into the
/// repository.
pub fn new_package(
    origin_id: OriginId,
    files: Vec<DeclaredFileSpec>,
    body: PackageBody,
    parent: Option<ParentRef>,
    now: DateTime<Utc>,
) -> Package {
    let kind = body.kind();
    let files: Vec<DeclaredFile> = files.into_iter().map(DeclaredFile::from).collect();
    let remaining = files.len();
    Package {
        id: PackageId::new(),
        kind,
        origin_id,
        folio: None,
        state: initial_state(kind),
        created_at: now,
        updated_at: now,
        parent,
        files,
        remaining,
        transition_log: Vec::new(),
        acuse: None,
        body,
    }
}

/// Apply `trigger` to `package`.
///
/// Returns [`Advance::AlreadyAdvanced`] without touching the package when
/// it is already past the trigger's target.
///
/// # Errors
///
/// [`ExchangeError::Internal`] for a combination with no defined transition.
/// That is a wiring fault, so debug builds panic on it.
pub fn apply(
    package: &mut Package,
    trigger: Trigger,
    now: DateTime<Utc>,
) -> Result<Advance, ExchangeError> {
    let outcome = exh_state::advance(package.kind, package.state, trigger);
    debug_assert!(outcome.is_ok(), "lifecycle wiring fault: {outcome:?}");
    let outcome = outcome?;

    if let Advance::Transitioned { from, to } = outcome {
        package.state = to;
        package.updated_at = now;
        package.transition_log.push(TransitionRecord {
            from_state: from,
            to_state: to,
            trigger,
            timestamp: now,
        });
        tracing::info!(
            kind = %package.kind,
            origin_id = %package.origin_id,
            from = %from,
            to = %to,
            trigger = %trigger,
            "package transitioned"
        );
    }
    Ok(outcome)
}

/// Whether an exhorto in `state` can accept a respuesta.
pub fn accepts_respuesta(state: PackageState) -> bool {
    state == PackageState::Received
}
