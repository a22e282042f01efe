//! # Package Lifecycle
//!
//! One engine, parameterized by a per-kind transition table.
//!
//! ## Idempotence
//!
//! [`advance`] performs at most one transition per call. A package already
//! at or past the state a trigger leads to yields [`Advance::AlreadyAdvanced`]
//! rather than an error, so a duplicated completion signal is harmless.
//!
//! A `(kind, state, trigger)` combination that is neither in the table nor
//! "already past" is a wiring fault and comes back as
//! [`LifecycleError::NoTransition`]. Callers assert on it in debug builds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Kinds, States, Triggers ──────────────────────────────────────────

/// The three exchange package kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    /// Inter-jurisdiction judicial request, the root artifact.
    Exhorto,
    /// Follow-on submission attached to a received exhorto.
    Promocion,
    /// The receiving court's reply to an exhorto.
    Respuesta,
}

impl PackageKind {
    /// All kinds, in protocol order.
    pub const ALL: [PackageKind; 3] = [Self::Exhorto, Self::Promocion, Self::Respuesta];

    /// Lowercase identifier, used in blob locators and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exhorto => "exhorto",
            Self::Promocion => "promocion",
            Self::Respuesta => "respuesta",
        }
    }

    /// Parse a kind identifier.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "exhorto" => Some(Self::Exhorto),
            "promocion" => Some(Self::Promocion),
            "respuesta" => Some(Self::Respuesta),
            _ => None,
        }
    }
}

impl std::fmt::Display for PackageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a package. The set of reachable states depends on
/// the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackageState {
    /// Exhorto created, declared files outstanding.
    #[serde(rename = "PENDING")]
    Pending,
    /// Exhorto with every declared file received.
    #[serde(rename = "RECEIVED")]
    Received,
    /// Exhorto for which a respuesta was accepted.
    #[serde(rename = "RESPONDED")]
    Responded,
    /// Exhorto whose respuesta files all arrived, or a completed respuesta.
    #[serde(rename = "ANSWERED")]
    Answered,
    /// Promoción or respuesta created, declared files outstanding.
    #[serde(rename = "PENDING_FILES")]
    PendingFiles,
    /// Promoción with every declared file received.
    #[serde(rename = "SENT")]
    Sent,
}

impl PackageState {
    /// The canonical string name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Received => "RECEIVED",
            Self::Responded => "RESPONDED",
            Self::Answered => "ANSWERED",
            Self::PendingFiles => "PENDING_FILES",
            Self::Sent => "SENT",
        }
    }

    /// Convert a canonical state name. Returns `None` for anything else.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PENDING" => Some(Self::Pending),
            "RECEIVED" => Some(Self::Received),
            "RESPONDED" => Some(Self::Responded),
            "ANSWERED" => Some(Self::Answered),
            "PENDING_FILES" => Some(Self::PendingFiles),
            "SENT" => Some(Self::Sent),
            _ => None,
        }
    }
}

impl std::fmt::Display for PackageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events that drive package transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trigger {
    /// The package's last outstanding declared file arrived.
    FilesComplete,
    /// A respuesta referencing this exhorto was accepted.
    ResponseAccepted,
    /// The accepted respuesta's last outstanding file arrived.
    ResponseFilesComplete,
}

impl Trigger {
    /// The canonical string name of this trigger.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FilesComplete => "FILES_COMPLETE",
            Self::ResponseAccepted => "RESPONSE_ACCEPTED",
            Self::ResponseFilesComplete => "RESPONSE_FILES_COMPLETE",
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Transition Table ─────────────────────────────────────────────────

struct Transition {
    kind: PackageKind,
    from: PackageState,
    trigger: Trigger,
    to: PackageState,
}

const TRANSITIONS: &[Transition] = &[
    Transition {
        kind: PackageKind::Exhorto,
        from: PackageState::Pending,
        trigger: Trigger::FilesComplete,
        to: PackageState::Received,
    },
    Transition {
        kind: PackageKind::Exhorto,
        from: PackageState::Received,
        trigger: Trigger::ResponseAccepted,
        to: PackageState::Responded,
    },
    Transition {
        kind: PackageKind::Exhorto,
        from: PackageState::Responded,
        trigger: Trigger::ResponseFilesComplete,
        to: PackageState::Answered,
    },
    Transition {
        kind: PackageKind::Promocion,
        from: PackageState::PendingFiles,
        trigger: Trigger::FilesComplete,
        to: PackageState::Sent,
    },
    Transition {
        kind: PackageKind::Respuesta,
        from: PackageState::PendingFiles,
        trigger: Trigger::FilesComplete,
        to: PackageState::Answered,
    },
];

/// States of each kind in lifecycle order. Position is the "rank" used to
/// decide whether a package is already past a trigger's target.
fn chain(kind: PackageKind) -> &'static [PackageState] {
    match kind {
        PackageKind::Exhorto => &[
            PackageState::Pending,
            PackageState::Received,
            PackageState::Responded,
            PackageState::Answered,
        ],
        PackageKind::Promocion => &[PackageState::PendingFiles, PackageState::Sent],
        PackageKind::Respuesta => &[PackageState::PendingFiles, PackageState::Answered],
    }
}

fn rank(kind: PackageKind, state: PackageState) -> Option<usize> {
    chain(kind).iter().position(|s| *s == state)
}

/// State a freshly created package of `kind` starts in.
pub fn initial_state(kind: PackageKind) -> PackageState {
    chain(kind)[0]
}

/// Whether `state` is the last state of `kind`'s lifecycle.
pub fn is_terminal(kind: PackageKind, state: PackageState) -> bool {
    chain(kind).last() == Some(&state)
}

// ── Engine ───────────────────────────────────────────────────────────

/// Outcome of a successful [`advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Exactly one transition was applied.
    Transitioned {
        /// State before.
        from: PackageState,
        /// State after.
        to: PackageState,
    },
    /// The package is already at or past the trigger's target; nothing changed.
    AlreadyAdvanced,
}

impl Advance {
    /// The state after this outcome, given the state before it.
    pub fn resulting_state(&self, current: PackageState) -> PackageState {
        match self {
            Self::Transitioned { to, .. } => *to,
            Self::AlreadyAdvanced => current,
        }
    }
}

/// Lifecycle wiring faults.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// No transition is defined and the package is not already past the
    /// trigger's target.
    #[error("no transition for {kind} in state {state} on {trigger}")]
    NoTransition {
        kind: PackageKind,
        state: PackageState,
        trigger: Trigger,
    },
}

/// Compute the transition for `(kind, current, trigger)`.
///
/// Pure: the caller applies the resulting state under its own lock.
///
/// # Errors
///
/// [`LifecycleError::NoTransition`] when the combination is neither defined
/// nor already advanced past.
pub fn advance(
    kind: PackageKind,
    current: PackageState,
    trigger: Trigger,
) -> Result<Advance, LifecycleError> {
    let no_transition = LifecycleError::NoTransition {
        kind,
        state: current,
        trigger,
    };

    if let Some(t) = TRANSITIONS
        .iter()
        .find(|t| t.kind == kind && t.from == current && t.trigger == trigger)
    {
        return Ok(Advance::Transitioned {
            from: current,
            to: t.to,
        });
    }

    let target = TRANSITIONS
        .iter()
        .find(|t| t.kind == kind && t.trigger == trigger)
        .map(|t| t.to);
    match (target.and_then(|to| rank(kind, to)), rank(kind, current)) {
        (Some(target_rank), Some(current_rank)) if current_rank >= target_rank => {
            Ok(Advance::AlreadyAdvanced)
        }
        _ => Err(no_transition),
    }
}

/// Audit record of one applied transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// State before the transition.
    pub from_state: PackageState,
    /// State after the transition.
    pub to_state: PackageState,
    /// What caused it.
    pub trigger: Trigger,
    /// When the transition occurred.
    pub timestamp: DateTime<Utc>,
}
