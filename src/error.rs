//! Error taxonomy for the AtomSpace core.
//!
//! Each subsystem owns a leaf error enum; [`Error`] aggregates them behind
//! `#[from]` conversions so callers working across subsystem boundaries can
//! use a single `?`-propagating return type. The taxonomy mirrors `spec.md`
//! §7: validation / integrity / resource / storage / cancellation.

use crate::handle::Handle;
use crate::types::AtomType;
use thiserror::Error;

/// Errors raised directly by the AtomSpace core (add/get/remove/index).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AtomSpaceError {
    #[error("link outgoing set references unknown handle {0:?}")]
    DanglingReference(Handle),

    #[error("atom {0:?} still has a non-empty incoming set")]
    HasIncoming(Handle),

    #[error("illegal atom composition: {0}")]
    TypeMismatch(String),

    #[error("type {0} is not recognized by this atom-type lattice")]
    UnknownType(String),

    #[error("no atom exists for handle {0:?}")]
    UnknownAtom(Handle),
}

/// Errors raised by the pattern matcher.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatcherError {
    #[error("pattern is malformed: {0}")]
    MalformedPattern(String),

    #[error("type constraint names unknown type {0}")]
    UnknownType(AtomType),
}

/// Errors raised by storage backends.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("failed to serialize or deserialize an atom: {0}")]
    SerializationFailed(String),

    #[error("connection pool exhausted (capacity {capacity})")]
    PoolExhausted { capacity: usize },
}

/// Errors raised by the attention bank.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttentionError {
    #[error("stimulation of {amount} would violate the STI fund invariant")]
    FundInsufficient { amount: i64 },

    #[error("no atom exists for handle {0:?}")]
    UnknownAtom(Handle),
}

/// Errors raised by the rule engine (URE/PLN chainers).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleEngineError {
    #[error(transparent)]
    Matcher(#[from] MatcherError),

    #[error(transparent)]
    AtomSpace(#[from] AtomSpaceError),

    #[error("rule template references unbound variable '{0}'")]
    UnboundVariable(String),

    #[error("rule '{0}' conclusion is not a Link pattern")]
    MalformedRule(String),
}

/// A chainer or cycle was cancelled before completion via its
/// [`crate::cancel::CancellationToken`]. Not a failure in the usual sense —
/// distinguished from success, never retried.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation cancelled")]
pub struct Cancelled;

/// The crate-wide error type. Subsystem errors convert into this via `?`.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error(transparent)]
    AtomSpace(#[from] AtomSpaceError),

    #[error(transparent)]
    Matcher(#[from] MatcherError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Attention(#[from] AttentionError),

    #[error(transparent)]
    RuleEngine(#[from] RuleEngineError),

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

pub type Result<T> = std::result::Result<T, Error>;
