//! Engine failure classification
//!
//! Maps raw failures reported by the bridging engine into a closed taxonomy.
//! Matching is case-insensitive and runs in priority order: a signing
//! rejection wins over everything else because it is handled differently
//! (abort silently, no retry) from a genuine failure.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::engine::EngineFailure;

/// Signatures of a user declining the wallet signature request
const REJECTION_SIGNATURES: &[&str] = &[
    "user rejected",
    "user denied",
    "rejected the request",
    "user cancelled",
    "user canceled",
    "denied transaction signature",
];

/// Known bridging, parsing and broadcast failures inside the engine
const ENGINE_SIGNATURES: &[&str] = &[
    "tx parse error",
    "failed to parse",
    "parse error",
    "bridge failed",
    "bridging failed",
    "intent failed",
    "broadcast failed",
    "failed to broadcast",
    "allowance setup failed",
    "receipt timeout",
];

/// Balance too low to cover the amount, fees or gas
const INSUFFICIENT_FUNDS_SIGNATURES: &[&str] = &["insufficient", "exceeds balance"];

const REJECTED_MESSAGE: &str = "Transaction was rejected in the wallet";
const ENGINE_ERROR_MESSAGE: &str = "The bridge could not process this transaction. Please try again.";
const INSUFFICIENT_FUNDS_MESSAGE: &str =
    "Insufficient balance to cover the deposit and its fees. Lower the amount and try again.";
const UNKNOWN_MESSAGE: &str = "Something went wrong while processing the deposit";

/// Failure category surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// User declined signing
    Rejected,
    /// Transient or parsing failure inside the bridging engine
    EngineError,
    /// Balance too low; the user must adjust the amount
    InsufficientFunds,
    /// Engine-reported message, shown verbatim
    General,
    /// Failure without a usable message
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Rejected => "rejected",
            ErrorKind::EngineError => "engine_error",
            ErrorKind::InsufficientFunds => "insufficient_funds",
            ErrorKind::General => "general",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Whether retrying the same request is worthwhile
    pub fn suggests_retry(&self) -> bool {
        matches!(self, ErrorKind::EngineError)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified failure: category plus the message to show
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Message to display, or `None` when the flow should abort silently
    pub fn user_message(&self) -> Option<&str> {
        match self.kind {
            ErrorKind::Rejected => None,
            _ => Some(&self.message),
        }
    }
}

/// Classify a raw engine failure
pub fn classify(failure: &EngineFailure) -> ClassifiedError {
    let message = match failure.message() {
        Some(message) if !message.trim().is_empty() => message,
        _ => return ClassifiedError::new(ErrorKind::Unknown, UNKNOWN_MESSAGE),
    };

    let lower = message.to_lowercase();
    let matches_any = |signatures: &[&str]| signatures.iter().any(|s| lower.contains(s));

    if matches_any(REJECTION_SIGNATURES) {
        return ClassifiedError::new(ErrorKind::Rejected, REJECTED_MESSAGE);
    }

    if matches_any(ENGINE_SIGNATURES) {
        return ClassifiedError::new(ErrorKind::EngineError, ENGINE_ERROR_MESSAGE);
    }

    if matches_any(INSUFFICIENT_FUNDS_SIGNATURES) {
        return ClassifiedError::new(ErrorKind::InsufficientFunds, INSUFFICIENT_FUNDS_MESSAGE);
    }

    ClassifiedError::new(ErrorKind::General, message)
}
