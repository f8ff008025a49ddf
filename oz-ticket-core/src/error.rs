use thiserror::Error;

/// Error type for every ticket, RSVP and sealing operation.
///
/// The variants form a closed taxonomy. Callers match on the variant (or use the
/// `is_*` helpers) to decide how to react; the `reason` strings are for humans and
/// never carry key material or cipher internals.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    /// A required field is missing or malformed, or the inputs contradict each
    /// other (for example a grant that does not match the parent ticket).
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A scope failed syntax validation
    #[error("Invalid scope: {reason}")]
    Validation { reason: String },

    /// The request would widen authority: scope escalation, relaxing a
    /// delegation restriction, or delegating a ticket that forbids it
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// The request is structurally disallowed (a second delegation hop)
    #[error("Bad request: {reason}")]
    BadRequest { reason: String },

    /// Randomness, sealing or unsealing failed
    #[error("Cryptographic failure: {reason}")]
    Crypto { reason: String },
}

impl TicketError {
    // ===== Helper Methods for Common Error Checks =====

    /// Check if this error is a missing or inconsistent input
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, TicketError::InvalidInput { .. })
    }

    /// Check if this error is a scope syntax failure
    pub fn is_validation(&self) -> bool {
        matches!(self, TicketError::Validation { .. })
    }

    /// Check if this error is a policy violation
    pub fn is_forbidden(&self) -> bool {
        matches!(self, TicketError::Forbidden { .. })
    }

    /// Check if this error is a structurally disallowed request
    pub fn is_bad_request(&self) -> bool {
        matches!(self, TicketError::BadRequest { .. })
    }

    /// Check if this error came from randomness or the sealing engine
    pub fn is_crypto(&self) -> bool {
        matches!(self, TicketError::Crypto { .. })
    }

    /// The human readable reason carried by every variant
    pub fn reason(&self) -> &str {
        match self {
            TicketError::InvalidInput { reason }
            | TicketError::Validation { reason }
            | TicketError::Forbidden { reason }
            | TicketError::BadRequest { reason }
            | TicketError::Crypto { reason } => reason,
        }
    }

    // ===== Constructor Helper Methods =====

    pub fn invalid_input<S: Into<String>>(reason: S) -> Self {
        TicketError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn validation<S: Into<String>>(reason: S) -> Self {
        TicketError::Validation {
            reason: reason.into(),
        }
    }

    pub fn forbidden<S: Into<String>>(reason: S) -> Self {
        TicketError::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn bad_request<S: Into<String>>(reason: S) -> Self {
        TicketError::BadRequest {
            reason: reason.into(),
        }
    }

    pub fn crypto<S: Into<String>>(reason: S) -> Self {
        TicketError::Crypto {
            reason: reason.into(),
        }
    }
}

// Payload encoding only ever happens on either side of a seal, so a JSON
// failure is reported as a sealing failure without its internal detail.
impl From<serde_json::Error> for TicketError {
    fn from(err: serde_json::Error) -> Self {
        let reason = match err.classify() {
            serde_json::error::Category::Data => "Sealed payload has an unexpected shape",
            _ => "Sealed payload could not be encoded",
        };
        TicketError::crypto(reason)
    }
}

impl From<hex::FromHexError> for TicketError {
    fn from(_: hex::FromHexError) -> Self {
        TicketError::crypto("Bad hex encoding")
    }
}

impl From<base64::DecodeError> for TicketError {
    fn from(_: base64::DecodeError) -> Self {
        TicketError::crypto("Bad base64 encoding")
    }
}
