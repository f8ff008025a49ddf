use crate::model::{Delegation, TicketExt};
use oz_ticket_core::SealOptions;

/// Per-call options for [`issue`](crate::TicketAuthority::issue),
/// [`reissue`](crate::TicketAuthority::reissue) and
/// [`generate`](crate::TicketAuthority::generate).
///
/// Unset values fall back to the authority's [`TicketConfig`](oz_ticket_core::TicketConfig).
///
/// # Example
/// ```rust
/// use oz_ticket::{TicketExt, TicketOptions};
/// use serde_json::json;
///
/// let options = TicketOptions::new()
///     .ttl(60 * 1000)
///     .delegate(false)
///     .ext(TicketExt::new(Some(json!({ "tos": "0.0.1" })), Some(json!({ "x": 1 }))));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketOptions {
    /// Ticket lifetime in milliseconds
    pub ttl: Option<i64>,
    /// `None` leaves the default (or the parent's restriction) in place
    pub delegate: Option<Delegation>,
    pub ext: Option<TicketExt>,
    /// Delegating application id, recorded on issue
    pub dlg: Option<String>,
    /// Ticket scope. On reissue it must be a subset of the parent's.
    pub scope: Option<Vec<String>>,
    /// Reissue the ticket to this application instead of the parent's
    pub issue_to: Option<String>,
    /// Ticket secret size
    pub key_bytes: Option<usize>,
    pub hmac_algorithm: Option<String>,
    pub seal: SealOptions,
}

impl TicketOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl(mut self, ttl: i64) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the delegation permission. `false` forbids delegation of this
    /// ticket and everything reissued from it.
    pub fn delegate(mut self, allowed: bool) -> Self {
        self.delegate = Some(Delegation::from(allowed));
        self
    }

    pub fn ext(mut self, ext: TicketExt) -> Self {
        self.ext = Some(ext);
        self
    }

    pub fn dlg<S: Into<String>>(mut self, dlg: S) -> Self {
        self.dlg = Some(dlg.into());
        self
    }

    pub fn scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = Some(scope.into_iter().map(Into::into).collect());
        self
    }

    pub fn issue_to<S: Into<String>>(mut self, app: S) -> Self {
        self.issue_to = Some(app.into());
        self
    }

    pub fn key_bytes(mut self, key_bytes: usize) -> Self {
        self.key_bytes = Some(key_bytes);
        self
    }

    pub fn hmac_algorithm<S: Into<String>>(mut self, algorithm: S) -> Self {
        self.hmac_algorithm = Some(algorithm.into());
        self
    }

    pub fn seal(mut self, seal: SealOptions) -> Self {
        self.seal = seal;
        self
    }
}

/// Per-call options for RSVP issuance and parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RsvpOptions {
    /// RSVP lifetime in milliseconds
    pub ttl: Option<i64>,
    pub seal: SealOptions,
}

impl RsvpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl(mut self, ttl: i64) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn seal(mut self, seal: SealOptions) -> Self {
        self.seal = seal;
        self
    }
}
