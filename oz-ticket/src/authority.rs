use crate::model::{Application, Grant};
use oz_ticket_core::{
    Clock, CredentialGenerator, IronSealer, Password, RandomCredentials, ScopeRules,
    ScopeValidator, SealOptions, Sealer, SystemClock, TicketConfig, TicketError,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// Issues, reissues and parses tickets and RSVPs.
///
/// The authority bundles the collaborators every operation needs: the sealing
/// engine, scope rules, secret generator and clock, plus the [`TicketConfig`]
/// defaults. It holds no mutable state, so a single instance can be shared
/// across threads.
///
/// # Example
/// ```rust
/// use oz_ticket::{Application, Password, TicketAuthority, TicketOptions};
///
/// let authority = TicketAuthority::new();
/// let password = Password::new("a_password_that_is_not_too_short_and_also_not_very_random");
///
/// let app = Application::new("123").with_scope(["a", "b"]);
/// let ticket = authority
///     .issue(&app, None, &password, &TicketOptions::new())
///     .expect("Failed to issue ticket");
///
/// let parsed = authority
///     .parse(&ticket.id, &password, &Default::default())
///     .expect("Failed to parse ticket");
/// assert_eq!(parsed.app, "123");
/// assert_eq!(parsed.key, ticket.key);
/// ```
pub struct TicketAuthority {
    sealer: Box<dyn Sealer>,
    scopes: Box<dyn ScopeValidator>,
    credentials: Box<dyn CredentialGenerator>,
    clock: Box<dyn Clock>,
    config: TicketConfig,
}

impl TicketAuthority {
    /// Creates an authority with the default collaborators and configuration.
    pub fn new() -> Self {
        Self {
            sealer: Box::new(IronSealer),
            scopes: Box::new(ScopeRules),
            credentials: Box::new(RandomCredentials),
            clock: Box::new(SystemClock),
            config: TicketConfig::default(),
        }
    }

    pub fn with_sealer<S: Sealer + 'static>(mut self, sealer: S) -> Self {
        self.sealer = Box::new(sealer);
        self
    }

    pub fn with_scope_validator<V: ScopeValidator + 'static>(mut self, scopes: V) -> Self {
        self.scopes = Box::new(scopes);
        self
    }

    pub fn with_credentials<C: CredentialGenerator + 'static>(mut self, credentials: C) -> Self {
        self.credentials = Box::new(credentials);
        self
    }

    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_config(mut self, config: TicketConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TicketConfig {
        &self.config
    }

    /// Current time according to the authority's clock
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn scopes(&self) -> &dyn ScopeValidator {
        self.scopes.as_ref()
    }

    pub(crate) fn credentials(&self) -> &dyn CredentialGenerator {
        self.credentials.as_ref()
    }

    /// Ticket expiration for a lifetime of `ttl`, capped by the grant's own.
    /// A missing or zero `ttl` uses the configured ticket lifetime.
    pub(crate) fn ticket_expiry(
        &self,
        ttl: Option<i64>,
        grant: Option<&Grant>,
    ) -> Result<i64, TicketError> {
        let ttl = ttl.filter(|ttl| *ttl != 0).unwrap_or(self.config.ticket_ttl);
        let exp = self.expires_in(ttl)?;
        Ok(match grant {
            Some(grant) => exp.min(grant.exp),
            None => exp,
        })
    }

    /// `now + ttl`, rejecting lifetimes that overflow the timestamp
    pub(crate) fn expires_in(&self, ttl: i64) -> Result<i64, TicketError> {
        self.now_ms()
            .checked_add(ttl)
            .ok_or_else(|| TicketError::invalid_input("Invalid ttl"))
    }

    pub(crate) fn seal_value<T: Serialize>(
        &self,
        value: &T,
        password: &Password,
        seal: &SealOptions,
    ) -> Result<String, TicketError> {
        let object = serde_json::to_value(value)?;
        self.sealer.seal(&object, password, &self.pin_clock(seal))
    }

    pub(crate) fn unseal_value<T: DeserializeOwned>(
        &self,
        sealed: &str,
        password: &Password,
        seal: &SealOptions,
    ) -> Result<T, TicketError> {
        let object = self.sealer.unseal(sealed, password, &self.pin_clock(seal))?;
        Ok(serde_json::from_value(object)?)
    }

    /// Seal expirations follow the authority's clock unless the caller pinned
    /// a time of their own.
    fn pin_clock(&self, seal: &SealOptions) -> SealOptions {
        SealOptions {
            now: seal.now.or_else(|| Some(self.now_ms())),
            ..*seal
        }
    }
}

impl Default for TicketAuthority {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TicketAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketAuthority")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ===== Shared input checks =====

pub(crate) fn require_app(app: &Application) -> Result<(), TicketError> {
    if app.id.is_empty() {
        return Err(TicketError::invalid_input("Invalid application object"));
    }
    Ok(())
}

/// A grant quoted for ticket issuance must identify the grant, its user and
/// its expiration.
pub(crate) fn require_grant(grant: &Grant) -> Result<(), TicketError> {
    if grant.id.is_empty() || grant.user.is_empty() || grant.exp == 0 {
        return Err(TicketError::invalid_input("Invalid grant object"));
    }
    Ok(())
}

pub(crate) fn require_password(password: &Password) -> Result<(), TicketError> {
    if password.is_empty() {
        return Err(TicketError::invalid_input("Invalid encryption password"));
    }
    Ok(())
}
