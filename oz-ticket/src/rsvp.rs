//! RSVPs: short-lived sealed vouchers that let an application come back for a
//! ticket once the user has resolved a grant out of band.

use crate::authority::{TicketAuthority, require_app, require_password};
use crate::model::{Application, Grant, RsvpEnvelope};
use crate::options::RsvpOptions;
use oz_ticket_core::{Password, TicketError};
use tracing::{info, warn};

impl TicketAuthority {
    /// Creates an RSVP for an application and the grant the user just approved.
    ///
    /// The RSVP expires after `options.ttl`, one minute by default. It is meant
    /// for a single immediate round trip.
    pub fn rsvp(
        &self,
        app: &Application,
        grant: &Grant,
        password: &Password,
        options: &RsvpOptions,
    ) -> Result<String, TicketError> {
        self.seal_rsvp(app, Some(grant), None, None, password, options)
    }

    /// Creates an RSVP through which `dlg` delegates to `app`.
    ///
    /// When both `grant` and `scope` are given, `scope` is recorded in the
    /// envelope as the part of the grant being delegated. It is checked for
    /// syntax only. Whether it fits inside the grant's scope is left to
    /// whoever redeems the RSVP, since only they hold the grant record.
    pub fn delegate_rsvp(
        &self,
        app: &Application,
        dlg: &Application,
        grant: Option<&Grant>,
        scope: Option<&[String]>,
        password: &Password,
        options: &RsvpOptions,
    ) -> Result<String, TicketError> {
        require_app(app)?;
        if dlg.id.is_empty() {
            return Err(TicketError::invalid_input(
                "Invalid delegating application object",
            ));
        }

        let scope = match (grant, scope) {
            (Some(_), Some(scope)) => {
                self.scopes().validate(scope)?;
                Some(scope.to_vec())
            }
            _ => None,
        };

        self.seal_rsvp(app, grant, Some(dlg.id.clone()), scope, password, options)
    }

    /// Recovers the envelope sealed into an RSVP.
    ///
    /// The envelope's own `exp` is returned as-is; deciding whether a late
    /// RSVP is still acceptable is up to the caller.
    pub fn parse_rsvp(
        &self,
        rsvp: &str,
        password: &Password,
        options: &RsvpOptions,
    ) -> Result<RsvpEnvelope, TicketError> {
        require_password(password)?;

        self.unseal_value(rsvp, password, &options.seal)
            .map_err(|err| match err {
                TicketError::Crypto { reason } => {
                    warn!(%reason, "failed to unseal rsvp");
                    TicketError::crypto("Invalid rsvp")
                }
                other => other,
            })
    }

    fn seal_rsvp(
        &self,
        app: &Application,
        grant: Option<&Grant>,
        dlg: Option<String>,
        scope: Option<Vec<String>>,
        password: &Password,
        options: &RsvpOptions,
    ) -> Result<String, TicketError> {
        require_app(app)?;
        if grant.is_some_and(|grant| grant.id.is_empty()) {
            return Err(TicketError::invalid_input("Invalid grant object"));
        }
        require_password(password)?;

        let ttl = options
            .ttl
            .filter(|ttl| *ttl != 0)
            .unwrap_or(self.config().rsvp_ttl);

        let envelope = RsvpEnvelope {
            app: app.id.clone(),
            exp: self.expires_in(ttl)?,
            grant: grant.map(|grant| grant.id.clone()),
            dlg,
            scope,
        };

        let rsvp = self.seal_value(&envelope, password, &options.seal)?;
        info!(
            app = %envelope.app,
            exp = envelope.exp,
            dlg = envelope.dlg.as_deref().unwrap_or("-"),
            "rsvp issued"
        );

        Ok(rsvp)
    }
}
