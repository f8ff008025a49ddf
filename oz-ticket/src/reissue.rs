use crate::authority::{TicketAuthority, require_grant, require_password};
use crate::model::{Delegation, Grant, IssuedTicket, Ticket, TicketDraft};
use crate::options::TicketOptions;
use oz_ticket_core::{Password, TicketError};
use std::borrow::Cow;
use tracing::debug;

impl TicketAuthority {
    /// Reissues a ticket, either renewing it or delegating it to another
    /// application.
    ///
    /// The new ticket can only narrow what the parent allows:
    /// - `options.scope` must be a subset of the parent scope
    /// - a parent that forbids delegation cannot be relaxed or delegated
    /// - a ticket that was itself delegated (`dlg` set) cannot be delegated again
    /// - the grant must be the parent's grant, or absent on both
    ///
    /// When `options.ext` is unset the parent's ext data is carried over.
    ///
    /// # Arguments
    /// * `parent` - The parsed parent ticket (see [`parse`](TicketAuthority::parse))
    /// * `grant` - The parent's grant, reloaded from the grant store
    /// * `password` - The sealing password
    /// * `options` - `issue_to` delegates, the rest as in [`issue`](TicketAuthority::issue)
    ///
    /// # Errors
    /// * `InvalidInput` - empty password, incomplete grant, grant not matching the parent
    /// * `Validation` - malformed parent or requested scope
    /// * `Forbidden` - scope escalation or a delegation restriction
    /// * `BadRequest` - delegating an already delegated ticket
    /// * `Crypto` - secret generation or sealing failed
    pub fn reissue(
        &self,
        parent: &Ticket,
        grant: Option<&Grant>,
        password: &Password,
        options: &TicketOptions,
    ) -> Result<IssuedTicket, TicketError> {
        require_password(password)?;

        self.scopes().validate(&parent.scope)?;

        if let Some(scope) = &options.scope {
            self.scopes().validate(scope)?;

            if !self.scopes().is_subset(&parent.scope, scope) {
                debug!(app = %parent.app, "reissue scope exceeds parent scope");
                return Err(TicketError::forbidden(
                    "New scope is not a subset of the parent ticket scope",
                ));
            }
        }

        if options.delegate == Some(Delegation::Allowed) && parent.delegate.is_forbidden() {
            return Err(TicketError::forbidden(
                "Cannot override ticket delegate restriction",
            ));
        }

        let issue_to = options.issue_to.as_deref().filter(|app| !app.is_empty());
        if let Some(issue_to) = issue_to {
            if parent.dlg.is_some() {
                debug!(app = %parent.app, issue_to = %issue_to, "rejected second delegation hop");
                return Err(TicketError::bad_request("Cannot re-delegate"));
            }

            if parent.delegate.is_forbidden() {
                return Err(TicketError::forbidden("Ticket does not allow delegation"));
            }
        }

        if let Some(grant) = grant {
            require_grant(grant)?;
        }

        match (grant, parent.grant.as_deref()) {
            (None, None) => {}
            (Some(grant), Some(parent_grant)) if grant.id == parent_grant => {}
            _ => {
                return Err(TicketError::invalid_input(
                    "Parent ticket grant does not match the supplied grant",
                ));
            }
        }

        let options = match (&options.ext, &parent.ext) {
            (None, Some(parent_ext)) => Cow::Owned(TicketOptions {
                ext: Some(parent_ext.clone()),
                ..options.clone()
            }),
            _ => Cow::Borrowed(options),
        };

        let delegate = if options.delegate == Some(Delegation::Forbidden)
            || parent.delegate.is_forbidden()
        {
            Delegation::Forbidden
        } else {
            Delegation::Allowed
        };

        let (app, dlg) = match issue_to {
            Some(issue_to) => (issue_to.to_string(), Some(parent.app.clone())),
            None => (parent.app.clone(), parent.dlg.clone()),
        };

        let draft = TicketDraft {
            exp: self.ticket_expiry(options.ttl, grant)?,
            app,
            scope: options
                .scope
                .clone()
                .unwrap_or_else(|| parent.scope.clone()),
            grant: grant.map(|grant| grant.id.clone()),
            user: grant.map(|grant| grant.user.clone()),
            grant_exp: grant.map(|grant| grant.exp),
            delegate,
            dlg,
        };

        self.generate(&draft, password, &options)
    }
}
