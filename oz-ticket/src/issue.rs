use crate::authority::{TicketAuthority, require_app, require_grant, require_password};
use crate::model::{Application, Delegation, Grant, IssuedTicket, TicketDraft};
use crate::options::TicketOptions;
use oz_ticket_core::{Password, TicketError};
use tracing::debug;

impl TicketAuthority {
    /// Issues a new ticket to an application, optionally on behalf of a user.
    ///
    /// The ticket scope is the first of `options.scope`, `grant.scope` and
    /// `app.scope` that is set (or empty). When both the application and the
    /// grant carry a scope, the grant's must be a subset of the application's.
    /// With a grant, the ticket never outlives it.
    ///
    /// # Arguments
    /// * `app` - The application the ticket is issued to
    /// * `grant` - The user grant the ticket acts under, if any
    /// * `password` - The sealing password
    /// * `options` - Lifetime, delegation, ext data and key overrides
    ///
    /// # Errors
    /// * `InvalidInput` - missing application id, incomplete grant, empty password
    /// * `Validation` - malformed scope
    /// * `Forbidden` - grant scope wider than the application scope
    /// * `Crypto` - secret generation or sealing failed
    pub fn issue(
        &self,
        app: &Application,
        grant: Option<&Grant>,
        password: &Password,
        options: &TicketOptions,
    ) -> Result<IssuedTicket, TicketError> {
        require_app(app)?;
        if let Some(grant) = grant {
            require_grant(grant)?;
        }
        require_password(password)?;

        let grant_scope = grant.and_then(|grant| grant.scope.as_ref());
        let scope = options
            .scope
            .as_ref()
            .or(grant_scope)
            .or(app.scope.as_ref())
            .cloned()
            .unwrap_or_default();
        self.scopes().validate(&scope)?;

        if let (Some(grant_scope), Some(app_scope)) = (grant_scope, app.scope.as_ref()) {
            if !self.scopes().is_subset(app_scope, grant_scope) {
                debug!(app = %app.id, "grant scope exceeds application scope");
                return Err(TicketError::forbidden(
                    "Grant scope is not a subset of the application scope",
                ));
            }
        }

        let delegate = match options.delegate {
            Some(Delegation::Forbidden) => Delegation::Forbidden,
            _ => Delegation::Allowed,
        };

        let draft = TicketDraft {
            exp: self.ticket_expiry(options.ttl, grant)?,
            app: app.id.clone(),
            scope,
            grant: grant.map(|grant| grant.id.clone()),
            user: grant.map(|grant| grant.user.clone()),
            grant_exp: grant.map(|grant| grant.exp),
            delegate,
            dlg: options.dlg.clone().filter(|dlg| !dlg.is_empty()),
        };

        self.generate(&draft, password, options)
    }
}
