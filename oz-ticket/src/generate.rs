use crate::authority::{TicketAuthority, require_password};
use crate::model::{IssuedTicket, Ticket, TicketDraft, TicketExt};
use crate::options::TicketOptions;
use oz_ticket_core::{Password, TicketError};
use tracing::info;

impl TicketAuthority {
    /// Finalizes a draft into a sealed ticket.
    ///
    /// Adds a fresh secret and its algorithm, attaches `options.ext`, and seals
    /// the whole record into the ticket id. The returned ticket shows only the
    /// public ext data; the private part can only be recovered by
    /// [`parse`](TicketAuthority::parse).
    ///
    /// [`issue`](TicketAuthority::issue) and [`reissue`](TicketAuthority::reissue)
    /// end here. Calling it directly skips their scope, grant and delegation
    /// rules, so the draft must already be trusted.
    ///
    /// # Arguments
    /// * `draft` - The issuer-decided ticket fields
    /// * `password` - The sealing password
    /// * `options` - `key_bytes`, `hmac_algorithm`, `ext` and `seal` are used
    ///
    /// # Returns
    /// The client view of the ticket, whose `id` is the sealed record
    pub fn generate(
        &self,
        draft: &TicketDraft,
        password: &Password,
        options: &TicketOptions,
    ) -> Result<IssuedTicket, TicketError> {
        require_password(password)?;

        let key_bytes = options
            .key_bytes
            .filter(|size| *size != 0)
            .unwrap_or(self.config().key_bytes);
        let key = self.credentials().random_secret(key_bytes)?;

        let algorithm = options
            .hmac_algorithm
            .clone()
            .unwrap_or_else(|| self.config().hmac_algorithm.clone());

        // Field by field, so nothing but the public and private parts is carried
        let ext = options.ext.as_ref().map(|ext| TicketExt {
            public: ext.public.clone(),
            private: ext.private.clone(),
        });

        let mut ticket = Ticket::from_draft(draft.clone(), key, algorithm, ext);
        ticket.id = self.seal_value(&ticket, password, &options.seal)?;

        info!(
            app = %ticket.app,
            exp = ticket.exp,
            dlg = ticket.dlg.as_deref().unwrap_or("-"),
            grant = ticket.grant.as_deref().unwrap_or("-"),
            "ticket generated"
        );

        Ok(ticket.into_issued())
    }
}
