use crate::authority::{TicketAuthority, require_password};
use crate::model::Ticket;
use oz_ticket_core::{Password, SealOptions, TicketError};
use tracing::warn;

impl TicketAuthority {
    /// Recovers the full ticket record from a ticket id.
    ///
    /// Unsealing verifies the id was produced under `password` and has not been
    /// altered, so the returned record (including `key` and the private ext
    /// data) can be trusted. Any unsealing failure is reported as a generic
    /// [`TicketError::Crypto`]; the underlying reason is only logged.
    ///
    /// # Arguments
    /// * `id` - The ticket id presented by the client
    /// * `password` - The sealing password
    /// * `seal` - Sealing engine overrides
    pub fn parse(
        &self,
        id: &str,
        password: &Password,
        seal: &SealOptions,
    ) -> Result<Ticket, TicketError> {
        require_password(password)?;

        let mut ticket: Ticket = self
            .unseal_value(id, password, seal)
            .map_err(|err| match err {
                TicketError::Crypto { reason } => {
                    warn!(%reason, "failed to unseal ticket");
                    TicketError::crypto("Invalid ticket id")
                }
                other => other,
            })?;

        ticket.id = id.to_string();
        Ok(ticket)
    }
}
