use crate::authority::TicketAuthority;
use crate::model::Ticket;
use oz_ticket_core::Clock;

/// Summary of a parsed ticket at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketInspection {
    /// The application holding the ticket
    pub app: String,
    /// The user the ticket acts for, if it was issued under a grant
    pub user: Option<String>,
    pub scope: Vec<String>,
    pub expires_at: i64,
    pub is_expired: bool,
    pub grant_expires_at: Option<i64>,
    pub is_grant_expired: bool,
    /// Whether the ticket was delegated from another application
    pub is_delegated: bool,
    /// Whether the ticket may still be reissued to another application
    pub can_delegate: bool,
}

/// Inspects a ticket against the given clock.
///
/// A ticket is expired once the clock reaches its `exp`. This never fails;
/// enforcing the result is up to the caller.
pub fn inspect_ticket(ticket: &Ticket, clock: &dyn Clock) -> TicketInspection {
    let now = clock.now_ms();

    TicketInspection {
        app: ticket.app.clone(),
        user: ticket.user.clone(),
        scope: ticket.scope.clone(),
        expires_at: ticket.exp,
        is_expired: ticket.exp <= now,
        grant_expires_at: ticket.grant_exp,
        is_grant_expired: ticket.grant_exp.is_some_and(|exp| exp <= now),
        is_delegated: ticket.dlg.is_some(),
        can_delegate: ticket.delegate.is_allowed() && ticket.dlg.is_none(),
    }
}

impl TicketAuthority {
    /// Inspects a ticket against the authority's clock.
    pub fn inspect(&self, ticket: &Ticket) -> TicketInspection {
        inspect_ticket(ticket, self.clock())
    }
}
