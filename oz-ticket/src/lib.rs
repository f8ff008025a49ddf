//! # Oz Ticket
//!
//! Ticket, grant and delegation lifecycle for the Oz authorization protocol.
//!
//! Applications are issued tickets: expiring, scope-bound records sealed into an
//! opaque id. A ticket authorizes its application to act within its scope,
//! optionally on behalf of a user (through a grant) and optionally because
//! another application delegated to it.
//!
//! ## Operations
//!
//! All operations are methods on [`TicketAuthority`]:
//!
//! - [`issue`](TicketAuthority::issue) - new ticket for an application and optional grant
//! - [`reissue`](TicketAuthority::reissue) - renew a ticket or delegate it to another application
//! - [`rsvp`](TicketAuthority::rsvp) / [`delegate_rsvp`](TicketAuthority::delegate_rsvp) -
//!   short-lived vouchers redeemed for a ticket once a grant is resolved
//! - [`generate`](TicketAuthority::generate) - seal a prepared draft
//! - [`parse`](TicketAuthority::parse) / [`parse_rsvp`](TicketAuthority::parse_rsvp) -
//!   recover the sealed record
//!
//! ## Rules enforced
//!
//! - A grant's scope must fit inside the application's, and a ticket never
//!   outlives its grant
//! - Reissued tickets can only narrow their parent's scope
//! - `delegate: false` is sticky for every descendant
//! - Delegation is one hop: a delegated ticket cannot be delegated again
//! - `ext.private` only ever travels inside the sealed id
//!
//! ## Example
//! ```rust
//! use oz_ticket::{Application, Grant, Password, SealOptions, TicketAuthority, TicketOptions};
//!
//! let authority = TicketAuthority::new();
//! let password = Password::new("a_password_that_is_not_too_short_and_also_not_very_random");
//!
//! let app = Application::new("social").with_scope(["a", "b"]);
//! let grant = Grant::new("g1", "steve", authority.now_ms() + 60_000).with_scope(["a"]);
//!
//! let ticket = authority
//!     .issue(&app, Some(&grant), &password, &TicketOptions::new())
//!     .expect("Failed to issue ticket");
//!
//! // Later, the client presents `ticket.id` and asks for a delegated ticket
//! let parent = authority
//!     .parse(&ticket.id, &password, &SealOptions::default())
//!     .expect("Failed to parse ticket");
//! let delegated = authority
//!     .reissue(&parent, Some(&grant), &password, &TicketOptions::new().issue_to("photos"))
//!     .expect("Failed to delegate ticket");
//!
//! assert_eq!(delegated.app, "photos");
//! assert_eq!(delegated.dlg.as_deref(), Some("social"));
//! ```

mod authority;
mod generate;
mod inspect;
mod issue;
mod model;
mod options;
mod parse;
mod reissue;
mod rsvp;

#[cfg(test)]
mod testing;

pub use authority::TicketAuthority;
pub use inspect::{TicketInspection, inspect_ticket};
pub use model::{
    Application, Delegation, Grant, IssuedTicket, RsvpEnvelope, Ticket, TicketDraft, TicketExt,
};
pub use options::{RsvpOptions, TicketOptions};

// Re-export commonly needed types from core
pub use oz_ticket_core::{
    Clock, CredentialGenerator, FixedClock, IronSealer, Password, RandomCredentials, ScopeRules,
    ScopeValidator, SealOptions, Sealer, SystemClock, TicketConfig, TicketError,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{NOW, app, authority, grant, password};
    use serde_json::json;

    #[test]
    fn test_expiry_is_capped_by_grant() {
        let authority = authority();
        for (ttl, grant_exp) in [
            (1000, NOW + 5000),
            (5000, NOW + 1000),
            (3000, NOW + 3000),
            (3_600_000, NOW + 7_200_000),
        ] {
            let grant = Grant::new("g1", "456", grant_exp);
            let ticket = authority
                .issue(&app(), Some(&grant), &password(), &TicketOptions::new().ttl(ttl))
                .expect("Failed to issue ticket");
            assert_eq!(
                ticket.exp,
                (NOW + ttl).min(grant_exp),
                "ttl {ttl}, grant exp {grant_exp}"
            );
        }
    }

    #[test]
    fn test_grant_scope_must_fit_app_scope() {
        let app = Application::new("123").with_scope(["a"]);
        let grant = Grant::new("g1", "456", NOW + 5000).with_scope(["a", "b"]);
        let err = authority()
            .issue(&app, Some(&grant), &password(), &TicketOptions::new())
            .expect_err("grant scope wider than app scope");
        assert!(err.is_forbidden());
    }

    #[test]
    fn test_delegate_restriction_cannot_be_lifted_down_the_chain() {
        let authority = authority();
        let ticket = authority
            .issue(&app(), None, &password(), &TicketOptions::new().delegate(false))
            .expect("Failed to issue ticket");

        // Renew twice; the restriction survives each hop
        let mut parent = authority
            .parse(&ticket.id, &password(), &SealOptions::default())
            .expect("Failed to parse ticket");
        for _ in 0..2 {
            let renewed = authority
                .reissue(&parent, None, &password(), &TicketOptions::new())
                .expect("Failed to renew ticket");
            assert_eq!(renewed.delegate, Delegation::Forbidden);
            parent = authority
                .parse(&renewed.id, &password(), &SealOptions::default())
                .expect("Failed to parse renewed ticket");
        }

        let err = authority
            .reissue(&parent, None, &password(), &TicketOptions::new().delegate(true))
            .expect_err("cannot relax restriction");
        assert!(err.is_forbidden());

        let err = authority
            .reissue(&parent, None, &password(), &TicketOptions::new().issue_to("789"))
            .expect_err("cannot delegate restricted ticket");
        assert!(err.is_forbidden());
    }

    #[test]
    fn test_delegation_is_single_hop() {
        let authority = authority();
        let grant = grant();
        let ticket = authority
            .issue(&app(), Some(&grant), &password(), &TicketOptions::new())
            .expect("Failed to issue ticket");
        let parent = authority
            .parse(&ticket.id, &password(), &SealOptions::default())
            .expect("Failed to parse ticket");

        let delegated = authority
            .reissue(&parent, Some(&grant), &password(), &TicketOptions::new().issue_to("789"))
            .expect("first hop is allowed");
        let delegated = authority
            .parse(&delegated.id, &password(), &SealOptions::default())
            .expect("Failed to parse delegated ticket");
        assert_eq!(delegated.dlg.as_deref(), Some("123"));

        let err = authority
            .reissue(&delegated, Some(&grant), &password(), &TicketOptions::new().issue_to("000"))
            .expect_err("second hop is rejected");
        assert!(err.is_bad_request());

        // The delegated app may still renew its own ticket
        let renewed = authority
            .reissue(&delegated, Some(&grant), &password(), &TicketOptions::new())
            .expect("renewal of a delegated ticket is allowed");
        assert_eq!(renewed.app, "789");
        assert_eq!(renewed.dlg.as_deref(), Some("123"));
    }

    #[test]
    fn test_ext_privacy_round_trip() {
        let authority = authority();
        let options = TicketOptions::new().ext(TicketExt::new(
            Some(json!({ "tos": "1.0" })),
            Some(json!({ "x": 1 })),
        ));
        let ticket = authority
            .issue(&app(), None, &password(), &options)
            .expect("Failed to issue ticket");

        assert_eq!(ticket.ext, Some(json!({ "tos": "1.0" })));

        let parsed = authority
            .parse(&ticket.id, &password(), &SealOptions::default())
            .expect("Failed to parse ticket");
        let ext = parsed.ext.expect("sealed ext");
        assert_eq!(ext.public, Some(json!({ "tos": "1.0" })));
        assert_eq!(ext.private, Some(json!({ "x": 1 })));
    }

    #[test]
    fn test_grant_linkage_is_all_or_nothing() {
        let authority = authority();

        let app_ticket = authority
            .issue(&app(), None, &password(), &TicketOptions::new())
            .expect("Failed to issue app ticket");
        let app_ticket = authority
            .parse(&app_ticket.id, &password(), &SealOptions::default())
            .expect("Failed to parse app ticket");
        let err = authority
            .reissue(&app_ticket, Some(&grant()), &password(), &TicketOptions::new())
            .expect_err("grant added on reissue");
        assert!(err.is_invalid_input());

        let g1 = Grant::new("g1", "456", NOW + 5000);
        let user_ticket = authority
            .issue(&app(), Some(&g1), &password(), &TicketOptions::new())
            .expect("Failed to issue user ticket");
        let user_ticket = authority
            .parse(&user_ticket.id, &password(), &SealOptions::default())
            .expect("Failed to parse user ticket");
        let g2 = Grant::new("g2", "456", NOW + 5000);
        let err = authority
            .reissue(&user_ticket, Some(&g2), &password(), &TicketOptions::new())
            .expect_err("grant swapped on reissue");
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_rsvp_default_ttl_differs_from_ticket() {
        let authority = authority();
        let rsvp = authority
            .rsvp(&app(), &grant(), &password(), &RsvpOptions::new())
            .expect("Failed to create rsvp");
        let envelope = authority
            .parse_rsvp(&rsvp, &password(), &RsvpOptions::new())
            .expect("Failed to parse rsvp");
        assert_eq!(envelope.exp, NOW + 60_000);

        let ticket = authority
            .issue(&app(), None, &password(), &TicketOptions::new())
            .expect("Failed to issue ticket");
        assert_eq!(ticket.exp, NOW + 3_600_000);
    }

    #[test]
    fn test_generate_parse_round_trip() {
        let authority = authority();
        let draft = TicketDraft {
            exp: NOW + 1000,
            app: "123".to_string(),
            scope: vec!["a".to_string()],
            grant: Some("g1".to_string()),
            user: Some("456".to_string()),
            grant_exp: Some(NOW + 2000),
            delegate: Delegation::Forbidden,
            dlg: Some("789".to_string()),
        };
        let ext = TicketExt::new(Some(json!({ "tos": "1.0" })), Some(json!({ "x": 1 })));
        let options = TicketOptions::new().ext(ext.clone());

        let issued = authority
            .generate(&draft, &password(), &options)
            .expect("Failed to generate ticket");
        let parsed = authority
            .parse(&issued.id, &password(), &SealOptions::default())
            .expect("Failed to parse ticket");

        assert_eq!(parsed.draft(), draft);
        assert_eq!(parsed.key, issued.key);
        assert_eq!(parsed.algorithm, issued.algorithm);
        assert_eq!(parsed.ext, Some(ext));
        assert_eq!(parsed.id, issued.id);

        // Redacting the parsed record reproduces what the client was given
        assert_eq!(parsed.into_issued(), issued);
    }

    #[test]
    fn test_concurrent_issuance() {
        let authority = std::sync::Arc::new(authority());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let authority = authority.clone();
                std::thread::spawn(move || {
                    let app = Application::new(format!("app-{i}"));
                    authority
                        .issue(&app, None, &password(), &TicketOptions::new())
                        .expect("Failed to issue ticket")
                })
            })
            .collect();

        let mut ids: Vec<String> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread panicked").id)
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }
}
