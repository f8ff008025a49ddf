//! # Oz Ticket Core
//!
//! Core types and collaborators shared by the Oz ticket implementation.
//!
//! The ticket lifecycle depends on four pluggable collaborators, each defined
//! here as a trait with a default implementation:
//!
//! - [`ScopeValidator`] / [`ScopeRules`] - scope syntax and subset checks
//! - [`Sealer`] / [`IronSealer`] - password-based authenticated sealing
//! - [`CredentialGenerator`] / [`RandomCredentials`] - ticket secrets
//! - [`Clock`] / [`SystemClock`] - the current time
//!
//! Along with the shared [`TicketError`] taxonomy and the [`TicketConfig`]
//! defaults.

pub mod config;
pub mod credentials;
pub mod error;
pub mod scope;
pub mod seal;
pub mod time;
pub mod utils;

pub use config::{
    DEFAULT_HMAC_ALGORITHM, DEFAULT_KEY_BYTES, DEFAULT_RSVP_TTL_MS, DEFAULT_TICKET_TTL_MS,
    TicketConfig,
};
pub use credentials::{CredentialGenerator, RandomCredentials};
pub use error::TicketError;
pub use scope::{ScopeRules, ScopeValidator};
pub use seal::{IronSealer, MIN_PASSWORD_LENGTH, Password, SealOptions, Sealer};
pub use time::{Clock, FixedClock, SystemClock};
pub use utils::{decode_base64, encode_base64};
