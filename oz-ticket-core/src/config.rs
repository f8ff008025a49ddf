use serde::Deserialize;

/// Default ticket lifetime: one hour
pub const DEFAULT_TICKET_TTL_MS: i64 = 60 * 60 * 1000;
/// Default RSVP lifetime: one minute
pub const DEFAULT_RSVP_TTL_MS: i64 = 60 * 1000;
/// Default ticket secret size
pub const DEFAULT_KEY_BYTES: usize = 32;
/// Default ticket HMAC algorithm
pub const DEFAULT_HMAC_ALGORITHM: &str = "sha256";

/// Defaults applied when a call's options leave a value unset.
///
/// Every field can be overridden per call through the ticket or RSVP options.
/// The struct deserializes from a partial document, missing fields keep
/// their defaults:
///
/// ```rust
/// use oz_ticket_core::TicketConfig;
///
/// let config: TicketConfig = serde_json::from_str(r#"{ "rsvpTtl": 30000 }"#).unwrap();
/// assert_eq!(config.rsvp_ttl, 30_000);
/// assert_eq!(config.ticket_ttl, 3_600_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TicketConfig {
    /// Ticket lifetime in milliseconds
    pub ticket_ttl: i64,
    /// RSVP lifetime in milliseconds
    pub rsvp_ttl: i64,
    /// Size of the generated ticket secret
    pub key_bytes: usize,
    /// HMAC algorithm advertised for the ticket secret
    pub hmac_algorithm: String,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            ticket_ttl: DEFAULT_TICKET_TTL_MS,
            rsvp_ttl: DEFAULT_RSVP_TTL_MS,
            key_bytes: DEFAULT_KEY_BYTES,
            hmac_algorithm: DEFAULT_HMAC_ALGORITHM.to_string(),
        }
    }
}
