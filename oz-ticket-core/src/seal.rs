//! Password-based sealing of JSON objects into opaque strings
//!
//! A sealed string has six `*`-separated components:
//!
//! ```text
//! Oz.1*{password id}*{salt hex}*{nonce}*{ciphertext}*{expiration}
//! ```
//!
//! The key is HMAC-SHA256 over the salt, keyed with the password secret. The
//! payload is encrypted with ChaCha20-Poly1305, and every other component is bound
//! in as associated data, so changing any part of the string (including the
//! expiration) breaks decryption. The expiration is empty unless a seal TTL was
//! requested.

use crate::{TicketError, utils};
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

const SEAL_PREFIX: &str = "Oz.1";
const SALT_BYTES: usize = 32;
const NONCE_BYTES: usize = 12;

/// Shortest password secret the sealer accepts
pub const MIN_PASSWORD_LENGTH: usize = 32;

/// Seals and unseals objects with a shared password.
pub trait Sealer: Send + Sync {
    /// Encrypts and integrity-protects `object`, returning an opaque string.
    fn seal(
        &self,
        object: &Value,
        password: &Password,
        options: &SealOptions,
    ) -> Result<String, TicketError>;

    /// Verifies and decrypts a string produced by [`Sealer::seal`].
    ///
    /// Every failure is a [`TicketError::Crypto`] that does not say which
    /// cryptographic step rejected the input.
    fn unseal(
        &self,
        sealed: &str,
        password: &Password,
        options: &SealOptions,
    ) -> Result<Value, TicketError>;
}

/// A sealing password, optionally tagged with an id so that a rotated password
/// can be told apart from the current one.
#[derive(Debug)]
pub struct Password {
    id: Option<String>,
    secret: SecretString,
}

impl Password {
    /// Creates an untagged password.
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self {
            id: None,
            secret: SecretString::from(secret.into()),
        }
    }

    /// Creates a password tagged with `id`. The id is written into every sealed
    /// string in the clear and must match when unsealing.
    pub fn with_id<I: Into<String>, S: Into<String>>(id: I, secret: S) -> Self {
        Self {
            id: Some(id.into()),
            secret: SecretString::from(secret.into()),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// True when no secret was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.secret.expose_secret().is_empty()
    }

    fn secret(&self) -> &str {
        self.secret.expose_secret()
    }
}

impl From<&str> for Password {
    fn from(secret: &str) -> Self {
        Password::new(secret)
    }
}

impl From<String> for Password {
    fn from(secret: String) -> Self {
        Password::new(secret)
    }
}

/// Per-call overrides for the sealing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SealOptions {
    /// Lifetime of the sealed string in milliseconds. `None` (or zero) seals
    /// without an expiration.
    pub ttl: Option<i64>,
    /// Tolerated clock skew in seconds when checking the expiration
    pub timestamp_skew_sec: i64,
    /// Offset added to the local clock, for hosts whose clock is known to drift
    pub localtime_offset_ms: i64,
    /// Current time in milliseconds. `None` reads the system clock.
    pub now: Option<i64>,
}

impl Default for SealOptions {
    fn default() -> Self {
        Self {
            ttl: None,
            timestamp_skew_sec: 60,
            localtime_offset_ms: 0,
            now: None,
        }
    }
}

impl SealOptions {
    fn now_ms(&self) -> i64 {
        self.now
            .unwrap_or_else(|| Utc::now().timestamp_millis())
            .saturating_add(self.localtime_offset_ms)
    }
}

/// The default [`Sealer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IronSealer;

impl IronSealer {
    fn check_password(password: &Password) -> Result<(), TicketError> {
        if password.secret().len() < MIN_PASSWORD_LENGTH {
            return Err(TicketError::invalid_input(format!(
                "Password string too short (min {MIN_PASSWORD_LENGTH} characters required)"
            )));
        }

        if let Some(id) = password.id() {
            if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(TicketError::invalid_input("Invalid password id"));
            }
        }

        Ok(())
    }
}

impl Sealer for IronSealer {
    fn seal(
        &self,
        object: &Value,
        password: &Password,
        options: &SealOptions,
    ) -> Result<String, TicketError> {
        Self::check_password(password)?;

        let payload = Zeroizing::new(serde_json::to_vec(object)?);

        let mut salt = [0u8; SALT_BYTES];
        let mut nonce = [0u8; NONCE_BYTES];
        OsRng
            .try_fill_bytes(&mut salt)
            .and_then(|_| OsRng.try_fill_bytes(&mut nonce))
            .map_err(|_| TicketError::crypto("Failed generating random bits"))?;

        let salt = hex::encode(salt);
        let key = derive_key(password.secret(), &salt)?;

        let expiration = match options.ttl.filter(|ttl| *ttl > 0) {
            Some(ttl) => options
                .now_ms()
                .checked_add(ttl)
                .ok_or_else(|| TicketError::invalid_input("Invalid seal ttl"))?
                .to_string(),
            None => String::new(),
        };

        let header = format!(
            "{SEAL_PREFIX}*{}*{salt}*{}",
            password.id().unwrap_or_default(),
            utils::encode_base64(&nonce)
        );
        let aad = format!("{header}*{expiration}");

        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key[..]));
        let ciphertext = cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &payload,
                    aad: aad.as_bytes(),
                },
            )
            .map_err(|_| TicketError::crypto("Failed to encrypt payload"))?;

        Ok(format!(
            "{header}*{}*{expiration}",
            utils::encode_base64(&ciphertext)
        ))
    }

    fn unseal(
        &self,
        sealed: &str,
        password: &Password,
        options: &SealOptions,
    ) -> Result<Value, TicketError> {
        Self::check_password(password)?;

        let parts: Vec<&str> = sealed.split('*').collect();
        let [prefix, password_id, salt, nonce, ciphertext, expiration] = parts[..] else {
            return Err(TicketError::crypto("Incorrect number of sealed components"));
        };

        if prefix != SEAL_PREFIX {
            return Err(TicketError::crypto("Wrong seal prefix"));
        }

        if password_id != password.id().unwrap_or_default() {
            return Err(TicketError::crypto("Cannot find password"));
        }

        if !expiration.is_empty() {
            let exp: i64 = expiration
                .parse()
                .map_err(|_| TicketError::crypto("Invalid expiration"))?;

            let skew_ms = options.timestamp_skew_sec.saturating_mul(1000);
            if exp <= options.now_ms().saturating_sub(skew_ms) {
                debug!(exp, "rejected expired seal");
                return Err(TicketError::crypto("Expired seal"));
            }
        }

        if hex::decode(salt)?.len() != SALT_BYTES {
            return Err(TicketError::crypto("Invalid salt"));
        }

        let nonce = utils::decode_base64(nonce)?;
        if nonce.len() != NONCE_BYTES {
            return Err(TicketError::crypto("Invalid nonce"));
        }

        let ciphertext = utils::decode_base64(ciphertext)?;
        let key = derive_key(password.secret(), salt)?;
        let aad = format!("{prefix}*{password_id}*{salt}*{}*{expiration}", parts[3]);

        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key[..]));
        let payload = Zeroizing::new(
            cipher
                .decrypt(
                    Nonce::from_slice(&nonce),
                    Payload {
                        msg: &ciphertext,
                        aad: aad.as_bytes(),
                    },
                )
                .map_err(|_| TicketError::crypto("Bad seal integrity"))?,
        );

        Ok(serde_json::from_slice(&payload)?)
    }
}

fn derive_key(secret: &str, salt: &str) -> Result<Zeroizing<[u8; 32]>, TicketError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|_| TicketError::crypto("Invalid password"))?;
    mac.update(salt.as_bytes());

    let mut key = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&mac.finalize().into_bytes());
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "a_password_that_is_not_too_short_and_also_not_very_random_but_is_good_enough";

    fn object() -> Value {
        json!({ "a": 1, "b": 2, "c": [3, 4, 5], "d": { "e": "f" } })
    }

    #[test]
    fn test_seal_and_unseal() {
        let password = Password::new(SECRET);
        let sealed = IronSealer
            .seal(&object(), &password, &SealOptions::default())
            .expect("Failed to seal");

        assert!(sealed.starts_with("Oz.1*"));
        assert_eq!(sealed.split('*').count(), 6);
        assert!(!sealed.contains("\"a\""));

        let unsealed = IronSealer
            .unseal(&sealed, &password, &SealOptions::default())
            .expect("Failed to unseal");
        assert_eq!(unsealed, object());
    }

    #[test]
    fn test_each_seal_is_unique() {
        let password = Password::new(SECRET);
        let a = IronSealer
            .seal(&object(), &password, &SealOptions::default())
            .expect("seal a");
        let b = IronSealer
            .seal(&object(), &password, &SealOptions::default())
            .expect("seal b");
        assert_ne!(a, b);
    }

    #[test]
    fn test_short_password_rejected() {
        let err = IronSealer
            .seal(&object(), &Password::new("short"), &SealOptions::default())
            .expect_err("short password should fail");
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_wrong_password_rejected() {
        let sealed = IronSealer
            .seal(&object(), &Password::new(SECRET), &SealOptions::default())
            .expect("Failed to seal");

        let other = Password::new(format!("{SECRET}-other"));
        let err = IronSealer
            .unseal(&sealed, &other, &SealOptions::default())
            .expect_err("wrong password should fail");
        assert!(err.is_crypto());
    }

    #[test]
    fn test_password_id_must_match() {
        let sealed = IronSealer
            .seal(
                &object(),
                &Password::with_id("current", SECRET),
                &SealOptions::default(),
            )
            .expect("Failed to seal");
        assert!(sealed.starts_with("Oz.1*current*"));

        let unsealed = IronSealer
            .unseal(
                &sealed,
                &Password::with_id("current", SECRET),
                &SealOptions::default(),
            )
            .expect("Failed to unseal with matching id");
        assert_eq!(unsealed, object());

        let err = IronSealer
            .unseal(
                &sealed,
                &Password::with_id("previous", SECRET),
                &SealOptions::default(),
            )
            .expect_err("other id should fail");
        assert!(err.is_crypto());

        let err = IronSealer
            .unseal(&sealed, &Password::new(SECRET), &SealOptions::default())
            .expect_err("untagged password should fail");
        assert!(err.is_crypto());
    }

    #[test]
    fn test_invalid_password_id_rejected() {
        let err = IronSealer
            .seal(
                &object(),
                &Password::with_id("a*b", SECRET),
                &SealOptions::default(),
            )
            .expect_err("id with separator should fail");
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_tampered_components_rejected() {
        let password = Password::new(SECRET);
        let sealed = IronSealer
            .seal(&object(), &password, &SealOptions::default())
            .expect("Failed to seal");

        let mut parts: Vec<String> = sealed.split('*').map(str::to_string).collect();
        let ciphertext = &mut parts[4];
        let flipped = if ciphertext.starts_with('A') { "B" } else { "A" };
        ciphertext.replace_range(0..1, flipped);
        let tampered = parts.join("*");

        let err = IronSealer
            .unseal(&tampered, &password, &SealOptions::default())
            .expect_err("tampered ciphertext should fail");
        assert!(err.is_crypto());

        let err = IronSealer
            .unseal(&format!("{sealed}*extra"), &password, &SealOptions::default())
            .expect_err("extra component should fail");
        assert!(err.is_crypto());

        let err = IronSealer
            .unseal(
                &sealed.replacen("Oz.1", "Oz.2", 1),
                &password,
                &SealOptions::default(),
            )
            .expect_err("wrong prefix should fail");
        assert!(err.is_crypto());
    }

    #[test]
    fn test_expiration_is_bound_and_enforced() {
        let password = Password::new(SECRET);
        let options = SealOptions {
            ttl: Some(200),
            ..SealOptions::default()
        };
        let sealed = IronSealer
            .seal(&object(), &password, &options)
            .expect("Failed to seal");

        assert!(!sealed.ends_with('*'), "expiration should be stamped");
        IronSealer
            .unseal(&sealed, &password, &SealOptions::default())
            .expect("fresh seal should unseal");

        // Two minutes ahead is past the 60 second skew allowance
        let later = SealOptions {
            localtime_offset_ms: 120_000,
            ..SealOptions::default()
        };
        let err = IronSealer
            .unseal(&sealed, &password, &later)
            .expect_err("expired seal should fail");
        assert_eq!(err, TicketError::crypto("Expired seal"));

        // Stripping the expiration breaks integrity
        let (head, _) = sealed.rsplit_once('*').expect("has components");
        let err = IronSealer
            .unseal(&format!("{head}*"), &password, &later)
            .expect_err("stripped expiration should fail");
        assert!(err.is_crypto());
    }

    #[test]
    fn test_pinned_time_drives_expiration() {
        let password = Password::new(SECRET);
        let sealed_at = SealOptions {
            ttl: Some(1000),
            now: Some(1_000_000),
            ..SealOptions::default()
        };
        let sealed = IronSealer
            .seal(&object(), &password, &sealed_at)
            .expect("Failed to seal");
        assert!(sealed.ends_with("*1001000"));

        let within_skew = SealOptions {
            now: Some(1_050_000),
            ..SealOptions::default()
        };
        IronSealer
            .unseal(&sealed, &password, &within_skew)
            .expect("seal within skew should unseal");

        let past_skew = SealOptions {
            now: Some(1_062_000),
            ..SealOptions::default()
        };
        let err = IronSealer
            .unseal(&sealed, &password, &past_skew)
            .expect_err("expired seal should fail");
        assert_eq!(err, TicketError::crypto("Expired seal"));
    }

    #[test]
    fn test_overflowing_seal_ttl_rejected() {
        let options = SealOptions {
            ttl: Some(i64::MAX),
            ..SealOptions::default()
        };
        let err = IronSealer
            .seal(&object(), &Password::new(SECRET), &options)
            .expect_err("overflowing ttl should fail");
        assert_eq!(err, TicketError::invalid_input("Invalid seal ttl"));
    }
}
