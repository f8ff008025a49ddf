use crate::{TicketError, utils};
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroize;

/// Produces the per-ticket secret handed to the client alongside the ticket id.
pub trait CredentialGenerator: Send + Sync {
    /// Returns a fresh random secret exactly `size` characters long.
    fn random_secret(&self, size: usize) -> Result<String, TicketError>;
}

/// Secret generator backed by the operating system RNG.
///
/// Secrets are URL-safe base64 strings, so `size` is a character count and each
/// character carries six bits of entropy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCredentials;

impl CredentialGenerator for RandomCredentials {
    fn random_secret(&self, size: usize) -> Result<String, TicketError> {
        if size == 0 {
            return Err(TicketError::invalid_input("Invalid secret size"));
        }

        let byte_len = ((size + 1) * 6).div_ceil(8);
        let mut bytes = vec![0u8; byte_len];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|_| TicketError::crypto("Failed generating random bits"))?;

        let mut secret = utils::encode_base64(&bytes);
        bytes.zeroize();
        secret.truncate(size);
        Ok(secret)
    }
}
