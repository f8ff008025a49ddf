//! Fixtures shared by the unit tests.

use crate::{Application, Grant, TicketAuthority};
use oz_ticket_core::{
    CredentialGenerator, FixedClock, IronSealer, Password, RandomCredentials, SealOptions, Sealer,
    TicketError,
};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) const NOW: i64 = 1_352_535_473_414;

pub(crate) const SECRET: &str = "a_password_that_is_not_too_short_and_also_not_very_random_but_is_good_enough";

pub(crate) fn authority() -> TicketAuthority {
    TicketAuthority::new().with_clock(FixedClock(NOW))
}

pub(crate) fn password() -> Password {
    Password::new(SECRET)
}

pub(crate) fn app() -> Application {
    Application::new("123").with_scope(["a", "b"])
}

pub(crate) fn grant() -> Grant {
    Grant::new("s81u29n1812", "456", NOW + 5000).with_scope(["a"])
}

/// Counts calls into the sealer and secret generator, so tests can check that
/// rejected requests never reach them.
#[derive(Clone, Default)]
pub(crate) struct SideEffects {
    calls: Arc<AtomicUsize>,
}

impl SideEffects {
    pub(crate) fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Sealer for SideEffects {
    fn seal(
        &self,
        object: &Value,
        password: &Password,
        options: &SealOptions,
    ) -> Result<String, TicketError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        IronSealer.seal(object, password, options)
    }

    fn unseal(
        &self,
        sealed: &str,
        password: &Password,
        options: &SealOptions,
    ) -> Result<Value, TicketError> {
        IronSealer.unseal(sealed, password, options)
    }
}

impl CredentialGenerator for SideEffects {
    fn random_secret(&self, size: usize) -> Result<String, TicketError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        RandomCredentials.random_secret(size)
    }
}

/// An authority whose sealer and secret generator both report to `effects`.
pub(crate) fn counting_authority(effects: &SideEffects) -> TicketAuthority {
    authority()
        .with_sealer(effects.clone())
        .with_credentials(effects.clone())
}
