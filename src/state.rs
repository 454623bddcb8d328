//! Provides the `state` parameter used to protect the authorization redirect against CSRF.
use rand::{TryRngCore, rngs::OsRng};
use subtle::ConstantTimeEq;
use tracing::error;

use crate::error::Error;

const STATE_LEN: usize = 32;
const CHARSET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
// 248 = 4 * 62. Bytes at or above it are rejected to keep the pick unbiased.
const ACCEPT_BELOW: u8 = 248;

/// A randomly generated state value: 32 characters out of `[0-9A-Za-z]`, drawn with `OsRng`.
///
/// Store it (session, cookie keyed store, ...) before redirecting the user agent
/// and compare it with the value the provider sends back.
/// # Example
/// ```rust, no_run
/// use tiny_oidc_client::state::State;
///
/// let state = State::new().expect("Failed to generate state");
/// println!("Generated state: {}", state.value());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct State(pub(crate) String);

impl State {
    /// Generates a new state using a secure random generator.
    /// - Every character is picked uniformly from the 62 symbol alphabet.
    /// - Returns an `Error::GenState` if the random generation fails.
    pub fn new() -> Result<Self, Error> {
        let mut state = String::with_capacity(STATE_LEN);
        let mut buf = [0u8; STATE_LEN];
        while state.len() < STATE_LEN {
            OsRng.try_fill_bytes(&mut buf).map_err(|e| {
                error!("Failed to generate state: {:?}", e);
                Error::GenState
            })?;
            state.extend(
                buf.iter()
                    .filter(|b| **b < ACCEPT_BELOW)
                    .map(|b| CHARSET[(*b as usize) % CHARSET.len()] as char)
                    .take(STATE_LEN - state.len()),
            );
        }
        Ok(Self(state))
    }

    /// Returns the state as a string reference.
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Checks the state sent back by the provider against this one.
    pub fn verify(&self, incoming: &UnCheckedState) -> Result<(), Error> {
        validate_state(&self.0, &incoming.0)
    }
}

impl From<State> for String {
    fn from(value: State) -> Self {
        value.0
    }
}

/// A state value received on the redirect back from the provider.
///
/// This value **has not been verified yet** and must be checked against the stored `State`.
#[derive(Debug, Clone)]
pub struct UnCheckedState(pub(crate) String);

impl From<String> for UnCheckedState {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UnCheckedState {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Compares the cached state with the incoming one in constant time.
///
/// Fails with `Error::InvalidState` when `incoming` is empty or differs from `cached`.
/// Removing the cached value after a successful check is left to the caller.
pub fn validate_state(cached: &str, incoming: &str) -> Result<(), Error> {
    if incoming.is_empty() {
        error!("State is missing from the callback");
        return Err(Error::InvalidState("state must not be empty"));
    }
    if !bool::from(cached.as_bytes().ct_eq(incoming.as_bytes())) {
        error!("State mismatch");
        return Err(Error::InvalidState("state mismatch"));
    }
    Ok(())
}
