//! Anti-forgery `state` parameter for OAuth flows.
//!
//! The value is generated before the authorization redirect, kept server side in the
//! caller's session, and compared against the `state` the provider echoes back on the
//! callback. A state is meant to be used once.

use rand::Rng;
use subtle::ConstantTimeEq;

/// A cryptographically random anti-forgery token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State(String);

impl State {
    /// Generate a new state token: 32 random bytes, hex encoded.
    pub fn generate() -> Self {
        let random_bytes: [u8; 32] = rand::thread_rng().gen();
        Self(hex::encode(random_bytes))
    }

    /// Rebuild a state previously stored in the session.
    pub fn from_string(state: String) -> Self {
        Self(state)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare the stored state against the value returned by the provider.
    ///
    /// Runs in time independent of where the first differing byte is.
    pub fn verify(&self, received: &str) -> bool {
        let expected = self.0.as_bytes();
        let received = received.as_bytes();
        if expected.is_empty() || expected.len() != received.len() {
            return false;
        }
        expected.ct_eq(received).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_state() {
        let state = State::generate();
        assert_eq!(state.as_str().len(), 64); // 32 bytes hex encoded
        assert!(state.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_states_are_unique() {
        let states: HashSet<String> = (0..256).map(|_| State::generate().as_str().to_string()).collect();
        assert_eq!(states.len(), 256);
    }

    #[test]
    fn test_verify_matching_state() {
        let state = State::generate();
        let echoed = state.as_str().to_string();
        assert!(state.verify(&echoed));
    }

    #[test]
    fn test_verify_rejects_other_state() {
        let state = State::generate();
        let other = State::generate();
        assert!(!state.verify(other.as_str()));
    }

    #[test]
    fn test_verify_rejects_prefix_and_empty() {
        let state = State::from_string("abcdef".to_string());
        assert!(!state.verify("abc"));
        assert!(!state.verify(""));
        assert!(!State::from_string(String::new()).verify(""));
    }

    #[test]
    fn test_verify_rejects_single_byte_difference() {
        let state = State::from_string("abcdef".to_string());
        assert!(!state.verify("abcdeg"));
        assert!(!state.verify("bbcdef"));
        assert!(state.verify("abcdef"));
    }
}
