//! Single-use pickup codes proving entitlement to receive an item.
//!
//! A code is minted once, at transaction creation, from a cryptographically
//! secure RNG. It is never derived from the transaction id or a timestamp,
//! never rotated, and never recycled after cancellation; a new code requires
//! a new transaction.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pickup codes are always exactly this many characters.
pub const PICKUP_CODE_LEN: usize = 8;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Errors from parsing a submitted pickup code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickupCodeError {
    /// The submitted code is not exactly [`PICKUP_CODE_LEN`] characters.
    #[error("Pickup code must be exactly {PICKUP_CODE_LEN} characters, got {len}")]
    InvalidLength { len: usize },

    /// The submitted code contains a non-alphanumeric character.
    #[error("Pickup code must contain only letters and digits")]
    InvalidCharacter,
}

/// An 8-character alphanumeric secret bound to a single Order or Claim.
///
/// Stored normalized to uppercase; submissions are case-insensitive.
/// Comparison is constant-time so verification leaks nothing about how
/// close a guess was.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PickupCode(String);

impl PickupCode {
    /// Generates a fresh code from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let code: String = (0..PICKUP_CODE_LEN)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    /// Parses a submitted code, normalizing to uppercase.
    ///
    /// Fails unless the input is exactly 8 alphanumeric characters.
    pub fn parse(input: &str) -> Result<Self, PickupCodeError> {
        let trimmed = input.trim();
        if trimmed.chars().count() != PICKUP_CODE_LEN {
            return Err(PickupCodeError::InvalidLength {
                len: trimmed.chars().count(),
            });
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(PickupCodeError::InvalidCharacter);
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Verifies a submitted code against this one in constant time.
    ///
    /// Pure: never mutates anything, never errors, returns the same result
    /// for the same inputs every time.
    pub fn matches(&self, submitted: &PickupCode) -> bool {
        let a = self.0.as_bytes();
        let b = submitted.0.as_bytes();
        if a.len() != b.len() {
            return false;
        }
        let mut diff = 0u8;
        for (x, y) in a.iter().zip(b.iter()) {
            diff |= x ^ y;
        }
        diff == 0
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for PickupCode {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl std::fmt::Display for PickupCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_is_eight_uppercase_alphanumerics() {
        let code = PickupCode::generate();
        assert_eq!(code.as_str().len(), PICKUP_CODE_LEN);
        assert!(
            code.as_str()
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_generated_codes_are_unpredictable() {
        // Not a statistical test, just a sanity check that consecutive
        // codes differ.
        let a = PickupCode::generate();
        let b = PickupCode::generate();
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_parse_normalizes_to_uppercase() {
        let code = PickupCode::parse("ab12cd34").unwrap();
        assert_eq!(code.as_str(), "AB12CD34");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let code = PickupCode::parse("  AB12CD34  ").unwrap();
        assert_eq!(code.as_str(), "AB12CD34");
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(matches!(
            PickupCode::parse("ABC"),
            Err(PickupCodeError::InvalidLength { len: 3 })
        ));
        assert!(matches!(
            PickupCode::parse("ABCDEFGHI"),
            Err(PickupCodeError::InvalidLength { len: 9 })
        ));
    }

    #[test]
    fn test_parse_rejects_non_alphanumeric() {
        assert!(matches!(
            PickupCode::parse("AB12CD3!"),
            Err(PickupCodeError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_matches_is_case_insensitive_via_parse() {
        let stored = PickupCode::parse("AB12CD34").unwrap();
        let submitted = PickupCode::parse("ab12cd34").unwrap();
        assert!(stored.matches(&submitted));
    }

    #[test]
    fn test_mismatch_is_stable_across_repeated_calls() {
        let stored = PickupCode::parse("AB12CD34").unwrap();
        let wrong = PickupCode::parse("XX99YY00").unwrap();
        for _ in 0..5 {
            assert!(!stored.matches(&wrong));
        }
    }

    #[test]
    fn test_serialization_roundtrip() {
        let code = PickupCode::generate();
        let json = serde_json::to_string(&code).unwrap();
        let deserialized: PickupCode = serde_json::from_str(&json).unwrap();
        assert!(code.matches(&deserialized));
    }
}
