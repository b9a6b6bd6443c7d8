//! API key generation.
//!
//! Keys are `dandi-` followed by 32 characters drawn uniformly from
//! `[A-Za-z0-9]`. Uniqueness is guaranteed by the table's constraint on
//! `api_key`, not by the generator.

use rand::{Rng, distr::Alphanumeric};

/// Prefix shared by every generated key.
pub const KEY_PREFIX: &str = "dandi-";

/// Number of random characters after the prefix.
pub const KEY_RANDOM_LEN: usize = 32;

/// Generator for new API keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyGenerator;

impl KeyGenerator {
    /// Generate a new API key.
    pub fn generate(&self) -> String {
        let random: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(KEY_RANDOM_LEN)
            .map(char::from)
            .collect();

        format!("{}{}", KEY_PREFIX, random)
    }
}
