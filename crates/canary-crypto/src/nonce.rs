//! Nonce generation from the OS CSPRNG.

use canary_core::{NONCE_ALPHABET, NONCE_LENGTH};
use rand::Rng;

/// A fresh canary nonce: [`NONCE_LENGTH`] characters from [`NONCE_ALPHABET`].
pub fn random_nonce() -> String {
    let mut rng = rand::rngs::OsRng;
    (0..NONCE_LENGTH)
        .map(|_| char::from(NONCE_ALPHABET[rng.gen_range(0..NONCE_ALPHABET.len())]))
        .collect()
}
