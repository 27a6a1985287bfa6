//! Random short code generation.
//!
//! Candidates are uniform over the 62-symbol alphanumeric alphabet. Uniqueness
//! is not this module's concern; the registry probes the store for collisions.

use rand::{Rng, distr::Alphanumeric};

/// Length of every generated code.
pub const CODE_LENGTH: usize = 8;

/// Generates a random 8-character alphanumeric code.
///
/// # Examples
///
/// ```
/// use link_registry::utils::code_generator::{CODE_LENGTH, generate_code};
///
/// let code = generate_code();
/// assert_eq!(code.len(), CODE_LENGTH);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LENGTH)
        .map(char::from)
        .collect()
}
