//! Pure helpers used by the registry.
//!
//! - [`validation`] - URL and short code predicates
//! - [`code_generator`] - Random short code generation

pub mod code_generator;
pub mod validation;
