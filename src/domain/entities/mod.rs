//! Core domain entities.
//!
//! - [`Link`] - A stored short-code mapping with its click counters
//! - [`NewLink`] - Input for inserting a fresh record

pub mod link;

pub use link::{Link, NewLink};
