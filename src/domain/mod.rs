//! Domain layer containing the link record and the store contract.
//!
//! Nothing here depends on HTTP or on a particular database. The registry
//! protocols that operate on these types live in
//! [`crate::application::services`].
//!
//! # Architecture
//!
//! - [`entities`] - The link record and its creation input
//! - [`repositories`] - The keyed store trait implemented by the infrastructure layer

pub mod entities;
pub mod repositories;
