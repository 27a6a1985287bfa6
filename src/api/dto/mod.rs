//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization. Field names are
//! camelCase on the wire.

pub mod health;
pub mod link;
