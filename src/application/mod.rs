//! Application layer services implementing the registry protocols.
//!
//! Services consume repository traits and give HTTP handlers and the admin
//! CLI a single entry point for every link operation.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Allocation, resolution, click accounting, deletion

pub mod services;
