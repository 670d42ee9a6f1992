//! Domain layer for the fooddb embedding and search subsystem.
//!
//! Contains the core models, the port traits that adapters implement,
//! and the domain error taxonomy. Nothing in this layer touches SQLite
//! or HTTP directly.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
