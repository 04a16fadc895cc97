//! LocalMind Core - Domain types for the folder ingestion system.

mod types;

pub use types::*;
