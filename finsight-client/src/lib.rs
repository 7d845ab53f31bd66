//! FinSight Client - typed access to the equity-research backend
//!
//! This crate provides the HTTP transport layer (two clients split by
//! timeout class) and the typed domain client with one operation per
//! backend capability. Controllers and tests program against the
//! [`ResearchBackend`] trait rather than the concrete client.

pub mod client;
pub mod transport;

mod wire;

pub use client::{ApiClient, ResearchBackend};
pub use transport::{LatencyClass, Transport};
