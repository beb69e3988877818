//! Data models for the agent client.
//!
//! Each sub-module covers one entity of the billing domain. Everything is
//! a client-side projection; the hosted backend owns the authoritative
//! state.

mod agent;
mod payment;
mod plan;
mod subscription;

// Re-export all models for convenient imports
pub use agent::*;
pub use payment::*;
pub use plan::*;
pub use subscription::*;
