//! Khata Core Library
//!
//! This crate provides the domain models, shared constants, and pure
//! helpers used by the agent-facing Khata client components.

pub mod constants;
pub mod models;

// Re-export commonly used types
pub use models::{
    filter_subscriptions, Agent, SubscriptionPayment, SubscriptionPlan, SubscriptionStatus,
    UserSubscription,
};
