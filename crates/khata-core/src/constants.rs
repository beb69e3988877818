//! Application-wide constants.

/// Plan name hidden from the agent-facing catalog. Subscribers get it
/// automatically on signup; agents never collect money for it.
pub const TRIAL_PLAN_NAME: &str = "Free Trial";

/// File name of the durable session record inside the data directory.
pub const AGENT_SESSION_FILE: &str = "agent_session.json";

/// Days added by an extension when no plan is selected.
pub const DEFAULT_EXTENSION_DAYS: i32 = 30;
