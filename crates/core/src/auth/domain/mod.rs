pub mod auth_policy;
pub mod auth_state;
pub mod authenticator;
