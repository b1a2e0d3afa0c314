//! TaskDeck Backend Library
//!
//! Credential issuance and request-authorization core: local password and
//! federated Google logins, stateless signed session tokens, and
//! ownership-gated project/task resources around them.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod ownership;
pub mod resources;
