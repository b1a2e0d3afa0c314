//! Authentication Module
//! Mission: Prove who is calling — local passwords, Google identities,
//! and our own signed session tokens

pub mod api;
pub mod google;
pub mod middleware;
pub mod models;
pub mod password;
pub mod store;
pub mod token;

pub use api::AuthState;
pub use google::GoogleVerifier;
pub use middleware::auth_gate;
pub use store::IdentityStore;
pub use token::SessionTokens;
