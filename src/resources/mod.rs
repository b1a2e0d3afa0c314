//! Resources Module
//! Mission: The thin project/task layer that the auth core protects

pub mod api;
pub mod models;
pub mod store;

pub use api::ResourcesState;
pub use store::ResourceStore;
