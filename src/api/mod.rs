//! Thin network client for the Agora backend and its wire/domain types.

pub mod cached_client;
pub mod client;
pub mod types;
pub mod wire;
