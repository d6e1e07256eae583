// core/src/session/mod.rs

//! Persistent client session: the bearer token and the identity decoded from it.

pub mod store;
pub mod token;

pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use token::{decode_token, TokenStore};
