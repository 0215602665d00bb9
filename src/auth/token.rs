//! OAuth 1.0a credential pairs and their cached representation.

pub mod cached;
pub mod pair;
pub mod secret;
