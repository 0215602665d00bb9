//! Customer identifiers, redacted secrets, and OAuth 1.0a credential models.

pub mod id;
pub mod token;

pub use id::*;
pub use token::{cached::*, pair::*, secret::*};
