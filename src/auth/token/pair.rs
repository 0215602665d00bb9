//! Token/secret pairs issued by the upstream OAuth 1.0a endpoints.

// self
use crate::{_prelude::*, auth::Secret};

/// Access credentials bound to a consumer key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenPair {
	/// OAuth token value.
	pub token: Secret,
	/// OAuth token secret used in the signing key.
	pub secret: Secret,
}
impl TokenPair {
	/// Creates a pair from raw strings.
	pub fn new(token: impl Into<Secret>, secret: impl Into<Secret>) -> Self {
		Self { token: token.into(), secret: secret.into() }
	}

	/// Returns `true` when neither half carries a value.
	pub fn is_empty(&self) -> bool {
		self.token.is_empty() && self.secret.is_empty()
	}
}

/// Short-lived request credentials returned by `begin` and consumed by `verify`.
///
/// The pair is single-use and never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestToken(pub TokenPair);
impl RequestToken {
	/// Creates a request token from raw strings.
	pub fn new(token: impl Into<Secret>, secret: impl Into<Secret>) -> Self {
		Self(TokenPair::new(token, secret))
	}

	/// Request token value, as shown in the authorization URL.
	pub fn token(&self) -> &Secret {
		&self.0.token
	}

	/// Request token secret.
	pub fn secret(&self) -> &Secret {
		&self.0.secret
	}
}

/// Output of `begin`: the request token plus the URL the human must visit.
#[derive(Clone, Debug)]
pub struct PendingAuthorization {
	/// Request credentials awaiting verification.
	pub request: RequestToken,
	/// Upstream page that displays the verification code.
	pub authorize_url: Url,
}
