//! Persisted access credentials for a single consumer key.

// crates.io
use time::serde::rfc3339;
// self
use crate::{
	_prelude::*,
	auth::{Secret, TokenPair},
};

/// Access credentials as stored in the per-customer cache file.
///
/// Either both halves of the pair carry a value or both are empty; the empty form stands for
/// "no cache". `last_updated` is only meaningful for the non-empty form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedCredentials {
	access_token: Secret,
	access_secret: Secret,
	#[serde(with = "rfc3339")]
	last_updated: OffsetDateTime,
}
impl CachedCredentials {
	/// Wraps a freshly issued pair.
	pub fn new(pair: TokenPair, last_updated: OffsetDateTime) -> Self {
		Self { access_token: pair.token, access_secret: pair.secret, last_updated }
	}

	/// Empty credentials, used when no cache exists.
	pub fn empty() -> Self {
		Self {
			access_token: Secret::default(),
			access_secret: Secret::default(),
			last_updated: OffsetDateTime::UNIX_EPOCH,
		}
	}

	/// Parses a cache document and enforces the both-or-neither invariant.
	pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
		let parsed: Self = serde_json::from_slice(bytes)?;

		if parsed.access_token.is_empty() != parsed.access_secret.is_empty() {
			return Err(<serde_json::Error as serde::de::Error>::custom(
				"accessToken and accessSecret must both be set or both be empty",
			));
		}

		Ok(parsed)
	}

	/// Returns `true` when no usable pair is cached.
	pub fn is_empty(&self) -> bool {
		self.access_token.is_empty() || self.access_secret.is_empty()
	}

	/// Cached pair, or `None` for the empty form.
	pub fn token_pair(&self) -> Option<TokenPair> {
		if self.is_empty() {
			return None;
		}

		Some(TokenPair { token: self.access_token.clone(), secret: self.access_secret.clone() })
	}

	/// Instant of the last issuance or renewal.
	pub fn last_updated(&self) -> Option<OffsetDateTime> {
		(!self.is_empty()).then_some(self.last_updated)
	}
}
impl Default for CachedCredentials {
	fn default() -> Self {
		Self::empty()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn serializes_with_camel_case_and_rfc3339() {
		let creds = CachedCredentials::new(
			TokenPair::new("T", "S"),
			datetime!(2024-03-01 12:30:00 -5),
		);
		let payload = serde_json::to_value(&creds).expect("Credentials should serialize.");

		assert_eq!(payload["accessToken"], "T");
		assert_eq!(payload["accessSecret"], "S");
		assert_eq!(payload["lastUpdated"], "2024-03-01T12:30:00-05:00");
	}

	#[test]
	fn half_empty_documents_are_rejected() {
		let doc = br#"{"accessToken":"T","accessSecret":"","lastUpdated":"2024-03-01T12:30:00Z"}"#;

		assert!(CachedCredentials::from_slice(doc).is_err());
	}

	#[test]
	fn empty_form_has_no_pair_or_timestamp() {
		let creds = CachedCredentials::empty();

		assert!(creds.is_empty());
		assert!(creds.token_pair().is_none());
		assert!(creds.last_updated().is_none());
	}
}
