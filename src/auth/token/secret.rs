//! Redacting wrapper for consumer secrets, token secrets, and access tokens.

// self
use crate::_prelude::*;

/// Sensitive string that never prints its value.
///
/// Formatting shows `<redacted>`, or `<empty>` when nothing is set, so a missing consumer secret
/// is still visible in debug output. Serialization writes the plain value because the
/// configuration and credential files store it verbatim.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);
impl Secret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Plain value, for signing and persistence only.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when no value is set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	fn placeholder(&self) -> &'static str {
		if self.0.is_empty() { "<empty>" } else { "<redacted>" }
	}
}
impl AsRef<str> for Secret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl From<&str> for Secret {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl From<String> for Secret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Secret({})", self.placeholder())
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.placeholder())
	}
}
