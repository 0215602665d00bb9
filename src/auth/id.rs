//! Strongly typed identifiers for customers and their consumer keys.
//!
//! Customer ids are free-form configuration keys, so only surrounding whitespace and control
//! characters are refused. Consumer keys also name a file on disk and must be usable as a single
//! path component.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! identifier {
	($(#[$meta:meta])* $name:ident, $kind:literal, $check:path) => {
		$(#[$meta])*
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Validates and wraps `value`.
			pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
				let value = value.into();

				$check($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &str {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				Self::new(value)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, "{}({:?})", stringify!($name), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

const MAX_LEN: usize = 128;

/// Identifier validation failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// Empty value.
	#[error("{kind} cannot be empty.")]
	Empty {
		/// Which identifier failed.
		kind: &'static str,
	},
	/// Leading or trailing whitespace, or (for consumer keys) any whitespace at all.
	#[error("{kind} `{value}` contains whitespace.")]
	Whitespace {
		/// Which identifier failed.
		kind: &'static str,
		/// Rejected value.
		value: String,
	},
	/// Longer than the allowed byte count.
	#[error("{kind} exceeds {max} bytes.")]
	TooLong {
		/// Which identifier failed.
		kind: &'static str,
		/// Maximum permitted length.
		max: usize,
	},
	/// Contains a control character, a path separator, or names `.`/`..`.
	#[error("{kind} `{value}` cannot be used as a file name.")]
	Unprintable {
		/// Which identifier failed.
		kind: &'static str,
		/// Rejected value, with control characters escaped.
		value: String,
	},
}

identifier! {
	/// Configuration key selecting one customer profile (`--customerId`).
	CustomerId, "customer id", check_customer_id
}
identifier! {
	/// OAuth consumer key. The credential cache file is named after it.
	ConsumerKey, "consumer key", check_consumer_key
}

fn check_customer_id(kind: &'static str, value: &str) -> Result<(), IdentifierError> {
	check_length(kind, value)?;

	if value.trim() != value {
		return Err(IdentifierError::Whitespace { kind, value: value.to_owned() });
	}
	if value.chars().any(char::is_control) {
		return Err(IdentifierError::Unprintable { kind, value: value.escape_default().to_string() });
	}

	Ok(())
}

fn check_consumer_key(kind: &'static str, value: &str) -> Result<(), IdentifierError> {
	check_length(kind, value)?;

	if value.chars().any(char::is_whitespace) {
		return Err(IdentifierError::Whitespace { kind, value: value.to_owned() });
	}
	if matches!(value, "." | "..") || value.chars().any(|c| c.is_control() || matches!(c, '/' | '\\'))
	{
		return Err(IdentifierError::Unprintable { kind, value: value.escape_default().to_string() });
	}

	Ok(())
}

fn check_length(kind: &'static str, value: &str) -> Result<(), IdentifierError> {
	if value.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if value.len() > MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn customer_ids_only_refuse_surrounding_whitespace() {
		assert!(CustomerId::new(" C1").is_err());
		assert!(CustomerId::new("C1 ").is_err());
		assert!(CustomerId::new("").is_err());

		let id = CustomerId::new("Joint Account").expect("Inner spaces should be allowed.");

		assert_eq!(id.as_ref(), "Joint Account");
		assert_eq!(format!("{id:?}"), "CustomerId(\"Joint Account\")");
	}

	#[test]
	fn consumer_keys_must_be_a_single_path_component() {
		assert!(matches!(
			ConsumerKey::new("../escape"),
			Err(IdentifierError::Unprintable { kind: "consumer key", .. })
		));
		assert!(ConsumerKey::new("a\\b").is_err());
		assert!(ConsumerKey::new("..").is_err());
		assert!(ConsumerKey::new("a\u{0}b").is_err());
		assert!(matches!(ConsumerKey::new("a b"), Err(IdentifierError::Whitespace { .. })));

		ConsumerKey::new("0123456789abcdef0123456789abcdef").expect("Hex key should be valid.");
	}

	#[test]
	fn deserialization_runs_the_same_checks() {
		let id: CustomerId =
			serde_json::from_str("\"C-42\"").expect("Customer id should deserialize.");

		assert_eq!(id.as_ref(), "C-42");
		assert!(serde_json::from_str::<ConsumerKey>("\"with space\"").is_err());
	}

	#[test]
	fn length_is_bounded() {
		CustomerId::new("a".repeat(MAX_LEN)).expect("Exact length should succeed.");

		assert_eq!(
			ConsumerKey::new("a".repeat(MAX_LEN + 1)),
			Err(IdentifierError::TooLong { kind: "consumer key", max: MAX_LEN })
		);
	}

	#[test]
	fn maps_can_be_queried_by_str() {
		let map = HashMap::from([(
			CustomerId::new("C1").expect("Customer id should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("C1"), Some(&7));
	}
}
