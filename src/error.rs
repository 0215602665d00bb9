//! Crate-level error types shared across the session manager, transports, and stores.

// std
use std::path::PathBuf;
// self
use crate::{_prelude::*, auth::IdentifierError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential cache failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeouts).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Customer identifier is not present in the configuration store.
	#[error("Customer `{customer_id}` is not configured.")]
	NotFound {
		/// Identifier that failed the lookup.
		customer_id: String,
	},
	/// Upstream rejected the access credentials.
	#[error("Authentication failed: {reason}.")]
	AuthFailed {
		/// Upstream- or crate-supplied reason string.
		reason: String,
	},
	/// Upstream answered with a non-success status or an in-body error envelope.
	#[error("Upstream request failed: {message}.")]
	Upstream {
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Upstream message or status line.
		message: String,
	},
	/// Upstream rejected the verification code; the request token pair is spent.
	#[error("Verification code was rejected: {reason}.")]
	InvalidCode {
		/// Upstream- or crate-supplied reason string.
		reason: String,
	},
	/// The human supplied an empty verification code or abandoned the login.
	#[error("No verification code was provided.")]
	UserAbort,
	/// Request-scoped deadline elapsed before the upstream answered.
	#[error("Request was cancelled because its deadline elapsed.")]
	Cancelled,
	/// A verification code arrived for a customer without a pending login.
	#[error("No login is pending for customer `{customer_id}`.")]
	LoginNotStarted {
		/// Identifier of the customer.
		customer_id: String,
	},
	/// Caller-supplied argument failed validation.
	#[error("Invalid argument: {message}.")]
	InvalidArgument {
		/// Description of the rejected value.
		message: String,
	},
}
impl Error {
	/// Returns `true` when the failure means the cached access token is no longer usable.
	pub fn is_auth_failed(&self) -> bool {
		matches!(self, Self::AuthFailed { .. })
	}

	/// Returns `true` when the failure is an unknown customer.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. })
	}

	/// Stable snake-case label of the variant, used for log fields and metric labels.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Storage(_) => "storage",
			Self::Config(_) => "config",
			Self::Transport(_) => "transport",
			Self::NotFound { .. } => "not_found",
			Self::AuthFailed { .. } => "auth_failed",
			Self::Upstream { .. } => "upstream",
			Self::InvalidCode { .. } => "invalid_code",
			Self::UserAbort => "user_abort",
			Self::Cancelled => "cancelled",
			Self::LoginNotStarted { .. } => "login_not_started",
			Self::InvalidArgument { .. } => "invalid_argument",
		}
	}

	/// Operator hint appended to human-facing error messages.
	pub fn hint(&self) -> Option<&'static str> {
		match self {
			Self::AuthFailed { .. } =>
				Some("please authenticate with the 'auth login' command first"),
			Self::NotFound { .. } => Some("run the 'cfg list' command to see configured customers"),
			Self::Config(ConfigError::Io { .. } | ConfigError::Parse { .. }) =>
				Some("run the 'cfg create' command to write a configuration template"),
			_ => None,
		}
	}

	pub(crate) fn auth_failed(reason: impl Into<String>) -> Self {
		Self::AuthFailed { reason: reason.into() }
	}

	pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
		Self::InvalidArgument { message: message.into() }
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Configuration file could not be read or written.
	#[error("Configuration file {} could not be accessed.", path.display())]
	Io {
		/// File that failed.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Configuration file is not valid JSON for the customer map.
	#[error("Configuration file {} is malformed at `{}`.", path.display(), source.path())]
	Parse {
		/// File that failed.
		path: PathBuf,
		/// Structured parsing failure with the JSON path of the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Refused to overwrite an existing configuration file.
	#[error("Configuration file {} already exists.", path.display())]
	AlreadyExists {
		/// File that already exists.
		path: PathBuf,
	},
	/// Customer profile has no consumer secret.
	#[error("Consumer secret cannot be empty.")]
	EmptyConsumerSecret,
	/// No home directory could be determined for the current user.
	#[error("Unable to determine the home directory of the current user.")]
	MissingHomeDirectory,
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Endpoint URL cannot be parsed.
	#[error("Endpoint URL `{url}` is invalid.")]
	InvalidEndpoint {
		/// Offending URL string.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint URL uses something other than HTTP or HTTPS.
	#[error("Endpoint URL `{url}` must use http or https.")]
	UnsupportedScheme {
		/// Offending URL string.
		url: String,
	},
	/// Customer profile carries an invalid identifier.
	#[error(transparent)]
	InvalidIdentifier(#[from] IdentifierError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the upstream API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the upstream API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
