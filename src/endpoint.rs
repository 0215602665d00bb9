//! Upstream URL sets for the production and sandbox environments.
//!
//! Base URLs are configuration rather than constants: the defaults point at the public
//! E*TRADE hosts and every URL can be overridden (for example to target a local mock).

// self
use crate::{_prelude::*, error::ConfigError};

/// Default production API base.
pub const PRODUCTION_API_BASE: &str = "https://api.etrade.com";
/// Default sandbox API base.
pub const SANDBOX_API_BASE: &str = "https://apisb.etrade.com";
/// Default page that displays verification codes.
pub const AUTHORIZE_URL: &str = "https://us.etrade.com/e/t/etws/authorize";

/// URLs for one upstream environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
	api_base: Url,
	authorize: Url,
}
impl Endpoints {
	/// Validates and wraps an API base and authorization page.
	pub fn new(api_base: &str, authorize: &str) -> Result<Self, ConfigError> {
		Ok(Self { api_base: parse_http_url(api_base)?, authorize: parse_http_url(authorize)? })
	}

	/// Default production URLs.
	pub fn production() -> Result<Self, ConfigError> {
		Self::new(PRODUCTION_API_BASE, AUTHORIZE_URL)
	}

	/// Default sandbox URLs.
	pub fn sandbox() -> Result<Self, ConfigError> {
		Self::new(SANDBOX_API_BASE, AUTHORIZE_URL)
	}

	/// API base URL.
	pub fn api_base(&self) -> &Url {
		&self.api_base
	}

	/// `POST {base}/oauth/request_token`.
	pub fn request_token(&self) -> Result<Url, ConfigError> {
		self.join("/oauth/request_token")
	}

	/// `POST {base}/oauth/access_token`.
	pub fn access_token(&self) -> Result<Url, ConfigError> {
		self.join("/oauth/access_token")
	}

	/// `GET {base}/oauth/renew_access_token`.
	pub fn renew_access_token(&self) -> Result<Url, ConfigError> {
		self.join("/oauth/renew_access_token")
	}

	/// Authorization page for a freshly issued request token.
	pub fn authorize_url(&self, consumer_key: &str, request_token: &str) -> Url {
		let mut url = self.authorize.clone();

		url.query_pairs_mut().append_pair("key", consumer_key).append_pair("token", request_token);

		url
	}

	/// Resolves an API path such as `/v1/accounts/list?x=1` against the base URL.
	///
	/// Any path prefix on the base URL is preserved.
	pub fn join(&self, path: &str) -> Result<Url, ConfigError> {
		let raw = format!(
			"{}/{}",
			self.api_base.as_str().trim_end_matches('/'),
			path.trim_start_matches('/')
		);

		Url::parse(&raw).map_err(|source| ConfigError::InvalidEndpoint { url: raw, source })
	}
}

/// Production and sandbox URL sets; a profile's `production` flag selects between them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointConfig {
	production: Endpoints,
	sandbox: Endpoints,
}
impl EndpointConfig {
	/// Pairs explicit production and sandbox URL sets.
	pub fn new(production: Endpoints, sandbox: Endpoints) -> Self {
		Self { production, sandbox }
	}

	/// Public E*TRADE hosts.
	pub fn defaults() -> Result<Self, ConfigError> {
		Ok(Self::new(Endpoints::production()?, Endpoints::sandbox()?))
	}

	/// Applies optional overrides on top of the defaults.
	pub fn with_overrides(
		production_api_base: Option<&str>,
		sandbox_api_base: Option<&str>,
		authorize_url: Option<&str>,
	) -> Result<Self, ConfigError> {
		let authorize = authorize_url.unwrap_or(AUTHORIZE_URL);
		let production =
			Endpoints::new(production_api_base.unwrap_or(PRODUCTION_API_BASE), authorize)?;
		let sandbox = Endpoints::new(sandbox_api_base.unwrap_or(SANDBOX_API_BASE), authorize)?;

		Ok(Self::new(production, sandbox))
	}

	/// URL set for the requested environment.
	pub fn select(&self, production: bool) -> &Endpoints {
		if production { &self.production } else { &self.sandbox }
	}
}

fn parse_http_url(raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw)
		.map_err(|source| ConfigError::InvalidEndpoint { url: raw.to_owned(), source })?;

	if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
		return Err(ConfigError::UnsupportedScheme { url: raw.to_owned() });
	}

	Ok(url)
}
