//! Command-line and local HTTP front end for the E*TRADE REST API: OAuth 1.0a customer sessions,
//! an on-disk credential cache, and thin JSON adapters over the upstream endpoints.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod paging;
pub mod server;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and fixtures for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// std
	use std::path::Path;
	// self
	use crate::{
		auth::CustomerId,
		config::{ConfigFolder, ConfigurationStore, CustomerProfile},
		endpoint::{EndpointConfig, Endpoints},
		flows::SessionManager,
		http::ReqwestHttpClient,
		store::{CredentialStore, FileCredentialStore},
	};

	/// Consumer key used by [`profile_fixture`].
	pub const TEST_CONSUMER_KEY: &str = "K1";
	/// Consumer secret used by [`profile_fixture`].
	pub const TEST_CONSUMER_SECRET: &str = "S1";

	/// Builds the HTTP client used across tests.
	pub fn test_http_client() -> ReqwestHttpClient {
		ReqwestHttpClient::new().expect("Failed to build Reqwest client for tests.")
	}

	/// Endpoint set rooted at a mock server: production under `/prod`, sandbox under `/sandbox`,
	/// and the authorization page at `/authorize`.
	pub fn mock_endpoints(base: &str) -> EndpointConfig {
		let base = base.trim_end_matches('/');
		let authorize = format!("{base}/authorize");
		let production = Endpoints::new(&format!("{base}/prod"), &authorize)
			.expect("Mock production endpoints should be valid.");
		let sandbox = Endpoints::new(&format!("{base}/sandbox"), &authorize)
			.expect("Mock sandbox endpoints should be valid.");

		EndpointConfig::new(production, sandbox)
	}

	/// Profile bound to [`TEST_CONSUMER_KEY`] and [`TEST_CONSUMER_SECRET`].
	pub fn profile_fixture(production: bool) -> CustomerProfile {
		CustomerProfile::new("Test Customer", production, TEST_CONSUMER_KEY, TEST_CONSUMER_SECRET)
	}

	/// Configuration holding a single customer `C1` with [`profile_fixture`].
	pub fn config_fixture(production: bool) -> ConfigurationStore {
		ConfigurationStore::from_profiles([(
			CustomerId::new("C1").expect("Customer fixture should be valid."),
			profile_fixture(production),
		)])
	}

	/// Session manager over a file-backed cache in `root` and a mock upstream at `base`.
	pub fn build_test_manager(
		root: &Path,
		config: ConfigurationStore,
		base: &str,
	) -> (SessionManager, Arc<FileCredentialStore>) {
		let store = Arc::new(FileCredentialStore::new(ConfigFolder::new(root)));
		let backend: Arc<dyn CredentialStore> = store.clone();
		let manager =
			SessionManager::new(config, backend, mock_endpoints(base), test_http_client());

		(manager, store)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
// Only the binary reports through `color-eyre`.
use color_eyre as _;
#[cfg(test)] use {httpmock as _, tower as _};
