//! Customer session manager: resolve a profile, renew the cached token, fall back to
//! interactive authorization, and persist what was issued.

pub mod registry;
pub mod verifier;

mod common;

pub use registry::*;
pub use verifier::*;

// self
use crate::{
	_prelude::*,
	auth::{CachedCredentials, ConsumerKey, CustomerId, TokenPair},
	client::AuthorizedClient,
	config::{ConfigurationStore, CustomerProfile},
	endpoint::EndpointConfig,
	flows::common::FlowGuards,
	http::{Deadline, ReqwestHttpClient},
	oauth::OAuthSession,
	obs::{self, FlowKind, FlowSpan},
	store::CredentialStore,
};

/// Composes the configuration store, credential cache, and OAuth sessions.
///
/// The manager is cheap to clone; clones share the registry, the per-customer guards, and the
/// connection pool. CLI callers use [`SessionManager::obtain_client`] once per invocation; the
/// server uses the memoizing [`SessionManager::client`].
#[derive(Clone)]
pub struct SessionManager {
	config: Arc<ConfigurationStore>,
	store: Arc<dyn CredentialStore>,
	endpoints: EndpointConfig,
	http: ReqwestHttpClient,
	registry: ClientRegistry,
	guards: FlowGuards,
}
impl SessionManager {
	/// Creates a manager over a loaded configuration and a credential store.
	pub fn new(
		config: ConfigurationStore,
		store: Arc<dyn CredentialStore>,
		endpoints: EndpointConfig,
		http: ReqwestHttpClient,
	) -> Self {
		Self {
			config: Arc::new(config),
			store,
			endpoints,
			http,
			registry: ClientRegistry::default(),
			guards: FlowGuards::default(),
		}
	}

	/// Loaded configuration.
	pub fn config(&self) -> &ConfigurationStore {
		&self.config
	}

	/// Memoized clients (server mode).
	pub fn registry(&self) -> &ClientRegistry {
		&self.registry
	}

	/// Returns an authorized client for `customer_id`, renewing or re-authorizing as needed.
	///
	/// The cached token is renewed first. Only [`Error::AuthFailed`] from renewal enters the
	/// interactive branch (`begin`, code from `verifier`, `verify`, save); every other failure is
	/// returned unchanged and leaves the cache alone. A failed save after a successful `verify`
	/// is logged and the client is still returned.
	pub async fn obtain_client(
		&self,
		customer_id: &str,
		verifier: &dyn VerifierSource,
		deadline: Deadline,
	) -> Result<AuthorizedClient> {
		let span = FlowSpan::new(FlowKind::Obtain, "obtain_client").with_customer(customer_id);

		obs::observe(span, self.obtain_inner(customer_id, verifier, deadline)).await
	}

	async fn obtain_inner(
		&self,
		customer_id: &str,
		verifier: &dyn VerifierSource,
		deadline: Deadline,
	) -> Result<AuthorizedClient> {
		let (customer_id, profile) = self.resolve(customer_id)?;
		let consumer_key = profile.consumer_key()?;
		let consumer_secret = profile.consumer_secret()?.clone();
		let cached = self.store.load(&consumer_key).await?;
		let session = OAuthSession::new(
			self.http.clone(),
			&self.endpoints,
			profile.production,
			consumer_key.clone(),
			consumer_secret,
		)
		.with_deadline(deadline);

		if let Some(pair) = cached.token_pair() {
			match session.renew(pair.clone()).await {
				Ok(client) => {
					if let Some(rotated) = client.access_token().filter(|issued| **issued != pair) {
						self.persist(&consumer_key, rotated.clone()).await;
					}

					return Ok(client);
				},
				Err(e) if e.is_auth_failed() => {
					tracing::info!(customer = %customer_id, error = %e, "Cached access token was rejected.");
				},
				Err(e) => return Err(e),
			}
		}
		if !verifier.interactive() {
			return Err(Error::auth_failed(format!(
				"customer `{customer_id}` has no usable access token"
			)));
		}

		let pending = session.begin().await?;
		let verification = verifier.verification_code(&customer_id, &pending.authorize_url).await?;
		let code = verification.code.trim();

		if code.is_empty() {
			return Err(Error::UserAbort);
		}

		let session = match verification.deadline {
			Some(deadline) => session.with_deadline(deadline),
			None => session,
		};
		let access = session.verify(&pending.request, code).await?;

		self.persist(&consumer_key, access.clone()).await;

		tracing::info!(customer = %customer_id, "Customer authorized.");

		Ok(session.authorized_client(access))
	}

	/// Memoizing variant of [`SessionManager::obtain_client`] for long-running servers.
	///
	/// Concurrent first calls for the same customer are serialized, so only one of them talks to
	/// the upstream; later calls return the memoized client without any upstream traffic.
	pub async fn client(
		&self,
		customer_id: &str,
		verifier: &dyn VerifierSource,
		deadline: Deadline,
	) -> Result<AuthorizedClient> {
		let (id, _) = self.resolve(customer_id)?;

		if let Some(client) = self.registry.get(&id) {
			return Ok(client);
		}

		let guard = self.guards.guard(&id);
		let _locked = guard.lock().await;

		if let Some(client) = self.registry.get(&id) {
			return Ok(client);
		}

		let client = self.obtain_client(&id, verifier, deadline).await?;

		self.registry.insert(id, client.clone());

		Ok(client)
	}

	/// Memoizes a client produced by an out-of-band login.
	///
	/// Callers hold the customer's [`SessionManager::guard`] so a concurrent logout cannot
	/// interleave.
	pub(crate) fn remember(&self, customer_id: CustomerId, client: AuthorizedClient) {
		self.registry.insert(customer_id, client);
	}

	/// Per-customer lock held by every flow that memoizes a client, persists credentials, or
	/// logs out.
	pub(crate) fn guard(&self, customer_id: &CustomerId) -> Arc<AsyncMutex<()>> {
		self.guards.guard(customer_id)
	}

	/// Drops the memoized client without touching the credential cache.
	pub fn evict(&self, customer_id: &str) -> Option<AuthorizedClient> {
		self.registry.release(customer_id)
	}

	/// Logout: drops the memoized client and removes the cached credentials.
	pub async fn release_client(&self, customer_id: &str) -> Result<()> {
		self.release_client_with(customer_id, |_| ()).await
	}

	/// Logout that also runs `on_locked` while the customer's guard is held.
	///
	/// Waits for an in-flight [`SessionManager::client`] call or server login, so neither can
	/// memoize a client after the logout returns.
	pub(crate) async fn release_client_with<F>(&self, customer_id: &str, on_locked: F) -> Result<()>
	where
		F: Send + FnOnce(&CustomerId),
	{
		let span = FlowSpan::new(FlowKind::Release, "release_client").with_customer(customer_id);

		obs::observe(span, async {
			let (customer_id, profile) = self.resolve(customer_id)?;
			let consumer_key = profile.consumer_key()?;
			let guard = self.guards.guard(&customer_id);
			let _locked = guard.lock().await;

			on_locked(&customer_id);
			self.registry.release(&customer_id);
			self.store.remove(&consumer_key).await?;

			tracing::info!(customer = %customer_id, "Customer credentials cleared.");

			Ok(())
		})
		.await
	}

	/// Logout for every configured customer.
	///
	/// Profiles whose consumer key is invalid cannot have a cache and are skipped.
	pub async fn release_all(&self) -> Result<()> {
		for (customer_id, profile) in self.config.iter() {
			let guard = self.guards.guard(customer_id);
			let _locked = guard.lock().await;

			self.registry.release(customer_id);

			match profile.consumer_key() {
				Ok(consumer_key) => self.store.remove(&consumer_key).await?,
				Err(e) => {
					tracing::debug!(customer = %customer_id, error = %e, "Skipping customer without a valid consumer key.");
				},
			}
		}

		Ok(())
	}

	/// Cached credentials for `customer_id`, without contacting the upstream.
	pub async fn cached_credentials(&self, customer_id: &str) -> Result<CachedCredentials> {
		let (_, profile) = self.resolve(customer_id)?;

		Ok(self.store.load(&profile.consumer_key()?).await?)
	}

	pub(crate) fn resolve(&self, customer_id: &str) -> Result<(CustomerId, &CustomerProfile)> {
		let profile = self.config.get(customer_id)?;
		let id = CustomerId::new(customer_id.trim())
			.map_err(|_| Error::NotFound { customer_id: customer_id.to_owned() })?;

		Ok((id, profile))
	}

	async fn persist(&self, consumer_key: &ConsumerKey, access: TokenPair) {
		let credentials = CachedCredentials::new(access, OffsetDateTime::now_utc());

		if let Err(e) = self.store.save(consumer_key, credentials).await {
			tracing::warn!(error = %e, "Failed to save credentials; the next run will re-authorize.");
		}
	}
}
impl Debug for SessionManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionManager")
			.field("customers", &self.config.len())
			.field("endpoints", &self.endpoints)
			.field("memoized", &self.registry.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{fs, io::Cursor, net::TcpListener as StdTcpListener, time::Duration as StdDuration};
	// crates.io
	use httpmock::prelude::*;
	// self
	use super::*;
	use crate::{_preludet::*, store::MemoryCredentialStore};

	const REQUEST_TOKEN_BODY: &str =
		"oauth_token=rt&oauth_token_secret=rs&oauth_callback_confirmed=true";

	fn consumer_key() -> ConsumerKey {
		ConsumerKey::new(TEST_CONSUMER_KEY).expect("Consumer key fixture should be valid.")
	}

	fn stdin_with(code: &str) -> LineVerifier<Cursor<Vec<u8>>, Vec<u8>> {
		LineVerifier::new(Cursor::new(format!("{code}\n").into_bytes()), Vec::new())
	}

	async fn seed(store: &dyn CredentialStore, token: &str, secret: &str) {
		store
			.save(
				&consumer_key(),
				CachedCredentials::new(TokenPair::new(token, secret), OffsetDateTime::now_utc()),
			)
			.await
			.expect("Seeding the credential cache should succeed.");
	}

	async fn cached_pair(store: &dyn CredentialStore) -> Option<(String, String)> {
		store
			.load(&consumer_key())
			.await
			.expect("Loading the credential cache should succeed.")
			.token_pair()
			.map(|pair| (pair.token.expose().to_owned(), pair.secret.expose().to_owned()))
	}

	fn unreachable_base() -> String {
		let listener =
			StdTcpListener::bind("127.0.0.1:0").expect("Ephemeral port should be available.");
		let port = listener.local_addr().expect("Listener should have an address.").port();

		drop(listener);

		format!("http://127.0.0.1:{port}")
	}

	#[tokio::test]
	async fn first_login_prompts_and_persists_the_access_pair() {
		let server = MockServer::start_async().await;
		let dir = tempfile::tempdir().expect("Temporary directory should be created.");
		let (manager, store) = build_test_manager(dir.path(), config_fixture(false), &server.base_url());
		let renew = server
			.mock_async(|when, then| {
				when.method(GET).path("/sandbox/oauth/renew_access_token");
				then.status(200).body("Access Token has been renewed");
			})
			.await;
		let begin = server
			.mock_async(|when, then| {
				when.method(POST).path("/sandbox/oauth/request_token");
				then.status(200).body(REQUEST_TOKEN_BODY);
			})
			.await;
		let verify = server
			.mock_async(|when, then| {
				when.method(POST).path("/sandbox/oauth/access_token");
				then.status(200).body("oauth_token=T&oauth_token_secret=S");
			})
			.await;
		let client = manager
			.obtain_client("C1", &stdin_with("V"), Deadline::none())
			.await
			.expect("First login should succeed.");

		renew.assert_calls_async(0).await;
		begin.assert_calls_async(1).await;
		verify.assert_calls_async(1).await;

		assert_eq!(client.access_token(), Some(&TokenPair::new("T", "S")));
		assert!(!client.production());
		assert!(dir.path().join(".etrade").join(".K1").is_file());
		assert_eq!(cached_pair(store.as_ref()).await, Some(("T".into(), "S".into())));
	}

	#[tokio::test]
	async fn cached_token_is_renewed_without_rewriting_the_cache() {
		let server = MockServer::start_async().await;
		let dir = tempfile::tempdir().expect("Temporary directory should be created.");
		let (manager, store) = build_test_manager(dir.path(), config_fixture(false), &server.base_url());

		seed(store.as_ref(), "T", "S").await;

		let before = fs::read(store.path_for(&consumer_key())).expect("Seeded file should exist.");
		let renew = server
			.mock_async(|when, then| {
				when.method(GET).path("/sandbox/oauth/renew_access_token");
				then.status(200).body("Access Token has been renewed");
			})
			.await;
		let begin = server
			.mock_async(|when, then| {
				when.method(POST).path("/sandbox/oauth/request_token");
				then.status(200).body(REQUEST_TOKEN_BODY);
			})
			.await;
		let client = manager
			.obtain_client("C1", &NonInteractive, Deadline::none())
			.await
			.expect("Renewal should succeed.");

		renew.assert_calls_async(1).await;
		begin.assert_calls_async(0).await;

		assert_eq!(client.access_token(), Some(&TokenPair::new("T", "S")));
		assert_eq!(
			fs::read(store.path_for(&consumer_key())).expect("Cache file should remain."),
			before
		);
	}

	#[tokio::test]
	async fn rejected_token_falls_through_to_interactive_authorization() {
		let server = MockServer::start_async().await;
		let dir = tempfile::tempdir().expect("Temporary directory should be created.");
		let (manager, store) = build_test_manager(dir.path(), config_fixture(false), &server.base_url());

		seed(store.as_ref(), "stale", "stale-secret").await;

		let renew = server
			.mock_async(|when, then| {
				when.method(GET).path("/sandbox/oauth/renew_access_token");
				then.status(401).body("oauth_problem=token_expired");
			})
			.await;
		let begin = server
			.mock_async(|when, then| {
				when.method(POST).path("/sandbox/oauth/request_token");
				then.status(200).body(REQUEST_TOKEN_BODY);
			})
			.await;
		let verify = server
			.mock_async(|when, then| {
				when.method(POST).path("/sandbox/oauth/access_token");
				then.status(200).body("oauth_token=T2&oauth_token_secret=S2");
			})
			.await;
		let client = manager
			.obtain_client("C1", &stdin_with("  V2  "), Deadline::none())
			.await
			.expect("Re-authorization should succeed.");

		renew.assert_calls_async(1).await;
		begin.assert_calls_async(1).await;
		verify.assert_calls_async(1).await;

		assert_eq!(client.access_token(), Some(&TokenPair::new("T2", "S2")));
		assert_eq!(cached_pair(store.as_ref()).await, Some(("T2".into(), "S2".into())));
	}

	#[tokio::test]
	async fn rejected_token_without_a_human_is_auth_failed() {
		let server = MockServer::start_async().await;
		let dir = tempfile::tempdir().expect("Temporary directory should be created.");
		let (manager, store) = build_test_manager(dir.path(), config_fixture(false), &server.base_url());

		seed(store.as_ref(), "stale", "stale-secret").await;

		server
			.mock_async(|when, then| {
				when.method(GET).path("/sandbox/oauth/renew_access_token");
				then.status(401).body("oauth_problem=token_rejected");
			})
			.await;

		let begin = server
			.mock_async(|when, then| {
				when.method(POST).path("/sandbox/oauth/request_token");
				then.status(200).body(REQUEST_TOKEN_BODY);
			})
			.await;
		let err = manager
			.obtain_client("C1", &NonInteractive, Deadline::none())
			.await
			.expect_err("Non-interactive callers cannot re-authorize.");

		assert!(err.is_auth_failed());
		assert!(err.hint().is_some_and(|hint| hint.contains("auth login")));

		begin.assert_calls_async(0).await;
	}

	#[tokio::test]
	async fn blank_verification_code_aborts_without_writing() {
		let server = MockServer::start_async().await;
		let dir = tempfile::tempdir().expect("Temporary directory should be created.");
		let (manager, store) = build_test_manager(dir.path(), config_fixture(false), &server.base_url());

		server
			.mock_async(|when, then| {
				when.method(POST).path("/sandbox/oauth/request_token");
				then.status(200).body(REQUEST_TOKEN_BODY);
			})
			.await;

		let verify = server
			.mock_async(|when, then| {
				when.method(POST).path("/sandbox/oauth/access_token");
				then.status(200).body("oauth_token=T&oauth_token_secret=S");
			})
			.await;
		let result = manager.obtain_client("C1", &stdin_with(" \t "), Deadline::none()).await;

		assert!(matches!(result, Err(Error::UserAbort)));

		verify.assert_calls_async(0).await;

		assert!(!store.path_for(&consumer_key()).exists());
	}

	#[tokio::test]
	async fn rejected_code_is_invalid_code() {
		let server = MockServer::start_async().await;
		let dir = tempfile::tempdir().expect("Temporary directory should be created.");
		let (manager, store) = build_test_manager(dir.path(), config_fixture(false), &server.base_url());

		server
			.mock_async(|when, then| {
				when.method(POST).path("/sandbox/oauth/request_token");
				then.status(200).body(REQUEST_TOKEN_BODY);
			})
			.await;
		server
			.mock_async(|when, then| {
				when.method(POST).path("/sandbox/oauth/access_token");
				then.status(401).body("oauth_problem=token_rejected");
			})
			.await;

		let result = manager.obtain_client("C1", &stdin_with("WRONG"), Deadline::none()).await;

		assert!(matches!(result, Err(Error::InvalidCode { .. })));
		assert_eq!(cached_pair(store.as_ref()).await, None);
	}

	#[tokio::test]
	async fn server_errors_during_renewal_are_not_escalated() {
		let server = MockServer::start_async().await;
		let dir = tempfile::tempdir().expect("Temporary directory should be created.");
		let (manager, store) = build_test_manager(dir.path(), config_fixture(false), &server.base_url());

		seed(store.as_ref(), "T", "S").await;

		server
			.mock_async(|when, then| {
				when.method(GET).path("/sandbox/oauth/renew_access_token");
				then.status(503).body("Service Unavailable");
			})
			.await;

		let begin = server
			.mock_async(|when, then| {
				when.method(POST).path("/sandbox/oauth/request_token");
				then.status(200).body(REQUEST_TOKEN_BODY);
			})
			.await;
		let result = manager.obtain_client("C1", &stdin_with("V"), Deadline::none()).await;

		assert!(matches!(result, Err(Error::Upstream { status: Some(503), .. })));

		begin.assert_calls_async(0).await;

		assert_eq!(cached_pair(store.as_ref()).await, Some(("T".into(), "S".into())));
	}

	#[tokio::test]
	async fn network_failure_during_renewal_keeps_the_cache() {
		let dir = tempfile::tempdir().expect("Temporary directory should be created.");
		let (manager, store) = build_test_manager(dir.path(), config_fixture(false), &unreachable_base());

		seed(store.as_ref(), "T", "S").await;

		let before = fs::read(store.path_for(&consumer_key())).expect("Seeded file should exist.");
		let result = manager.obtain_client("C1", &stdin_with("V"), Deadline::none()).await;

		assert!(matches!(result, Err(Error::Transport(_))));
		assert_eq!(
			fs::read(store.path_for(&consumer_key())).expect("Cache file should remain."),
			before
		);
	}

	#[tokio::test]
	async fn production_profiles_never_reach_sandbox_hosts() {
		let server = MockServer::start_async().await;
		let dir = tempfile::tempdir().expect("Temporary directory should be created.");
		let (manager, store) = build_test_manager(dir.path(), config_fixture(true), &server.base_url());

		seed(store.as_ref(), "T", "S").await;

		let production = server
			.mock_async(|when, then| {
				when.method(GET).path("/prod/oauth/renew_access_token");
				then.status(200).body("Access Token has been renewed");
			})
			.await;
		let sandbox = server
			.mock_async(|when, then| {
				when.method(GET).path("/sandbox/oauth/renew_access_token");
				then.status(200).body("Access Token has been renewed");
			})
			.await;
		let client = manager
			.obtain_client("C1", &NonInteractive, Deadline::none())
			.await
			.expect("Renewal should succeed.");

		production.assert_calls_async(1).await;
		sandbox.assert_calls_async(0).await;

		assert!(client.production());
		assert!(client.api_base().as_str().ends_with("/prod"));
	}

	#[tokio::test]
	async fn memoized_client_is_shared_and_renewed_once() {
		let server = MockServer::start_async().await;
		let dir = tempfile::tempdir().expect("Temporary directory should be created.");
		let (manager, store) = build_test_manager(dir.path(), config_fixture(false), &server.base_url());

		seed(store.as_ref(), "T", "S").await;

		let renew = server
			.mock_async(|when, then| {
				when.method(GET).path("/sandbox/oauth/renew_access_token");
				then.status(200).body("Access Token has been renewed");
			})
			.await;
		let (first, second) = tokio::join!(
			manager.client("C1", &NonInteractive, Deadline::none()),
			manager.client("C1", &NonInteractive, Deadline::none()),
		);
		let first = first.expect("First concurrent call should succeed.");
		let second = second.expect("Second concurrent call should succeed.");
		let third = manager
			.client("C1", &NonInteractive, Deadline::none())
			.await
			.expect("Memoized call should succeed.");

		renew.assert_calls_async(1).await;

		assert!(AuthorizedClient::ptr_eq(&first, &second));
		assert!(AuthorizedClient::ptr_eq(&first, &third));
		assert_eq!(manager.registry().len(), 1);
	}

	#[tokio::test]
	async fn logout_waits_for_an_inflight_client_and_stays_logged_out() {
		let server = MockServer::start_async().await;
		let dir = tempfile::tempdir().expect("Temporary directory should be created.");
		let (manager, store) = build_test_manager(dir.path(), config_fixture(false), &server.base_url());

		seed(store.as_ref(), "T", "S").await;

		let renew = server
			.mock_async(|when, then| {
				when.method(GET).path("/sandbox/oauth/renew_access_token");
				then.status(200)
					.delay(StdDuration::from_millis(400))
					.body("Access Token has been renewed");
			})
			.await;
		let (inflight, logout) = tokio::join!(
			manager.client("C1", &NonInteractive, Deadline::none()),
			async {
				tokio::time::sleep(StdDuration::from_millis(100)).await;

				manager.release_client("C1").await
			},
		);

		inflight.expect("The call that started before the logout should complete.");
		logout.expect("Logout should succeed.");

		assert!(manager.registry().is_empty());
		assert_eq!(cached_pair(store.as_ref()).await, None);

		let err = manager
			.client("C1", &NonInteractive, Deadline::none())
			.await
			.expect_err("A logged-out customer must not get a client back.");

		assert!(err.is_auth_failed());

		renew.assert_calls_async(1).await;
	}

	#[tokio::test]
	async fn logout_is_idempotent() {
		let dir = tempfile::tempdir().expect("Temporary directory should be created.");
		let (manager, store) = build_test_manager(dir.path(), config_fixture(false), &unreachable_base());

		seed(store.as_ref(), "T", "S").await;
		manager.release_client("C1").await.expect("First logout should succeed.");

		assert!(!store.path_for(&consumer_key()).exists());
		assert_eq!(cached_pair(store.as_ref()).await, None);

		manager.release_client("C1").await.expect("Second logout should also succeed.");
		manager.release_all().await.expect("Clearing everything should succeed.");

		assert!(manager.registry().is_empty());
	}

	#[tokio::test]
	async fn unknown_customers_are_not_found() {
		let dir = tempfile::tempdir().expect("Temporary directory should be created.");
		let (manager, _) = build_test_manager(dir.path(), config_fixture(false), &unreachable_base());
		let err = manager
			.obtain_client("C9", &NonInteractive, Deadline::none())
			.await
			.expect_err("Unknown customers must fail.");

		assert!(err.is_not_found());
		assert!(matches!(manager.release_client("C9").await, Err(Error::NotFound { .. })));
	}

	#[tokio::test]
	async fn empty_consumer_secret_fails_before_any_upstream_call() {
		let server = MockServer::start_async().await;
		let dir = tempfile::tempdir().expect("Temporary directory should be created.");
		let config = ConfigurationStore::from_profiles([(
			CustomerId::new("C1").expect("Customer fixture should be valid."),
			CustomerProfile::new("No secret", false, TEST_CONSUMER_KEY, ""),
		)]);
		let (manager, _) = build_test_manager(dir.path(), config, &server.base_url());
		let begin = server
			.mock_async(|when, then| {
				when.method(POST).path("/sandbox/oauth/request_token");
				then.status(200).body(REQUEST_TOKEN_BODY);
			})
			.await;
		let err = manager
			.obtain_client(" C1 ", &stdin_with("V"), Deadline::none())
			.await
			.expect_err("A profile without a consumer secret cannot authenticate.");

		assert!(matches!(err, Error::Config(crate::error::ConfigError::EmptyConsumerSecret)));

		begin.assert_calls_async(0).await;
	}

	#[tokio::test]
	async fn clearing_everything_empties_every_cache_entry() {
		let store = Arc::new(MemoryCredentialStore::default());
		let config = ConfigurationStore::from_profiles([
			(
				CustomerId::new("C1").expect("Customer fixture should be valid."),
				CustomerProfile::new("One", false, "K1", "S1"),
			),
			(
				CustomerId::new("C2").expect("Customer fixture should be valid."),
				CustomerProfile::new("Two", true, "K2", "S2"),
			),
			(
				CustomerId::new("C3").expect("Customer fixture should be valid."),
				CustomerProfile::new("Broken", false, "", "S3"),
			),
		]);
		let backend: Arc<dyn CredentialStore> = store.clone();
		let manager = SessionManager::new(
			config,
			backend,
			mock_endpoints(&unreachable_base()),
			test_http_client(),
		);

		for key in ["K1", "K2"] {
			store
				.save(
					&ConsumerKey::new(key).expect("Consumer key fixture should be valid."),
					CachedCredentials::new(TokenPair::new("T", "S"), OffsetDateTime::now_utc()),
				)
				.await
				.expect("Seeding should succeed.");
		}

		manager.release_all().await.expect("Clearing everything should succeed.");

		assert!(store.snapshot("K1").is_none());
		assert!(store.snapshot("K2").is_none());
		assert!(
			manager
				.cached_credentials("C2")
				.await
				.expect("Cache lookup should succeed.")
				.is_empty()
		);
	}
}
