//! Local HTTP surface: the same operations as the CLI, one route per adapter.

pub mod login;

pub use login::*;

// std
use std::{net::SocketAddr, time::Duration as StdDuration};
// crates.io
use axum::{
	Json, Router,
	body::Bytes,
	extract::{Path, Query, RawQuery, State, rejection::QueryRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::get,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
// self
use crate::{
	_prelude::*,
	api::{
		self, AlertQuery, OptionChainQuery, OptionExpiryType, OrderQuery, PortfolioQuery,
		QuoteDetail, TransactionQuery,
	},
	client::AuthorizedClient,
	error::TransportError,
	flows::{NonInteractive, SessionManager},
	http::Deadline,
};

/// Default listen address.
pub const DEFAULT_ADDR: &str = "127.0.0.1:8888";

/// Server knobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServerConfig {
	/// Deadline applied to the upstream work of each inbound request; `None` waits forever.
	pub request_timeout: Option<StdDuration>,
	/// How long a started login waits for its verification code.
	pub verify_timeout: StdDuration,
}
impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			request_timeout: Some(StdDuration::from_secs(60)),
			verify_timeout: StdDuration::from_secs(600),
		}
	}
}

#[derive(Clone, Debug)]
struct AppState {
	manager: SessionManager,
	logins: LoginCoordinator,
	config: ServerConfig,
}
impl AppState {
	fn deadline(&self) -> Deadline {
		Deadline::maybe_after(self.config.request_timeout)
	}

	/// Memoized client for `customer_id`, evicting it when the upstream rejects its token.
	async fn call<F, Fut>(&self, customer_id: &str, adapter: F) -> Result<Json<Value>, ApiError>
	where
		F: FnOnce(AuthorizedClient) -> Fut,
		Fut: Future<Output = Result<Value>>,
	{
		let deadline = self.deadline();
		let client = self.manager.client(customer_id, &NonInteractive, deadline).await?;

		match adapter(client.with_deadline(deadline)).await {
			Ok(value) => Ok(Json(value)),
			Err(e) => {
				if e.is_auth_failed() && self.manager.evict(customer_id).is_some() {
					tracing::info!(customer = %customer_id, "Evicted client after its token was rejected.");
				}

				Err(e.into())
			},
		}
	}

	/// Like [`Self::call`], resolving `account_id` to its key before running `adapter`.
	async fn call_account<F, Fut>(
		&self,
		customer_id: &str,
		account_id: String,
		adapter: F,
	) -> Result<Json<Value>, ApiError>
	where
		F: FnOnce(AuthorizedClient, String) -> Fut,
		Fut: Future<Output = Result<Value>>,
	{
		self.call(customer_id, |client| async move {
			let account_id_key = api::account_id_key(&client, &account_id).await?;

			adapter(client, account_id_key).await
		})
		.await
	}
}

/// Error envelope: `{"status":"error","error":"..."}`.
///
/// Unknown customers answer `404`; every other failure answers `500`.
#[derive(Debug)]
pub struct ApiError(pub Error);
impl From<Error> for ApiError {
	fn from(e: Error) -> Self {
		Self(e)
	}
}
impl From<QueryRejection> for ApiError {
	fn from(rejection: QueryRejection) -> Self {
		Self(Error::invalid_argument(rejection.body_text()))
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = if self.0.is_not_found() {
			StatusCode::NOT_FOUND
		} else {
			StatusCode::INTERNAL_SERVER_ERROR
		};

		tracing::warn!(status = status.as_u16(), error = %self.0, "Request failed.");

		(status, Json(json!({ "status": "error", "error": self.0.to_string() }))).into_response()
	}
}

#[derive(Debug, Default, Deserialize)]
struct BalanceParams {
	#[serde(rename = "realTimeNAV")]
	real_time_nav: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteParams {
	symbol: String,
	detail: Option<QuoteDetail>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LookupParams {
	search: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct OptionExpireParams {
	symbol: String,
	expiry_type: Option<OptionExpiryType>,
}

/// Builds the router over `manager`.
pub fn router(manager: SessionManager, config: ServerConfig) -> Router {
	let state = AppState { manager, logins: LoginCoordinator::default(), config };

	Router::new()
		.route("/customers", get(list_customers))
		.route("/customers/{customer_id}/auth", axum::routing::post(login).delete(logout))
		.route("/customers/{customer_id}/accounts", get(list_accounts))
		.route("/customers/{customer_id}/accounts/{account_id}/balance", get(account_balance))
		.route("/customers/{customer_id}/accounts/{account_id}/portfolio", get(view_portfolio))
		.route(
			"/customers/{customer_id}/accounts/{account_id}/transactions",
			get(list_transactions),
		)
		.route(
			"/customers/{customer_id}/accounts/{account_id}/transactions/{transaction_id}",
			get(transaction_details),
		)
		.route("/customers/{customer_id}/accounts/{account_id}/orders", get(list_orders))
		.route("/customers/{customer_id}/alerts", get(list_alerts))
		.route("/customers/{customer_id}/alerts/{alert_id}", get(alert_details).delete(delete_alert))
		.route("/customers/{customer_id}/market/quote", get(quote))
		.route("/customers/{customer_id}/market/lookup", get(lookup))
		.route("/customers/{customer_id}/market/optionchains", get(option_chains))
		.route("/customers/{customer_id}/market/optionexpire", get(option_expire))
		.with_state(state)
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(addr: SocketAddr, manager: SessionManager, config: ServerConfig) -> Result<()> {
	let listener = TcpListener::bind(addr).await.map_err(TransportError::Io)?;
	let local = listener.local_addr().map_err(TransportError::Io)?;

	tracing::info!(addr = %local, customers = manager.config().len(), "Server listening.");

	axum::serve(listener, router(manager, config))
		.with_graceful_shutdown(shutdown_signal())
		.await
		.map_err(TransportError::Io)?;

	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::warn!(error = %e, "Failed to listen for Ctrl-C.");
	}

	tracing::info!("Server shutting down.");
}

async fn list_customers(State(state): State<AppState>) -> Json<Value> {
	Json(json!({ "customers": state.manager.config().list() }))
}

async fn login(
	State(state): State<AppState>,
	Path(customer_id): Path<String>,
	RawQuery(query): RawQuery,
	body: Bytes,
) -> Result<Json<LoginStatus>, ApiError> {
	let deadline = state.deadline();
	let status = match verify_code(query.as_deref(), &body) {
		Some(code) => state.logins.finish(&state.manager, &customer_id, &code, deadline).await?,
		None =>
			state
				.logins
				.begin(&state.manager, &customer_id, deadline, state.config.verify_timeout)
				.await?,
	};

	Ok(Json(status))
}

async fn logout(
	State(state): State<AppState>,
	Path(customer_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
	state.logins.logout(&state.manager, &customer_id).await?;

	Ok(Json(json!({ "status": "success" })))
}

async fn list_accounts(
	State(state): State<AppState>,
	Path(customer_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
	state.call(&customer_id, |client| async move { api::list_accounts(&client).await }).await
}

async fn account_balance(
	State(state): State<AppState>,
	Path((customer_id, account_id)): Path<(String, String)>,
	params: Result<Query<BalanceParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
	let Query(params) = params?;
	let real_time_nav = params.real_time_nav.unwrap_or(true);

	state
		.call_account(&customer_id, account_id, |client, account_id_key| async move {
			api::account_balance(&client, &account_id_key, real_time_nav).await
		})
		.await
}

async fn view_portfolio(
	State(state): State<AppState>,
	Path((customer_id, account_id)): Path<(String, String)>,
	query: Result<Query<PortfolioQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
	let Query(query) = query?;

	state
		.call_account(&customer_id, account_id, |client, account_id_key| async move {
			api::view_portfolio(&client, &account_id_key, &query).await
		})
		.await
}

async fn list_transactions(
	State(state): State<AppState>,
	Path((customer_id, account_id)): Path<(String, String)>,
	query: Result<Query<TransactionQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
	let Query(query) = query?;

	state
		.call_account(&customer_id, account_id, |client, account_id_key| async move {
			api::list_transactions(&client, &account_id_key, &query).await
		})
		.await
}

async fn transaction_details(
	State(state): State<AppState>,
	Path((customer_id, account_id, transaction_id)): Path<(String, String, String)>,
) -> Result<Json<Value>, ApiError> {
	state
		.call_account(&customer_id, account_id, |client, account_id_key| async move {
			api::transaction_details(&client, &account_id_key, &transaction_id).await
		})
		.await
}

async fn list_orders(
	State(state): State<AppState>,
	Path((customer_id, account_id)): Path<(String, String)>,
	query: Result<Query<OrderQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
	let Query(query) = query?;

	state
		.call_account(&customer_id, account_id, |client, account_id_key| async move {
			api::list_orders(&client, &account_id_key, &query).await
		})
		.await
}

async fn list_alerts(
	State(state): State<AppState>,
	Path(customer_id): Path<String>,
	query: Result<Query<AlertQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
	let Query(query) = query?;

	state.call(&customer_id, |client| async move { api::list_alerts(&client, &query).await }).await
}

async fn alert_details(
	State(state): State<AppState>,
	Path((customer_id, alert_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
	state
		.call(&customer_id, |client| async move { api::alert_details(&client, &alert_id).await })
		.await
}

async fn delete_alert(
	State(state): State<AppState>,
	Path((customer_id, alert_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
	state
		.call(&customer_id, |client| async move { api::delete_alerts(&client, &[alert_id]).await })
		.await
}

async fn quote(
	State(state): State<AppState>,
	Path(customer_id): Path<String>,
	params: Result<Query<QuoteParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
	let Query(params) = params?;

	state
		.call(&customer_id, |client| async move {
			api::get_quotes(&client, &[params.symbol], params.detail).await
		})
		.await
}

async fn lookup(
	State(state): State<AppState>,
	Path(customer_id): Path<String>,
	params: Result<Query<LookupParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
	let Query(params) = params?;

	state.call(&customer_id, |client| async move { api::lookup(&client, &params.search).await }).await
}

async fn option_chains(
	State(state): State<AppState>,
	Path(customer_id): Path<String>,
	query: Result<Query<OptionChainQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
	let Query(query) = query?;

	state
		.call(&customer_id, |client| async move { api::option_chains(&client, &query).await })
		.await
}

async fn option_expire(
	State(state): State<AppState>,
	Path(customer_id): Path<String>,
	params: Result<Query<OptionExpireParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
	let Query(params) = params?;

	state
		.call(&customer_id, |client| async move {
			api::option_expire_dates(&client, &params.symbol, params.expiry_type).await
		})
		.await
}

/// `verifyCode` from the form body, falling back to the query string.
fn verify_code(query: Option<&str>, body: &[u8]) -> Option<String> {
	let find = |raw: &[u8]| {
		url::form_urlencoded::parse(raw)
			.find(|(key, _)| key == "verifyCode")
			.map(|(_, value)| value.into_owned())
	};

	find(body).or_else(|| query.and_then(|query| find(query.as_bytes())))
}
