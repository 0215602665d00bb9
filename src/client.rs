//! Authorized API client that signs every request with a bound consumer and access pair.

// crates.io
use reqwest::{
	Method,
	header::{ACCEPT, AUTHORIZATION},
};
// self
use crate::{
	_prelude::*,
	auth::TokenPair,
	endpoint::Endpoints,
	http::{Deadline, HttpResponse, ReqwestHttpClient},
	oauth::Signer,
};

#[derive(Debug)]
struct ClientInner {
	http: ReqwestHttpClient,
	endpoints: Endpoints,
	production: bool,
	signer: Signer,
}

/// Immutable, cheaply cloneable client bound to one customer's credentials.
///
/// The client owns no mutable state beyond the shared connection pool, so one instance can be
/// used from many tasks at once. Per-call deadlines are attached with
/// [`AuthorizedClient::with_deadline`], which returns a handle sharing the same binding.
#[derive(Clone, Debug)]
pub struct AuthorizedClient {
	inner: Arc<ClientInner>,
	deadline: Deadline,
}
impl AuthorizedClient {
	pub(crate) fn new(
		http: ReqwestHttpClient,
		endpoints: Endpoints,
		production: bool,
		signer: Signer,
	) -> Self {
		Self {
			inner: Arc::new(ClientInner { http, endpoints, production, signer }),
			deadline: Deadline::none(),
		}
	}

	/// Handle that applies `deadline` to every call.
	pub fn with_deadline(&self, deadline: Deadline) -> Self {
		Self { inner: self.inner.clone(), deadline }
	}

	/// Returns `true` when both handles share the same binding.
	pub fn ptr_eq(a: &Self, b: &Self) -> bool {
		Arc::ptr_eq(&a.inner, &b.inner)
	}

	/// Whether the client targets production.
	pub fn production(&self) -> bool {
		self.inner.production
	}

	/// API base URL the client targets.
	pub fn api_base(&self) -> &Url {
		self.inner.endpoints.api_base()
	}

	/// Access pair the client signs with.
	pub fn access_token(&self) -> Option<&TokenPair> {
		self.inner.signer.token()
	}

	/// `GET path`, returning the body bytes exactly as received.
	pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<u8>> {
		self.call(Method::GET, path, query).await
	}

	/// `DELETE path`, returning the body bytes exactly as received.
	pub async fn delete(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<u8>> {
		self.call(Method::DELETE, path, query).await
	}

	async fn call(&self, method: Method, path: &str, query: &[(&str, String)]) -> Result<Vec<u8>> {
		let mut url = self.inner.endpoints.join(path)?;

		if !query.is_empty() {
			url.query_pairs_mut().extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
		}

		let header = self.inner.signer.authorization_header(&method, &url, &[], &[]);
		let request = self
			.inner
			.http
			.request(method, url)
			.header(AUTHORIZATION, header)
			.header(ACCEPT, "application/json");
		let response = self.inner.http.send(request, self.deadline).await?;

		classify(response)
	}
}

fn classify(response: HttpResponse) -> Result<Vec<u8>> {
	match response.status {
		200 => Ok(response.body),
		401 => Err(Error::auth_failed(response.upstream_message())),
		_ if response.is_token_problem() => Err(Error::auth_failed(response.upstream_message())),
		status => Err(Error::Upstream { status: Some(status), message: response.upstream_message() }),
	}
}
