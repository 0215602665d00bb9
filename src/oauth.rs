//! OAuth 1.0a session: `begin`, `verify`, and `renew` against the upstream token endpoints.
//!
//! A session is a stateless bundle of the production flag and the consumer credentials. It never
//! stores request or access tokens; callers pass them in and receive them back.

pub mod signer;

mod form;

pub use signer::Signer;

// crates.io
use reqwest::{
	Method,
	header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH},
};
// self
use crate::{
	_prelude::*,
	auth::{ConsumerKey, PendingAuthorization, RequestToken, Secret, TokenPair},
	client::AuthorizedClient,
	endpoint::{EndpointConfig, Endpoints},
	http::{Deadline, HttpResponse, ReqwestHttpClient},
	obs::{self, FlowKind, FlowSpan},
};

/// Stateless OAuth 1.0a helper bound to one consumer key and one environment.
#[derive(Clone, Debug)]
pub struct OAuthSession {
	http: ReqwestHttpClient,
	endpoints: Endpoints,
	production: bool,
	consumer_key: ConsumerKey,
	consumer_secret: Secret,
	deadline: Deadline,
}
impl OAuthSession {
	/// Creates a session; `production` selects the URL set from `endpoints`.
	pub fn new(
		http: ReqwestHttpClient,
		endpoints: &EndpointConfig,
		production: bool,
		consumer_key: ConsumerKey,
		consumer_secret: Secret,
	) -> Self {
		Self {
			http,
			endpoints: endpoints.select(production).clone(),
			production,
			consumer_key,
			consumer_secret,
			deadline: Deadline::none(),
		}
	}

	/// Applies a deadline to every call made through this session.
	pub fn with_deadline(mut self, deadline: Deadline) -> Self {
		self.deadline = deadline;

		self
	}

	/// Whether the session targets production.
	pub fn production(&self) -> bool {
		self.production
	}

	/// Consumer key bound to the session.
	pub fn consumer_key(&self) -> &ConsumerKey {
		&self.consumer_key
	}

	/// Obtains a request token and the authorization URL the human must visit.
	pub async fn begin(&self) -> Result<PendingAuthorization> {
		obs::observe(FlowSpan::new(FlowKind::Begin, "begin"), self.begin_inner()).await
	}

	async fn begin_inner(&self) -> Result<PendingAuthorization> {
		let url = self.endpoints.request_token()?;
		let response =
			self.send(Method::POST, &url, self.signer(), &[("oauth_callback", "oob")]).await?;

		if !response.is_ok() {
			return Err(upstream(&response));
		}

		let pair = form::token_pair(&response.body).ok_or_else(|| malformed(&response))?;
		let authorize_url = self.endpoints.authorize_url(&self.consumer_key, pair.token.expose());

		Ok(PendingAuthorization { request: RequestToken(pair), authorize_url })
	}

	/// Exchanges a request token and the human-entered code for access credentials.
	///
	/// A `400` or `401` answer means the code (or the request token) was rejected and surfaces
	/// as [`Error::InvalidCode`]; the request token is spent either way.
	pub async fn verify(&self, request: &RequestToken, code: &str) -> Result<TokenPair> {
		let span = FlowSpan::new(FlowKind::Verify, "verify");

		obs::observe(span, self.verify_inner(request, code)).await
	}

	async fn verify_inner(&self, request: &RequestToken, code: &str) -> Result<TokenPair> {
		let url = self.endpoints.access_token()?;
		let signer = self.signer().with_token(request.0.clone());
		let response = self.send(Method::POST, &url, signer, &[("oauth_verifier", code)]).await?;

		match response.status {
			200 => form::token_pair(&response.body).ok_or_else(|| malformed(&response)),
			400 | 401 => Err(Error::InvalidCode { reason: response.upstream_message() }),
			_ => Err(upstream(&response)),
		}
	}

	/// Reactivates an existing access token and returns a client bound to it.
	///
	/// Any `4xx` answer (or an `oauth_problem=token_*` body) is [`Error::AuthFailed`]. Transport
	/// failures and `5xx` answers are returned unchanged so callers never mistake an outage for
	/// a dead token. When the upstream returns a new pair the client is bound to the new pair.
	pub async fn renew(&self, access: TokenPair) -> Result<AuthorizedClient> {
		obs::observe(FlowSpan::new(FlowKind::Renew, "renew"), self.renew_inner(access)).await
	}

	async fn renew_inner(&self, access: TokenPair) -> Result<AuthorizedClient> {
		if access.token.is_empty() || access.secret.is_empty() {
			return Err(Error::auth_failed("no access token is cached"));
		}

		let url = self.endpoints.renew_access_token()?;
		let signer = self.signer().with_token(access.clone());
		let response = self.send(Method::GET, &url, signer, &[]).await?;

		if response.is_ok() {
			let pair = form::token_pair(&response.body).unwrap_or(access);

			return Ok(self.authorized_client(pair));
		}
		if (400..500).contains(&response.status) || response.is_token_problem() {
			return Err(Error::auth_failed(response.upstream_message()));
		}

		Err(upstream(&response))
	}

	/// Builds an authorized client from an access pair without contacting the upstream.
	pub fn authorized_client(&self, access: TokenPair) -> AuthorizedClient {
		AuthorizedClient::new(
			self.http.clone(),
			self.endpoints.clone(),
			self.production,
			self.signer().with_token(access),
		)
	}

	fn signer(&self) -> Signer {
		Signer::new(self.consumer_key.clone(), self.consumer_secret.clone())
	}

	async fn send(
		&self,
		method: Method,
		url: &Url,
		signer: Signer,
		protocol: &[(&str, &str)],
	) -> Result<HttpResponse> {
		let header = signer.authorization_header(&method, url, protocol, &[]);
		let mut request = self
			.http
			.request(method.clone(), url.clone())
			.header(AUTHORIZATION, header)
			.header(ACCEPT, "*/*");

		if method == Method::POST {
			request = request.header(CONTENT_LENGTH, "0");
		}

		self.http.send(request, self.deadline).await
	}
}

fn upstream(response: &HttpResponse) -> Error {
	Error::Upstream { status: Some(response.status), message: response.upstream_message() }
}

fn malformed(response: &HttpResponse) -> Error {
	Error::Upstream {
		status: Some(response.status),
		message: "token response is missing oauth_token or oauth_token_secret".into(),
	}
}
