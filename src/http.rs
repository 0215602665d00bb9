//! Shared HTTP transport and request-scoped deadlines.
//!
//! Every upstream call made by the crate flows through [`ReqwestHttpClient::send`], which
//! applies the caller's [`Deadline`] and converts transport failures into [`TransportError`].
//! One client (and therefore one connection pool) is shared by every session and authorized
//! client in the process.

// std
use std::{ops::Deref, time::Duration as StdDuration};
// crates.io
use reqwest::{RequestBuilder, redirect::Policy};
use tokio::time::Instant;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Status and raw body of an upstream response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Canonical reason phrase for the status, if any.
	pub reason: Option<&'static str>,
	/// Body bytes exactly as received.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Returns `true` for `200 OK`.
	pub fn is_ok(&self) -> bool {
		self.status == 200
	}

	/// Status line such as `401 Unauthorized`.
	pub fn status_line(&self) -> String {
		match self.reason {
			Some(reason) => format!("{} {reason}", self.status),
			None => self.status.to_string(),
		}
	}

	/// Returns `true` when the body reports an OAuth token problem.
	///
	/// The upstream sometimes answers a dead token with a non-401 status and an
	/// `oauth_problem=token_*` body.
	pub fn is_token_problem(&self) -> bool {
		self.oauth_problem().is_some_and(|problem| problem.starts_with("token_"))
	}

	/// Best-effort human-readable failure message.
	///
	/// Looks for a JSON `Error.message`, then an XML `<message>` element, then an OAuth
	/// `oauth_problem`, and falls back to the status line.
	pub fn upstream_message(&self) -> String {
		let detail = serde_json::from_slice::<serde_json::Value>(&self.body)
			.ok()
			.and_then(|json| {
				["/Error/message", "/error/message", "/message"]
					.iter()
					.find_map(|path| json.pointer(path).and_then(|v| v.as_str()).map(str::to_owned))
			})
			.or_else(|| xml_message(&self.body))
			.or_else(|| self.oauth_problem());

		match detail {
			Some(detail) if !detail.trim().is_empty() =>
				format!("{} ({})", self.status_line(), detail.trim()),
			_ => self.status_line(),
		}
	}

	fn oauth_problem(&self) -> Option<String> {
		url::form_urlencoded::parse(&self.body)
			.find(|(k, _)| k == "oauth_problem")
			.map(|(_, v)| v.into_owned())
	}
}

/// Optional point in time after which an upstream call is abandoned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);
impl Deadline {
	/// No deadline; calls wait indefinitely.
	pub const fn none() -> Self {
		Self(None)
	}

	/// Deadline `timeout` from now.
	pub fn after(timeout: StdDuration) -> Self {
		Self(Some(Instant::now() + timeout))
	}

	/// Deadline `timeout` from now, or none when `timeout` is `None`.
	pub fn maybe_after(timeout: Option<StdDuration>) -> Self {
		timeout.map(Self::after).unwrap_or_default()
	}

	/// Returns `true` once the deadline has passed.
	pub fn is_elapsed(&self) -> bool {
		self.0.is_some_and(|at| Instant::now() >= at)
	}

	/// Runs `fut`, failing with [`Error::Cancelled`] when the deadline passes first.
	pub async fn run<F, T>(self, fut: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		match self.0 {
			None => fut.await,
			Some(at) => tokio::time::timeout_at(at, fut).await.map_err(|_| Error::Cancelled)?,
		}
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Redirects are not followed; the upstream answers OAuth and API calls directly.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Builds the default client.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Sends `request` under `deadline` and reads the full body.
	pub async fn send(&self, request: RequestBuilder, deadline: Deadline) -> Result<HttpResponse> {
		let request = request.build().map_err(TransportError::from)?;

		tracing::debug!(method = %request.method(), url = %redact_query(request.url()), "Calling upstream.");

		deadline
			.run(async {
				let response = self.0.execute(request).await.map_err(TransportError::from)?;
				let status = response.status();
				let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

				Ok(HttpResponse {
					status: status.as_u16(),
					reason: status.canonical_reason(),
					body,
				})
			})
			.await
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

fn xml_message(body: &[u8]) -> Option<String> {
	let text = std::str::from_utf8(body).ok()?;
	let start = text.find("<message>")? + "<message>".len();
	let end = text[start..].find("</message>")? + start;

	Some(text[start..end].to_owned())
}

fn redact_query(url: &Url) -> String {
	let mut url = url.clone();

	url.set_query(None);

	url.to_string()
}
