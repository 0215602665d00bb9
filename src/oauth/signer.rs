//! OAuth 1.0a `HMAC-SHA1` request signing.
//!
//! The signature base string is `METHOD&enc(base URL)&enc(sorted parameters)` where the
//! parameters are the URL query pairs, any form body pairs, and the `oauth_*` protocol
//! parameters. The signing key is `enc(consumer secret)&enc(token secret)`. Encoding follows
//! RFC 3986: everything except unreserved characters is percent-encoded.

// std
use std::borrow::Cow;
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use rand::{Rng, distr::Alphanumeric};
use reqwest::Method;
use sha1::Sha1;
// self
use crate::{
	_prelude::*,
	auth::{ConsumerKey, Secret, TokenPair},
};

const NONCE_LEN: usize = 32;

/// Consumer credentials plus an optional token pair used to sign requests.
#[derive(Clone, Debug)]
pub struct Signer {
	consumer_key: ConsumerKey,
	consumer_secret: Secret,
	token: Option<TokenPair>,
}
impl Signer {
	/// Signer for requests made before any token is issued.
	pub fn new(consumer_key: ConsumerKey, consumer_secret: Secret) -> Self {
		Self { consumer_key, consumer_secret, token: None }
	}

	/// Binds a request or access token pair.
	pub fn with_token(mut self, token: TokenPair) -> Self {
		self.token = Some(token);

		self
	}

	/// Consumer key.
	pub fn consumer_key(&self) -> &ConsumerKey {
		&self.consumer_key
	}

	/// Bound token pair, if any.
	pub fn token(&self) -> Option<&TokenPair> {
		self.token.as_ref()
	}

	/// Builds the `Authorization` header for a request.
	///
	/// `protocol` carries extra `oauth_*` parameters such as `oauth_callback` or
	/// `oauth_verifier`; `form` carries `application/x-www-form-urlencoded` body pairs.
	pub fn authorization_header(
		&self,
		method: &Method,
		url: &Url,
		protocol: &[(&str, &str)],
		form: &[(&str, &str)],
	) -> String {
		let timestamp = OffsetDateTime::now_utc().unix_timestamp().to_string();

		self.authorization_header_with(method, url, protocol, form, &nonce(), &timestamp)
	}

	pub(crate) fn authorization_header_with(
		&self,
		method: &Method,
		url: &Url,
		protocol: &[(&str, &str)],
		form: &[(&str, &str)],
		nonce: &str,
		timestamp: &str,
	) -> String {
		let mut oauth_params = vec![
			("oauth_consumer_key", self.consumer_key.as_ref()),
			("oauth_nonce", nonce),
			("oauth_signature_method", "HMAC-SHA1"),
			("oauth_timestamp", timestamp),
			("oauth_version", "1.0"),
		];

		if let Some(token) = &self.token {
			oauth_params.push(("oauth_token", token.token.expose()));
		}

		oauth_params.extend_from_slice(protocol);

		let base = signature_base(method, url, &oauth_params, form);
		let signature = self.sign(&base);

		oauth_params.push(("oauth_signature", &signature));
		oauth_params.sort_unstable();

		let fields = oauth_params
			.iter()
			.map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
			.collect::<Vec<_>>()
			.join(", ");

		format!("OAuth {fields}")
	}

	fn sign(&self, base: &str) -> String {
		let token_secret = self.token.as_ref().map(|t| t.secret.expose()).unwrap_or_default();
		let key = format!("{}&{}", encode(self.consumer_secret.expose()), encode(token_secret));
		let mut mac = <Hmac<Sha1>>::new_from_slice(key.as_bytes())
			.unwrap_or_else(|_| unreachable!("HMAC-SHA1 accepts keys of any length"));

		mac.update(base.as_bytes());

		STANDARD.encode(mac.finalize().into_bytes())
	}
}

fn signature_base(
	method: &Method,
	url: &Url,
	oauth_params: &[(&str, &str)],
	form: &[(&str, &str)],
) -> String {
	let mut params = url
		.query_pairs()
		.map(|(k, v)| (encode(&k).into_owned(), encode(&v).into_owned()))
		.chain(
			oauth_params
				.iter()
				.chain(form)
				.map(|(k, v)| (encode(k).into_owned(), encode(v).into_owned())),
		)
		.collect::<Vec<_>>();

	params.sort_unstable();

	let normalized =
		params.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&");
	let mut base_url = url.clone();

	base_url.set_query(None);
	base_url.set_fragment(None);

	format!("{}&{}&{}", method.as_str(), encode(base_url.as_str()), encode(&normalized))
}

fn encode(value: &str) -> Cow<'_, str> {
	urlencoding::encode(value)
}

fn nonce() -> String {
	rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn photos_signer() -> Signer {
		let key = ConsumerKey::new("dpf43f3p2l4k3l03").expect("Consumer key fixture should be valid.");

		Signer::new(key, Secret::new("kd94hf93k423kf44"))
			.with_token(TokenPair::new("nnch734d00sl2jdk", "pfkkdhi9sl3r4s00"))
	}

	fn photos_url() -> Url {
		Url::parse("http://photos.example.net/photos?file=vacation.jpg&size=original")
			.expect("Fixture URL should parse.")
	}

	#[test]
	fn base_string_matches_published_example() {
		let params = [
			("oauth_consumer_key", "dpf43f3p2l4k3l03"),
			("oauth_token", "nnch734d00sl2jdk"),
			("oauth_signature_method", "HMAC-SHA1"),
			("oauth_timestamp", "1191242096"),
			("oauth_nonce", "kllo9940pd9333jh"),
			("oauth_version", "1.0"),
		];

		assert_eq!(
			signature_base(&Method::GET, &photos_url(), &params, &[]),
			"GET&http%3A%2F%2Fphotos.example.net%2Fphotos&file%3Dvacation.jpg%26oauth_consumer_key%3Ddpf43f3p2l4k3l03%26oauth_nonce%3Dkllo9940pd9333jh%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1191242096%26oauth_token%3Dnnch734d00sl2jdk%26oauth_version%3D1.0%26size%3Doriginal"
		);
	}

	#[test]
	fn signature_matches_published_example() {
		let header = photos_signer().authorization_header_with(
			&Method::GET,
			&photos_url(),
			&[],
			&[],
			"kllo9940pd9333jh",
			"1191242096",
		);

		assert!(header.starts_with("OAuth "));
		assert!(
			header.contains("oauth_signature=\"tR3%2BTy81lMeYAr%2FFid0kMTYa%2FWM%3D\""),
			"{header}"
		);
		assert!(header.contains("oauth_token=\"nnch734d00sl2jdk\""));
	}

	#[test]
	fn protocol_parameters_are_signed_and_sent() {
		let key = ConsumerKey::new("K1").expect("Consumer key fixture should be valid.");
		let signer = Signer::new(key, Secret::new("S1"));
		let url = Url::parse("https://apisb.etrade.com/oauth/request_token")
			.expect("Fixture URL should parse.");
		let header = signer.authorization_header(&Method::POST, &url, &[("oauth_callback", "oob")], &[]);

		assert!(header.contains("oauth_callback=\"oob\""));
		assert!(!header.contains("oauth_token="), "No token is bound before begin.");
	}

	#[test]
	fn nonces_are_unique_alphanumerics() {
		let a = nonce();
		let b = nonce();

		assert_eq!(a.len(), NONCE_LEN);
		assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
		assert_ne!(a, b);
	}
}
