//! Form-encoded OAuth token responses.

// self
use crate::auth::TokenPair;

/// Extracts `oauth_token` and `oauth_token_secret` from a token endpoint body.
///
/// Returns `None` unless both are present and non-empty.
pub(crate) fn token_pair(body: &[u8]) -> Option<TokenPair> {
	let mut token = None;
	let mut secret = None;

	for (key, value) in url::form_urlencoded::parse(body) {
		match key.as_ref() {
			"oauth_token" => token = Some(value.into_owned()),
			"oauth_token_secret" => secret = Some(value.into_owned()),
			_ => {},
		}
	}

	match (token, secret) {
		(Some(token), Some(secret)) if !token.is_empty() && !secret.is_empty() =>
			Some(TokenPair::new(token, secret)),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parses_percent_encoded_pairs() {
		let pair = token_pair(b"oauth_token=abc%2B1&oauth_token_secret=s%3D&oauth_callback_confirmed=true")
			.expect("Both fields are present.");

		assert_eq!(pair.token.expose(), "abc+1");
		assert_eq!(pair.secret.expose(), "s=");
	}

	#[test]
	fn rejects_partial_or_non_form_bodies() {
		assert!(token_pair(b"oauth_token=abc").is_none());
		assert!(token_pair(b"oauth_token=abc&oauth_token_secret=").is_none());
		assert!(token_pair(b"Access Token has been renewed").is_none());
	}
}
