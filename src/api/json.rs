//! Decoding helpers for upstream JSON bodies.
//!
//! Upstream object keys mix `UpperCamelCase` and `lowerCamelCase`; every adapter lower-cases
//! the first character of each key before looking anything up, so paths below are written in
//! `lowerCamelCase` only.

// crates.io
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// Lower-cases the first character of every object key, recursively.
pub fn normalize_keys(value: Value) -> Value {
	match value {
		Value::Object(map) => Value::Object(
			map.into_iter().map(|(key, value)| (lower_first(&key), normalize_keys(value))).collect(),
		),
		Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
		other => other,
	}
}

/// Parses and normalizes a successful response body.
///
/// A `2xx` body that carries an `error` envelope is reported as [`Error::Upstream`].
pub(crate) fn decode(body: &[u8]) -> Result<Value> {
	let value = serde_json::from_slice::<Value>(body).map_err(|e| Error::Upstream {
		status: Some(200),
		message: format!("response body is not valid JSON ({e})"),
	})?;
	let value = normalize_keys(value);

	if let Some(envelope) = value.get("error") {
		let message = envelope
			.get("message")
			.and_then(Value::as_str)
			.map(str::to_owned)
			.unwrap_or_else(|| envelope.to_string());

		return Err(Error::Upstream { status: Some(200), message });
	}

	Ok(value)
}

/// Items found at `pointer`; a lone object counts as a one-item list and absence as none.
pub(crate) fn items_at(value: &Value, pointer: &str) -> Vec<Value> {
	match value.pointer(pointer) {
		Some(Value::Array(items)) => items.clone(),
		Some(Value::Null) | None => Vec::new(),
		Some(item) => vec![item.clone()],
	}
}

/// Cursor found at `pointer`, accepting both string and numeric encodings.
pub(crate) fn cursor_at(value: &Value, pointer: &str) -> Option<String> {
	text_at(value, pointer)
}

/// String or number at `pointer`, as text.
pub(crate) fn text_at(value: &Value, pointer: &str) -> Option<String> {
	match value.pointer(pointer)? {
		Value::String(cursor) => Some(cursor.clone()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

/// Wraps `value` in a single-key object.
pub(crate) fn keyed(key: &str, value: impl Into<Value>) -> Value {
	let mut map = Map::new();

	map.insert(key.to_owned(), value.into());

	Value::Object(map)
}

fn lower_first(key: &str) -> String {
	let mut chars = key.chars();

	match chars.next() {
		Some(first) if first.is_uppercase() => first.to_lowercase().chain(chars).collect(),
		_ => key.to_owned(),
	}
}
