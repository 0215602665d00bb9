//! Writes command results to stdout.

// std
use std::io::Write;
// crates.io
use clap::ValueEnum;
use serde_json::Value;
// self
use crate::{_prelude::*, error::TransportError};

/// Output encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Compact JSON on one line.
	Json,
	/// Indented JSON.
	#[default]
	JsonPretty,
}

/// Writes `value` followed by a newline.
pub fn render(value: &Value, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
	let written = match format {
		OutputFormat::Json => serde_json::to_writer(&mut *out, value),
		OutputFormat::JsonPretty => serde_json::to_writer_pretty(&mut *out, value),
	};

	written.map_err(|e| TransportError::Io(e.into()))?;

	writeln!(out).and_then(|()| out.flush()).map_err(TransportError::Io)?;

	Ok(())
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn compact_output_is_one_line() {
		let mut out = Vec::new();

		render(&json!({ "status": "success" }), OutputFormat::Json, &mut out)
			.expect("Rendering should succeed.");

		assert_eq!(out, b"{\"status\":\"success\"}\n");
	}

	#[test]
	fn pretty_output_is_indented() {
		let mut out = Vec::new();

		render(&json!({ "a": [1] }), OutputFormat::JsonPretty, &mut out)
			.expect("Rendering should succeed.");

		assert_eq!(String::from_utf8(out).expect("Output should be UTF-8."), "{\n  \"a\": [\n    1\n  ]\n}\n");
	}
}
