//! Crate-level error types shared by configuration, link handling, and rendering.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical error exposed by the crate's fallible entry points.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Process configuration problem; fatal at startup.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Capability link could not be minted or opened.
	#[error(transparent)]
	Link(#[from] crate::issuer::LinkError),
	/// Mint request failed the bearer gate.
	#[error(transparent)]
	Bearer(#[from] crate::auth::BearerError),
	/// Renderer failed outside of a link operation.
	#[error(transparent)]
	Render(#[from] crate::render::RenderError),
}

/// Configuration and key-material failures raised while building the process context.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required variable is absent.
	#[error("Missing required configuration value `{name}`.")]
	Missing {
		/// Variable or field name.
		name: &'static str,
	},
	/// A required variable is present but empty.
	#[error("Configuration value `{name}` must not be empty.")]
	Empty {
		/// Variable or field name.
		name: &'static str,
	},
	/// JSON configuration document could not be parsed.
	#[error("Configuration document is malformed at `{path}`.")]
	Parse {
		/// Path to the offending field inside the document.
		path: String,
		/// Structured parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// Signing key material was rejected by the MAC.
	#[error("Signing key is invalid: {reason}.")]
	InvalidKey {
		/// MAC-supplied reason string.
		reason: String,
	},
}
impl From<serde_path_to_error::Error<serde_json::Error>> for ConfigError {
	fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = e.path().to_string();

		Self::Parse { path, source: e.into_inner() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn config_errors_name_the_offending_value() {
		let err = ConfigError::Missing { name: "QR_SIGNING_SECRET" };

		assert_eq!(err.to_string(), "Missing required configuration value `QR_SIGNING_SECRET`.");

		let err: Error = ConfigError::Empty { name: "QR_MINT_TOKEN" }.into();

		assert!(matches!(err, Error::Config(ConfigError::Empty { name: "QR_MINT_TOKEN" })));
	}

	#[test]
	fn component_errors_convert_transparently() {
		let err: Error = crate::auth::BearerError::Unauthorized.into();

		assert_eq!(err.to_string(), "unauthorized");

		let err: Error = crate::render::RenderError::encode("data too long").into();

		assert!(matches!(err, Error::Render(_)));
	}
}
