//! Bearer gate guarding the mint path.

// crates.io
use subtle::ConstantTimeEq;
// self
use crate::{_prelude::*, error::ConfigError};

/// Failures raised by [`MintCredential::authorize`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum BearerError {
	/// No `Authorization` header was presented.
	#[error("missing Authorization header")]
	Missing,
	/// The presented header does not match the configured credential.
	#[error("unauthorized")]
	Unauthorized,
}

/// Static shared credential that authorizes mint requests.
///
/// Holds the full expected header value (`Bearer <token>`) so the comparison covers the scheme
/// prefix too.
#[derive(Clone, PartialEq, Eq)]
pub struct MintCredential {
	expected_header: String,
}
impl MintCredential {
	/// Wraps the configured mint token.
	pub fn new(token: impl AsRef<str>) -> Result<Self, ConfigError> {
		let token = token.as_ref();

		if token.is_empty() {
			return Err(ConfigError::Empty { name: "mint credential" });
		}

		Ok(Self { expected_header: format!("Bearer {token}") })
	}

	/// Checks a presented `Authorization` header value in constant time.
	pub fn authorize(&self, header: Option<&str>) -> Result<(), BearerError> {
		let presented = match header {
			Some(value) if !value.is_empty() => value,
			_ => return Err(BearerError::Missing),
		};

		if bool::from(presented.as_bytes().ct_eq(self.expected_header.as_bytes())) {
			Ok(())
		} else {
			Err(BearerError::Unauthorized)
		}
	}
}
impl Debug for MintCredential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("MintCredential").field(&"<redacted>").finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn credential() -> MintCredential {
		MintCredential::new("s3cret").expect("Credential fixture should be valid.")
	}

	#[test]
	fn authorize_accepts_exact_bearer_header() {
		let credential = credential();

		assert_eq!(credential.authorize(Some("Bearer s3cret")), Ok(()));
	}

	#[test]
	fn authorize_classifies_missing_and_wrong_headers() {
		let credential = credential();

		assert_eq!(credential.authorize(None), Err(BearerError::Missing));
		assert_eq!(credential.authorize(Some("")), Err(BearerError::Missing));
		assert_eq!(credential.authorize(Some("Bearer s3cre")), Err(BearerError::Unauthorized));
		assert_eq!(credential.authorize(Some("Bearer s3cret ")), Err(BearerError::Unauthorized));
		assert_eq!(credential.authorize(Some("bearer s3cret")), Err(BearerError::Unauthorized));
		assert_eq!(credential.authorize(Some("s3cret")), Err(BearerError::Unauthorized));
	}

	#[test]
	fn credential_debug_redacts() {
		let credential = credential();

		assert_eq!(format!("{credential:?}"), "MintCredential(\"<redacted>\")");
	}
}
