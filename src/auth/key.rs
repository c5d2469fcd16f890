//! HMAC-SHA256 signing key that redacts itself from every formatter.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
// self
use crate::{_prelude::*, error::ConfigError};

/// Length in bytes of every digest produced by [`SigningKey::sign`].
pub const DIGEST_LEN: usize = 32;

const GENERATED_SECRET_LEN: usize = 32;

type HmacSha256 = Hmac<Sha256>;

/// Process-wide signing key.
///
/// The key is keyed into an HMAC state once at construction and cloned for every signature, so
/// signing never fails and never touches the raw secret again. Share it by reference or behind an
/// [`Arc`]; it is immutable for its whole lifetime.
#[derive(Clone)]
pub struct SigningKey {
	mac: HmacSha256,
}
impl SigningKey {
	/// Keys a new signing key from opaque secret material.
	pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
		let secret = secret.as_ref();

		if secret.is_empty() {
			return Err(ConfigError::Empty { name: "signing key" });
		}

		let mac = HmacSha256::new_from_slice(secret)
			.map_err(|e| ConfigError::InvalidKey { reason: e.to_string() })?;

		Ok(Self { mac })
	}

	/// Generates a random secret suitable for `QR_SIGNING_SECRET`.
	///
	/// The secret is 32 random bytes encoded as URL-safe base64 so it survives shells and
	/// `.env` files unchanged.
	pub fn generate_secret() -> String {
		let mut bytes = [0_u8; GENERATED_SECRET_LEN];

		rand::rng().fill(&mut bytes);

		URL_SAFE_NO_PAD.encode(bytes)
	}

	/// Computes `HMAC(resource ‖ 0x0A ‖ expiry)` over the exact bytes supplied.
	pub fn sign(&self, resource: &str, expiry: &str) -> [u8; DIGEST_LEN] {
		let mut mac = self.mac.clone();

		mac.update(resource.as_bytes());
		mac.update(b"\n");
		mac.update(expiry.as_bytes());

		let digest = mac.finalize().into_bytes();
		let mut out = [0_u8; DIGEST_LEN];

		out.copy_from_slice(&digest);

		out
	}
}
impl Debug for SigningKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SigningKey").field(&"<redacted>").finish()
	}
}
impl Display for SigningKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn key_formatters_redact() {
		let key = SigningKey::new("super-secret").expect("Signing key fixture should be valid.");

		assert_eq!(format!("{key:?}"), "SigningKey(\"<redacted>\")");
		assert_eq!(format!("{key}"), "<redacted>");
	}

	#[test]
	fn empty_secret_is_rejected() {
		let err = SigningKey::new("").expect_err("Empty signing secret must be rejected.");

		assert!(matches!(err, ConfigError::Empty { .. }));
	}

	#[test]
	fn sign_matches_known_answer() {
		let key = SigningKey::new("Jefe").expect("Known-answer key should be valid.");
		let digest = key.sign("https://example.com/img", "1700000060");
		let hex = digest.iter().map(|b| format!("{b:02x}")).collect::<String>();

		assert_eq!(hex, "1d5b733b6fb4b6f7adb2a2a658174c2478c04d6da37c3f87b1666a6916504f0a");
	}

	#[test]
	fn separator_keeps_fields_apart() {
		let key = SigningKey::new("k").expect("Signing key fixture should be valid.");

		assert_ne!(key.sign("ab", "1"), key.sign("a", "b1"));
	}

	#[test]
	fn generated_secrets_are_distinct_and_usable() {
		let a = SigningKey::generate_secret();
		let b = SigningKey::generate_secret();

		assert_ne!(a, b);
		assert_eq!(a.len(), 43);
		SigningKey::new(&a).expect("Generated secret should key a signing key.");
	}
}
