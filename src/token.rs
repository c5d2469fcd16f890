//! Capability token codec: binds a resource and an expiry under HMAC-SHA256.
//!
//! A token is `base64url(HMAC(resource ‖ "\n" ‖ expiry))` without padding. Tokens are never
//! stored; [`verify`] recomputes the digest over the fields exactly as presented and compares the
//! fixed-size digests in constant time.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use subtle::ConstantTimeEq;
// self
use crate::{
	_prelude::*,
	auth::{DIGEST_LEN, SigningKey},
};

/// Encoded length of every token (32 bytes, unpadded base64).
pub const TOKEN_LEN: usize = 43;

/// Link field named by a [`Verification::Malformed`] outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
	/// Resource locator (`u`).
	Resource,
	/// Expiry timestamp (`exp`).
	Expiry,
	/// Signature token (`sig`).
	Token,
	/// Requested lifetime (`ttl`) on the mint path.
	Ttl,
}
impl Field {
	/// Returns the query-parameter name carrying the field.
	pub const fn param(self) -> &'static str {
		match self {
			Field::Resource => "u",
			Field::Expiry => "exp",
			Field::Token => "sig",
			Field::Ttl => "ttl",
		}
	}
}
impl Display for Field {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.param())
	}
}

/// Error returned when an expiry string is not a positive decimal integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
#[error("Expiry must be a positive integer of Unix seconds.")]
pub struct InvalidExpiry;

/// Absolute expiry instant in Unix seconds; always positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Expiry(i64);
impl Expiry {
	/// Wraps a Unix timestamp, rejecting zero and negatives.
	pub const fn from_unix(secs: i64) -> Result<Self, InvalidExpiry> {
		if secs > 0 { Ok(Self(secs)) } else { Err(InvalidExpiry) }
	}

	/// Computes `now + ttl`, rejecting overflow and non-positive results.
	pub fn after(now: i64, ttl_secs: i64) -> Result<Self, InvalidExpiry> {
		now.checked_add(ttl_secs).ok_or(InvalidExpiry).and_then(Self::from_unix)
	}

	/// Unix seconds.
	pub const fn unix(self) -> i64 {
		self.0
	}

	/// Whether the instant lies strictly before `now`.
	pub const fn is_expired_at(self, now: i64) -> bool {
		now > self.0
	}
}
impl Display for Expiry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		Display::fmt(&self.0, f)
	}
}
impl FromStr for Expiry {
	type Err = InvalidExpiry;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		s.parse::<i64>().map_err(|_| InvalidExpiry).and_then(Self::from_unix)
	}
}
impl TryFrom<i64> for Expiry {
	type Error = InvalidExpiry;

	fn try_from(value: i64) -> Result<Self, Self::Error> {
		Self::from_unix(value)
	}
}
impl From<Expiry> for i64 {
	fn from(value: Expiry) -> Self {
		value.0
	}
}

/// URL-safe, unpadded base64 signature over a `(resource, expiry)` pair.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);
impl Token {
	/// Encoded token text.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for Token {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Token({})", self.0)
	}
}
impl Display for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl From<Token> for String {
	fn from(value: Token) -> Self {
		value.0
	}
}

/// Result of [`verify`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verification {
	/// Signature matches and the link has not expired.
	Valid,
	/// A field could not be parsed.
	Malformed(Field),
	/// `now` is past the expiry.
	Expired,
	/// Recomputed digest differs from the presented one.
	SignatureMismatch,
}
impl Verification {
	/// Whether access may be granted.
	pub const fn is_valid(self) -> bool {
		matches!(self, Verification::Valid)
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Verification::Valid => "valid",
			Verification::Malformed(_) => "malformed",
			Verification::Expired => "expired",
			Verification::SignatureMismatch => "signature_mismatch",
		}
	}
}

/// Outcome of comparing the presented signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignatureCheck {
	/// Presented digest equals the recomputed one.
	Match,
	/// Presented digest differs, or is not 32 bytes long.
	Mismatch,
	/// Presented token is not valid unpadded URL-safe base64.
	Undecodable,
}

/// Every check run against a presented link, evaluated independently of each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TokenChecks {
	/// Parsed expiry, or `None` when the expiry string was malformed.
	pub expiry: Option<Expiry>,
	/// Whether `now` is past the expiry (false when the expiry is malformed).
	pub expired: bool,
	/// Signature comparison result.
	pub signature: SignatureCheck,
}
impl TokenChecks {
	/// Collapses the checks into a single outcome.
	///
	/// Precedence: malformed expiry, expiry, malformed token, signature.
	pub const fn outcome(&self) -> Verification {
		if self.expiry.is_none() {
			return Verification::Malformed(Field::Expiry);
		}
		if self.expired {
			return Verification::Expired;
		}

		match self.signature {
			SignatureCheck::Match => Verification::Valid,
			SignatureCheck::Mismatch => Verification::SignatureMismatch,
			SignatureCheck::Undecodable => Verification::Malformed(Field::Token),
		}
	}
}

/// Mints the token for `resource` expiring at `expiry`.
///
/// `resource` must already have passed the resource guard; it is signed byte for byte.
pub fn mint(resource: &str, expiry: Expiry, key: &SigningKey) -> Token {
	Token(URL_SAFE_NO_PAD.encode(key.sign(resource, &expiry.to_string())))
}

/// Verifies a presented `(resource, expiry, token)` triple at `now`.
pub fn verify(
	resource: &str,
	expiry: &str,
	presented: &str,
	key: &SigningKey,
	now: i64,
) -> Verification {
	inspect(resource, expiry, presented, key, now).outcome()
}

/// Runs every check of [`verify`] and reports each result.
///
/// The digest is recomputed over `expiry` exactly as presented, so `"+60"` or `"060"` never
/// authenticate a token minted for `"60"`.
pub fn inspect(
	resource: &str,
	expiry: &str,
	presented: &str,
	key: &SigningKey,
	now: i64,
) -> TokenChecks {
	let parsed = expiry.parse::<Expiry>().ok();
	let expired = parsed.is_some_and(|e| e.is_expired_at(now));
	let signature = match URL_SAFE_NO_PAD.decode(presented) {
		Ok(decoded) => compare_digest(&key.sign(resource, expiry), &decoded),
		Err(_) => SignatureCheck::Undecodable,
	};

	TokenChecks { expiry: parsed, expired, signature }
}

fn compare_digest(expected: &[u8; DIGEST_LEN], presented: &[u8]) -> SignatureCheck {
	let Ok(presented) = <&[u8; DIGEST_LEN]>::try_from(presented) else {
		return SignatureCheck::Mismatch;
	};

	if bool::from(expected.as_slice().ct_eq(presented.as_slice())) {
		SignatureCheck::Match
	} else {
		SignatureCheck::Mismatch
	}
}
