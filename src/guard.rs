//! Allow-policy for resource locators before they may be signed or rendered.
//!
//! The default policy is deliberately narrow: an absolute `http`/`https` URL with a non-empty
//! authority whose host is not the literal `localhost`. It does not resolve DNS and does not look
//! at IP literals such as `127.0.0.1`, `169.254.169.254`, or `[::1]`, nor at IDN look-alikes of
//! `localhost`. Callers that need more opt into [`ResourceGuard::deny_private_addresses`].

// std
use std::net::{Ipv4Addr, Ipv6Addr};
// crates.io
use url::{Host, ParseError};
// self
use crate::_prelude::*;

/// Rule that rejected a resource locator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ThisError)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
	/// Not a structurally valid absolute URL.
	#[error("malformed URL")]
	BadSyntax,
	/// Scheme is neither `http` nor `https`.
	#[error("scheme must be http or https")]
	BadScheme,
	/// Authority has no host.
	#[error("missing host")]
	EmptyHost,
	/// Host is the literal `localhost`.
	#[error("localhost not allowed")]
	LoopbackHost,
	/// Host is a loopback, private, or link-local IP literal (strict policy only).
	#[error("private address not allowed")]
	PrivateAddress,
}
impl RejectReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RejectReason::BadSyntax => "bad_syntax",
			RejectReason::BadScheme => "bad_scheme",
			RejectReason::EmptyHost => "empty_host",
			RejectReason::LoopbackHost => "loopback_host",
			RejectReason::PrivateAddress => "private_address",
		}
	}
}

/// Schemes admitted by the guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scheme {
	/// Plain HTTP.
	Http,
	/// HTTP over TLS.
	Https,
}

/// A locator that passed [`ResourceGuard::validate`].
///
/// Keeps the caller's original string verbatim; that string, not a normalized form, is what gets
/// signed and rendered.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceLocator {
	raw: String,
	scheme: Scheme,
	host: String,
}
impl ResourceLocator {
	/// Original string exactly as supplied.
	pub fn as_str(&self) -> &str {
		&self.raw
	}

	/// Admitted scheme.
	pub fn scheme(&self) -> Scheme {
		self.scheme
	}

	/// Lower-cased host used for policy checks.
	pub fn host(&self) -> &str {
		&self.host
	}

	/// Consumes the locator, returning the original string.
	pub fn into_string(self) -> String {
		self.raw
	}
}
impl AsRef<str> for ResourceLocator {
	fn as_ref(&self) -> &str {
		&self.raw
	}
}
impl Display for ResourceLocator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.raw)
	}
}

/// Resource allow-policy.
///
/// `ResourceGuard::default()` applies the narrow policy described in the module docs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceGuard {
	deny_private_addresses: bool,
}
impl ResourceGuard {
	/// Additionally rejects loopback, private, link-local, and unspecified IP literals.
	pub fn deny_private_addresses(mut self, deny: bool) -> Self {
		self.deny_private_addresses = deny;

		self
	}

	/// Validates `raw` against the policy.
	pub fn validate(&self, raw: &str) -> Result<ResourceLocator, RejectReason> {
		// The parser strips these silently, so the signed string would differ from the URL.
		if raw.chars().any(char::is_control) || raw.starts_with(' ') || raw.ends_with(' ') {
			return Err(RejectReason::BadSyntax);
		}

		let url = Url::parse(raw).map_err(|e| match e {
			ParseError::EmptyHost => RejectReason::EmptyHost,
			_ => RejectReason::BadSyntax,
		})?;
		let scheme = match url.scheme() {
			"http" => Scheme::Http,
			"https" => Scheme::Https,
			_ => return Err(RejectReason::BadScheme),
		};

		// WHATWG parsing repairs `https:///path` and `http:example.com` into URLs with a host;
		// the raw authority must carry one on its own.
		if raw_authority_host(raw).is_none_or(str::is_empty) {
			return Err(RejectReason::EmptyHost);
		}

		let host = match url.host_str() {
			Some(host) if !host.is_empty() => host.to_ascii_lowercase(),
			_ => return Err(RejectReason::EmptyHost),
		};

		if host == "localhost" {
			return Err(RejectReason::LoopbackHost);
		}
		if self.deny_private_addresses && url.host().is_some_and(|h| is_private_host(&h)) {
			return Err(RejectReason::PrivateAddress);
		}

		Ok(ResourceLocator { raw: raw.to_owned(), scheme, host })
	}
}

/// Validates `raw` with the default policy.
pub fn validate(raw: &str) -> Result<ResourceLocator, RejectReason> {
	ResourceGuard::default().validate(raw)
}

fn raw_authority_host(raw: &str) -> Option<&str> {
	let (_, rest) = raw.split_once(':')?;
	let rest = rest.strip_prefix("//")?;
	let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
	let host_port = authority.rsplit_once('@').map_or(authority, |(_, host_port)| host_port);

	if host_port.starts_with('[') {
		return Some(host_port);
	}

	Some(host_port.split_once(':').map_or(host_port, |(host, _)| host))
}

fn is_private_host(host: &Host<&str>) -> bool {
	match host {
		Host::Domain(_) => false,
		Host::Ipv4(ip) => is_private_v4(ip),
		Host::Ipv6(ip) => is_private_v6(ip),
	}
}

fn is_private_v4(ip: &Ipv4Addr) -> bool {
	ip.is_loopback()
		|| ip.is_private()
		|| ip.is_link_local()
		|| ip.is_unspecified()
		|| ip.is_broadcast()
}

fn is_private_v6(ip: &Ipv6Addr) -> bool {
	let first = ip.segments()[0];

	ip.is_loopback()
		|| ip.is_unspecified()
		// fc00::/7 unique local, fe80::/10 link local.
		|| (first & 0xfe00) == 0xfc00
		|| (first & 0xffc0) == 0xfe80
		|| ip.to_ipv4_mapped().is_some_and(|v4| is_private_v4(&v4))
}
