//! Capability-link wire codec.
//!
//! A link travels as three query parameters: `u` (the resource, escaped), `exp` (decimal Unix
//! seconds), and `sig` (the token, escaped even though its alphabet never needs it). Each value is
//! escaped independently, so a resource carrying its own `&`/`=`/`?` survives the trip intact.

// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	token::{Expiry, Field, Token},
};

/// Path the bundled HTTP surface serves rendered links from.
pub const RENDER_PATH: &str = "/v1/qr";
/// Path the bundled HTTP surface mints links on.
pub const MINT_PATH: &str = "/v1/sign";

/// Error returned when a required query parameter is absent or empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
#[error("Missing or empty `{0}` parameter.")]
pub struct MissingParam(pub Field);

/// A freshly minted link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityLink {
	/// Resource exactly as it was signed.
	pub resource: String,
	/// Expiry bound into the token.
	pub expiry: Expiry,
	/// Signature over `resource` and `expiry`.
	pub token: Token,
}
impl CapabilityLink {
	/// Encodes the link as `u=..&exp=..&sig=..`.
	pub fn to_query(&self) -> String {
		form_urlencoded::Serializer::new(String::new())
			.append_pair(Field::Resource.param(), &self.resource)
			.append_pair(Field::Expiry.param(), &self.expiry.to_string())
			.append_pair(Field::Token.param(), self.token.as_str())
			.finish()
	}

	/// Joins the encoded query onto `base`, e.g. `/v1/qr?u=..&exp=..&sig=..`.
	pub fn path(&self, base: &str) -> String {
		format!("{base}?{}", self.to_query())
	}

	/// Returns `base` with its query replaced by the link parameters.
	pub fn url(&self, base: &Url) -> Url {
		let mut url = base.clone();

		url.set_query(Some(&self.to_query()));

		url
	}

	/// Views the link the way a verifier receives it.
	pub fn to_presented(&self) -> PresentedLink {
		PresentedLink::new(&self.resource, self.expiry.to_string(), self.token.as_str())
	}
}
impl Display for CapabilityLink {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.path(RENDER_PATH))
	}
}

/// Link fields as presented by an untrusted bearer; nothing here has been checked yet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentedLink {
	/// Presented resource.
	pub resource: String,
	/// Presented expiry, kept as the literal string that will be authenticated.
	pub expiry: String,
	/// Presented token.
	pub token: String,
}
impl PresentedLink {
	/// Builds a presented link from its raw fields.
	pub fn new(
		resource: impl Into<String>,
		expiry: impl Into<String>,
		token: impl Into<String>,
	) -> Self {
		Self { resource: resource.into(), expiry: expiry.into(), token: token.into() }
	}

	/// Parses `u`, `exp`, and `sig` from a query string (without the leading `?`).
	///
	/// The first occurrence of each parameter wins; later duplicates are ignored.
	pub fn from_query(query: &str) -> Result<Self, MissingParam> {
		let mut resource = None;
		let mut expiry = None;
		let mut token = None;

		for (key, value) in form_urlencoded::parse(query.as_bytes()) {
			let slot = match &*key {
				"u" => &mut resource,
				"exp" => &mut expiry,
				"sig" => &mut token,
				_ => continue,
			};

			if slot.is_none() {
				*slot = Some(value.into_owned());
			}
		}

		Ok(Self {
			resource: required(resource, Field::Resource)?,
			expiry: required(expiry, Field::Expiry)?,
			token: required(token, Field::Token)?,
		})
	}

	/// Parses the link parameters out of `url`'s query.
	pub fn from_url(url: &Url) -> Result<Self, MissingParam> {
		Self::from_query(url.query().unwrap_or_default())
	}
}

/// Returns the value or the [`MissingParam`] naming `field` when it is absent or empty.
pub(crate) fn required(value: Option<String>, field: Field) -> Result<String, MissingParam> {
	value.filter(|v| !v.is_empty()).ok_or(MissingParam(field))
}
