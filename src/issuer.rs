//! Capability-link orchestration: guard, codec, TTL bounds, and rendering in one place.
//!
//! [`LinkIssuer`] is the only type that combines the resource guard with the token codec. The
//! mint path validates the resource, bounds the TTL, and signs; the open path re-validates the
//! resource and verifies the token, running both checks before it reports either. Rendering is
//! only reachable through a successful open.

// self
use crate::{
	_prelude::*,
	auth::SigningKey,
	guard::{RejectReason, ResourceGuard, ResourceLocator},
	link::{CapabilityLink, MissingParam, PresentedLink},
	obs::{self, OpKind, OpOutcome, OpSpan},
	render::{RenderError, Renderer},
	token::{self, Expiry, Field, Verification},
};

/// Longest lifetime a minted link may have by default (one day).
pub const DEFAULT_MAX_TTL_SECS: i64 = 24 * 3600;

/// How a [`LinkError`] may be surfaced to the party that caused it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorClass {
	/// Caller-supplied input is structurally wrong or fails policy; the reason may be shown.
	ClientInput,
	/// The link does not grant access; which check failed must stay hidden.
	Unauthorized,
	/// Server-side failure; details stay in logs.
	Internal,
}

/// Failures raised while minting, opening, or rendering a capability link.
#[derive(Debug, ThisError)]
pub enum LinkError {
	/// A field is missing or unparseable.
	#[error("Missing or invalid `{0}` parameter.")]
	Malformed(Field),
	/// Requested TTL falls outside `1..=max`.
	#[error("Invalid ttl (1..{max}).")]
	InvalidTtl {
		/// Largest accepted TTL in seconds.
		max: i64,
	},
	/// Resource failed the guard.
	#[error("Invalid target url: {0}.")]
	Rejected(RejectReason),
	/// Link is past its expiry.
	#[error("Capability link has expired.")]
	Expired,
	/// Token does not authenticate the presented fields.
	#[error("Capability link signature does not match.")]
	SignatureMismatch,
	/// Render collaborator failed.
	#[error("Failed to render the capability link target.")]
	InternalRenderFailure(#[source] RenderError),
}
impl LinkError {
	/// Returns the surface class for this error.
	pub const fn class(&self) -> ErrorClass {
		match self {
			LinkError::Malformed(_) | LinkError::InvalidTtl { .. } | LinkError::Rejected(_) =>
				ErrorClass::ClientInput,
			LinkError::Expired | LinkError::SignatureMismatch => ErrorClass::Unauthorized,
			LinkError::InternalRenderFailure(_) => ErrorClass::Internal,
		}
	}

	/// Message safe to show the caller.
	///
	/// Expired and mismatched links collapse to the same text so the response never tells a
	/// bearer which of the two checks failed.
	pub fn public_message(&self) -> String {
		match self.class() {
			ErrorClass::ClientInput => self.to_string(),
			ErrorClass::Unauthorized => "unauthorized".into(),
			ErrorClass::Internal => "failed to render".into(),
		}
	}

	/// Returns a stable label naming the exact failure, for logs and metrics only.
	pub const fn reason(&self) -> &'static str {
		match self {
			LinkError::Malformed(Field::Resource) => "malformed_resource",
			LinkError::Malformed(Field::Expiry) => "malformed_expiry",
			LinkError::Malformed(Field::Token) => "malformed_token",
			LinkError::Malformed(Field::Ttl) => "malformed_ttl",
			LinkError::InvalidTtl { .. } => "invalid_ttl",
			LinkError::Rejected(reason) => reason.as_str(),
			LinkError::Expired => "expired",
			LinkError::SignatureMismatch => "signature_mismatch",
			LinkError::InternalRenderFailure(_) => "render_failure",
		}
	}
}
impl From<MissingParam> for LinkError {
	fn from(e: MissingParam) -> Self {
		Self::Malformed(e.0)
	}
}
impl From<RejectReason> for LinkError {
	fn from(reason: RejectReason) -> Self {
		Self::Rejected(reason)
	}
}
impl From<RenderError> for LinkError {
	fn from(e: RenderError) -> Self {
		Self::InternalRenderFailure(e)
	}
}

/// Mints and opens capability links under one signing key.
///
/// Cheap to clone and safe to share across threads; the key sits behind an [`Arc`] and is never
/// mutated.
#[derive(Clone, Debug)]
pub struct LinkIssuer {
	key: Arc<SigningKey>,
	guard: ResourceGuard,
	max_ttl: i64,
}
impl LinkIssuer {
	/// Creates an issuer with the default guard and a one-day TTL ceiling.
	pub fn new(key: Arc<SigningKey>) -> Self {
		Self { key, guard: ResourceGuard::default(), max_ttl: DEFAULT_MAX_TTL_SECS }
	}

	/// Replaces the resource guard.
	pub fn with_guard(mut self, guard: ResourceGuard) -> Self {
		self.guard = guard;

		self
	}

	/// Overrides the TTL ceiling in seconds.
	pub fn with_max_ttl(mut self, max_ttl_secs: i64) -> Self {
		self.max_ttl = max_ttl_secs;

		self
	}

	/// Resource guard applied on both paths.
	pub fn guard(&self) -> &ResourceGuard {
		&self.guard
	}

	/// TTL ceiling in seconds.
	pub fn max_ttl(&self) -> i64 {
		self.max_ttl
	}

	/// Mints a link for `resource` that stays valid for `ttl_secs` from now.
	pub fn mint(&self, resource: &str, ttl_secs: i64) -> Result<CapabilityLink, LinkError> {
		self.mint_at(resource, ttl_secs, now_unix())
	}

	/// Mints a link for `resource` expiring at `now + ttl_secs`.
	pub fn mint_at(
		&self,
		resource: &str,
		ttl_secs: i64,
		now: i64,
	) -> Result<CapabilityLink, LinkError> {
		const KIND: OpKind = OpKind::Mint;

		let _span = OpSpan::new(KIND, "mint_at").entered();

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = self.mint_inner(resource, ttl_secs, now);

		finish(KIND, &result);

		result
	}

	/// Opens a presented link at the current time.
	pub fn open(&self, presented: &PresentedLink) -> Result<ResourceLocator, LinkError> {
		self.open_at(presented, now_unix())
	}

	/// Opens a presented link at `now`, returning the re-validated resource.
	///
	/// The guard and every token check run regardless of each other's result. The guard's
	/// verdict is reported first, then the token's.
	pub fn open_at(
		&self,
		presented: &PresentedLink,
		now: i64,
	) -> Result<ResourceLocator, LinkError> {
		const KIND: OpKind = OpKind::Verify;

		let _span = OpSpan::new(KIND, "open_at").entered();

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = self.open_inner(presented, now);

		finish(KIND, &result);

		result
	}

	/// Opens a presented link at the current time and renders its resource.
	pub fn render<R>(&self, presented: &PresentedLink, renderer: &R) -> Result<Vec<u8>, LinkError>
	where
		R: ?Sized + Renderer,
	{
		self.render_at(presented, renderer, now_unix())
	}

	/// Opens a presented link at `now` and renders its resource.
	pub fn render_at<R>(
		&self,
		presented: &PresentedLink,
		renderer: &R,
		now: i64,
	) -> Result<Vec<u8>, LinkError>
	where
		R: ?Sized + Renderer,
	{
		const KIND: OpKind = OpKind::Render;

		let locator = self.open_at(presented, now)?;
		let _span = OpSpan::new(KIND, "render_at").entered();

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = renderer.render(locator.as_str()).map_err(LinkError::from);

		finish(KIND, &result);

		result
	}

	fn mint_inner(
		&self,
		resource: &str,
		ttl_secs: i64,
		now: i64,
	) -> Result<CapabilityLink, LinkError> {
		if !(1..=self.max_ttl).contains(&ttl_secs) {
			return Err(LinkError::InvalidTtl { max: self.max_ttl });
		}

		let locator = self.guard.validate(resource)?;
		let expiry = Expiry::after(now, ttl_secs)
			.map_err(|_| LinkError::InvalidTtl { max: self.max_ttl })?;
		let token = token::mint(locator.as_str(), expiry, &self.key);

		Ok(CapabilityLink { resource: locator.into_string(), expiry, token })
	}

	fn open_inner(
		&self,
		presented: &PresentedLink,
		now: i64,
	) -> Result<ResourceLocator, LinkError> {
		if presented.resource.is_empty() {
			return Err(LinkError::Malformed(Field::Resource));
		}

		let guarded = self.guard.validate(&presented.resource);
		let PresentedLink { resource, expiry, token: presented_token } = presented;
		let verification =
			token::inspect(resource, expiry, presented_token, &self.key, now).outcome();

		if guarded.is_err() && !verification.is_valid() {
			// Only the guard's verdict is returned and `finish` logs it; keep the token's here.
			obs::log_denial(OpKind::Verify, verification.as_str());
			obs::record_denial(OpKind::Verify, verification.as_str());
		}

		let locator = guarded?;

		match verification {
			Verification::Valid => Ok(locator),
			Verification::Malformed(field) => Err(LinkError::Malformed(field)),
			Verification::Expired => Err(LinkError::Expired),
			Verification::SignatureMismatch => Err(LinkError::SignatureMismatch),
		}
	}
}

/// Current Unix time in seconds.
pub fn now_unix() -> i64 {
	OffsetDateTime::now_utc().unix_timestamp()
}

fn finish<T>(kind: OpKind, result: &Result<T, LinkError>) {
	match result {
		Ok(_) => obs::record_op_outcome(kind, OpOutcome::Success),
		Err(e) => {
			obs::log_denial(kind, e.reason());
			obs::record_denial(kind, e.reason());
			obs::record_op_outcome(kind, OpOutcome::Failure);
		},
	}
}
