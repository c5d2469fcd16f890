//! Stateless capability links: HMAC-signed, time-bounded URLs that let a bearer fetch a QR
//! rendering of a vetted target without any server-side session or token store.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod issuer;
pub mod link;
pub mod obs;
pub mod render;
pub mod service;
pub mod token;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and fixtures for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{MintCredential, SigningKey},
		issuer::LinkIssuer,
		render::{RenderError, Renderer},
	};

	/// Signing secret shared by every fixture in the test suite.
	pub const TEST_SIGNING_SECRET: &str = "test-signing-secret";
	/// Mint credential shared by every fixture in the test suite.
	pub const TEST_MINT_TOKEN: &str = "test-mint-token";
	/// Fixed "now" used by deterministic tests (2023-11-14T22:13:20Z).
	pub const TEST_NOW: i64 = 1_700_000_000;

	/// Builds the signing key used across tests.
	pub fn test_signing_key() -> SigningKey {
		SigningKey::new(TEST_SIGNING_SECRET).expect("Test signing secret should be accepted.")
	}

	/// Builds the mint credential used across tests.
	pub fn test_mint_credential() -> MintCredential {
		MintCredential::new(TEST_MINT_TOKEN).expect("Test mint token should be accepted.")
	}

	/// Constructs a [`LinkIssuer`] with the default guard and TTL bounds.
	pub fn build_test_issuer() -> LinkIssuer {
		LinkIssuer::new(Arc::new(test_signing_key()))
	}

	/// Renderer that echoes the resource bytes back, so tests can assert what reached it.
	#[derive(Clone, Copy, Debug, Default)]
	pub struct EchoRenderer;
	impl Renderer for EchoRenderer {
		fn content_type(&self) -> &'static str {
			"text/plain; charset=utf-8"
		}

		fn render(&self, resource: &str) -> Result<Vec<u8>, RenderError> {
			Ok(resource.as_bytes().to_vec())
		}
	}

	/// Renderer that always fails, for exercising the internal-failure path.
	#[derive(Clone, Copy, Debug, Default)]
	pub struct FailingRenderer;
	impl Renderer for FailingRenderer {
		fn content_type(&self) -> &'static str {
			"application/octet-stream"
		}

		fn render(&self, _resource: &str) -> Result<Vec<u8>, RenderError> {
			Err(RenderError::encode("fixture renderer always fails"))
		}
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		str::FromStr,
		sync::Arc,
	};

	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use http;
pub use url;
#[cfg(test)] use color_eyre as _;
