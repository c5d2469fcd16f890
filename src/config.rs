//! Process configuration: the signing key and the mint credential.
//!
//! Both values are required. A process embedding this crate should treat any [`ConfigError`]
//! from these loaders as fatal at startup rather than retrying.

// self
use crate::{
	_prelude::*,
	auth::{MintCredential, SigningKey},
	error::ConfigError,
};

/// Environment variable holding the signing secret.
pub const SIGNING_SECRET_VAR: &str = "QR_SIGNING_SECRET";
/// Environment variable holding the mint bearer token.
pub const MINT_TOKEN_VAR: &str = "QR_MINT_TOKEN";

/// Secrets loaded once at startup and shared read-only afterwards.
#[derive(Clone, Debug)]
pub struct Config {
	/// Key every link is signed and verified with.
	pub signing_key: Arc<SigningKey>,
	/// Credential that gates the mint path.
	pub mint_credential: MintCredential,
}
impl Config {
	/// Builds a configuration from raw secret strings.
	pub fn new(signing_secret: &str, mint_token: &str) -> Result<Self, ConfigError> {
		Ok(Self {
			signing_key: Arc::new(SigningKey::new(signing_secret)?),
			mint_credential: MintCredential::new(mint_token)?,
		})
	}

	/// Loads `QR_SIGNING_SECRET` and `QR_MINT_TOKEN` from the process environment.
	pub fn from_env() -> Result<Self> {
		Ok(Self::from_lookup(|name| std::env::var(name).ok())?)
	}

	/// Loads both variables through `lookup`, which maps a variable name to its value.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let signing_secret = require(SIGNING_SECRET_VAR, lookup(SIGNING_SECRET_VAR))?;
		let mint_token = require(MINT_TOKEN_VAR, lookup(MINT_TOKEN_VAR))?;

		Self::new(&signing_secret, &mint_token)
	}

	/// Parses a JSON document with `signing_secret` and `mint_token` fields.
	pub fn from_json_str(json: &str) -> Result<Self> {
		let de = &mut serde_json::Deserializer::from_str(json);
		let raw: RawConfig = serde_path_to_error::deserialize(de).map_err(ConfigError::from)?;
		let signing_secret = require("signing_secret", raw.signing_secret)?;
		let mint_token = require("mint_token", raw.mint_token)?;

		Ok(Self::new(&signing_secret, &mint_token)?)
	}
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
	#[serde(default)]
	signing_secret: Option<String>,
	#[serde(default)]
	mint_token: Option<String>,
}

fn require(name: &'static str, value: Option<String>) -> Result<String, ConfigError> {
	match value {
		None => Err(ConfigError::Missing { name }),
		Some(value) if value.is_empty() => Err(ConfigError::Empty { name }),
		Some(value) => Ok(value),
	}
}
