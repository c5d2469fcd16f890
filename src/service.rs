//! Framework-agnostic HTTP surface for minting and serving capability links.
//!
//! [`LinkService`] maps an [`http::Request`] to an [`http::Response`] without owning a socket, so
//! any server (hyper, axum, a test harness) can mount it. Two routes exist:
//!
//! - `GET /v1/sign?u=<target>&ttl=<seconds>` behind `Authorization: Bearer <mint token>` returns
//!   the signed path as `text/plain`.
//! - `GET /v1/qr?u=<target>&exp=<unix>&sig=<token>` returns the rendered artifact with
//!   `Cache-Control: no-store`.
//!
//! Expired and forged links both answer `401 unauthorized`; client-input problems answer `400`
//! with the specific reason; render failures answer `500`.

// crates.io
use http::{
	HeaderValue, Request, Response, StatusCode,
	header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{BearerError, MintCredential},
	config::Config,
	issuer::{ErrorClass, LinkError, LinkIssuer, now_unix},
	link::{self, MINT_PATH, PresentedLink, RENDER_PATH},
	render::Renderer,
	token::Field,
};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Request handler for the mint and render routes.
#[derive(Clone)]
pub struct LinkService {
	issuer: LinkIssuer,
	mint_credential: MintCredential,
	renderer: Arc<dyn Renderer>,
}
impl LinkService {
	/// Creates a service from its parts.
	pub fn new(
		issuer: LinkIssuer,
		mint_credential: MintCredential,
		renderer: Arc<dyn Renderer>,
	) -> Self {
		Self { issuer, mint_credential, renderer }
	}

	/// Creates a service with a default issuer built from `config`.
	pub fn from_config(config: &Config, renderer: Arc<dyn Renderer>) -> Self {
		Self::new(
			LinkIssuer::new(config.signing_key.clone()),
			config.mint_credential.clone(),
			renderer,
		)
	}

	/// Issuer backing both routes.
	pub fn issuer(&self) -> &LinkIssuer {
		&self.issuer
	}

	/// Handles `request` at the current time.
	pub fn handle<B>(&self, request: &Request<B>) -> Response<Vec<u8>> {
		self.handle_at(request, now_unix())
	}

	/// Handles `request` as if the current Unix time were `now`.
	pub fn handle_at<B>(&self, request: &Request<B>, now: i64) -> Response<Vec<u8>> {
		match request.uri().path() {
			MINT_PATH => self.sign(request, now),
			RENDER_PATH => self.qr(request, now),
			_ => text(StatusCode::NOT_FOUND, "not found"),
		}
	}

	fn sign<B>(&self, request: &Request<B>, now: i64) -> Response<Vec<u8>> {
		let header = match request.headers().get(AUTHORIZATION).map(HeaderValue::to_str) {
			None => None,
			Some(Ok(value)) => Some(value),
			// Present but not visible ASCII, so it can never match.
			Some(Err(_)) =>
				return text(StatusCode::UNAUTHORIZED, BearerError::Unauthorized.to_string()),
		};

		if let Err(e) = self.mint_credential.authorize(header) {
			return text(StatusCode::UNAUTHORIZED, e.to_string());
		}

		let query = request.uri().query().unwrap_or_default();
		let (resource, ttl) = match (
			link::required(first_param(query, Field::Resource), Field::Resource),
			link::required(first_param(query, Field::Ttl), Field::Ttl),
		) {
			(Ok(resource), Ok(ttl)) => (resource, ttl),
			(Err(e), _) | (_, Err(e)) => return error_response(&e.into()),
		};
		let Ok(ttl) = ttl.parse::<i64>() else {
			return error_response(&LinkError::InvalidTtl { max: self.issuer.max_ttl() });
		};

		match self.issuer.mint_at(&resource, ttl, now) {
			Ok(link) => text(StatusCode::OK, link.path(RENDER_PATH)),
			Err(e) => error_response(&e),
		}
	}

	fn qr<B>(&self, request: &Request<B>, now: i64) -> Response<Vec<u8>> {
		let query = request.uri().query().unwrap_or_default();
		let presented = match PresentedLink::from_query(query) {
			Ok(presented) => presented,
			Err(e) => return error_response(&e.into()),
		};

		match self.issuer.render_at(&presented, self.renderer.as_ref(), now) {
			Ok(body) => {
				let content_type = HeaderValue::from_str(self.renderer.content_type())
					.unwrap_or(HeaderValue::from_static("application/octet-stream"));
				let mut response = Response::new(body);

				response.headers_mut().insert(CONTENT_TYPE, content_type);
				response.headers_mut().insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

				response
			},
			Err(e) => error_response(&e),
		}
	}
}
impl Debug for LinkService {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LinkService")
			.field("issuer", &self.issuer)
			.field("mint_credential", &self.mint_credential)
			.field("renderer", &self.renderer.content_type())
			.finish()
	}
}

/// Maps a [`LinkError`] to its public response.
pub fn error_response(e: &LinkError) -> Response<Vec<u8>> {
	let status = match e.class() {
		ErrorClass::ClientInput => StatusCode::BAD_REQUEST,
		ErrorClass::Unauthorized => StatusCode::UNAUTHORIZED,
		ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
	};

	text(status, e.public_message())
}

fn text(status: StatusCode, body: impl Into<String>) -> Response<Vec<u8>> {
	let mut response = Response::new(body.into().into_bytes());

	*response.status_mut() = status;

	response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));

	response
}

fn first_param(query: &str, field: Field) -> Option<String> {
	form_urlencoded::parse(query.as_bytes())
		.find(|(key, _)| key == field.param())
		.map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::{EchoRenderer, TEST_NOW, build_test_issuer, test_mint_credential};

	fn service() -> LinkService {
		LinkService::new(build_test_issuer(), test_mint_credential(), Arc::new(EchoRenderer))
	}

	fn get(uri: &str) -> Request<()> {
		Request::builder().uri(uri).body(()).expect("Request fixture should build.")
	}

	#[test]
	fn unknown_paths_are_not_found() {
		let response = service().handle_at(&get("/v1/other"), TEST_NOW);

		assert_eq!(response.status(), StatusCode::NOT_FOUND);
	}

	#[test]
	fn first_param_decodes_values() {
		assert_eq!(
			first_param("u=https%3A%2F%2Fa.b%2F&ttl=60&u=x", Field::Resource).as_deref(),
			Some("https://a.b/")
		);
		assert_eq!(first_param("ttl=60", Field::Resource), None);
	}

	#[test]
	fn error_responses_follow_the_error_class() {
		assert_eq!(
			error_response(&LinkError::Malformed(Field::Expiry)).status(),
			StatusCode::BAD_REQUEST
		);
		assert_eq!(error_response(&LinkError::Expired).status(), StatusCode::UNAUTHORIZED);
		assert_eq!(
			error_response(&LinkError::SignatureMismatch).body(),
			error_response(&LinkError::Expired).body()
		);
	}
}
