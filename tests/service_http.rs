// std
use std::sync::Arc;
// self
use caplink::{
	config::{Config, MINT_TOKEN_VAR, SIGNING_SECRET_VAR},
	http::{
		Request, Response, StatusCode,
		header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE},
	},
	render::{RenderError, Renderer},
	service::LinkService,
};

const T: i64 = 1_700_000_000;
const MINT_TOKEN: &str = "service-mint-token";

struct UpperRenderer;
impl Renderer for UpperRenderer {
	fn content_type(&self) -> &'static str {
		"text/x-upper"
	}

	fn render(&self, resource: &str) -> Result<Vec<u8>, RenderError> {
		Ok(resource.to_uppercase().into_bytes())
	}
}

struct BrokenRenderer;
impl Renderer for BrokenRenderer {
	fn content_type(&self) -> &'static str {
		"image/png"
	}

	fn render(&self, _resource: &str) -> Result<Vec<u8>, RenderError> {
		Err(RenderError::encode("data too long"))
	}
}

fn config() -> Config {
	Config::from_lookup(|name| match name {
		SIGNING_SECRET_VAR => Some("service-signing-secret".into()),
		MINT_TOKEN_VAR => Some(MINT_TOKEN.into()),
		_ => None,
	})
	.expect("Service configuration should load.")
}

fn service(renderer: Arc<dyn Renderer>) -> LinkService {
	LinkService::from_config(&config(), renderer)
}

fn sign_request(query: &str, bearer: Option<&str>) -> Request<()> {
	let mut builder = Request::builder().uri(format!("/v1/sign?{query}"));

	if let Some(token) = bearer {
		builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
	}

	builder.body(()).expect("Sign request should build.")
}

fn get(uri: &str) -> Request<()> {
	Request::builder().uri(uri).body(()).expect("Request should build.")
}

fn body_text(response: &Response<Vec<u8>>) -> &str {
	std::str::from_utf8(response.body()).expect("Response body should be UTF-8.")
}

fn mint_path(service: &LinkService, target: &str, ttl: i64) -> String {
	let query = format!("u={target}&ttl={ttl}");
	let response = service.handle_at(&sign_request(&query, Some(MINT_TOKEN)), T);

	assert_eq!(response.status(), StatusCode::OK, "{}", body_text(&response));

	body_text(&response).to_owned()
}

#[test]
fn sign_then_fetch_renders_the_target() {
	let service = service(Arc::new(UpperRenderer));
	let path = mint_path(&service, "https%3A%2F%2Fexample.com%2Fimg", 60);

	assert!(path.starts_with("/v1/qr?u=https%3A%2F%2Fexample.com%2Fimg&exp=1700000060&sig="));

	let response = service.handle_at(&get(&path), T + 60);

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(response.headers()[CONTENT_TYPE], "text/x-upper");
	assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
	assert_eq!(body_text(&response), "HTTPS://EXAMPLE.COM/IMG");
}

#[test]
fn sign_requires_the_mint_credential() {
	let service = service(Arc::new(UpperRenderer));
	let query = "u=https%3A%2F%2Fexample.com&ttl=60";
	let missing = service.handle_at(&sign_request(query, None), T);

	assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(body_text(&missing), "missing Authorization header");

	let wrong = service.handle_at(&sign_request(query, Some("nope")), T);

	assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(body_text(&wrong), "unauthorized");
}

#[test]
fn sign_validates_its_inputs() {
	let service = service(Arc::new(UpperRenderer));

	for (query, status) in [
		("ttl=60", StatusCode::BAD_REQUEST),
		("u=https%3A%2F%2Fexample.com", StatusCode::BAD_REQUEST),
		("u=https%3A%2F%2Fexample.com&ttl=abc", StatusCode::BAD_REQUEST),
		("u=https%3A%2F%2Fexample.com&ttl=0", StatusCode::BAD_REQUEST),
		("u=https%3A%2F%2Fexample.com&ttl=86401", StatusCode::BAD_REQUEST),
		("u=ftp%3A%2F%2Fexample.com&ttl=60", StatusCode::BAD_REQUEST),
	] {
		let response = service.handle_at(&sign_request(query, Some(MINT_TOKEN)), T);

		assert_eq!(response.status(), status, "{query}");
	}

	let response = service
		.handle_at(&sign_request("u=https%3A%2F%2Flocalhost%2Fx&ttl=60", Some(MINT_TOKEN)), T);

	assert_eq!(body_text(&response), "Invalid target url: localhost not allowed.");
}

#[test]
fn expired_and_forged_links_look_identical() {
	let service = service(Arc::new(UpperRenderer));
	let path = mint_path(&service, "https%3A%2F%2Fexample.com%2Fimg", 60);
	let expired = service.handle_at(&get(&path), T + 61);
	let forged_path = path.replace("%2Fimg", "%2Fother");
	let forged = service.handle_at(&get(&forged_path), T);

	assert_eq!(expired.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(expired.body(), forged.body());
	assert_eq!(body_text(&expired), "unauthorized");
}

#[test]
fn fetch_reports_client_input_errors() {
	let service = service(Arc::new(UpperRenderer));
	let missing = service.handle_at(&get("/v1/qr?u=https%3A%2F%2Fexample.com&exp=1"), T);

	assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
	assert_eq!(body_text(&missing), "Missing or invalid `sig` parameter.");

	let bad_exp = service.handle_at(&get("/v1/qr?u=https%3A%2F%2Fexample.com&exp=-1&sig=AAAA"), T);

	assert_eq!(bad_exp.status(), StatusCode::BAD_REQUEST);

	let bad_target = service.handle_at(&get("/v1/qr?u=file%3A%2F%2F%2Fetc&exp=1&sig=AAAA"), T);

	assert_eq!(bad_target.status(), StatusCode::BAD_REQUEST);
	assert_eq!(body_text(&bad_target), "Invalid target url: scheme must be http or https.");
}

#[test]
fn render_failures_are_opaque() {
	let service = service(Arc::new(BrokenRenderer));
	let path = mint_path(&service, "https%3A%2F%2Fexample.com%2Fimg", 60);
	let response = service.handle_at(&get(&path), T);

	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(body_text(&response), "failed to render");
}

#[cfg(feature = "qrcode")]
#[test]
fn bundled_png_renderer_serves_png() {
	let service = service(Arc::new(caplink::render::QrPngRenderer::default()));
	let path = mint_path(&service, "https%3A%2F%2Fexample.com%2Fimg", 60);
	let response = service.handle_at(&get(&path), T);

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(response.headers()[CONTENT_TYPE], "image/png");
	assert!(response.body().starts_with(&[0x89, b'P', b'N', b'G']));
}
