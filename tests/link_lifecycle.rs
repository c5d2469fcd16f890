// std
use std::sync::Arc;
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use caplink::{
	auth::SigningKey,
	guard::RejectReason,
	issuer::{LinkError, LinkIssuer, now_unix},
	link::{PresentedLink, RENDER_PATH},
	token::{self, Expiry, TOKEN_LEN, Verification},
	url::Url,
};

const T: i64 = 1_700_000_000;

fn issuer() -> LinkIssuer {
	let key = SigningKey::new("lifecycle-secret").expect("Lifecycle key should be valid.");

	LinkIssuer::new(Arc::new(key))
}

#[test]
fn link_minted_with_sixty_second_ttl_expires_after_sixty_seconds() {
	let issuer = issuer();
	let link = issuer.mint_at("https://example.com/img", 60, T).expect("Mint should succeed.");

	assert_eq!(link.expiry.unix(), T + 60);

	let presented = link.to_presented();

	assert!(issuer.open_at(&presented, T).is_ok());
	assert!(issuer.open_at(&presented, T + 60).is_ok());
	assert!(matches!(issuer.open_at(&presented, T + 61), Err(LinkError::Expired)));
}

#[test]
fn wire_format_is_bit_exact() {
	let issuer = issuer();
	let link =
		issuer.mint_at("https://example.com/a b?c=d&e", 300, T).expect("Mint should succeed.");
	let digest = URL_SAFE_NO_PAD.decode(link.token.as_str()).expect("Token should decode.");

	assert_eq!(link.token.as_str().len(), TOKEN_LEN);
	assert_eq!(digest.len(), 32);
	assert!(!link.token.as_str().contains('='));

	let path = link.path(RENDER_PATH);
	let query = path.strip_prefix("/v1/qr?").expect("Path should target the render route.");

	assert!(query.starts_with("u=https%3A%2F%2Fexample.com%2Fa+b%3Fc%3Dd%26e&exp=1700000300&sig="));

	let key = SigningKey::new("lifecycle-secret").expect("Lifecycle key should be valid.");

	assert_eq!(
		token::verify(&link.resource, "1700000300", link.token.as_str(), &key, T),
		Verification::Valid
	);
}

#[test]
fn links_survive_a_trip_through_a_full_url() {
	let issuer = issuer();
	let link = issuer
		.mint_at("https://example.com/path?x=1&y=%20", 120, T)
		.expect("Mint should succeed.");
	let base = Url::parse("https://qr.example.net/v1/qr").expect("Base URL should parse.");
	let url = Url::parse(link.url(&base).as_str()).expect("Link URL should re-parse.");
	let presented = PresentedLink::from_url(&url).expect("Link URL should carry every field.");
	let locator = issuer.open_at(&presented, T + 1).expect("Link should open.");

	assert_eq!(locator.as_str(), "https://example.com/path?x=1&y=%20");
}

#[test]
fn tampering_with_any_field_is_refused() {
	let issuer = issuer();
	let link = issuer.mint_at("https://example.com/img", 60, T).expect("Mint should succeed.");
	let mut resource = link.to_presented();

	resource.resource.push('x');

	assert!(matches!(issuer.open_at(&resource, T), Err(LinkError::SignatureMismatch)));

	let mut expiry = link.to_presented();

	expiry.expiry = (T + 3_600).to_string();

	assert!(matches!(issuer.open_at(&expiry, T), Err(LinkError::SignatureMismatch)));

	let mut swapped = link.to_presented();

	swapped.resource = "https://localhost/img".into();

	assert!(matches!(
		issuer.open_at(&swapped, T),
		Err(LinkError::Rejected(RejectReason::LoopbackHost))
	));
}

#[test]
fn links_from_another_key_are_refused() {
	let link = issuer().mint_at("https://example.com/img", 60, T).expect("Mint should succeed.");
	let other = LinkIssuer::new(Arc::new(
		SigningKey::new("another-secret").expect("Second key should be valid."),
	));

	assert!(matches!(other.open_at(&link.to_presented(), T), Err(LinkError::SignatureMismatch)));
}

#[test]
fn wall_clock_round_trip() {
	let issuer = issuer();
	let link = issuer.mint("https://example.com/now", 60).expect("Mint should succeed.");

	assert!(link.expiry.unix() >= now_unix());
	assert!(issuer.open(&link.to_presented()).is_ok());
}

#[test]
fn codec_is_usable_without_the_issuer() {
	let key = SigningKey::new("lifecycle-secret").expect("Lifecycle key should be valid.");
	let expiry = Expiry::from_unix(T + 60).expect("Expiry should be positive.");
	let token = token::mint("https://example.com/img", expiry, &key);
	let exp = expiry.to_string();

	assert_eq!(
		token::verify("https://example.com/img", &exp, token.as_str(), &key, T + 60),
		Verification::Valid
	);
	assert_eq!(
		token::verify("https://example.com/img", &exp, token.as_str(), &key, T + 61),
		Verification::Expired
	);
}
