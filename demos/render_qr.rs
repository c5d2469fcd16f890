//! Demonstrates driving the bundled HTTP surface: mint through `/v1/sign`, then fetch the PNG QR
//! code from `/v1/qr` and write it to disk.
//!
//! Reads `QR_SIGNING_SECRET` and `QR_MINT_TOKEN` from the environment, falling back to demo values.

// std
use std::{env, fs, sync::Arc};
// crates.io
use color_eyre::{Result, eyre::eyre};
// self
use caplink::{
	config::{Config, MINT_TOKEN_VAR, SIGNING_SECRET_VAR},
	http::{Request, StatusCode, header::AUTHORIZATION},
	render::QrPngRenderer,
	service::LinkService,
	url::form_urlencoded,
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let config = Config::from_lookup(|name| {
		env::var(name).ok().or_else(|| match name {
			SIGNING_SECRET_VAR => Some("demo-signing-secret".into()),
			MINT_TOKEN_VAR => Some("demo-mint-token".into()),
			_ => None,
		})
	})?;
	let mint_token = env::var(MINT_TOKEN_VAR).unwrap_or_else(|_| "demo-mint-token".into());
	let service = LinkService::from_config(&config, Arc::new(QrPngRenderer::default()));
	let query = form_urlencoded::Serializer::new(String::new())
		.append_pair("u", "https://example.com/menu")
		.append_pair("ttl", "120")
		.finish();
	let sign = Request::builder()
		.uri(format!("/v1/sign?{query}"))
		.header(AUTHORIZATION, format!("Bearer {mint_token}"))
		.body(())?;
	let signed = service.handle(&sign);

	if signed.status() != StatusCode::OK {
		return Err(eyre!("Mint failed with {}.", signed.status()));
	}

	let path = String::from_utf8(signed.into_body())?;

	println!("Signed path: {path}.");

	let fetched = service.handle(&Request::builder().uri(path.as_str()).body(())?);

	if fetched.status() != StatusCode::OK {
		return Err(eyre!("Fetch failed with {}.", fetched.status()));
	}

	let out = env::temp_dir().join("caplink-demo.png");

	fs::write(&out, fetched.body())?;

	println!("Wrote {} bytes to {}.", fetched.body().len(), out.display());

	Ok(())
}
