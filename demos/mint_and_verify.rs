//! Demonstrates minting a capability link with a freshly generated signing secret and opening it
//! again, including what a tampered link looks like to the verifier.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
// self
use caplink::{
	auth::SigningKey,
	issuer::LinkIssuer,
	link::{PresentedLink, RENDER_PATH},
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let secret = SigningKey::generate_secret();
	let issuer = LinkIssuer::new(Arc::new(SigningKey::new(&secret)?));
	let link = issuer.mint("https://example.com/menu", 300)?;
	let path = link.path(RENDER_PATH);

	println!("Signed path: {path}.");

	let query = path.split_once('?').map(|(_, query)| query).unwrap_or_default();
	let presented = PresentedLink::from_query(query)?;
	let resource = issuer.open(&presented)?;

	println!("Opened resource: {resource}.");

	let mut tampered = presented.clone();

	tampered.resource = "https://example.com/admin".into();

	match issuer.open(&tampered) {
		Ok(_) => println!("Tampered link unexpectedly opened."),
		Err(e) => println!("Tampered link refused: {} ({}).", e.public_message(), e.reason()),
	}

	Ok(())
}
