// std
use std::io::Cursor;
// crates.io
use image::{ImageFormat, Luma};
use qrcode::{EcLevel, QrCode, render::svg};
// self
use crate::render::{RenderError, Renderer};

/// Minimum edge length, in pixels, of rendered QR symbols.
pub const DEFAULT_QR_SIZE: u32 = 256;

/// Renders resources as PNG QR codes at the highest error-correction level.
#[derive(Clone, Copy, Debug)]
pub struct QrPngRenderer {
	size: u32,
	ec_level: EcLevel,
}
impl QrPngRenderer {
	/// Overrides the minimum edge length in pixels.
	pub fn with_size(mut self, size: u32) -> Self {
		self.size = size;

		self
	}

	/// Overrides the error-correction level.
	pub fn with_ec_level(mut self, ec_level: EcLevel) -> Self {
		self.ec_level = ec_level;

		self
	}
}
impl Default for QrPngRenderer {
	fn default() -> Self {
		Self { size: DEFAULT_QR_SIZE, ec_level: EcLevel::H }
	}
}
impl Renderer for QrPngRenderer {
	fn content_type(&self) -> &'static str {
		"image/png"
	}

	fn render(&self, resource: &str) -> Result<Vec<u8>, RenderError> {
		let image = encode(resource, self.ec_level)?
			.render::<Luma<u8>>()
			.min_dimensions(self.size, self.size)
			.build();
		let mut png = Vec::new();

		image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png).map_err(RenderError::output)?;

		Ok(png)
	}
}

/// Renders resources as SVG QR codes.
#[derive(Clone, Copy, Debug)]
pub struct QrSvgRenderer {
	size: u32,
	ec_level: EcLevel,
}
impl QrSvgRenderer {
	/// Overrides the minimum edge length in pixels.
	pub fn with_size(mut self, size: u32) -> Self {
		self.size = size;

		self
	}
}
impl Default for QrSvgRenderer {
	fn default() -> Self {
		Self { size: DEFAULT_QR_SIZE, ec_level: EcLevel::H }
	}
}
impl Renderer for QrSvgRenderer {
	fn content_type(&self) -> &'static str {
		"image/svg+xml"
	}

	fn render(&self, resource: &str) -> Result<Vec<u8>, RenderError> {
		let svg = encode(resource, self.ec_level)?
			.render::<svg::Color>()
			.min_dimensions(self.size, self.size)
			.dark_color(svg::Color("#000000"))
			.light_color(svg::Color("#ffffff"))
			.build();

		Ok(svg.into_bytes())
	}
}

fn encode(resource: &str, ec_level: EcLevel) -> Result<QrCode, RenderError> {
	QrCode::with_error_correction_level(resource.as_bytes(), ec_level)
		.map_err(|e| RenderError::encode(e.to_string()))
}
