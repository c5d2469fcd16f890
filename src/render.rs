//! Render collaborator contract plus the bundled QR renderers.
//!
//! The core never inspects rendered bytes. It only calls [`Renderer::render`] after a link has
//! verified and the resource has passed the guard again, and it reports any failure as an opaque
//! internal error.

#[cfg(feature = "qrcode")] mod qr;
#[cfg(feature = "qrcode")] pub use qr::*;

// self
use crate::_prelude::*;

/// Turns a validated resource string into output bytes.
pub trait Renderer
where
	Self: Send + Sync,
{
	/// MIME type of the bytes returned by [`render`](Renderer::render).
	fn content_type(&self) -> &'static str;

	/// Renders the artifact for `resource`.
	fn render(&self, resource: &str) -> Result<Vec<u8>, RenderError>;
}

/// Failures raised by a [`Renderer`].
#[derive(Debug, ThisError)]
pub enum RenderError {
	/// The resource cannot be represented by the renderer (e.g., too long for a QR symbol).
	#[error("Resource cannot be encoded: {reason}.")]
	Encode {
		/// Renderer-supplied reason string.
		reason: String,
	},
	/// The rendered artifact could not be serialized.
	#[error("Rendered artifact could not be serialized.")]
	Output {
		/// Underlying serialization failure.
		#[source]
		source: Box<dyn StdError + Send + Sync>,
	},
}
impl RenderError {
	/// Builds an [`RenderError::Encode`] from a reason string.
	pub fn encode(reason: impl Into<String>) -> Self {
		Self::Encode { reason: reason.into() }
	}

	/// Wraps a serialization failure inside [`RenderError`].
	pub fn output(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Output { source: Box::new(src) }
	}
}
