// self
use crate::{_prelude::*, obs::Stage};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type Instrumented<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type Instrumented<F> = F;

/// A span wrapper used around token and request handling.
#[derive(Clone, Debug)]
pub struct ObsSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl ObsSpan {
	/// Creates a span for a token-handling stage.
	pub fn token(stage: Stage) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self { span: tracing::info_span!("mpesa_sdk.token", stage = stage.as_str()) }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Creates a span for a business request to `path`.
	pub fn request(path: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self { span: tracing::info_span!("mpesa_sdk.request", path) }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = path;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Notes that the cache could not be used and the caller falls back to a refresh.
pub fn cache_degraded(location: &dyn Display, reason: &str) {
	#[cfg(feature = "tracing")]
	tracing::warn!(%location, reason, "Token cache unreadable; treating as a miss.");

	#[cfg(not(feature = "tracing"))]
	let _ = (location, reason);
}

/// Notes that a fresh token could not be persisted.
pub fn persistence_failed(location: &dyn Display, error: &dyn Display) {
	#[cfg(feature = "tracing")]
	tracing::warn!(%location, %error, "Fresh access token could not be cached.");

	#[cfg(not(feature = "tracing"))]
	let _ = (location, error);
}

/// Emits a request-level debug event when the client runs in debug mode.
pub fn request_debug(enabled: bool, path: &str, status: u16, body_len: usize) {
	#[cfg(feature = "tracing")]
	{
		if enabled {
			tracing::debug!(path, status, body_len, "M-Pesa request completed.");
		}
	}

	#[cfg(not(feature = "tracing"))]
	let _ = (enabled, path, status, body_len);
}
