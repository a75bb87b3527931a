// self
use crate::obs::{Outcome, Stage};

/// Records a token-stage outcome via the global metrics recorder (when enabled).
pub fn record_token_outcome(stage: Stage, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"mpesa_sdk_token_total",
			"stage" => stage.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (stage, outcome);
	}
}

/// Records a business-request outcome via the global metrics recorder (when enabled).
pub fn record_request_outcome(path: &str, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"mpesa_sdk_request_total",
			"path" => path.to_owned(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (path, outcome);
	}
}
