use thiserror::Error;

pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
	/// Rejected locally, before any network call.
	#[error("{0}")]
	Validation(String),
	/// Transport failure, or a body that is missing or not JSON where one was expected.
	#[error("{0}")]
	Protocol(String),
	/// The gateway answered but reported a business failure.
	#[error("{0}")]
	Request(String),
	/// The asynchronous callback carried a non-zero result code.
	#[error("{description}")]
	Callback {
		result_code: i64,
		description: String,
		checkout_request_id: String,
	},
}

impl GatewayError {
	pub fn validation(message: impl Into<String>) -> Self {
		Self::Validation(message.into())
	}
}

impl From<reqwest::Error> for GatewayError {
	fn from(value: reqwest::Error) -> Self {
		if value.is_decode() {
			return Self::Protocol("failed to decode gateway response body".to_string());
		}
		Self::Protocol(format!("gateway request failed: {value}"))
	}
}

impl From<serde_json::Error> for GatewayError {
	fn from(value: serde_json::Error) -> Self {
		Self::Protocol(format!("malformed gateway payload: {value}"))
	}
}
