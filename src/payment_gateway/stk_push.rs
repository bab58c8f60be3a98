use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::payment_gateway::{
	callback::optional_code_from_number_or_string,
	error::{GatewayError, Result},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkPushRequest<'a> {
	pub business_short_code: &'a str,
	pub password: &'a str,
	pub timestamp: &'a str,
	pub transaction_type: &'a str,
	pub amount: u64,
	pub party_a: &'a str,
	pub party_b: &'a str,
	pub phone_number: &'a str,
	#[serde(rename = "CallBackURL")]
	pub callback_url: &'a str,
	pub account_reference: &'a str,
	#[serde(rename = "TransactionDesc")]
	pub transaction_description: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkQueryRequest<'a> {
	pub business_short_code: &'a str,
	pub password: &'a str,
	pub timestamp: &'a str,
	#[serde(rename = "CheckoutRequestID")]
	pub checkout_request_id: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushResponse {
	#[serde(rename = "MerchantRequestID")]
	pub merchant_request_id: String,
	#[serde(rename = "CheckoutRequestID")]
	pub checkout_request_id: String,
	#[serde(rename = "ResponseCode")]
	pub response_code: String,
	#[serde(rename = "ResponseDescription")]
	pub response_description: String,
	#[serde(rename = "CustomerMessage", default, skip_serializing_if = "Option::is_none")]
	pub customer_message: Option<String>,
}

impl PushResponse {
	pub fn is_success(&self) -> bool {
		self.response_code == "0"
	}
}

/// Status of an earlier push, as reported by the query endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushQueryResponse {
	#[serde(rename = "ResponseCode")]
	pub response_code: String,
	#[serde(rename = "ResponseDescription", default)]
	pub response_description: String,
	#[serde(rename = "MerchantRequestID", default)]
	pub merchant_request_id: Option<String>,
	#[serde(rename = "CheckoutRequestID", default)]
	pub checkout_request_id: Option<String>,
	#[serde(rename = "ResultCode", default, deserialize_with = "optional_code_from_number_or_string")]
	pub result_code: Option<i64>,
	#[serde(rename = "ResultDesc", default)]
	pub result_desc: Option<String>,
}

impl PushQueryResponse {
	pub fn is_paid(&self) -> bool {
		self.result_code == Some(0)
	}
}

/// The gateway only takes whole units, so fractions round up.
pub fn whole_amount(amount: f64) -> Result<u64> {
	if !amount.is_finite() || amount <= 0.0 {
		return Err(GatewayError::validation("Invalid Amount"));
	}
	Ok(amount.ceil() as u64)
}

/// Sorts a push or query response body into success, gateway error or protocol failure.
///
/// Branching only looks at an `errorCode` field and at `ResponseCode`.
pub fn classify_response(body: &str) -> Result<Value> {
	let value = match serde_json::from_str::<Value>(body) {
		Ok(value @ Value::Object(_)) => value,
		_ => return Err(GatewayError::Protocol("Internal Server Error. Please Contact Admin".to_string())),
	};

	if value.get("errorCode").is_some_and(|code| !code.is_null()) {
		let message = value
			.get("errorMessage")
			.and_then(Value::as_str)
			.unwrap_or("gateway reported an error without a message");
		return Err(GatewayError::Request(message.to_string()));
	}

	match value.get("ResponseCode").and_then(Value::as_str) {
		Some("0") => Ok(value),
		_ => {
			let description = value
				.get("ResponseDescription")
				.and_then(Value::as_str)
				.unwrap_or("gateway response carried no ResponseCode");
			Err(GatewayError::Request(description.to_string()))
		}
	}
}
