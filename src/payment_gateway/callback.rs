use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::payment_gateway::{
	codes,
	error::{GatewayError, Result},
};

#[derive(Debug, Deserialize)]
struct CallbackEnvelope {
	#[serde(rename = "Body")]
	body: CallbackBody,
}

#[derive(Debug, Deserialize)]
struct CallbackBody {
	#[serde(rename = "stkCallback")]
	stk_callback: CallbackPayload,
}

/// The `stkCallback` object the gateway posts once the customer acts on the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackPayload {
	#[serde(rename = "MerchantRequestID")]
	pub merchant_request_id: String,
	#[serde(rename = "CheckoutRequestID")]
	pub checkout_request_id: String,
	#[serde(rename = "ResultCode", deserialize_with = "code_from_number_or_string")]
	pub result_code: i64,
	#[serde(rename = "ResultDesc", default)]
	pub result_desc: String,
	#[serde(rename = "CallbackMetadata", default, skip_serializing_if = "Option::is_none")]
	pub callback_metadata: Option<CallbackMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallbackMetadata {
	#[serde(rename = "Item", default)]
	pub items: Vec<MetadataItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataItem {
	#[serde(rename = "Name")]
	pub name: String,
	#[serde(rename = "Value", default, skip_serializing_if = "Option::is_none")]
	pub value: Option<Value>,
}

impl CallbackPayload {
	pub fn is_success(&self) -> bool {
		self.result_code == 0
	}

	fn item(&self, name: &str) -> Option<&Value> {
		self.callback_metadata
			.as_ref()?
			.items
			.iter()
			.find(|item| item.name == name)
			.and_then(|item| item.value.as_ref())
	}

	pub fn amount(&self) -> Option<f64> {
		self.item("Amount").and_then(Value::as_f64)
	}

	pub fn receipt_number(&self) -> Option<&str> {
		self.item("MpesaReceiptNumber").and_then(Value::as_str)
	}

	/// `YYYYMMDDHHmmss`, sent by the gateway as a bare number.
	pub fn transaction_date(&self) -> Option<String> {
		self.item("TransactionDate").map(value_to_plain_string)
	}

	pub fn phone_number(&self) -> Option<String> {
		self.item("PhoneNumber").map(value_to_plain_string)
	}
}

fn value_to_plain_string(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Code {
	Number(i64),
	Text(String),
}

impl Code {
	fn into_i64<E: serde::de::Error>(self) -> std::result::Result<i64, E> {
		match self {
			Code::Number(n) => Ok(n),
			Code::Text(s) => s.trim().parse().map_err(E::custom),
		}
	}
}

/// Result codes arrive as numbers in callbacks and as strings from the query endpoint.
pub(crate) fn code_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
	D: Deserializer<'de>,
{
	Code::deserialize(deserializer)?.into_i64()
}

pub(crate) fn optional_code_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
	D: Deserializer<'de>,
{
	Option::<Code>::deserialize(deserializer)?.map(Code::into_i64).transpose()
}

/// Parses a callback body and fails with [`GatewayError::Callback`] unless the result code is zero.
pub fn process_callback(body: &str) -> Result<CallbackPayload> {
	if body.trim().is_empty() {
		return Err(GatewayError::Protocol("Error Processing Request".to_string()));
	}
	let envelope: CallbackEnvelope = serde_json::from_str(body)?;
	let mut payload = envelope.body.stk_callback;

	if !payload.is_success() {
		if payload.result_desc.trim().is_empty() {
			payload.result_desc = codes::transaction_error_description(payload.result_code)
				.unwrap_or("payment failed")
				.to_string();
		}
		log::warn!(
			"payment {} failed with result code {} ({})",
			payload.checkout_request_id,
			payload.result_code,
			codes::transaction_error_description(payload.result_code).unwrap_or("unknown result code")
		);
		return Err(GatewayError::Callback {
			result_code: payload.result_code,
			description: payload.result_desc,
			checkout_request_id: payload.checkout_request_id,
		});
	}

	log::info!(
		"payment {} completed, receipt {}",
		payload.checkout_request_id,
		payload.receipt_number().unwrap_or("-")
	);
	Ok(payload)
}

#[cfg(test)]
mod tests {
	use super::*;

	const SUCCESS: &str = r#"{
		"Body": {
			"stkCallback": {
				"MerchantRequestID": "29115-34620561-1",
				"CheckoutRequestID": "ws_CO_191220191020363925",
				"ResultCode": 0,
				"ResultDesc": "The service request is processed successfully.",
				"CallbackMetadata": {
					"Item": [
						{ "Name": "Amount", "Value": 1.00 },
						{ "Name": "MpesaReceiptNumber", "Value": "NLJ7RT61SV" },
						{ "Name": "Balance" },
						{ "Name": "TransactionDate", "Value": 20191219102115 },
						{ "Name": "PhoneNumber", "Value": 254708374149 }
					]
				}
			}
		}
	}"#;

	const CANCELLED: &str = r#"{
		"Body": {
			"stkCallback": {
				"MerchantRequestID": "29115-34620561-1",
				"CheckoutRequestID": "ws_CO_191220191020363925",
				"ResultCode": 1032,
				"ResultDesc": "Request cancelled by user"
			}
		}
	}"#;

	#[test]
	fn successful_callback_exposes_metadata() {
		let payload = process_callback(SUCCESS).unwrap();
		assert_eq!(payload.merchant_request_id, "29115-34620561-1");
		assert_eq!(payload.checkout_request_id, "ws_CO_191220191020363925");
		assert_eq!(payload.amount(), Some(1.0));
		assert_eq!(payload.receipt_number(), Some("NLJ7RT61SV"));
		assert_eq!(payload.transaction_date().as_deref(), Some("20191219102115"));
		assert_eq!(payload.phone_number().as_deref(), Some("254708374149"));
	}

	#[test]
	fn cancelled_callback_is_a_callback_error() {
		match process_callback(CANCELLED) {
			Err(err @ GatewayError::Callback { .. }) => {
				assert_eq!(err.to_string(), "Request cancelled by user");
				let GatewayError::Callback {
					result_code,
					checkout_request_id,
					..
				} = err
				else {
					unreachable!()
				};
				assert_eq!(result_code, 1032);
				assert_eq!(checkout_request_id, "ws_CO_191220191020363925");
			}
			other => panic!("unexpected result: {other:?}"),
		}
	}

	#[test]
	fn failed_callback_without_description_uses_code_table() {
		let body = r#"{"Body":{"stkCallback":{"MerchantRequestID":"m-1","CheckoutRequestID":"ws_CO_1","ResultCode":1032}}}"#;
		match process_callback(body) {
			Err(GatewayError::Callback { result_code, description, .. }) => {
				assert_eq!(result_code, 1032);
				assert_eq!(description, "Request cancelled by user");
			}
			other => panic!("unexpected result: {other:?}"),
		}

		let unlisted = body.replace("1032", "4242");
		match process_callback(&unlisted) {
			Err(GatewayError::Callback { description, .. }) => assert_eq!(description, "payment failed"),
			other => panic!("unexpected result: {other:?}"),
		}
	}

	#[test]
	fn string_result_codes_are_accepted() {
		let body = CANCELLED.replace("1032", "\"0\"");
		let payload = process_callback(&body).unwrap();
		assert!(payload.is_success());
		assert!(payload.amount().is_none());
	}

	#[test]
	fn garbage_is_a_protocol_error() {
		for body in ["", "   ", "not json", "{\"Body\":{}}", "HTTP/1.1 200 OK\r\n\r\n"] {
			assert!(matches!(process_callback(body), Err(GatewayError::Protocol(_))), "body {body:?}");
		}
	}
}
