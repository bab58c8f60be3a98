use std::str::FromStr;

use crate::payment_gateway::error::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
	PayBillOnline,
	BuyGoodsOnline,
}

impl TransactionType {
	/// Value sent in the `TransactionType` field of a push request.
	pub fn as_str(&self) -> &'static str {
		match self {
			TransactionType::PayBillOnline => "CustomerPayBillOnline",
			TransactionType::BuyGoodsOnline => "CustomerBuyGoodsOnline",
		}
	}
}

impl FromStr for TransactionType {
	type Err = GatewayError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"paybill" => Ok(TransactionType::PayBillOnline),
			"till" => Ok(TransactionType::BuyGoodsOnline),
			_ => Err(GatewayError::validation("Invalid Transaction Type")),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
	Live,
	Sandbox,
}

impl Environment {
	/// Only the exact flag `"live"` selects production. Everything else is sandbox.
	pub fn from_flag(flag: &str) -> Self {
		match flag {
			"live" => Environment::Live,
			"sandbox" => Environment::Sandbox,
			other => {
				log::warn!("unrecognised mpesa environment {:?}, falling back to sandbox", other);
				Environment::Sandbox
			}
		}
	}
}

/// Merchant credentials. Read-only once built.
#[derive(Clone)]
pub struct GatewayCredentials {
	pub shortcode: String,
	pub consumer_key: String,
	pub consumer_secret: String,
	pub passkey: String,
	pub transaction_type: TransactionType,
	pub environment: Environment,
}

impl GatewayCredentials {
	pub fn new(
		shortcode: impl Into<String>,
		consumer_key: impl Into<String>,
		consumer_secret: impl Into<String>,
		passkey: impl Into<String>,
		transaction_type: &str,
		environment: &str,
	) -> Result<Self, GatewayError> {
		Ok(GatewayCredentials {
			shortcode: shortcode.into(),
			consumer_key: consumer_key.into(),
			consumer_secret: consumer_secret.into(),
			passkey: passkey.into(),
			transaction_type: transaction_type.parse()?,
			environment: Environment::from_flag(environment),
		})
	}
}

// secrets stay out of logs
impl std::fmt::Debug for GatewayCredentials {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GatewayCredentials")
			.field("shortcode", &self.shortcode)
			.field("transaction_type", &self.transaction_type)
			.field("environment", &self.environment)
			.finish_non_exhaustive()
	}
}
