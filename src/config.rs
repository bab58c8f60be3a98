use std::env;

use anyhow::Context;

use crate::{db_client::DbConfig, payment_gateway::GatewayCredentials};

/// Fixed parameters attached to every push the payment form makes.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
	pub callback_url: String,
	pub account_reference: String,
	pub transaction_description: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
	pub bind_addr: String,
	pub credentials: GatewayCredentials,
	pub checkout: CheckoutSettings,
	pub db: DbConfig,
}

impl AppConfig {
	pub fn from_env() -> anyhow::Result<Self> {
		let credentials = GatewayCredentials::new(
			required("MPESA_SHORTCODE")?,
			required("MPESA_CONSUMER_KEY")?,
			required("MPESA_CONSUMER_SECRET")?,
			optional("MPESA_PASSKEY", ""),
			&optional("MPESA_TRANSACTION_TYPE", "paybill"),
			&optional("MPESA_ENVIRONMENT", "sandbox"),
		)
		.context("invalid MPESA_TRANSACTION_TYPE")?;

		let checkout = CheckoutSettings {
			callback_url: required("MPESA_CALLBACK_URL")?,
			account_reference: optional("MPESA_ACCOUNT_REFERENCE", "DONATION"),
			transaction_description: optional("MPESA_TRANSACTION_DESC", "Donation ACC"),
		};

		let db = DbConfig {
			host: optional("DB_HOST", "localhost"),
			user: optional("DB_USER", "postgres"),
			password: optional("DB_PASSWORD", ""),
			dbname: optional("DB_NAME", "mpesa"),
		};

		Ok(AppConfig {
			bind_addr: optional("BIND_ADDR", "0.0.0.0:4000"),
			credentials,
			checkout,
			db,
		})
	}
}

fn required(key: &str) -> anyhow::Result<String> {
	env::var(key).with_context(|| format!("{} not set", key))
}

fn optional(key: &str, default: &str) -> String {
	env::var(key).unwrap_or_else(|_| default.to_owned())
}
