use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

use crate::payment_gateway::{
	auth,
	callback::{self, CallbackPayload},
	codes,
	endpoints::ResolvedEndpoints,
	error::{GatewayError, Result},
	merchant_portal::GatewayCredentials,
	phone::format_phone_number,
	stk_push::{classify_response, whole_amount, PushQueryResponse, PushResponse, StkPushRequest, StkQueryRequest},
};

/// Bearer token handed out by the gateway. Never cached; every call fetches its own.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Debug for AccessToken {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("AccessToken(..)")
	}
}

#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
}

/// Client for the M-Pesa Express (STK push) API.
///
/// Holds only read-only configuration, so a clone can be handed to every request.
#[derive(Debug, Clone)]
pub struct MpesaClient {
	client: reqwest::Client,
	credentials: GatewayCredentials,
	endpoints: ResolvedEndpoints,
}

impl MpesaClient {
	pub fn new(credentials: GatewayCredentials) -> Self {
		let endpoints = ResolvedEndpoints::for_environment(credentials.environment);
		Self::with_endpoints(credentials, endpoints)
	}

	pub fn with_endpoints(credentials: GatewayCredentials, endpoints: ResolvedEndpoints) -> Self {
		// no idle connection reuse: each call is its own round trip
		let client = reqwest::Client::builder()
			.pool_max_idle_per_host(0)
			.build()
			.unwrap_or_else(|_| reqwest::Client::new());
		MpesaClient {
			client,
			credentials,
			endpoints,
		}
	}

	pub fn endpoints(&self) -> &ResolvedEndpoints {
		&self.endpoints
	}

	pub async fn get_access_token(&self) -> Result<AccessToken> {
		let url = &self.endpoints.authorization_url;
		log::debug!("mpesa token request to {}", url);
		let res = self
			.client
			.get(url)
			.header(
				AUTHORIZATION,
				auth::basic_credentials(&self.credentials.consumer_key, &self.credentials.consumer_secret),
			)
			.send()
			.await?;
		log_status("token", res.status());

		let body = res.text().await?;
		let token: TokenResponse =
			serde_json::from_str(&body).map_err(|_| GatewayError::Protocol("MPESA Error. Please Contact Admin".to_string()))?;
		Ok(AccessToken(token.access_token))
	}

	/// Sends a payment prompt to `phone` (local `0XXXXXXXXX` form).
	///
	/// The gateway later posts the outcome to `callback_url`. `account_reference` (1-12 chars)
	/// and `description` (1-13 chars) are limits the gateway enforces, not this client.
	pub async fn request_push(
		&self,
		phone: &str,
		amount: f64,
		callback_url: &str,
		account_reference: &str,
		description: &str,
	) -> Result<PushResponse> {
		let phone = format_phone_number(phone)?;
		let amount = whole_amount(amount)?;

		let token = self.get_access_token().await?;
		let timestamp = auth::generate_timestamp();
		let password = self.password(&timestamp);

		let request = StkPushRequest {
			business_short_code: &self.credentials.shortcode,
			password: &password,
			timestamp: &timestamp,
			transaction_type: self.credentials.transaction_type.as_str(),
			amount,
			party_a: &phone,
			party_b: &self.credentials.shortcode,
			phone_number: &phone,
			callback_url,
			account_reference,
			transaction_description: description,
		};

		let url = &self.endpoints.push_request_url;
		log::debug!("mpesa push request to {} for {} (amount {})", url, phone, amount);
		let res = self.client.post(url).bearer_auth(token.as_str()).json(&request).send().await?;
		log_status("push", res.status());

		let body = res.text().await?;
		let response: PushResponse = serde_json::from_value(classify_response(&body)?)?;
		log::info!(
			"mpesa push accepted: merchant request {}, checkout request {}",
			response.merchant_request_id,
			response.checkout_request_id
		);
		Ok(response)
	}

	pub async fn query_push(&self, checkout_request_id: &str) -> Result<PushQueryResponse> {
		let token = self.get_access_token().await?;
		let timestamp = auth::generate_timestamp();
		let password = self.password(&timestamp);

		let request = StkQueryRequest {
			business_short_code: &self.credentials.shortcode,
			password: &password,
			timestamp: &timestamp,
			checkout_request_id,
		};

		let url = &self.endpoints.push_query_url;
		log::debug!("mpesa push query to {} for {}", url, checkout_request_id);
		let res = self.client.post(url).bearer_auth(token.as_str()).json(&request).send().await?;
		log_status("query", res.status());

		let body = res.text().await?;
		Ok(serde_json::from_value(classify_response(&body)?)?)
	}

	/// Parses the body the gateway posted to the callback url. No network I/O.
	pub fn process_callback(&self, body: &str) -> Result<CallbackPayload> {
		callback::process_callback(body)
	}

	fn password(&self, timestamp: &str) -> String {
		auth::generate_password(&self.credentials.shortcode, &self.credentials.passkey, timestamp)
	}
}

fn log_status(call: &str, status: reqwest::StatusCode) {
	if status.is_success() {
		return;
	}
	log::warn!(
		"mpesa {} call returned {} ({})",
		call,
		status.as_u16(),
		codes::http_error_description(status.as_u16()).unwrap_or("unlisted status")
	);
}
