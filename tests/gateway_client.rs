use base64::{prelude::BASE64_STANDARD, Engine};
use httpmock::prelude::*;
use mpesa_server::payment_gateway::{GatewayCredentials, GatewayError, MpesaClient, ResolvedEndpoints};
use serde_json::json;

const PASSKEY: &str = "bfb279f9aa9bdbcf158e97dd71a467cd2e0c893059b10f78e6b72ada1ed2c919";
const TOKEN_PATH: &str = "/oauth/v1/generate";
const PUSH_PATH: &str = "/mpesa/stkpush/v1/processrequest";
const QUERY_PATH: &str = "/mpesa/stkpushquery/v1/query";

fn client(server: &MockServer, transaction_type: &str) -> MpesaClient {
	let credentials = GatewayCredentials::new("174379", "key", "secret", PASSKEY, transaction_type, "sandbox").unwrap();
	MpesaClient::with_endpoints(credentials, ResolvedEndpoints::with_base_url(&server.base_url()))
}

/// Password must be base64(shortcode + passkey + Timestamp) for the Timestamp in the same body.
fn password_signs_sent_timestamp(req: &HttpMockRequest) -> bool {
	let Some(body) = req.body.as_deref() else {
		return false;
	};
	let Ok(json) = serde_json::from_slice::<serde_json::Value>(body) else {
		return false;
	};
	let (Some(password), Some(timestamp)) = (json["Password"].as_str(), json["Timestamp"].as_str()) else {
		return false;
	};
	let Ok(decoded) = BASE64_STANDARD.decode(password) else {
		return false;
	};
	timestamp.len() == 14
		&& timestamp.bytes().all(|b| b.is_ascii_digit())
		&& decoded == format!("174379{}{}", PASSKEY, timestamp).into_bytes()
}

async fn mock_token(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path(TOKEN_PATH)
				.query_param("grant_type", "client_credentials")
				.header("Authorization", "Basic a2V5OnNlY3JldA==");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "access_token": "tok-123", "expires_in": "3599" }));
		})
		.await
}

#[tokio::test]
async fn access_token_uses_basic_credentials() {
	let server = MockServer::start_async().await;
	let token_mock = mock_token(&server).await;

	let token = client(&server, "paybill").get_access_token().await.expect("token fetched");
	assert_eq!(token.as_str(), "tok-123");
	token_mock.assert_async().await;
}

#[tokio::test]
async fn unparsable_token_body_is_a_protocol_error() {
	let server = MockServer::start_async().await;
	server
		.mock_async(|when, then| {
			when.method(GET).path(TOKEN_PATH);
			then.status(400).body("");
		})
		.await;

	let err = client(&server, "paybill").get_access_token().await.expect_err("token must fail");
	assert!(matches!(err, GatewayError::Protocol(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn push_request_sends_signed_body_and_returns_identifiers() {
	let server = MockServer::start_async().await;
	let token_mock = mock_token(&server).await;
	let push_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(PUSH_PATH)
				.header("Authorization", "Bearer tok-123")
				.json_body_partial(
					json!({
						"BusinessShortCode": "174379",
						"TransactionType": "CustomerPayBillOnline",
						"Amount": 11,
						"PartyA": "254712345678",
						"PartyB": "174379",
						"PhoneNumber": "254712345678",
						"CallBackURL": "https://example.com/callback",
						"AccountReference": "DONATION",
						"TransactionDesc": "Donation ACC"
					})
					.to_string(),
				)
				.matches(password_signs_sent_timestamp);
			then.status(200).json_body(json!({
				"MerchantRequestID": "29115-34620561-1",
				"CheckoutRequestID": "ws_CO_191220191020363925",
				"ResponseCode": "0",
				"ResponseDescription": "Success. Request accepted for processing",
				"CustomerMessage": "Success. Request accepted for processing"
			}));
		})
		.await;

	let response = client(&server, "paybill")
		.request_push("0712345678", 10.2, "https://example.com/callback", "DONATION", "Donation ACC")
		.await
		.expect("push accepted");

	assert!(response.is_success());
	assert_eq!(response.merchant_request_id, "29115-34620561-1");
	assert_eq!(response.checkout_request_id, "ws_CO_191220191020363925");
	token_mock.assert_async().await;
	push_mock.assert_async().await;
}

#[tokio::test]
async fn till_accounts_send_buy_goods_type() {
	let server = MockServer::start_async().await;
	mock_token(&server).await;
	let push_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(PUSH_PATH)
				.body_contains("\"TransactionType\":\"CustomerBuyGoodsOnline\"");
			then.status(200).json_body(json!({
				"MerchantRequestID": "m-1",
				"CheckoutRequestID": "ws_CO_1",
				"ResponseCode": "0",
				"ResponseDescription": "ok"
			}));
		})
		.await;

	client(&server, "till")
		.request_push("0712345678", 1.0, "https://example.com/callback", "REF", "desc")
		.await
		.expect("push accepted");
	push_mock.assert_async().await;
}

#[tokio::test]
async fn push_error_code_surfaces_error_message() {
	let server = MockServer::start_async().await;
	mock_token(&server).await;
	server
		.mock_async(|when, then| {
			when.method(POST).path(PUSH_PATH);
			then.status(500).json_body(json!({
				"requestId": "r-1",
				"errorCode": "500.001.1001",
				"errorMessage": "X"
			}));
		})
		.await;

	let err = client(&server, "paybill")
		.request_push("0712345678", 5.0, "https://example.com/callback", "REF", "desc")
		.await
		.expect_err("push must fail");
	match err {
		GatewayError::Request(msg) => assert_eq!(msg, "X"),
		other => panic!("unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn push_non_zero_response_code_surfaces_description() {
	let server = MockServer::start_async().await;
	mock_token(&server).await;
	server
		.mock_async(|when, then| {
			when.method(POST).path(PUSH_PATH);
			then.status(200).json_body(json!({
				"MerchantRequestID": "m-1",
				"CheckoutRequestID": "ws_CO_1",
				"ResponseCode": "1",
				"ResponseDescription": "Rejected"
			}));
		})
		.await;

	let err = client(&server, "paybill")
		.request_push("0712345678", 5.0, "https://example.com/callback", "REF", "desc")
		.await
		.expect_err("push must fail");
	assert_eq!(err.to_string(), "Rejected");
	assert!(matches!(err, GatewayError::Request(_)));
}

#[tokio::test]
async fn push_unparsable_body_is_a_protocol_error() {
	let server = MockServer::start_async().await;
	mock_token(&server).await;
	server
		.mock_async(|when, then| {
			when.method(POST).path(PUSH_PATH);
			then.status(502).body("<html>Bad Gateway</html>");
		})
		.await;

	let err = client(&server, "paybill")
		.request_push("0712345678", 5.0, "https://example.com/callback", "REF", "desc")
		.await
		.expect_err("push must fail");
	assert!(matches!(err, GatewayError::Protocol(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn invalid_input_never_reaches_the_network() {
	let server = MockServer::start_async().await;
	let token_mock = mock_token(&server).await;
	let gateway = client(&server, "paybill");

	let err = gateway
		.request_push("712345678", 5.0, "https://example.com/callback", "REF", "desc")
		.await
		.expect_err("bad phone");
	assert_eq!(err.to_string(), "Invalid Phone Number");

	let err = gateway
		.request_push("0712345678", 0.0, "https://example.com/callback", "REF", "desc")
		.await
		.expect_err("bad amount");
	assert!(matches!(err, GatewayError::Validation(_)));

	assert_eq!(token_mock.hits_async().await, 0);
}

#[tokio::test]
async fn query_returns_status_object() {
	let server = MockServer::start_async().await;
	mock_token(&server).await;
	let query_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(QUERY_PATH)
				.header("Authorization", "Bearer tok-123")
				.json_body_partial(
					json!({
						"BusinessShortCode": "174379",
						"CheckoutRequestID": "ws_CO_191220191020363925"
					})
					.to_string(),
				)
				.matches(password_signs_sent_timestamp);
			then.status(200).json_body(json!({
				"ResponseCode": "0",
				"ResponseDescription": "The service request has been accepted successsfully",
				"MerchantRequestID": "29115-34620561-1",
				"CheckoutRequestID": "ws_CO_191220191020363925",
				"ResultCode": "0",
				"ResultDesc": "The service request is processed successfully."
			}));
		})
		.await;

	let status = client(&server, "paybill")
		.query_push("ws_CO_191220191020363925")
		.await
		.expect("query succeeds");
	assert!(status.is_paid());
	assert_eq!(status.checkout_request_id.as_deref(), Some("ws_CO_191220191020363925"));
	query_mock.assert_async().await;
}

#[tokio::test]
async fn query_error_code_surfaces_error_message() {
	let server = MockServer::start_async().await;
	mock_token(&server).await;
	server
		.mock_async(|when, then| {
			when.method(POST).path(QUERY_PATH);
			then.status(500).json_body(json!({
				"requestId": "r-2",
				"errorCode": "500.001.1001",
				"errorMessage": "The transaction is being processed"
			}));
		})
		.await;

	let err = client(&server, "paybill").query_push("ws_CO_1").await.expect_err("still pending");
	match err {
		GatewayError::Request(msg) => assert_eq!(msg, "The transaction is being processed"),
		other => panic!("unexpected error: {other:?}"),
	}
}

#[test]
fn environment_picks_endpoints_at_construction() {
	let live = GatewayCredentials::new("174379", "key", "secret", "", "paybill", "live").unwrap();
	assert!(MpesaClient::new(live).endpoints().push_request_url.starts_with("https://api.safaricom.co.ke/"));

	let typo = GatewayCredentials::new("174379", "key", "secret", "", "paybill", "lve").unwrap();
	assert!(MpesaClient::new(typo).endpoints().push_request_url.starts_with("https://sandbox.safaricom.co.ke/"));
}

#[test]
fn callback_processing_needs_no_network() {
	let credentials = GatewayCredentials::new("174379", "key", "secret", "", "paybill", "sandbox").unwrap();
	let gateway = MpesaClient::new(credentials);
	let body = json!({
		"Body": { "stkCallback": {
			"MerchantRequestID": "m-1",
			"CheckoutRequestID": "ws_CO_1",
			"ResultCode": 1032,
			"ResultDesc": "Request cancelled by user"
		}}
	})
	.to_string();

	let err = gateway.process_callback(&body).expect_err("cancelled");
	assert_eq!(err.to_string(), "Request cancelled by user");
}
