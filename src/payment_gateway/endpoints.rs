use crate::payment_gateway::merchant_portal::Environment;

const SANDBOX_AUTHORIZATION_URL: &str = "https://sandbox.safaricom.co.ke/oauth/v1/generate?grant_type=client_credentials";
const SANDBOX_STKPUSH_REQUEST_URL: &str = "https://sandbox.safaricom.co.ke/mpesa/stkpush/v1/processrequest";
const SANDBOX_STKPUSH_QUERY_URL: &str = "https://sandbox.safaricom.co.ke/mpesa/stkpushquery/v1/query";

const LIVE_AUTHORIZATION_URL: &str = "https://api.safaricom.co.ke/oauth/v1/generate?grant_type=client_credentials";
const LIVE_STKPUSH_REQUEST_URL: &str = "https://api.safaricom.co.ke/mpesa/stkpush/v1/processrequest";
const LIVE_STKPUSH_QUERY_URL: &str = "https://api.safaricom.co.ke/mpesa/stkpushquery/v1/query";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoints {
	pub authorization_url: String,
	pub push_request_url: String,
	pub push_query_url: String,
}

impl ResolvedEndpoints {
	pub fn for_environment(environment: Environment) -> Self {
		let (auth, request, query) = match environment {
			Environment::Live => (LIVE_AUTHORIZATION_URL, LIVE_STKPUSH_REQUEST_URL, LIVE_STKPUSH_QUERY_URL),
			Environment::Sandbox => (SANDBOX_AUTHORIZATION_URL, SANDBOX_STKPUSH_REQUEST_URL, SANDBOX_STKPUSH_QUERY_URL),
		};
		ResolvedEndpoints {
			authorization_url: auth.to_owned(),
			push_request_url: request.to_owned(),
			push_query_url: query.to_owned(),
		}
	}

	/// All three endpoints under one base url, using the gateway's paths.
	pub fn with_base_url(base_url: &str) -> Self {
		let base = base_url.trim_end_matches('/');
		ResolvedEndpoints {
			authorization_url: format!("{}/oauth/v1/generate?grant_type=client_credentials", base),
			push_request_url: format!("{}/mpesa/stkpush/v1/processrequest", base),
			push_query_url: format!("{}/mpesa/stkpushquery/v1/query", base),
		}
	}
}
