use axum::{
	extract::{rejection::FormRejection, Path, State},
	response::{Html, IntoResponse, Redirect, Response},
	routing::{get, post},
	Form, Json, Router,
};
use hyper::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
	config::CheckoutSettings,
	db_client::{db_client, DbConfig},
	payment_gateway::{format_phone_number, stk_push::whole_amount, GatewayError, MpesaClient, PushQueryResponse},
	transactions::{self, Transaction},
};

#[derive(Clone)]
pub struct AppState {
	pub gateway: MpesaClient,
	pub db: DbConfig,
	pub checkout: CheckoutSettings,
}

#[derive(Debug, Error)]
pub enum AppError {
	#[error(transparent)]
	Gateway(#[from] GatewayError),
	#[error("database error: {0}")]
	Database(#[from] tokio_postgres::Error),
	#[error("transaction {0} not found")]
	NotFound(String),
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response {
		let (status, code) = match &self {
			AppError::Gateway(GatewayError::Validation(_)) => (StatusCode::BAD_REQUEST, "VALIDATION"),
			AppError::Gateway(GatewayError::Request(_)) => (StatusCode::BAD_GATEWAY, "GATEWAY_REQUEST"),
			AppError::Gateway(GatewayError::Protocol(_)) => (StatusCode::BAD_GATEWAY, "GATEWAY_PROTOCOL"),
			AppError::Gateway(GatewayError::Callback { .. }) => (StatusCode::UNPROCESSABLE_ENTITY, "GATEWAY_CALLBACK"),
			AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE"),
			AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
		};
		if status.is_server_error() {
			log::error!("{}", self);
		} else {
			log::warn!("{}", self);
		}
		(status, Json(json!({ "code": code, "message": self.to_string() }))).into_response()
	}
}

#[derive(serde::Deserialize, Debug)]
pub struct PaymentForm {
	phone: String,
	amount: f64,
}

const PAYMENT_FORM: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
	<meta charset="UTF-8">
	<meta name="viewport" content="width=device-width, initial-scale=1.0">
	<title>MPESA</title>
</head>
<body>
<form action="/" method="POST">
	<h1>Make Payment</h1>
	<div>
		<label for="phone">Phone Number (Format: 07xxxxxxxx. e.g. 0712345678)</label>
		<input id="phone" name="phone" type="text" placeholder="07XXXXXXXX" required>
	</div>
	<div>
		<label for="amount">Amount (Min: 1)</label>
		<input id="amount" name="amount" type="number" min="1" step="any" placeholder="amount" required>
	</div>
	<button type="submit">Make Payment</button>
</form>
</body>
</html>"#;

const THANK_YOU: &str = "<!DOCTYPE html><html lang=\"en\"><body><h1>Thank you</h1><p>Check your phone to complete the payment.</p></body></html>";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/", get(payment_form).post(submit_payment))
		.route("/thank-you", get(thank_you))
		.route("/callback", post(mpesa_callback))
		.route("/transactions/:checkout_request_id", get(get_transaction))
		.route("/transactions/:checkout_request_id/status", get(transaction_status))
		.with_state(state)
}

async fn payment_form() -> Html<&'static str> {
	Html(PAYMENT_FORM)
}

async fn thank_you() -> Html<&'static str> {
	Html(THANK_YOU)
}

async fn submit_payment(State(state): State<AppState>, form: Result<Form<PaymentForm>, FormRejection>) -> Result<Redirect, AppError> {
	let Form(form) = form.map_err(|rejection| GatewayError::validation(rejection.body_text()))?;
	let checkout = &state.checkout;
	let push = state
		.gateway
		.request_push(
			&form.phone,
			form.amount,
			&checkout.callback_url,
			&checkout.account_reference,
			&checkout.transaction_description,
		)
		.await?;

	let phone = format_phone_number(&form.phone)?;
	let amount = i64::try_from(whole_amount(form.amount)?).unwrap_or(i64::MAX);
	let db = db_client(&state.db).await?;
	transactions::insert_pending(&db, &push, &phone, amount).await?;

	Ok(Redirect::to("/thank-you"))
}

async fn mpesa_callback(State(state): State<AppState>, body: String) -> Result<(StatusCode, Json<Value>), AppError> {
	match state.gateway.process_callback(&body) {
		Ok(payload) => {
			let db = db_client(&state.db).await?;
			if transactions::mark_completed(&db, &payload).await? == 0 {
				log::warn!("callback for unknown checkout request {}", payload.checkout_request_id);
			}
		}
		Err(GatewayError::Callback {
			result_code,
			description,
			checkout_request_id,
		}) => {
			let db = db_client(&state.db).await?;
			if transactions::mark_failed(&db, &checkout_request_id, result_code, &description).await? == 0 {
				log::warn!("callback for unknown checkout request {}", checkout_request_id);
			}
		}
		Err(e) => {
			log::warn!("rejecting malformed mpesa callback: {}", e);
			return Ok((StatusCode::BAD_REQUEST, Json(json!({ "ResultCode": 1, "ResultDesc": e.to_string() }))));
		}
	}
	Ok((StatusCode::OK, Json(json!({ "ResultCode": 0, "ResultDesc": "Accepted" }))))
}

async fn get_transaction(State(state): State<AppState>, Path(checkout_request_id): Path<String>) -> Result<Json<Transaction>, AppError> {
	let db = db_client(&state.db).await?;
	match transactions::find_by_checkout_id(&db, &checkout_request_id).await? {
		Some(transaction) => Ok(Json(transaction)),
		None => Err(AppError::NotFound(checkout_request_id)),
	}
}

async fn transaction_status(
	State(state): State<AppState>,
	Path(checkout_request_id): Path<String>,
) -> Result<Json<PushQueryResponse>, AppError> {
	Ok(Json(state.gateway.query_push(&checkout_request_id).await?))
}
