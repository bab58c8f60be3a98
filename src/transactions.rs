use postgres_from_row::FromRow;
use tokio_postgres::Client;

use crate::payment_gateway::{CallbackPayload, PushResponse};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_FAILED: &str = "failed";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS transactions (
	id SERIAL PRIMARY KEY,
	merchant_request_id VARCHAR(64) NOT NULL,
	checkout_request_id VARCHAR(64) NOT NULL UNIQUE,
	phone_number VARCHAR(16),
	amount BIGINT,
	status VARCHAR(16) NOT NULL DEFAULT 'pending',
	result_code INTEGER,
	result_desc TEXT,
	receipt_number VARCHAR(32)
)";

const COLUMNS: &str =
	"id,merchant_request_id,checkout_request_id,phone_number,amount,status,result_code,result_desc,receipt_number";

#[derive(Debug, Clone, serde::Serialize, FromRow)]
pub struct Transaction {
	pub id: i32,
	pub merchant_request_id: String,
	pub checkout_request_id: String,
	pub phone_number: Option<String>,
	pub amount: Option<i64>,
	pub status: String,
	pub result_code: Option<i32>,
	pub result_desc: Option<String>,
	pub receipt_number: Option<String>,
}

pub async fn ensure_schema(db: &Client) -> Result<(), tokio_postgres::Error> {
	db.batch_execute(CREATE_TABLE).await
}

/// Records a push the gateway accepted, keyed by its request identifiers.
pub async fn insert_pending(db: &Client, push: &PushResponse, phone_number: &str, amount: i64) -> Result<u64, tokio_postgres::Error> {
	let statement = "INSERT INTO transactions (merchant_request_id,checkout_request_id,phone_number,amount,status) VALUES ($1,$2,$3,$4,$5)";
	db.execute(
		statement,
		&[&push.merchant_request_id, &push.checkout_request_id, &phone_number, &amount, &STATUS_PENDING],
	)
	.await
}

const MARK_COMPLETED: &str = "UPDATE transactions SET status=$1,result_code=0,result_desc=$2,receipt_number=$3,amount=COALESCE($4,amount) WHERE checkout_request_id=$5";

/// Whole units the customer paid, as reported by the callback metadata.
pub fn paid_amount(payload: &CallbackPayload) -> Option<i64> {
	payload
		.amount()
		.filter(|amount| amount.is_finite() && *amount >= 0.0)
		.map(|amount| amount.ceil() as i64)
}

pub async fn mark_completed(db: &Client, payload: &CallbackPayload) -> Result<u64, tokio_postgres::Error> {
	db.execute(
		MARK_COMPLETED,
		&[
			&STATUS_COMPLETED,
			&payload.result_desc,
			&payload.receipt_number(),
			&paid_amount(payload),
			&payload.checkout_request_id,
		],
	)
	.await
}

pub async fn mark_failed(db: &Client, checkout_request_id: &str, result_code: i64, description: &str) -> Result<u64, tokio_postgres::Error> {
	let code = i32::try_from(result_code).ok();
	let statement = "UPDATE transactions SET status=$1,result_code=$2,result_desc=$3 WHERE checkout_request_id=$4";
	db.execute(statement, &[&STATUS_FAILED, &code, &description, &checkout_request_id]).await
}

pub async fn find_by_checkout_id(db: &Client, checkout_request_id: &str) -> Result<Option<Transaction>, tokio_postgres::Error> {
	let query = format!("SELECT {} FROM transactions WHERE checkout_request_id=$1", COLUMNS);
	let row = db.query_opt(query.as_str(), &[&checkout_request_id]).await?;
	row.as_ref().map(Transaction::try_from_row).transpose()
}
