pub mod auth;
pub mod callback;
/// Diagnostic descriptions for gateway result and HTTP codes
pub mod codes;
pub mod endpoints;
pub mod error;
pub mod merchant_portal;
pub mod mpesa_payment_gateway;
pub mod phone;
/// Push and query wire types
pub mod stk_push;

pub use callback::CallbackPayload;
pub use endpoints::ResolvedEndpoints;
pub use error::{GatewayError, Result};
pub use merchant_portal::{Environment, GatewayCredentials, TransactionType};
pub use mpesa_payment_gateway::{AccessToken, MpesaClient};
pub use phone::format_phone_number;
pub use stk_push::{PushQueryResponse, PushResponse};
