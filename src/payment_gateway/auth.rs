use base64::{prelude::BASE64_STANDARD, Engine};
use chrono::Local;

/// `Authorization` header value for the token endpoint.
pub fn basic_credentials(consumer_key: &str, consumer_secret: &str) -> String {
	format!("Basic {}", BASE64_STANDARD.encode(format!("{}:{}", consumer_key, consumer_secret)))
}

/// Request password: base64(shortcode + passkey + timestamp).
pub fn generate_password(shortcode: &str, passkey: &str, timestamp: &str) -> String {
	BASE64_STANDARD.encode(format!("{}{}{}", shortcode, passkey, timestamp))
}

/// Current local time as `YYYYMMDDHHmmss`.
pub fn generate_timestamp() -> String {
	Local::now().format("%Y%m%d%H%M%S").to_string()
}
