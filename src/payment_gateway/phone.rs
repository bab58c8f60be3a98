use crate::payment_gateway::error::{GatewayError, Result};

/// Turns a local `0XXXXXXXXX` number into the `254XXXXXXXXX` form the gateway expects.
pub fn format_phone_number(phone: &str) -> Result<String> {
	let valid = phone.len() == 10 && phone.starts_with('0') && phone.bytes().all(|b| b.is_ascii_digit());
	if !valid {
		return Err(GatewayError::validation("Invalid Phone Number"));
	}
	Ok(format!("254{}", &phone[1..]))
}
