//! Human readable descriptions of gateway codes. Used for operator-facing
//! diagnostics only, never to decide what a response means.

const TRANSACTION_ERRORS: &[(i64, &str)] = &[
	(0, "Success"),
	(1, "Insufficient Funds"),
	(2, "Less Than Minimum Transaction Value"),
	(3, "More Than Maximum Transaction Value"),
	(4, "Would Exceed Daily Transfer Limit"),
	(5, "Would Exceed Minimum Balance"),
	(6, "Unresolved Primary Party"),
	(7, "Unresolved Receiver Party"),
	(8, "Would Exceed Maxiumum Balance"),
	(11, "Debit Account Invalid"),
	(12, "Credit Account Invalid"),
	(13, "Unresolved Debit Account"),
	(14, "Unresolved Credit Account"),
	(15, "Duplicate Detected"),
	(17, "Internal Failure"),
	(20, "Unresolved Initiator"),
	(26, "Traffic blocking condition in place"),
	(1032, "Request cancelled by user"),
	(
		1037,
		"STK error. User Cannot be reached. Please ensure that the phone is offline and that the SIM card MPESA Menu is updated. To update SIM, dial *234*1*6#",
	),
	(1025, "An error occurred while sending the STK push request"),
	(9999, "An error occurred while sending the STK push request. MPESA Message Too long"),
	(2001, "Invalid MPESA PIN. Please Try Again"),
	(1019, "Transaction Expired. Please Try Again"),
	(1001, "Transaction Not Completed. A Similar Transaction is Underway"),
];

const HTTP_ERRORS: &[(u16, &str)] = &[
	(400, "Bad Request"),
	(401, "Unauthorized"),
	(403, "Forbidden"),
	(404, "Not Found"),
	(405, "Method Not Allowed"),
	(406, "Not Acceptable - You requested a format that isn't json"),
	(429, "Too Many Requests - You're requesting too many kittens! Slow down!"),
	(500, "Internal Server Error - We had a problem with our server. Try again later."),
	(503, "Service Unavailable - We're temporarily offline for maintenance. Please try again later."),
];

pub fn transaction_error_description(code: i64) -> Option<&'static str> {
	TRANSACTION_ERRORS.iter().find(|(c, _)| *c == code).map(|(_, desc)| *desc)
}

pub fn http_error_description(status: u16) -> Option<&'static str> {
	HTTP_ERRORS.iter().find(|(s, _)| *s == status).map(|(_, desc)| *desc)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn known_codes_resolve() {
		assert_eq!(transaction_error_description(1032), Some("Request cancelled by user"));
		assert_eq!(transaction_error_description(0), Some("Success"));
		assert_eq!(http_error_description(401), Some("Unauthorized"));
	}

	#[test]
	fn unknown_codes_do_not() {
		assert_eq!(transaction_error_description(9), None);
		assert_eq!(http_error_description(418), None);
	}
}
