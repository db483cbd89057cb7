//! Maps request failures to the status code and message a caller sees.
//!
//! Upstream providers report their HTTP status structurally, which is used first. Legacy
//! upstream errors only carry text, so the message is also searched for an OAuth token
//! rejection and for an embedded 4xx code.

use std::error::Error as StdError;

use crate::Error;

pub const DEFAULT_ERROR_MESSAGE: &str = "Server error has occurred.";

const AUTH_REJECTION_MARKER: &str = "oauthtoken";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
	pub status: u16,
	pub message: String,
}

pub fn classify(err: &Error) -> Classification {
	let message = message_of(err);
	let upstream = err.upstream_status();
	let status = if upstream == Some(401) || mentions_auth_rejection(&message) {
		401
	} else if let Some(status) = upstream.filter(is_client_error) {
		status
	} else if let Some(status) = client_error_in(&message) {
		status
	} else {
		500
	};

	Classification { status, message }
}

/// Message of the innermost cause, falling back to the error itself and then to
/// [`DEFAULT_ERROR_MESSAGE`].
pub fn message_of(err: &(dyn StdError + 'static)) -> String {
	let mut innermost = err;

	while let Some(source) = innermost.source() {
		innermost = source;
	}

	[innermost.to_string(), err.to_string()]
		.into_iter()
		.map(|message| message.trim().to_string())
		.find(|message| !message.is_empty())
		.unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())
}

fn mentions_auth_rejection(message: &str) -> bool {
	message.to_ascii_lowercase().contains(AUTH_REJECTION_MARKER)
}

fn is_client_error(status: &u16) -> bool {
	(400..500).contains(status)
}

// First standalone three-digit number starting with 4.
fn client_error_in(message: &str) -> Option<u16> {
	message
		.split(|c: char| !c.is_ascii_digit())
		.find(|run| run.len() == 3 && run.starts_with('4'))
		.and_then(|run| run.parse().ok())
}
