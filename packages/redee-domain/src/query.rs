use std::collections::HashMap;

/// Inbound parameters after control keys have been consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
	/// Parameters forwarded to the upstream search.
	pub params: HashMap<String, String>,
	pub token: String,
	pub enrich: bool,
}

/// Splits the raw parameter bag into forwarded parameters, the caller's token, and the
/// enrichment flag. Missing maps are treated as empty; nothing here can fail.
pub fn normalize(
	query: Option<HashMap<String, String>>,
	headers: Option<&HashMap<String, String>>,
	names: &redee_config::Request,
) -> NormalizedQuery {
	let mut params = query.unwrap_or_default();
	let enrich = params.remove(&names.enrichment_param).as_deref().is_some_and(parse_flag);
	let token = headers
		.and_then(|headers| header_value(headers, &names.auth_header))
		.map(str::to_string)
		.unwrap_or_else(|| names.default_auth_token.clone());

	NormalizedQuery { params, token, enrich }
}

fn parse_flag(raw: &str) -> bool {
	raw.trim().eq_ignore_ascii_case("true")
}

// Header names are case-insensitive; an exact match is preferred.
fn header_value<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
	if let Some(value) = headers.get(name) {
		return Some(value);
	}

	headers.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
}
