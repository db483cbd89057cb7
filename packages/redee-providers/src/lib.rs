pub mod detail;
pub mod error;
pub mod search;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{
	Client, Response,
	header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue},
};
use serde_json::{Map, Value};

use redee_config::SearchProviderConfig;

/// Client for the upstream listing API. Holds one pooled HTTP client and is shared by every
/// request and every enrichment task.
#[derive(Debug)]
pub struct SearchApi {
	client: Client,
	api_base: String,
	search_path: String,
	detail_path: String,
	default_headers: HeaderMap,
}
impl SearchApi {
	pub fn new(cfg: &SearchProviderConfig) -> Result<Self> {
		let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

		Ok(Self {
			client,
			api_base: cfg.api_base.trim_end_matches('/').to_string(),
			search_path: cfg.search_path.clone(),
			detail_path: cfg.detail_path.trim_end_matches('/').to_string(),
			default_headers: default_headers(&cfg.default_headers)?,
		})
	}

	fn headers(&self, token: &str) -> Result<HeaderMap> {
		let mut headers = self.default_headers.clone();

		headers.insert(AUTHORIZATION, HeaderValue::from_str(token)?);

		Ok(headers)
	}
}

pub fn default_headers(raw: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	for (key, value) in raw {
		let Some(value) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: format!("Default header {key} must be a string."),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, HeaderValue::from_str(value)?);
	}

	Ok(headers)
}

async fn read_body(res: Response) -> Result<String> {
	let status = res.status();
	let body = res.text().await?;

	if !status.is_success() {
		return Err(Error::Status { status: status.as_u16(), body });
	}

	Ok(body)
}
