use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_AUTH_TOKEN: &str = "Bearer foo";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub providers: Providers,
	#[serde(default)]
	pub enrichment: Enrichment,
	#[serde(default)]
	pub extraction: Extraction,
	#[serde(default)]
	pub request: Request,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub search: SearchProviderConfig,
}

/// Upstream listing API. Both the search and the detail ("expose") endpoints live under the
/// same base URL and share one pooled HTTP client.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchProviderConfig {
	pub api_base: String,
	pub search_path: String,
	pub detail_path: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Enrichment {
	#[serde(default = "default_page_size_param")]
	pub page_size_param: String,
	#[serde(default = "default_page_size")]
	pub page_size: u32,
	#[serde(default = "default_max_concurrency")]
	pub max_concurrency: usize,
}
impl Default for Enrichment {
	fn default() -> Self {
		Self {
			page_size_param: default_page_size_param(),
			page_size: default_page_size(),
			max_concurrency: default_max_concurrency(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Extraction {
	/// Offset applied to wall-clock times found in listing text.
	///
	/// The offset is fixed and does not follow daylight saving time. The default of `+01:00` is
	/// German standard time, so summer listings read one hour late unless this is set to 120.
	#[serde(default = "default_utc_offset_minutes")]
	pub utc_offset_minutes: i32,
}
impl Default for Extraction {
	fn default() -> Self {
		Self { utc_offset_minutes: default_utc_offset_minutes() }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Request {
	#[serde(default = "default_enrichment_param")]
	pub enrichment_param: String,
	#[serde(default = "default_auth_header")]
	pub auth_header: String,
	#[serde(default = "default_auth_token")]
	pub default_auth_token: String,
}
impl Default for Request {
	fn default() -> Self {
		Self {
			enrichment_param: default_enrichment_param(),
			auth_header: default_auth_header(),
			default_auth_token: default_auth_token(),
		}
	}
}

fn default_page_size_param() -> String {
	"pagesize".to_string()
}

fn default_page_size() -> u32 {
	100
}

fn default_max_concurrency() -> usize {
	8
}

fn default_utc_offset_minutes() -> i32 {
	60
}

fn default_enrichment_param() -> String {
	"appointments".to_string()
}

fn default_auth_header() -> String {
	"Authorization".to_string()
}

fn default_auth_token() -> String {
	DEFAULT_AUTH_TOKEN.to_string()
}
