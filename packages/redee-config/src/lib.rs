mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, DEFAULT_AUTH_TOKEN, Enrichment, Extraction, Providers, Request, SearchProviderConfig,
	Service,
};

use std::{fs, path::Path};

const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	let search = &cfg.providers.search;

	for (field, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("providers.search.api_base", &search.api_base),
		("providers.search.search_path", &search.search_path),
		("providers.search.detail_path", &search.detail_path),
		("enrichment.page_size_param", &cfg.enrichment.page_size_param),
		("request.enrichment_param", &cfg.request.enrichment_param),
		("request.auth_header", &cfg.request.auth_header),
	] {
		if value.trim().is_empty() {
			return Err(Error::Invalid { field, reason: "must be non-empty" });
		}
	}

	if !search.api_base.starts_with("http://") && !search.api_base.starts_with("https://") {
		return Err(Error::Invalid {
			field: "providers.search.api_base",
			reason: "must be an http or https URL",
		});
	}
	if search.timeout_ms == 0 {
		return Err(Error::Invalid {
			field: "providers.search.timeout_ms",
			reason: "must be greater than zero",
		});
	}
	if search.default_headers.values().any(|value| !value.is_string()) {
		return Err(Error::Invalid {
			field: "providers.search.default_headers",
			reason: "must only contain string values",
		});
	}
	if cfg.enrichment.page_size == 0 {
		return Err(Error::Invalid {
			field: "enrichment.page_size",
			reason: "must be greater than zero",
		});
	}
	if cfg.enrichment.max_concurrency == 0 {
		return Err(Error::Invalid {
			field: "enrichment.max_concurrency",
			reason: "must be greater than zero",
		});
	}
	if cfg.extraction.utc_offset_minutes.abs() >= MAX_UTC_OFFSET_MINUTES {
		return Err(Error::Invalid {
			field: "extraction.utc_offset_minutes",
			reason: "must be within +-18 hours",
		});
	}
	if cfg.request.enrichment_param == cfg.enrichment.page_size_param {
		return Err(Error::Invalid {
			field: "request.enrichment_param",
			reason: "must differ from enrichment.page_size_param",
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let api_base = cfg.providers.search.api_base.trim().trim_end_matches('/').to_string();

	cfg.providers.search.api_base = api_base;

	if cfg.request.default_auth_token.trim().is_empty() {
		cfg.request.default_auth_token = DEFAULT_AUTH_TOKEN.to_string();
	}
}
