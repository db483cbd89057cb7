pub mod classify;
pub mod enrich;
pub mod error;
pub mod handler;
pub mod reassemble;
pub mod search;

pub use classify::{Classification, DEFAULT_ERROR_MESSAGE, classify};
pub use error::{Error, Result};
pub use handler::{HandlerResponse, InboundRequest, ResponseBody};
pub use search::SearchOutcome;

use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use redee_config::Config;
use redee_domain::{DateExtraction, DetailRecord, RuleExtractor, SearchPage};
use redee_providers::SearchApi;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Upstream search. Implementations are shared across concurrent requests.
pub trait SearchProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		params: &'a HashMap<String, String>,
		token: &'a str,
	) -> BoxFuture<'a, redee_providers::Result<SearchPage>>;
}

/// Per-item detail lookup. Called concurrently from every enrichment task.
pub trait DetailProvider
where
	Self: Send + Sync,
{
	fn detail<'a>(
		&'a self,
		item_id: &'a str,
		token: &'a str,
	) -> BoxFuture<'a, redee_providers::Result<DetailRecord>>;
}

/// Text to appointment dates. Must be reentrant: one instance serves every task at once.
pub trait DateExtractor
where
	Self: Send + Sync,
{
	fn extract(&self, text: &str) -> Vec<DateExtraction>;
}

#[derive(Clone)]
pub struct Providers {
	pub search: Arc<dyn SearchProvider>,
	pub detail: Arc<dyn DetailProvider>,
	pub extractor: Arc<dyn DateExtractor>,
}

pub struct RedeeService {
	pub cfg: Config,
	pub providers: Providers,
}

impl SearchProvider for SearchApi {
	fn search<'a>(
		&'a self,
		params: &'a HashMap<String, String>,
		token: &'a str,
	) -> BoxFuture<'a, redee_providers::Result<SearchPage>> {
		Box::pin(SearchApi::search(self, params, token))
	}
}

impl DetailProvider for SearchApi {
	fn detail<'a>(
		&'a self,
		item_id: &'a str,
		token: &'a str,
	) -> BoxFuture<'a, redee_providers::Result<DetailRecord>> {
		Box::pin(SearchApi::detail(self, item_id, token))
	}
}

impl DateExtractor for RuleExtractor {
	fn extract(&self, text: &str) -> Vec<DateExtraction> {
		RuleExtractor::extract(self, text)
	}
}

impl Providers {
	pub fn new(
		search: Arc<dyn SearchProvider>,
		detail: Arc<dyn DetailProvider>,
		extractor: Arc<dyn DateExtractor>,
	) -> Self {
		Self { search, detail, extractor }
	}

	/// Builds the HTTP-backed providers. Search and detail share one connection pool.
	pub fn from_config(cfg: &Config) -> Result<Self> {
		let api = Arc::new(SearchApi::new(&cfg.providers.search)?);
		let extractor = Arc::new(RuleExtractor::from_config(&cfg.extraction)?);

		Ok(Self { search: api.clone(), detail: api, extractor })
	}
}

impl RedeeService {
	pub fn new(cfg: Config) -> Result<Self> {
		let providers = Providers::from_config(&cfg)?;

		Ok(Self { cfg, providers })
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers }
	}
}
