use std::{collections::HashMap, mem};

use serde::Serialize;

use redee_domain::{EnrichedItem, SearchPage};

use crate::{Error, RedeeService, Result, reassemble::reassemble};

/// What a search request produces: the upstream page as-is, or the enriched single page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchOutcome {
	Plain(SearchPage),
	Enriched(SearchPage<EnrichedItem>),
}

impl RedeeService {
	pub async fn execute(
		&self,
		mut params: HashMap<String, String>,
		token: &str,
		enrich: bool,
	) -> Result<SearchOutcome> {
		if !enrich {
			let page = self.search_page(&params, token).await?;

			return Ok(SearchOutcome::Plain(page));
		}

		let enrichment = &self.cfg.enrichment;

		params.insert(enrichment.page_size_param.clone(), enrichment.page_size.to_string());

		let mut page = self.search_page(&params, token).await?;
		let items = mem::take(&mut page.results);

		tracing::info!(items = items.len(), "Enriching search page.");

		let enriched = self.enrich(items, token).await?;

		Ok(SearchOutcome::Enriched(reassemble(enriched, page)))
	}

	async fn search_page(
		&self,
		params: &HashMap<String, String>,
		token: &str,
	) -> Result<SearchPage> {
		self.providers
			.search
			.search(params, token)
			.await
			.map_err(|source| Error::Search { source })
	}
}
