use futures::{StreamExt, TryStreamExt, stream};
use time::OffsetDateTime;

use redee_domain::{DateExtraction, EnrichedItem, SearchItem};

use crate::{Error, RedeeService, Result};

impl RedeeService {
	/// Looks up every item's detail record and extracts upcoming appointment dates from it.
	///
	/// Returns one entry per input item, in input order. At most
	/// `enrichment.max_concurrency` lookups are in flight. The first failed lookup fails the
	/// whole call and drops every lookup still running.
	pub async fn enrich(&self, items: Vec<SearchItem>, token: &str) -> Result<Vec<EnrichedItem>> {
		let now = OffsetDateTime::now_utc();
		let total = items.len();
		let mut indexed = stream::iter(items.into_iter().enumerate())
			.map(|(index, item)| async move {
				let enriched = self.enrich_item(item, token, now).await?;

				Ok::<_, Error>((index, enriched))
			})
			.buffer_unordered(self.cfg.enrichment.max_concurrency.max(1))
			.try_collect::<Vec<_>>()
			.await?;

		indexed.sort_by_key(|(index, _)| *index);

		let dated = indexed.iter().filter(|(_, item)| item.has_dates()).count();

		tracing::info!(items = total, dated, "Enrichment finished.");

		Ok(indexed.into_iter().map(|(_, item)| item).collect())
	}

	async fn enrich_item(
		&self,
		item: SearchItem,
		token: &str,
		now: OffsetDateTime,
	) -> Result<EnrichedItem> {
		let detail = self
			.providers
			.detail
			.detail(&item.id, token)
			.await
			.map_err(|source| Error::Detail { item_id: item.id.clone(), source })?;
		let dates = detail
			.texts()
			.flat_map(|text| self.providers.extractor.extract(text))
			.filter(|extraction: &DateExtraction| extraction.starts_after(now))
			.collect::<Vec<_>>();

		tracing::debug!(item_id = %item.id, dates = dates.len(), "Item enriched.");

		Ok(EnrichedItem { item, dates, detail_title: detail.title, detail_note: detail.note })
	}
}
