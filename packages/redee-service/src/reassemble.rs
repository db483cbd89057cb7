use redee_domain::{EnrichedItem, SearchItem, SearchPage};

/// Keeps only items with at least one appointment date and describes them as one page.
///
/// The upstream pagination is collapsed: totals and page size equal the kept count, and the
/// result is always page 1 of 1. The search session id and other upstream metadata survive.
pub fn reassemble(
	enriched: Vec<EnrichedItem>,
	original: SearchPage<SearchItem>,
) -> SearchPage<EnrichedItem> {
	let results = enriched.into_iter().filter(EnrichedItem::has_dates).collect::<Vec<_>>();
	let count = u32::try_from(results.len()).unwrap_or(u32::MAX);

	SearchPage {
		results,
		total_results: count,
		page_size: count,
		page_number: 1,
		number_of_pages: 1,
		total_new_results: original.total_new_results,
		search_id: original.search_id,
		extra: original.extra,
	}
}
