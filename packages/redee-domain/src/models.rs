use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// One listing as returned by the upstream search. Everything except `id` is owned by upstream
/// and kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
	#[serde(deserialize_with = "string_or_number")]
	pub id: String,
	#[serde(flatten)]
	pub attributes: Map<String, Value>,
}

/// A page of search results with its pagination metadata.
///
/// Top-level fields this service does not interpret are carried in `extra` so a page can be
/// re-emitted unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage<T = SearchItem> {
	#[serde(default = "Vec::new")]
	pub results: Vec<T>,
	pub total_results: u32,
	pub page_size: u32,
	pub page_number: u32,
	pub number_of_pages: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub total_new_results: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub search_id: Option<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Free-text fields of a listing detail record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRecord {
	pub title: Option<String>,
	#[serde(rename = "otherNote")]
	pub note: Option<String>,
}
impl DetailRecord {
	/// Present text fields in extraction order: title first, then note.
	pub fn texts(&self) -> impl Iterator<Item = &str> {
		[self.title.as_deref(), self.note.as_deref()].into_iter().flatten()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateExtraction {
	#[serde(with = "time::serde::rfc3339")]
	pub start: OffsetDateTime,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub end: Option<OffsetDateTime>,
	/// The span of source text the dates were read from.
	pub text: String,
}
impl DateExtraction {
	pub fn starts_after(&self, instant: OffsetDateTime) -> bool {
		self.start > instant
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedItem {
	#[serde(flatten)]
	pub item: SearchItem,
	pub dates: Vec<DateExtraction>,
	pub detail_title: Option<String>,
	pub detail_note: Option<String>,
}
impl EnrichedItem {
	pub fn has_dates(&self) -> bool {
		!self.dates.is_empty()
	}
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Id {
		Text(String),
		Number(u64),
	}

	Ok(match Id::deserialize(deserializer)? {
		Id::Text(text) => text,
		Id::Number(number) => number.to_string(),
	})
}
