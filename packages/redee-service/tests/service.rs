use std::{
	collections::HashMap,
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use serde_json::{Map, Value};
use time::{OffsetDateTime, UtcOffset};

use redee_config::{Config, Enrichment, Extraction, Providers as ProviderSettings, Request};
use redee_domain::{DetailRecord, RuleExtractor, SearchItem, SearchPage};
use redee_service::{
	BoxFuture, DEFAULT_ERROR_MESSAGE, DateExtractor, DetailProvider, InboundRequest, Providers,
	RedeeService, ResponseBody, SearchOutcome, SearchProvider,
};

struct StaticSearch {
	page: SearchPage,
	calls: Mutex<Vec<(HashMap<String, String>, String)>>,
}
impl StaticSearch {
	fn new(page: SearchPage) -> Self {
		Self { page, calls: Mutex::new(Vec::new()) }
	}

	fn calls(&self) -> Vec<(HashMap<String, String>, String)> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl SearchProvider for StaticSearch {
	fn search<'a>(
		&'a self,
		params: &'a HashMap<String, String>,
		token: &'a str,
	) -> BoxFuture<'a, redee_providers::Result<SearchPage>> {
		self.calls
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.push((params.clone(), token.to_string()));

		let page = self.page.clone();

		Box::pin(async move { Ok(page) })
	}
}

struct PanickingSearch;
impl SearchProvider for PanickingSearch {
	fn search<'a>(
		&'a self,
		_params: &'a HashMap<String, String>,
		_token: &'a str,
	) -> BoxFuture<'a, redee_providers::Result<SearchPage>> {
		Box::pin(async move { explode() })
	}
}

fn explode() -> redee_providers::Result<SearchPage> {
	std::panic::panic_any(())
}

#[derive(Clone)]
enum Reply {
	Record(DetailRecord),
	Fail(String),
}

#[derive(Default)]
struct ScriptedDetail {
	replies: HashMap<String, (Reply, Duration)>,
	in_flight: AtomicUsize,
	peak: AtomicUsize,
	completed: AtomicUsize,
}
impl ScriptedDetail {
	fn with(mut self, id: &str, reply: Reply, delay: Duration) -> Self {
		self.replies.insert(id.to_string(), (reply, delay));

		self
	}
}
impl DetailProvider for ScriptedDetail {
	fn detail<'a>(
		&'a self,
		item_id: &'a str,
		_token: &'a str,
	) -> BoxFuture<'a, redee_providers::Result<DetailRecord>> {
		Box::pin(async move {
			let (reply, delay) = self
				.replies
				.get(item_id)
				.cloned()
				.unwrap_or((Reply::Record(DetailRecord::default()), Duration::ZERO));
			let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;

			self.peak.fetch_max(current, Ordering::SeqCst);

			tokio::time::sleep(delay).await;

			self.in_flight.fetch_sub(1, Ordering::SeqCst);
			self.completed.fetch_add(1, Ordering::SeqCst);

			match reply {
				Reply::Record(record) => Ok(record),
				Reply::Fail(message) => Err(redee_providers::Error::InvalidResponse { message }),
			}
		})
	}
}

struct SpyExtractor {
	inner: RuleExtractor,
	calls: AtomicUsize,
}
impl DateExtractor for SpyExtractor {
	fn extract(&self, text: &str) -> Vec<redee_domain::DateExtraction> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		self.inner.extract(text)
	}
}

fn extractor() -> Arc<SpyExtractor> {
	Arc::new(SpyExtractor {
		inner: RuleExtractor::new(UtcOffset::UTC).expect("patterns must compile"),
		calls: AtomicUsize::new(0),
	})
}

fn test_config(max_concurrency: usize) -> Config {
	Config {
		service: redee_config::Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		providers: ProviderSettings {
			search: redee_config::SearchProviderConfig {
				api_base: "http://127.0.0.1:1".to_string(),
				search_path: "/search".to_string(),
				detail_path: "/expose".to_string(),
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		enrichment: Enrichment {
			page_size_param: "pagesize".to_string(),
			page_size: 100,
			max_concurrency,
		},
		extraction: Extraction { utc_offset_minutes: 0 },
		request: Request::default(),
	}
}

fn item(id: &str) -> SearchItem {
	let mut attributes = Map::new();

	attributes.insert("infoLine".to_string(), Value::String(format!("Listing {id}")));

	SearchItem { id: id.to_string(), attributes }
}

fn upstream_page(ids: &[&str]) -> SearchPage {
	SearchPage {
		results: ids.iter().map(|id| item(id)).collect(),
		total_results: 57,
		page_size: 20,
		page_number: 1,
		number_of_pages: 3,
		total_new_results: Some(2),
		search_id: Some("search-42".to_string()),
		extra: Map::new(),
	}
}

fn record(title: Option<&str>, note: Option<&str>) -> Reply {
	Reply::Record(DetailRecord {
		title: title.map(str::to_string),
		note: note.map(str::to_string),
	})
}

fn service(
	search: Arc<dyn SearchProvider>,
	detail: Arc<dyn DetailProvider>,
	extractor: Arc<dyn DateExtractor>,
	max_concurrency: usize,
) -> RedeeService {
	RedeeService::with_providers(
		test_config(max_concurrency),
		Providers::new(search, detail, extractor),
	)
}

fn enrich_request() -> InboundRequest {
	InboundRequest {
		query_string_parameters: Some(HashMap::from([
			("appointments".to_string(), "true".to_string()),
			("geocodes".to_string(), "1276003001".to_string()),
		])),
		headers: Some(HashMap::from([("Authorization".to_string(), "Bearer abc".to_string())])),
	}
}

fn scenario_b_detail() -> ScriptedDetail {
	ScriptedDetail::default()
		.with("1", record(None, Some("Besichtigung am 12.06.2099 um 17:00")), Duration::ZERO)
		.with("2", record(Some("Open house 2099-07-01 10:00"), None), Duration::ZERO)
		.with(
			"3",
			record(Some("Schöne Wohnung"), Some("Baujahr, renoviert 01.01.2001")),
			Duration::ZERO,
		)
}

fn enriched_page(body: ResponseBody) -> SearchPage<redee_domain::EnrichedItem> {
	match body {
		ResponseBody::Page(SearchOutcome::Enriched(page)) => page,
		other => panic!("expected enriched page, got {other:?}"),
	}
}

fn message(body: ResponseBody) -> String {
	match body {
		ResponseBody::Message(message) => message,
		other => panic!("expected message, got {other:?}"),
	}
}

#[tokio::test]
async fn plain_request_passes_upstream_page_through() {
	let upstream = upstream_page(&["1", "2"]);
	let search = Arc::new(StaticSearch::new(upstream.clone()));
	let detail = Arc::new(ScriptedDetail::default());
	let service = service(search.clone(), detail.clone(), extractor(), 4);
	let response = service.handle(InboundRequest::default()).await;

	assert_eq!(response.status_code, 200);
	assert_eq!(response.body, ResponseBody::Page(SearchOutcome::Plain(upstream.clone())));
	assert_eq!(
		serde_json::to_value(&response.body).expect("serialize failed"),
		serde_json::to_value(&upstream).expect("serialize failed")
	);
	assert_eq!(search.calls(), vec![(HashMap::new(), "Bearer foo".to_string())]);
	assert_eq!(detail.completed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn false_flag_is_stripped_and_page_untouched() {
	let upstream = upstream_page(&["1"]);
	let search = Arc::new(StaticSearch::new(upstream.clone()));
	let service = service(search.clone(), Arc::new(ScriptedDetail::default()), extractor(), 4);
	let request = InboundRequest {
		query_string_parameters: Some(HashMap::from([
			("appointments".to_string(), "false".to_string()),
			("price".to_string(), "-1000".to_string()),
		])),
		headers: None,
	};
	let response = service.handle(request).await;

	assert_eq!(response.body, ResponseBody::Page(SearchOutcome::Plain(upstream)));

	let (params, _) = search.calls().remove(0);

	assert_eq!(params, HashMap::from([("price".to_string(), "-1000".to_string())]));
}

#[tokio::test]
async fn enrichment_keeps_only_items_with_upcoming_dates() {
	let search = Arc::new(StaticSearch::new(upstream_page(&["1", "2", "3"])));
	let spy = extractor();
	let service = service(search.clone(), Arc::new(scenario_b_detail()), spy.clone(), 4);
	let response = service.handle(enrich_request()).await;

	assert_eq!(response.status_code, 200);

	let page = enriched_page(response.body);
	let now = OffsetDateTime::now_utc();
	let ids = page.results.iter().map(|item| item.item.id.as_str()).collect::<Vec<_>>();

	assert_eq!(ids, vec!["1", "2"]);
	assert!(page.results.iter().all(|item| !item.dates.is_empty()));
	assert!(page.results.iter().flat_map(|item| &item.dates).all(|date| date.start > now));
	assert_eq!(
		page.results[0].detail_note.as_deref(),
		Some("Besichtigung am 12.06.2099 um 17:00")
	);
	assert_eq!(page.results[1].detail_title.as_deref(), Some("Open house 2099-07-01 10:00"));
	assert_eq!(page.total_results, 2);
	assert_eq!(page.page_size, 2);
	assert_eq!(page.number_of_pages, 1);
	assert_eq!(page.search_id.as_deref(), Some("search-42"));
	// Item 3 has both fields, items 1 and 2 one each.
	assert_eq!(spy.calls.load(Ordering::SeqCst), 4);

	let (params, token) = search.calls().remove(0);

	assert_eq!(token, "Bearer abc");
	assert_eq!(params.get("pagesize").map(String::as_str), Some("100"));
	assert_eq!(params.get("geocodes").map(String::as_str), Some("1276003001"));
	assert!(!params.contains_key("appointments"));
}

#[tokio::test]
async fn title_dates_come_before_note_dates() {
	let search = Arc::new(StaticSearch::new(upstream_page(&["1"])));
	let detail = ScriptedDetail::default().with(
		"1",
		record(Some("Termin 02.02.2099"), Some("Termin 01.01.2099")),
		Duration::ZERO,
	);
	let service = service(search, Arc::new(detail), extractor(), 4);
	let page = enriched_page(service.handle(enrich_request()).await.body);
	let texts = page.results[0].dates.iter().map(|date| date.text.as_str()).collect::<Vec<_>>();

	assert_eq!(texts, vec!["02.02.2099", "01.01.2099"]);
}

#[tokio::test]
async fn enrichment_output_follows_input_order() {
	let search = Arc::new(StaticSearch::new(upstream_page(&["1", "2", "3"])));
	let note = Some("Besichtigung 05.05.2099 18:00");
	let detail = ScriptedDetail::default()
		.with("1", record(None, note), Duration::from_millis(60))
		.with("2", record(None, note), Duration::from_millis(30))
		.with("3", record(None, note), Duration::ZERO);
	let service = service(search, Arc::new(detail), extractor(), 3);

	for _ in 0..3 {
		let page = enriched_page(service.handle(enrich_request()).await.body);
		let ids = page.results.iter().map(|item| item.item.id.as_str()).collect::<Vec<_>>();

		assert_eq!(ids, vec!["1", "2", "3"]);
	}
}

#[tokio::test]
async fn enrichment_runs_lookups_in_parallel_up_to_the_cap() {
	let ids = (1..=12).map(|id| id.to_string()).collect::<Vec<_>>();
	let id_refs = ids.iter().map(String::as_str).collect::<Vec<_>>();
	let search = Arc::new(StaticSearch::new(upstream_page(&id_refs)));
	let detail = ids.iter().fold(ScriptedDetail::default(), |detail, id| {
		detail.with(id, record(None, None), Duration::from_millis(15))
	});
	let detail = Arc::new(detail);
	let service = service(search, detail.clone(), extractor(), 3);
	let items = id_refs.iter().map(|id| item(id)).collect::<Vec<_>>();
	let enriched = service.enrich(items, "Bearer abc").await.expect("enrichment failed");

	assert_eq!(enriched.len(), 12);
	assert!(enriched.iter().all(|item| item.dates.is_empty()));
	assert_eq!(detail.completed.load(Ordering::SeqCst), 12);
	assert_eq!(detail.peak.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn detail_failure_fails_the_whole_request_with_404() {
	let search = Arc::new(StaticSearch::new(upstream_page(&["1", "2", "3"])));
	let detail = ScriptedDetail::default()
		.with("1", record(None, Some("Besichtigung 01.01.2099")), Duration::ZERO)
		.with("2", Reply::Fail("Expose 2 lookup failed: 404 Not Found".into()), Duration::ZERO)
		.with("3", record(None, Some("Besichtigung 02.01.2099")), Duration::ZERO);
	let service = service(search, Arc::new(detail), extractor(), 4);
	let response = service.handle(enrich_request()).await;

	assert_eq!(response.status_code, 404);
	assert_eq!(message(response.body), "Expose 2 lookup failed: 404 Not Found");
}

#[tokio::test]
async fn detail_failure_cancels_running_siblings() {
	let search = Arc::new(StaticSearch::new(upstream_page(&["1", "2", "3"])));
	let detail = Arc::new(
		ScriptedDetail::default()
			.with("1", record(None, None), Duration::from_secs(30))
			.with("2", Reply::Fail("boom".to_string()), Duration::from_millis(10))
			.with("3", record(None, None), Duration::from_secs(30)),
	);
	let service = service(search, detail.clone(), extractor(), 4);
	let response = tokio::time::timeout(Duration::from_secs(5), service.handle(enrich_request()))
		.await
		.expect("failed lookup must not wait for slow siblings");

	assert_eq!(response.status_code, 500);
	assert_eq!(message(response.body), "boom");
	assert_eq!(detail.completed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn token_rejection_maps_to_401() {
	let search = Arc::new(StaticSearch::new(upstream_page(&["1", "2"])));
	let rejection = "ERROR_COMMON_INVALID_OAUTHTOKEN: invalid oauthtoken".to_string();
	let detail = ScriptedDetail::default().with("2", Reply::Fail(rejection), Duration::ZERO);
	let service = service(search, Arc::new(detail), extractor(), 4);
	let response = service.handle(enrich_request()).await;

	assert_eq!(response.status_code, 401);
	assert!(message(response.body).contains("invalid oauthtoken"));
}

#[tokio::test]
async fn unexplained_failure_is_500_with_default_message() {
	let service = service(
		Arc::new(PanickingSearch),
		Arc::new(ScriptedDetail::default()),
		extractor(),
		4,
	);
	let response = service.handle(InboundRequest::default()).await;

	assert_eq!(response.status_code, 500);
	assert_eq!(message(response.body), DEFAULT_ERROR_MESSAGE);
}

#[tokio::test]
async fn identical_requests_yield_identical_pages() {
	let search = Arc::new(StaticSearch::new(upstream_page(&["1", "2", "3"])));
	let service = service(search, Arc::new(scenario_b_detail()), extractor(), 2);
	let first = service.handle(enrich_request()).await;
	let second = service.handle(enrich_request()).await;

	assert_eq!(first, second);
}
