use std::{any::Any, collections::HashMap, panic::AssertUnwindSafe};

use futures::FutureExt;
use serde::{Deserialize, Serialize};

use redee_domain::query;

use crate::{Error, RedeeService, Result, SearchOutcome, classify};

/// Gateway-style parameter bag. Either map may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundRequest {
	#[serde(default)]
	pub query_string_parameters: Option<HashMap<String, String>>,
	#[serde(default)]
	pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
	pub status_code: u16,
	pub body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
	Page(SearchOutcome),
	Message(String),
}

impl RedeeService {
	/// Runs one search request end to end. Never fails: every error, including a panic inside
	/// a provider, is logged here and turned into a status code and message.
	pub async fn handle(&self, req: InboundRequest) -> HandlerResponse {
		let InboundRequest { query_string_parameters, headers } = req;

		tracing::info!(
			params = ?query_string_parameters,
			header_count = headers.as_ref().map_or(0, HashMap::len),
			"Received search request."
		);

		let query = query::normalize(query_string_parameters, headers.as_ref(), &self.cfg.request);
		let outcome = AssertUnwindSafe(self.execute(query.params, &query.token, query.enrich))
			.catch_unwind()
			.await
			.unwrap_or_else(|payload| Err(panic_error(payload)));

		respond(outcome)
	}
}

fn respond(outcome: Result<SearchOutcome>) -> HandlerResponse {
	match outcome {
		Ok(outcome) => HandlerResponse { status_code: 200, body: ResponseBody::Page(outcome) },
		Err(err) => {
			let classification = classify(&err);

			tracing::error!(
				error = ?err,
				status = classification.status,
				message = %classification.message,
				"Search request failed."
			);

			HandlerResponse {
				status_code: classification.status,
				body: ResponseBody::Message(classification.message),
			}
		},
	}
}

fn panic_error(payload: Box<dyn Any + Send>) -> Error {
	let message = payload
		.downcast_ref::<&str>()
		.map(|message| message.to_string())
		.or_else(|| payload.downcast_ref::<String>().cloned())
		.unwrap_or_default();

	Error::Internal { message }
}
