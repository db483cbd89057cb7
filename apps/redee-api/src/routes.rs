use std::collections::HashMap;

use axum::{
	Json, Router,
	extract::{Query, State},
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	routing::{get, post},
};

use redee_service::{HandlerResponse, InboundRequest};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/search", get(search))
		.route("/v1/invoke", post(invoke))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	Query(params): Query<HashMap<String, String>>,
	headers: HeaderMap,
) -> Response {
	let req = InboundRequest {
		query_string_parameters: Some(params),
		headers: Some(header_map(&headers)),
	};
	let HandlerResponse { status_code, body } = state.service.handle(req).await;
	let status = StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

	(status, Json(body)).into_response()
}

/// Gateway-style entry point: the classified status travels in the body.
async fn invoke(
	State(state): State<AppState>,
	Json(payload): Json<InboundRequest>,
) -> Json<HandlerResponse> {
	Json(state.service.handle(payload).await)
}

// Non-UTF-8 header values cannot carry a token and are skipped.
fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
	headers
		.iter()
		.filter_map(|(name, value)| {
			value.to_str().ok().map(|value| (name.as_str().to_string(), value.to_string()))
		})
		.collect()
}
