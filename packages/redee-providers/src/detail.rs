use reqwest::Url;
use serde_json::Value;

use redee_domain::DetailRecord;

use crate::{Error, Result, SearchApi};

impl SearchApi {
	pub async fn detail(&self, item_id: &str, token: &str) -> Result<DetailRecord> {
		let url = self.detail_url(item_id)?;
		let res = self.client.get(url).headers(self.headers(token)?).send().await?;
		let body = crate::read_body(res).await?;

		parse_detail(serde_json::from_str(&body)?)
	}

	/// The id becomes one percent-encoded path segment, so it can never address another route.
	fn detail_url(&self, item_id: &str) -> Result<Url> {
		if matches!(item_id, "" | "." | "..") {
			return Err(Error::InvalidItemId { id: item_id.to_string() });
		}

		let base = format!("{}{}", self.api_base, self.detail_path);
		let mut url = Url::parse(&base).map_err(|err| Error::InvalidConfig {
			message: format!("Detail URL {base} is invalid: {err}."),
		})?;

		url.path_segments_mut()
			.map_err(|()| Error::InvalidConfig {
				message: format!("Detail URL {base} cannot take a path."),
			})?
			.pop_if_empty()
			.push(item_id);

		Ok(url)
	}
}

// Legacy exposes nest the text fields under `realEstate`; newer payloads are flat.
fn parse_detail(json: Value) -> Result<DetailRecord> {
	let record = match json {
		Value::Object(mut map) => match map.remove("realEstate") {
			Some(inner @ Value::Object(_)) => inner,
			Some(_) =>
				return Err(Error::InvalidResponse {
					message: "Detail field realEstate must be an object.".to_string(),
				}),
			None => Value::Object(map),
		},
		_ =>
			return Err(Error::InvalidResponse {
				message: "Detail response must be a JSON object.".to_string(),
			}),
	};

	Ok(serde_json::from_value(record)?)
}
