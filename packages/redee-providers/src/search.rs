use std::collections::HashMap;

use redee_domain::SearchPage;

use crate::{Result, SearchApi};

impl SearchApi {
	pub async fn search(
		&self,
		params: &HashMap<String, String>,
		token: &str,
	) -> Result<SearchPage> {
		let url = format!("{}{}", self.api_base, self.search_path);
		let res =
			self.client.get(&url).headers(self.headers(token)?).query(params).send().await?;
		let body = crate::read_body(res).await?;
		let page: SearchPage = serde_json::from_str(&body)?;

		tracing::debug!(
			results = page.results.len(),
			total_results = page.total_results,
			page_number = page.page_number,
			"Upstream search returned."
		);

		Ok(page)
	}
}
