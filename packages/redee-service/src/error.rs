pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Search request failed.")]
	Search {
		#[source]
		source: redee_providers::Error,
	},
	#[error("Detail lookup failed for item {item_id}.")]
	Detail {
		item_id: String,
		#[source]
		source: redee_providers::Error,
	},
	#[error(transparent)]
	Provider(#[from] redee_providers::Error),
	#[error(transparent)]
	Extractor(#[from] redee_domain::dates::Error),
	#[error("{message}")]
	Internal { message: String },
}
impl Error {
	/// Status code the upstream service answered with, if the failure came from a response.
	pub fn upstream_status(&self) -> Option<u16> {
		match self {
			Self::Search { source } | Self::Detail { source, .. } | Self::Provider(source) =>
				source.status(),
			Self::Extractor(_) | Self::Internal { .. } => None,
		}
	}
}
