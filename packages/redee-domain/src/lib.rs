pub mod dates;
pub mod models;
pub mod query;

pub use dates::RuleExtractor;
pub use models::{DateExtraction, DetailRecord, EnrichedItem, SearchItem, SearchPage};
pub use query::NormalizedQuery;
