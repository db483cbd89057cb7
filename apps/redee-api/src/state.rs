use std::sync::Arc;

use redee_service::RedeeService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<RedeeService>,
}
impl AppState {
	pub fn new(config: redee_config::Config) -> color_eyre::Result<Self> {
		let service = RedeeService::new(config)?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: RedeeService) -> Self {
		Self { service: Arc::new(service) }
	}
}
