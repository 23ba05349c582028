use crate::client::ApiClient;
use crate::config::PortalConfig;
use crate::errors::ApiError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PortalConfig>,
    pub client: ApiClient,
}

impl AppState {
    pub fn new(config: PortalConfig) -> Result<Self, ApiError> {
        let client = ApiClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }
}
