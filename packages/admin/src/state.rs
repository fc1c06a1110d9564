use std::sync::Arc;

use lexpanel_client::BackendClient;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    /// Client without credentials; requests attach the session's token.
    pub client: BackendClient,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> lexpanel_client::Result<Self> {
        let client = BackendClient::new(&config.client)?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }
}
