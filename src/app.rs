use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::api::{ApiClient, BatchApi, BearerAuth};
use crate::config::Config;
use crate::dashboard::{AdminDashboard, LearnerDashboard};
use crate::session::SessionManager;
use crate::store::{SessionStore, SqliteStore};

/// Everything a view needs, built once per process and passed down.
pub struct AppContext {
    pub api: Arc<ApiClient>,
    pub session: Arc<SessionManager>,
}

impl AppContext {
    /// Wire a client and session manager around one shared interceptor.
    pub fn new(api: ApiClient, store: Arc<dyn SessionStore>) -> Self {
        let auth: BearerAuth = api.auth().clone();
        let api = Arc::new(api);
        let session = Arc::new(SessionManager::new(api.clone(), store, auth));
        Self { api, session }
    }

    /// Open the configured store, build the client and restore any saved session.
    pub async fn from_config(cfg: &Config) -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| cfg.storage.database_url());
        let store = SqliteStore::connect(&database_url).await?;
        let api = ApiClient::from_config(cfg, BearerAuth::new())?;
        let ctx = Self::new(api, Arc::new(store));
        let active = ctx.session.restore().await;
        info!(base_url = %cfg.api.base_url, active, "client ready");
        Ok(ctx)
    }

    pub fn admin_dashboard(&self) -> AdminDashboard {
        AdminDashboard::new(self.batch_api())
    }

    pub fn learner_dashboard(&self) -> LearnerDashboard {
        LearnerDashboard::new(self.batch_api())
    }

    fn batch_api(&self) -> Arc<dyn BatchApi> {
        self.api.clone()
    }
}
