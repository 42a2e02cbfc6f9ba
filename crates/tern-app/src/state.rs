use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tern_ai::{AiGateway, AiGatewayConfig, RequestRegistry};
use tern_compose::DraftFlowController;
use tern_config::{AppConfig, ConfigManager};
use tern_email::{MailApi, MailApiConfig};

pub struct AppState {
    pub config_manager: ConfigManager,
    pub config: AppConfig,
    pub mail: MailApi,
    pub registry: Arc<RequestRegistry>,
    pub compose: DraftFlowController,
}

impl AppState {
    pub fn initialize() -> anyhow::Result<Self> {
        let config_manager = ConfigManager::new().context("initialize config manager")?;
        let config = config_manager.load().context("load app config")?;

        let mail = MailApi::new(MailApiConfig {
            base_url: config.backend.api_base_url.clone(),
            request_timeout: Duration::from_secs(config.backend.request_timeout_secs),
        })
        .context("initialize mail api client")?;

        let registry = RequestRegistry::new();
        let gateway = AiGateway::new(
            AiGatewayConfig {
                base_url: config.backend.ai_base_url.clone(),
                request_timeout: Duration::from_secs(config.backend.request_timeout_secs),
                polish_timeout: Duration::from_secs(config.ai.polish_timeout_secs),
                analyze_timeout: Duration::from_secs(config.ai.analyze_timeout_secs),
            },
            Arc::clone(&registry),
        )
        .context("initialize ai gateway")?;

        let compose = DraftFlowController::new(gateway);

        Ok(Self {
            config_manager,
            config,
            mail,
            registry,
            compose,
        })
    }

    /// Teardown: cancel every in-flight AI request and clear view state so
    /// nothing outlives the session.
    pub async fn shutdown(&self) {
        self.compose.reset().await;
        tracing::debug!(live_requests = self.registry.len(), "app state torn down");
    }
}
