use crate::admin::{router, AdminState};
use crate::config::Settings;
use crate::domain::auth::AdminAuth;
use crate::domain::types::OperatorToken;
use crate::error::Error;
use crate::lifecycle::{LifecycleManager, LogOnlyDeleter, ResourceDeleter};
use crate::probe::ProbeOrchestrator;
use crate::Result;
use std::sync::Arc;
use tracing::{info, instrument};

/// Main application struct that coordinates all components
pub struct Application {
    settings: Settings,
    deleter: Arc<dyn ResourceDeleter>,
}

impl Application {
    #[instrument]
    pub fn new() -> Result<Self> {
        let settings = Settings::new()?;
        Ok(Self {
            settings,
            deleter: Arc::new(LogOnlyDeleter),
        })
    }

    /// Use a host-backed deleter instead of the default log-only one.
    ///
    /// Embedders that wire the probe into a real commerce system supply the
    /// deleter (and decide whether deletion cascades to related records).
    pub fn with_deleter(mut self, deleter: Arc<dyn ResourceDeleter>) -> Self {
        self.deleter = deleter;
        self
    }

    #[instrument(skip(self))]
    pub async fn run(self) -> Result<()> {
        let token = OperatorToken::try_new(self.settings.admin.operator_token.clone())
            .map_err(|e| Error::InvalidOperatorToken(e.to_string()))?;

        let state = AdminState {
            auth: Arc::new(AdminAuth::new(token)),
            lifecycle: Arc::new(LifecycleManager::new(
                self.settings.probe.enabled,
                self.deleter,
            )),
            orchestrator: Arc::new(ProbeOrchestrator::new()),
            probe: self.settings.probe.clone(),
        };

        let bind_address = self.settings.bind_address();
        info!(
            probe_enabled = self.settings.probe.enabled,
            fix_enabled = self.settings.probe.fix_enabled,
            "Starting checkout-probe admin server on {bind_address}"
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        axum::serve(listener, router(state)).await?;

        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
