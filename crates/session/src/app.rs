//! Application bootstrap and shutdown.

use std::sync::Arc;

use thiserror::Error;

use branchdesk_auth::{CatalogError, PermissionCatalog};
use branchdesk_navigation::{MenuItem, check_catalog_consistency, default_navigation};

use crate::backend::AuthBackend;
use crate::config::ConfigError;
use crate::controller::SessionController;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("permission catalog check failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("auth backend unavailable: {0}")]
    Backend(#[from] crate::backend::BackendError),
}

/// The running application: navigation, catalog and the session owner.
#[derive(Debug)]
pub struct Application {
    catalog: PermissionCatalog,
    menu: Vec<MenuItem>,
    session: SessionController,
}

impl Application {
    /// Start against the hosted service described by `config`.
    #[cfg(feature = "http")]
    pub async fn connect(config: &crate::config::AppConfig) -> Result<Self, StartupError> {
        let backend = crate::http::HttpAuthBackend::new(config)?;
        Self::bootstrap(Arc::new(backend)).await
    }

    /// Start against the hosted service configured in the environment.
    #[cfg(feature = "http")]
    pub async fn from_env() -> Result<Self, StartupError> {
        let config = crate::config::AppConfig::from_env()?;
        tracing::info!(service_url = %config.service_url, "configuration loaded");
        Self::connect(&config).await
    }

    /// Validate the catalog against every permission reference, then
    /// rehydrate any persisted session.
    ///
    /// Catalog inconsistencies are fatal. A failed rehydration is not: the
    /// application starts unauthenticated.
    pub async fn bootstrap(backend: Arc<dyn AuthBackend>) -> Result<Self, StartupError> {
        Self::bootstrap_with(backend, PermissionCatalog::builtin(), default_navigation()).await
    }

    pub async fn bootstrap_with(
        backend: Arc<dyn AuthBackend>,
        catalog: PermissionCatalog,
        menu: Vec<MenuItem>,
    ) -> Result<Self, StartupError> {
        check_catalog_consistency(&catalog, &menu)?;
        tracing::info!(permissions = catalog.len(), "permission catalog verified");

        let mut session = SessionController::new(backend);
        if let Err(err) = session.init().await {
            tracing::warn!(error = %err, "session rehydration failed; starting signed out");
        }

        tracing::info!(
            authenticated = session.is_authenticated(),
            "application started"
        );
        Ok(Self {
            catalog,
            menu,
            session,
        })
    }

    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionController {
        &mut self.session
    }

    /// The sidebar as the current session may see it.
    pub fn visible_menu(&self) -> Vec<MenuItem> {
        self.session.visible_menu(&self.menu)
    }

    /// Stop the application. The persisted session is left in place so the
    /// next start can rehydrate it.
    pub fn shutdown(self) {
        tracing::info!(
            authenticated = self.session.is_authenticated(),
            "application stopped"
        );
    }
}
