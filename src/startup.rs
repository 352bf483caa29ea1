//! One-time startup: resolve the document folder and assemble shared state.

use crate::config::Config;
use crate::db::Pool;
use crate::drive::{DocumentSource, DriveClient, ServiceAccountAuth};
use crate::model::Folder;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("no folder named '{0}' is visible to the service account")]
    FolderNotFound(String),
    #[error("failed to look up folder '{name}': {cause:#}")]
    FolderLookup { name: String, cause: anyhow::Error },
}

/// Build the Drive client from the configured service account key.
pub async fn drive_source(cfg: &Config) -> anyhow::Result<Arc<dyn DocumentSource>> {
    let auth = ServiceAccountAuth::from_file(&cfg.google.service_account_key).await?;
    info!(account = %auth.client_email(), "loaded service account");
    Ok(Arc::new(DriveClient::new(Arc::new(auth))?))
}

/// Find the configured folder. Several matches log a warning and use the first.
pub async fn resolve_folder(
    source: &dyn DocumentSource,
    name: &str,
) -> Result<Folder, StartupError> {
    let folders = source
        .find_folders(name)
        .await
        .map_err(|cause| StartupError::FolderLookup {
            name: name.to_string(),
            cause,
        })?;
    if folders.len() > 1 {
        warn!(
            folder = name,
            matches = folders.len(),
            "multiple folders share this name; using the first one"
        );
    }
    let folder = folders
        .into_iter()
        .next()
        .ok_or_else(|| StartupError::FolderNotFound(name.to_string()))?;
    info!(folder = %folder.name, id = %folder.id, "resolved document folder");
    Ok(folder)
}

/// Basic-auth credentials for the admin routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

/// Immutable process-wide state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub source: Arc<dyn DocumentSource>,
    pub folder: Folder,
    pub admin: AdminCredentials,
}

impl AppState {
    pub fn new(
        pool: Pool,
        source: Arc<dyn DocumentSource>,
        folder: Folder,
        admin: AdminCredentials,
    ) -> Self {
        Self {
            pool,
            source,
            folder,
            admin,
        }
    }

    /// Resolve the folder named in `cfg` and build the state.
    pub async fn bootstrap(
        cfg: &Config,
        pool: Pool,
        source: Arc<dyn DocumentSource>,
    ) -> Result<Self, StartupError> {
        let folder = resolve_folder(source.as_ref(), &cfg.site.folder_name).await?;
        let admin = AdminCredentials {
            username: cfg.admin.username.clone(),
            password: cfg.admin.password.clone(),
        };
        Ok(Self::new(pool, source, folder, admin))
    }
}
