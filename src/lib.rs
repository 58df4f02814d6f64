pub mod api;
pub mod config;
pub mod crypto;
pub mod db;
pub mod service;
pub mod storage;

use anyhow::{Context, Result};
use config::Config;
use tracing::info;

use crate::db::JsonStore;
use crate::service::{SessionService, UserService};
use crate::storage::UploadStore;

pub struct AppState {
    pub config: Config,
    pub sessions: SessionService,
    pub users: UserService,
}

impl AppState {
    pub fn new(config: Config, sessions: SessionService, users: UserService) -> Self {
        Self {
            config,
            sessions,
            users,
        }
    }

    /// Open the stores under the configured data directory. A users file
    /// that did not exist before is seeded with the default accounts.
    pub async fn init(config: Config) -> Result<Self> {
        let server = &config.server;
        info!("Opening data directory {}", server.data_dir.display());

        let users_path = server.users_file();
        let fresh_users = !tokio::fs::try_exists(&users_path).await.unwrap_or(false);

        let sessions = JsonStore::open(server.sessions_file())
            .await
            .context("Failed to open sessions store")?;
        let users = JsonStore::open(&users_path)
            .await
            .context("Failed to open users store")?;
        let uploads = UploadStore::open(server.uploads_dir())
            .await
            .with_context(|| {
                format!("Failed to create uploads directory {}", server.uploads_dir().display())
            })?;

        if fresh_users {
            db::seed_default_users(&users, &config.seed).await?;
        }

        Ok(Self::new(
            config,
            SessionService::new(sessions, uploads),
            UserService::new(users),
        ))
    }
}
