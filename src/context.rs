/// Application context and dependency injection
use crate::{
    admin::AdminManager,
    complaints::ComplaintManager,
    config::{BrandingConfig, ServerConfig},
    db,
    error::{AppError, AppResult},
    session::SessionKeys,
};
use sqlx::SqlitePool;
use std::{sync::Arc, time::Instant};

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub admin_manager: Arc<AdminManager>,
    pub complaint_manager: Arc<ComplaintManager>,
    pub session_keys: Arc<SessionKeys>,
    pub started_at: Instant,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> AppResult<Self> {
        // Validate configuration
        config.validate()?;

        // Create data directories if they don't exist
        Self::ensure_directories(&config).await?;

        let db = db::create_pool(
            &config.storage.database_location,
            db::DatabaseOptions {
                max_connections: config.storage.max_connections,
                ..Default::default()
            },
        )
        .await?;

        db::migrations::run_migrations(&db).await?;
        db::test_connection(&db).await?;

        Ok(Self::with_pool(config, db))
    }

    /// Wire managers around an already migrated pool
    pub fn with_pool(config: ServerConfig, db: SqlitePool) -> Self {
        let admin_manager = Arc::new(AdminManager::new(db.clone()));
        let complaint_manager = Arc::new(ComplaintManager::new(db.clone()));
        let session_keys = Arc::new(SessionKeys::new(&config.session));

        Self {
            config: Arc::new(config),
            db,
            admin_manager,
            complaint_manager,
            session_keys,
            started_at: Instant::now(),
        }
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> AppResult<()> {
        let dir = &config.storage.data_directory;
        if !dir.exists() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                AppError::Internal(format!("Failed to create directory {:?}: {}", dir, e))
            })?;
        }

        Ok(())
    }

    pub fn branding(&self) -> &BrandingConfig {
        &self.config.branding
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
