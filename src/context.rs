/// Application context and dependency injection
use crate::{
    account::AccountManager,
    admin::ReportManager,
    catalog::{CollectionManager, FilmManager},
    comments::CommentService,
    config::ServerConfig,
    db,
    error::MiraResult,
    video_host::{AssetImportBridge, MuxClient, VideoHost},
    viewing::{FavoriteManager, WatchProgressTracker},
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub accounts: Arc<AccountManager>,
    // Library
    pub films: FilmManager,
    pub collections: CollectionManager,
    // Community
    pub comments: CommentService,
    pub reports: ReportManager,
    // Per-viewer state
    pub favorites: FavoriteManager,
    pub progress: WatchProgressTracker,
    // Video host
    pub assets: AssetImportBridge,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> MiraResult<Self> {
        // Validate configuration
        config.validate()?;

        if !config.storage.data_directory.exists() {
            tokio::fs::create_dir_all(&config.storage.data_directory).await?;
        }

        let pool = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        let video_host: Option<Arc<dyn VideoHost>> = match &config.video_host {
            Some(host_config) => {
                tracing::info!("Video host enabled at {}", host_config.api_url);
                Some(Arc::new(MuxClient::new(host_config.clone())?))
            }
            None => {
                tracing::warn!("MUX_TOKEN_ID/MUX_TOKEN_SECRET not set - video host endpoints disabled");
                None
            }
        };

        let ctx = Self::with_parts(config, pool, video_host);

        if let Some(admin) = &ctx.config.bootstrap_admin {
            let user = ctx
                .accounts
                .ensure_admin(&admin.email, admin.name.as_deref())
                .await?;
            tracing::info!(user_id = %user.id, email = %admin.email, "bootstrap admin ready");
        }

        Ok(ctx)
    }

    /// Assemble the context from an existing pool and video host
    pub fn with_parts(
        config: ServerConfig,
        pool: SqlitePool,
        video_host: Option<Arc<dyn VideoHost>>,
    ) -> Self {
        let accounts = Arc::new(AccountManager::new(pool.clone(), config.session.clone()));
        let films = FilmManager::new(pool.clone());
        let collections = CollectionManager::new(pool.clone());
        let comments = CommentService::new(pool.clone());
        let reports = ReportManager::new(pool.clone(), comments.clone());
        let favorites = FavoriteManager::new(pool.clone());
        let progress = WatchProgressTracker::new(pool.clone());
        let assets = AssetImportBridge::new(video_host, films.clone());

        Self {
            config: Arc::new(config),
            db: pool,
            accounts,
            films,
            collections,
            comments,
            reports,
            favorites,
            progress,
            assets,
        }
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!("http://{}", self.config.bind_address())
    }
}
