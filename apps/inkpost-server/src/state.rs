//! Application state - shared across all handlers.

use std::sync::Arc;

use inkpost_core::domain::User;
use inkpost_core::ports::{
    BaseRepository, PasswordService, PostRepository, TokenService, UserRepository,
};
use inkpost_infra::{
    Argon2PasswordService, InMemoryPostRepository, InMemoryUserRepository, JwtConfig,
    JwtTokenService,
};

use crate::config::{AdminBootstrap, AppConfig};
use crate::middleware::error::{AppError, AppResult};

/// Where posts and users are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Postgres,
    Memory,
}

impl Storage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Storage::Postgres => "postgres",
            Storage::Memory => "memory",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub storage: Storage,
    pub cookie_secure: bool,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let mut state = Self::in_memory(config.jwt.clone());
        state.cookie_secure = config.cookie_secure;

        state.attach_database(config).await;

        tracing::info!(storage = state.storage.as_str(), "Application state initialized");
        state
    }

    /// State backed by in-memory repositories.
    pub fn in_memory(jwt: JwtConfig) -> Self {
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let posts: Arc<dyn PostRepository> = Arc::new(InMemoryPostRepository::new(users.clone()));

        Self {
            posts,
            users,
            tokens: Arc::new(JwtTokenService::new(jwt)),
            passwords: Arc::new(Argon2PasswordService::new()),
            storage: Storage::Memory,
            cookie_secure: false,
        }
    }

    /// Swap in the Postgres repositories when a database is configured and reachable.
    #[cfg(feature = "postgres")]
    async fn attach_database(&mut self, config: &AppConfig) {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return;
        };

        match Self::connect(db_config).await {
            Ok((posts, users)) => {
                self.posts = posts;
                self.users = users;
                self.storage = Storage::Postgres;
            }
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn attach_database(&mut self, _config: &AppConfig) {
        tracing::info!("Running without postgres feature - using in-memory repositories");
    }

    #[cfg(feature = "postgres")]
    async fn connect(
        config: &inkpost_infra::DatabaseConfig,
    ) -> Result<(Arc<dyn PostRepository>, Arc<dyn UserRepository>), migration::DbErr> {
        use migration::{Migrator, MigratorTrait};

        let conn = inkpost_infra::database::connect(config).await?;

        if config.auto_migrate {
            Migrator::up(&conn, None).await?;
            tracing::info!("Database migrations applied");
        }

        let conn = Arc::new(conn);
        let posts = Arc::new(inkpost_infra::PostgresPostRepository::new(conn.clone()));
        let users = Arc::new(inkpost_infra::PostgresUserRepository::new(conn));
        Ok((posts, users))
    }

    /// Create the configured account unless a user with that name exists.
    pub async fn ensure_user(&self, admin: &AdminBootstrap) -> AppResult<User> {
        if let Some(existing) = self.users.find_by_username(&admin.username).await? {
            tracing::debug!(username = %admin.username, "Bootstrap user already present");
            return Ok(existing);
        }

        let password_hash = self
            .passwords
            .hash(&admin.password)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let user = self
            .users
            .insert(User::new(admin.username.clone(), password_hash))
            .await?;

        tracing::info!(username = %user.username, "Created bootstrap user");
        Ok(user)
    }
}
