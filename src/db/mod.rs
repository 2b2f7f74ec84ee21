use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::models::weather::WeatherSnapshot;

pub mod migrator;
pub mod repositories;

pub use repositories::favorite::FavoriteCity;
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.ends_with(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn favorite_repo(&self) -> repositories::favorite::FavoriteRepository {
        repositories::favorite::FavoriteRepository::new(self.conn.clone())
    }

    fn history_repo(&self) -> repositories::history::HistoryRepository {
        repositories::history::HistoryRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<Option<User>> {
        self.user_repo().create(username, password, security).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn verify_user_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>> {
        self.user_repo().verify_password(username, password).await
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    pub async fn list_favorites(&self, user_id: i32) -> Result<Vec<FavoriteCity>> {
        self.favorite_repo().list(user_id).await
    }

    pub async fn is_favorite(&self, user_id: i32, city: &str, country_code: &str) -> Result<bool> {
        self.favorite_repo()
            .is_favorite(user_id, city, country_code)
            .await
    }

    pub async fn add_favorite(
        &self,
        user_id: i32,
        city: &str,
        country_code: &str,
    ) -> Result<FavoriteCity> {
        self.favorite_repo().add(user_id, city, country_code).await
    }

    pub async fn remove_favorite(
        &self,
        user_id: i32,
        city: &str,
        country_code: &str,
    ) -> Result<bool> {
        self.favorite_repo()
            .remove(user_id, city, country_code)
            .await
    }

    // ========================================================================
    // Search history
    // ========================================================================

    pub async fn record_search(&self, user_id: i32, snapshot: &WeatherSnapshot) -> Result<i32> {
        self.history_repo().record(user_id, snapshot).await
    }

    pub async fn recent_search_labels(&self, user_id: i32, limit: u64) -> Result<Vec<String>> {
        self.history_repo().recent_labels(user_id, limit).await
    }

    pub async fn search_count(&self, user_id: i32) -> Result<u64> {
        self.history_repo().count(user_id).await
    }
}
