use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use super::is_unique_violation;
use crate::entities::{favorite_cities, prelude::*};

/// Repository for saved-city operations. Callers normalize city and
/// country before calling in (see `services::location`).
pub struct FavoriteRepository {
    conn: DatabaseConnection,
}

impl FavoriteRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: favorite_cities::Model) -> FavoriteCity {
        FavoriteCity {
            id: model.id,
            city: model.city,
            country_code: model.country_code,
            created_at: model.created_at,
        }
    }

    /// All favorites for one user, newest-created first.
    pub async fn list(&self, user_id: i32) -> Result<Vec<FavoriteCity>> {
        let rows = FavoriteCities::find()
            .filter(favorite_cities::Column::UserId.eq(user_id))
            .order_by_desc(favorite_cities::Column::CreatedAt)
            .order_by_desc(favorite_cities::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list favorite cities")?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn is_favorite(&self, user_id: i32, city: &str, country_code: &str) -> Result<bool> {
        let count = FavoriteCities::find()
            .filter(favorite_cities::Column::UserId.eq(user_id))
            .filter(favorite_cities::Column::City.eq(city))
            .filter(favorite_cities::Column::CountryCode.eq(country_code))
            .count(&self.conn)
            .await
            .context("Failed to check favorite status")?;

        Ok(count > 0)
    }

    /// Idempotent get-or-create on the (user, city, country) triple. A
    /// unique-constraint violation from a concurrent duplicate insert is
    /// treated as the row already existing.
    pub async fn add(&self, user_id: i32, city: &str, country_code: &str) -> Result<FavoriteCity> {
        if let Some(existing) = self.find(user_id, city, country_code).await? {
            return Ok(existing);
        }

        let active = favorite_cities::ActiveModel {
            user_id: Set(user_id),
            city: Set(city.to_string()),
            country_code: Set(Some(country_code.to_string())),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => {
                info!("Saved favorite for user {}: {},{}", user_id, city, country_code);
                Ok(Self::map_model(model))
            }
            Err(e) if is_unique_violation(&e) => self
                .find(user_id, city, country_code)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Favorite vanished after duplicate insert")),
            Err(e) => Err(e).context("Failed to insert favorite city"),
        }
    }

    /// Delete the matching favorite. Removing a non-existent favorite is
    /// not an error.
    pub async fn remove(&self, user_id: i32, city: &str, country_code: &str) -> Result<bool> {
        let result = FavoriteCities::delete_many()
            .filter(favorite_cities::Column::UserId.eq(user_id))
            .filter(favorite_cities::Column::City.eq(city))
            .filter(favorite_cities::Column::CountryCode.eq(country_code))
            .exec(&self.conn)
            .await
            .context("Failed to delete favorite city")?;

        Ok(result.rows_affected > 0)
    }

    async fn find(
        &self,
        user_id: i32,
        city: &str,
        country_code: &str,
    ) -> Result<Option<FavoriteCity>> {
        let row = FavoriteCities::find()
            .filter(favorite_cities::Column::UserId.eq(user_id))
            .filter(favorite_cities::Column::City.eq(city))
            .filter(favorite_cities::Column::CountryCode.eq(country_code))
            .one(&self.conn)
            .await
            .context("Failed to query favorite city")?;

        Ok(row.map(Self::map_model))
    }
}

// ============================================================================
// Data Types
// ============================================================================

#[derive(Debug, Clone, serde::Serialize)]
pub struct FavoriteCity {
    pub id: i32,
    pub city: String,
    pub country_code: Option<String>,
    pub created_at: String,
}
