use anyhow::{Context, Result};
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::{prelude::*, search_history};
use crate::models::weather::WeatherSnapshot;

/// Repository for the append-only search log. Records are never updated or
/// deleted by the application; deletion cascades with the owning user.
pub struct HistoryRepository {
    conn: DatabaseConnection,
}

impl HistoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Append one history record from a freshly fetched snapshot.
    pub async fn record(&self, user_id: i32, snapshot: &WeatherSnapshot) -> Result<i32> {
        let active = search_history::ActiveModel {
            user_id: Set(user_id),
            city: Set(snapshot.label()),
            temperature: Set(Some(snapshot.temperature)),
            conditions: Set(Some(snapshot.conditions.clone())),
            icon: Set(Some(snapshot.icon.clone())),
            humidity: Set(Some(snapshot.humidity)),
            wind_speed: Set(Some(snapshot.wind_speed)),
            pressure: Set(Some(snapshot.pressure)),
            searched_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to append search history record")?;

        Ok(model.id)
    }

    /// Distinct city labels, newest occurrence first, at most `limit`.
    pub async fn recent_labels(&self, user_id: i32, limit: u64) -> Result<Vec<String>> {
        let rows: Vec<(String, String)> = SearchHistory::find()
            .select_only()
            .column(search_history::Column::City)
            .column_as(Expr::col(search_history::Column::SearchedAt).max(), "last_searched")
            .filter(search_history::Column::UserId.eq(user_id))
            .group_by(search_history::Column::City)
            .order_by_desc(Expr::col(Alias::new("last_searched")))
            .limit(limit)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query recent search labels")?;

        Ok(rows.into_iter().map(|(city, _)| city).collect())
    }

    /// Number of history rows for one user.
    pub async fn count(&self, user_id: i32) -> Result<u64> {
        use sea_orm::PaginatorTrait;

        let count = SearchHistory::find()
            .filter(search_history::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count search history")?;

        Ok(count)
    }
}
