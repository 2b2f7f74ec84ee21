use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(FavoriteCities)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(SearchHistory)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // One favorite per (user, city, country) triple; the add path relies
        // on this constraint under concurrent duplicate inserts.
        manager
            .create_index(
                Index::create()
                    .name("idx_favorite_cities_user_city_country")
                    .table(FavoriteCities)
                    .col(crate::entities::favorite_cities::Column::UserId)
                    .col(crate::entities::favorite_cities::Column::City)
                    .col(crate::entities::favorite_cities::Column::CountryCode)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SearchHistory).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FavoriteCities).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
