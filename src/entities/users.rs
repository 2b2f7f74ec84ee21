use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    /// Argon2id password hash
    pub password_hash: String,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::favorite_cities::Entity")]
    FavoriteCities,

    #[sea_orm(has_many = "super::search_history::Entity")]
    SearchHistory,
}

impl Related<super::favorite_cities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FavoriteCities.def()
    }
}

impl Related<super::search_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SearchHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
