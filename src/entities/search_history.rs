use sea_orm::entity::prelude::*;

/// Append-only log of weather lookups. `city` is the "City,CC" composite
/// label; the reading columns snapshot the provider data at search time.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "search_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub city: String,

    pub temperature: Option<f64>,

    pub conditions: Option<String>,

    pub icon: Option<String>,

    pub humidity: Option<f64>,

    pub wind_speed: Option<f64>,

    pub pressure: Option<f64>,

    pub searched_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
