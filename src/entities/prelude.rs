pub use super::favorite_cities::Entity as FavoriteCities;
pub use super::search_history::Entity as SearchHistory;
pub use super::users::Entity as Users;
