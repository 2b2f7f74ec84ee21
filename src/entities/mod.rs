pub mod prelude;

pub mod favorite_cities;
pub mod search_history;
pub mod users;
