pub mod location;

pub mod weather;
pub use weather::{WeatherService, WeatherView};
