pub mod openweather;

pub use openweather::{OpenWeatherClient, WeatherError};
