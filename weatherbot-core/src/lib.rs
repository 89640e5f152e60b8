//! Core library for the weather bot.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather provider client
//! - Reply formatting
//! - The SQLite-backed favorites store
//! - The query pipeline that ties them together behind bot commands
//!
//! It is used by `weatherbot-cli`, but a chat transport can drive
//! [`QueryPipeline`] the same way.

pub mod command;
pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod store;

pub use command::Command;
pub use config::Config;
pub use error::{BotError, FetchError, StoreError};
pub use format::format_report;
pub use model::{QueryResult, UserId, WeatherReport};
pub use pipeline::QueryPipeline;
pub use provider::{WeatherProvider, openweather::OpenWeatherClient};
pub use store::FavoritesStore;
