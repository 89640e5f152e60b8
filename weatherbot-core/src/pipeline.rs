//! Turns bot requests into reply text.
//!
//! Single-city lookups never touch the store. Favorites lookups read the
//! user's list once, fetch every city with bounded parallelism and render the
//! results in list order.

use futures::stream::{self, StreamExt};
use std::sync::Arc;

use crate::{
    Config,
    command::Command,
    error::{BotResult, StoreError, StoreResult},
    format::{favorite_block, format_report},
    model::{QueryResult, UserId, normalize_city},
    provider::{WeatherProvider, provider_from_config},
    store::FavoritesStore,
};

pub mod messages {
    pub const WEATHER_USAGE: &str = "Укажи город: /weather <город>";
    pub const ADD_USAGE: &str = "Укажи город: /add <город>";
    pub const REMOVE_USAGE: &str = "Укажи город: /remove <город>";
    pub const CITY_NOT_FOUND: &str = "Не удалось найти погоду для этого города 😕";
    pub const CITY_NOT_FOUND_RETRY: &str = "Не нашёл такой город. Попробуй ещё раз.";
    pub const NO_FAVORITES: &str = "⭐ Пока нет избранных. Добавь: /add <город>";
    pub const FAVORITES_WEATHER_HEADER: &str = "⭐ Погода в избранных:";
    pub const FAVORITES_LIST_HEADER: &str = "⭐ Избранные города:";
    pub const ALREADY_FAVORITE: &str = "⚠️ Уже в избранном или ошибка ввода";
    pub const NOT_A_FAVORITE: &str = "⚠️ Такого города нет в избранном";
    pub const APOLOGY: &str = "😔 Что-то пошло не так. Попробуй позже.";

    pub fn added(city: &str) -> String {
        format!("✅ Добавил {city} в избранное")
    }

    pub fn removed(city: &str) -> String {
        format!("🗑 Удалил {city} из избранного")
    }

    pub fn lookup_failed(city: &str) -> String {
        format!("• {city}\n  (не удалось получить данные)")
    }
}

pub struct QueryPipeline {
    provider: Arc<dyn WeatherProvider>,
    store: FavoritesStore,
    max_concurrent_fetches: usize,
}

impl QueryPipeline {
    pub fn new(provider: Arc<dyn WeatherProvider>, store: FavoritesStore) -> Self {
        Self { provider, store, max_concurrent_fetches: 4 }
    }

    /// Build the pipeline from config: requires an API key and initializes the store.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = provider_from_config(config)?;
        let store = FavoritesStore::open(&config.database_path)?;

        Ok(Self::new(provider, store).with_max_concurrent_fetches(config.max_concurrent_fetches))
    }

    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit.max(1);
        self
    }

    /// Dispatch a command and always produce a reply.
    ///
    /// Storage faults are logged and answered with a generic apology.
    pub async fn handle(&self, user_id: UserId, command: Command) -> String {
        let result = match command {
            Command::Start | Command::Help => Ok(command.static_reply().unwrap_or_default()),
            Command::Weather(city) => Ok(self.query_city(user_id, &city).await),
            Command::City(city) => Ok(self.query_text_city(user_id, &city).await),
            Command::Add(city) => self.add_favorite(user_id, &city).await,
            Command::Remove(city) => self.remove_favorite(user_id, &city).await,
            Command::List => self.list_favorites(user_id).await,
            Command::Favorites => self.query_favorites(user_id).await,
        };

        result.unwrap_or_else(|err| {
            tracing::error!(user_id, error = %err, "request failed");
            messages::APOLOGY.to_string()
        })
    }

    /// Weather for a single city.
    pub async fn query_city(&self, user_id: UserId, city_text: &str) -> String {
        let Some(city) = normalize_city(city_text) else {
            return messages::WEATHER_USAGE.to_string();
        };

        self.lookup_city(user_id, city, messages::CITY_NOT_FOUND).await
    }

    /// Weather for a city sent as a plain message. Blank text gets the `/weather` hint.
    pub async fn query_text_city(&self, user_id: UserId, text: &str) -> String {
        let Some(city) = normalize_city(text) else {
            return messages::WEATHER_USAGE.to_string();
        };

        self.lookup_city(user_id, city, messages::CITY_NOT_FOUND_RETRY).await
    }

    async fn lookup_city(&self, user_id: UserId, city: &str, not_found: &str) -> String {
        tracing::debug!(user_id, city, "query city");
        match self.provider.fetch(city).await {
            Some(report) => format_report(&report),
            None => not_found.to_string(),
        }
    }

    /// Weather for every favorite city of the user, in list order.
    pub async fn query_favorites(&self, user_id: UserId) -> BotResult<String> {
        let cities = self.with_store(move |store| store.list(user_id)).await?;
        if cities.is_empty() {
            return Ok(messages::NO_FAVORITES.to_string());
        }

        tracing::debug!(user_id, count = cities.len(), "query favorites");
        let results = self.fetch_all(&cities).await;

        let mut lines = vec![messages::FAVORITES_WEATHER_HEADER.to_string()];
        for result in results {
            let block = match result {
                QueryResult::Success(report) => favorite_block(&report),
                QueryResult::Failure { city } => messages::lookup_failed(&city),
            };
            lines.push(format!("\n{block}"));
        }

        Ok(lines.join("\n"))
    }

    pub async fn add_favorite(&self, user_id: UserId, city_text: &str) -> BotResult<String> {
        let Some(city) = normalize_city(city_text).map(str::to_string) else {
            return Ok(messages::ADD_USAGE.to_string());
        };

        let key = city.clone();
        let added = self.with_store(move |store| store.add(user_id, &key)).await?;

        Ok(if added { messages::added(&city) } else { messages::ALREADY_FAVORITE.to_string() })
    }

    pub async fn remove_favorite(&self, user_id: UserId, city_text: &str) -> BotResult<String> {
        let Some(city) = normalize_city(city_text).map(str::to_string) else {
            return Ok(messages::REMOVE_USAGE.to_string());
        };

        let key = city.clone();
        let removed = self.with_store(move |store| store.remove(user_id, &key)).await?;

        Ok(if removed { messages::removed(&city) } else { messages::NOT_A_FAVORITE.to_string() })
    }

    pub async fn list_favorites(&self, user_id: UserId) -> BotResult<String> {
        let cities = self.with_store(move |store| store.list(user_id)).await?;
        if cities.is_empty() {
            return Ok(messages::NO_FAVORITES.to_string());
        }

        let items: Vec<String> = cities.iter().map(|c| format!("• {c}")).collect();
        Ok(format!("{}\n{}", messages::FAVORITES_LIST_HEADER, items.join("\n")))
    }

    /// Look up every city; results come back in input order whatever the completion order.
    async fn fetch_all(&self, cities: &[String]) -> Vec<QueryResult> {
        let limit = self.max_concurrent_fetches.min(cities.len()).max(1);

        stream::iter(cities)
            .map(|city| async move {
                let report = self.provider.fetch(city).await;
                QueryResult::from_lookup(city, report)
            })
            .buffered(limit)
            .collect::<Vec<_>>()
            .await
    }

    /// Run a blocking store operation off the async executor.
    async fn with_store<T, F>(&self, op: F) -> BotResult<T>
    where
        F: FnOnce(FavoritesStore) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        let result = tokio::task::spawn_blocking(move || op(store))
            .await
            .map_err(StoreError::from)?;

        Ok(result?)
    }
}
