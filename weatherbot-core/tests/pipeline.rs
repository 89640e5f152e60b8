//! End-to-end pipeline scenarios against a scripted provider and a real SQLite file.

use async_trait::async_trait;
use serde_json::Number;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use weatherbot_core::pipeline::messages;
use weatherbot_core::{Command, FavoritesStore, QueryPipeline, WeatherProvider, WeatherReport};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Provider that answers from a fixed table, optionally after a delay, and counts calls.
#[derive(Debug, Default)]
struct ScriptedProvider {
    reports: HashMap<String, WeatherReport>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn with_report(mut self, city: &str, report: WeatherReport) -> Self {
        self.reports.insert(city.to_string(), report);
        self
    }

    fn with_delay(mut self, city: &str, delay: Duration) -> Self {
        self.delays.insert(city.to_string(), delay);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherProvider for ScriptedProvider {
    async fn fetch(&self, city: &str) -> Option<WeatherReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(city) {
            tokio::time::sleep(*delay).await;
        }
        self.reports.get(city).cloned()
    }
}

fn report(name: &str, description: &str, temp: f64) -> WeatherReport {
    WeatherReport {
        location_name: name.to_string(),
        description: Some(description.to_string()),
        temperature: Some(temp),
        feels_like: None,
        humidity: None,
        wind_speed: None,
    }
}

fn setup(provider: Arc<ScriptedProvider>) -> (TempDir, QueryPipeline) {
    let dir = tempfile::tempdir().unwrap();
    let store = FavoritesStore::open(dir.path().join("favorites.db")).unwrap();
    (dir, QueryPipeline::new(provider, store))
}

#[tokio::test]
async fn test_paris_reply_through_http_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Paris",
            "weather": [{"description": "clear sky"}],
            "main": {"temp": 18.4, "feels_like": 17.9, "humidity": 60},
            "wind": {"speed": 3.1}
        })))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = weatherbot_core::Config {
        api_key: Some("test_key".to_string()),
        base_url: mock_server.uri(),
        database_path: dir.path().join("favorites.db"),
        ..Default::default()
    };
    let pipeline = QueryPipeline::from_config(&config).unwrap();

    let reply = pipeline.query_city(1, "  Paris ").await;

    assert_eq!(
        reply,
        "🌍 Paris\n☁️ Clear sky\n🌡 Температура: 18°\n🤔 Ощущается как: 18°\n💧 Влажность: 60%\n🍃 Ветер: 3.1 м/с"
    );
}

#[tokio::test]
async fn test_empty_city_makes_no_call() {
    let provider = Arc::new(ScriptedProvider::default());
    let (_dir, pipeline) = setup(provider.clone());

    assert_eq!(pipeline.query_city(1, "").await, messages::WEATHER_USAGE);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_no_favorites_makes_no_call() {
    let provider = Arc::new(ScriptedProvider::default());
    let (_dir, pipeline) = setup(provider.clone());

    let reply = pipeline.query_favorites(1).await.unwrap();

    assert_eq!(reply, messages::NO_FAVORITES);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_failed_city_gets_placeholder_block() {
    let provider = Arc::new(
        ScriptedProvider::default()
            .with_report("Oslo", report("Oslo", "light snow", 1.5))
            .with_delay("Rome", Duration::from_millis(200)),
    );
    let (_dir, pipeline) = setup(provider.clone());

    // Listing order is alphabetical, so Oslo comes back first.
    pipeline.add_favorite(5, "Rome").await.unwrap();
    pipeline.add_favorite(5, "Oslo").await.unwrap();

    let reply = pipeline.query_favorites(5).await.unwrap();

    assert_eq!(
        reply,
        "⭐ Погода в избранных:\n\n\
         • Oslo\n☁️ Light snow\n🌡 Температура: 2°\n\n\
         • Rome\n  (не удалось получить данные)"
    );
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_slow_failure_does_not_reorder_blocks() {
    // "Amsterdam" is listed first, fails and finishes last.
    let provider = Arc::new(
        ScriptedProvider::default()
            .with_report("Oslo", report("Oslo", "clear", 4.0))
            .with_delay("Amsterdam", Duration::from_millis(200)),
    );
    let (_dir, pipeline) = setup(provider.clone());

    pipeline.add_favorite(9, "Oslo").await.unwrap();
    pipeline.add_favorite(9, "Amsterdam").await.unwrap();

    let reply = pipeline.query_favorites(9).await.unwrap();
    let amsterdam = reply.find("• Amsterdam").unwrap();
    let oslo = reply.find("• Oslo").unwrap();

    assert!(amsterdam < oslo);
    assert!(reply.contains("• Amsterdam\n  (не удалось получить данные)"));
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_favorites_button_routes_to_favorites() {
    let provider = Arc::new(
        ScriptedProvider::default().with_report("Oslo", report("Oslo", "fog", 0.4)),
    );
    let (_dir, pipeline) = setup(provider.clone());

    let add = Command::parse("/add Oslo").unwrap();
    assert_eq!(pipeline.handle(3, add).await, "✅ Добавил Oslo в избранное");

    let command = Command::parse(weatherbot_core::command::FAVORITES_BUTTON).unwrap();
    let reply = pipeline.handle(3, command).await;

    assert_eq!(reply, "⭐ Погода в избранных:\n\n• Oslo\n☁️ Fog\n🌡 Температура: 0°");
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_free_text_miss_asks_to_retry() {
    let provider = Arc::new(ScriptedProvider::default());
    let (_dir, pipeline) = setup(provider.clone());

    let text = Command::parse("Атлантида").unwrap();
    assert_eq!(pipeline.handle(1, text).await, messages::CITY_NOT_FOUND_RETRY);

    let command = Command::parse("/weather Атлантида").unwrap();
    assert_eq!(pipeline.handle(1, command).await, messages::CITY_NOT_FOUND);

    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_free_text_hit_formats_report() {
    let provider = Arc::new(
        ScriptedProvider::default().with_report("Казань", report("Казань", "ясно", 12.5)),
    );
    let (_dir, pipeline) = setup(provider.clone());

    let text = Command::parse("  Казань ").unwrap();
    assert_eq!(pipeline.handle(1, text).await, "🌍 Казань\n☁️ Ясно\n🌡 Температура: 12°");
}

#[tokio::test]
async fn test_concurrency_limit_of_one_still_fetches_everything() {
    let mut provider = ScriptedProvider::default();
    for city in ["Bergen", "Oslo", "Tromsø"] {
        provider = provider.with_report(city, report(city, "rain", 7.0));
    }
    let provider = Arc::new(provider);

    let dir = tempfile::tempdir().unwrap();
    let store = FavoritesStore::open(dir.path().join("favorites.db")).unwrap();
    let pipeline = QueryPipeline::new(provider.clone(), store).with_max_concurrent_fetches(0);

    for city in ["Tromsø", "Bergen", "Oslo"] {
        pipeline.add_favorite(2, city).await.unwrap();
    }

    let reply = pipeline.query_favorites(2).await.unwrap();
    let blocks: Vec<&str> = reply.split("\n\n").skip(1).collect();

    assert_eq!(blocks.len(), 3);
    assert!(blocks[0].starts_with("• Bergen"));
    assert!(blocks[1].starts_with("• Oslo"));
    assert!(blocks[2].starts_with("• Tromsø"));
    assert_eq!(provider.calls(), 3);
}

#[test]
fn test_report_numbers_print_as_given() {
    let report = WeatherReport {
        location_name: "Sochi".to_string(),
        description: Some("clear sky".to_string()),
        temperature: None,
        feels_like: None,
        humidity: Some(Number::from(85)),
        wind_speed: Some(Number::from(4)),
    };

    assert_eq!(
        weatherbot_core::format_report(&report),
        "🌍 Sochi\n☁️ Clear sky\n💧 Влажность: 85%\n🍃 Ветер: 4 м/с"
    );
}
