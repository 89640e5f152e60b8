use serde_json::Number;

/// Telegram-style numeric user identity.
pub type UserId = i64;

/// Current conditions for one city, as decoded from the provider.
///
/// Only `location_name` and `description` are always present. The remaining
/// fields are `None` when the provider omitted them.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub location_name: String,
    pub description: Option<String>,
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    /// Kept as the provider's JSON number so it prints exactly as given.
    pub humidity: Option<Number>,
    /// Kept as the provider's JSON number so it prints exactly as given.
    pub wind_speed: Option<Number>,
}

/// Outcome of a single city lookup inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Success(WeatherReport),
    Failure { city: String },
}

impl QueryResult {
    pub fn from_lookup(city: &str, report: Option<WeatherReport>) -> Self {
        match report {
            Some(report) => QueryResult::Success(report),
            None => QueryResult::Failure { city: city.to_string() },
        }
    }
}

/// Trim a user-supplied city and reject it if nothing is left.
pub fn normalize_city(raw: &str) -> Option<&str> {
    let city = raw.trim();
    if city.is_empty() { None } else { Some(city) }
}
