//! Human-readable rendering of weather reports.
//!
//! Temperatures are rounded half-to-even (21.5 → 22, 22.5 → 22). Humidity and
//! wind speed are printed exactly as the provider sent them.

use crate::model::WeatherReport;

const MISSING_DESCRIPTION: &str = "—";

/// Render a report as the multi-line reply shown for a single city.
pub fn format_report(report: &WeatherReport) -> String {
    let mut parts = vec![format!("🌍 {}", report.location_name)];
    parts.extend(detail_lines(report));
    parts.join("\n")
}

/// Render a report as one block of the favorites digest: `• {name}` in place
/// of the globe header, details unchanged.
pub fn favorite_block(report: &WeatherReport) -> String {
    let mut parts = vec![format!("• {}", report.location_name).trim().to_string()];
    parts.extend(detail_lines(report));
    parts.join("\n")
}

fn detail_lines(report: &WeatherReport) -> Vec<String> {
    let description = report
        .description
        .as_deref()
        .map(capitalize)
        .unwrap_or_else(|| MISSING_DESCRIPTION.to_string());

    let mut lines = vec![format!("☁️ {description}")];

    if let Some(temp) = report.temperature {
        lines.push(format!("🌡 Температура: {}°", round_degrees(temp)));
    }
    if let Some(feels) = report.feels_like {
        lines.push(format!("🤔 Ощущается как: {}°", round_degrees(feels)));
    }
    if let Some(humidity) = &report.humidity {
        lines.push(format!("💧 Влажность: {humidity}%"));
    }
    if let Some(wind) = &report.wind_speed {
        lines.push(format!("🍃 Ветер: {wind} м/с"));
    }

    lines
}

/// Nearest whole degree, ties to even.
pub fn round_degrees(value: f64) -> i64 {
    // `as` saturates on overflow and maps NaN to 0
    value.round_ties_even() as i64
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
