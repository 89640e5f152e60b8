use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, Select, Text};
use weatherbot_core::{Command as BotCommand, Config, QueryPipeline, UserId};

const UNITS: &[&str] = &["metric", "imperial", "standard"];

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherbot", version, about = "Weather bot with per-user favorite cities", disable_help_subcommand = true)]
pub struct Cli {
    /// Chat user the request is made on behalf of.
    #[arg(short, long, global = true, default_value_t = 0, allow_negative_numbers = true)]
    pub user: UserId,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively store the API key, units and language.
    Configure,

    /// Greeting with the list of commands.
    Start,

    /// List of commands.
    Help,

    /// Show weather for a city.
    Weather {
        /// City name; several words are joined with spaces.
        city: Vec<String>,
    },

    /// Add a city to favorites.
    Add { city: Vec<String> },

    /// Remove a city from favorites.
    Remove { city: Vec<String> },

    /// List favorite cities.
    List,

    /// Show weather for every favorite city.
    Fav,

    /// Send a raw chat message, e.g. "/weather Москва", "Казань" or "⭐ Избранное".
    Say { text: Vec<String> },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let bot_command = match self.command {
            Command::Configure => return configure(),
            Command::Start => BotCommand::Start,
            Command::Help => BotCommand::Help,
            Command::Weather { city } => BotCommand::Weather(city.join(" ")),
            Command::Add { city } => BotCommand::Add(city.join(" ")),
            Command::Remove { city } => BotCommand::Remove(city.join(" ")),
            Command::List => BotCommand::List,
            Command::Fav => BotCommand::Favorites,
            Command::Say { text } => match BotCommand::parse(&text.join(" ")) {
                Some(command) => command,
                None => {
                    tracing::debug!("message ignored");
                    return Ok(());
                }
            },
        };

        if let Some(reply) = bot_command.static_reply() {
            println!("{reply}");
            return Ok(());
        }

        let config = Config::load()?;
        let pipeline = QueryPipeline::from_config(&config)?;

        let reply = pipeline.handle(self.user, bot_command).await;
        println!("{reply}");

        Ok(())
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load_file()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let default_units = UNITS.iter().position(|u| *u == cfg.units).unwrap_or(0);
    let units = Select::new("Measurement units:", UNITS.to_vec())
        .with_starting_cursor(default_units)
        .prompt()
        .context("Failed to read measurement units")?;

    let lang = Text::new("Response language code:")
        .with_default(&cfg.lang)
        .prompt()
        .context("Failed to read language code")?;

    cfg.api_key = Some(api_key.trim().to_string());
    cfg.units = units.to_string();
    cfg.lang = lang.trim().to_string();
    cfg.require_api_key()?;
    cfg.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multi_word_city_and_global_user() {
        let cli = Cli::try_parse_from(["weatherbot", "weather", "Нижний", "Новгород", "--user", "42"])
            .unwrap();

        assert_eq!(cli.user, 42);
        assert!(
            matches!(cli.command, Command::Weather { ref city } if city.join(" ") == "Нижний Новгород")
        );
    }

    #[test]
    fn user_defaults_to_zero() {
        let cli = Cli::try_parse_from(["weatherbot", "fav"]).unwrap();
        assert_eq!(cli.user, 0);
        assert!(matches!(cli.command, Command::Fav));
    }
}
