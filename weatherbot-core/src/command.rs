//! Bot commands as typed values.
//!
//! Slash commands and free text both end up here, so the pipeline never has
//! to compare raw message text against button labels.

/// Label of the persistent keyboard button that shows weather for all favorites.
pub const FAVORITES_BUTTON: &str = "⭐ Избранное";

pub const GREETING: &str = "👋 Привет! ";

pub const HELP: &str = "Я бот погоды. Команды:\n\
    /start — приветствие\n\
    /help — помощь\n\
    /weather {город} — погода в выбранном городе\n\
    /add {город} — добавить город в избранное\n\
    /remove {город} — убрать город из избранного\n\
    /list — список избранных городов\n\
    /fav — погода во всех избранных городах\n\
    Или просто отправь свой город в виде сообщения";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// Weather for one city. The argument may be empty; the pipeline answers with guidance.
    Weather(String),
    /// A plain-text message naming a city. Looked up like `Weather`, but a miss
    /// invites the user to try again.
    City(String),
    Add(String),
    Remove(String),
    List,
    /// Weather for every favorite. Reached via `/fav` or the favorites button.
    Favorites,
}

impl Command {
    /// Parse an incoming message: a slash command, or free text.
    ///
    /// Returns `None` for unknown commands and for text that should be ignored.
    pub fn parse(message: &str) -> Option<Self> {
        let message = message.trim();
        match message.strip_prefix('/') {
            Some(rest) => {
                let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                // Group chats address commands as `/weather@some_bot`.
                let name = name.split('@').next().unwrap_or(name);
                Self::from_command(name, args)
            }
            None => Self::from_text(message),
        }
    }

    /// Build a command from its name (without the slash) and raw argument text.
    ///
    /// Arguments are whitespace-normalized so multi-word city names survive.
    pub fn from_command(name: &str, args: &str) -> Option<Self> {
        let args = join_args(args);
        let command = match name.to_lowercase().as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "weather" => Command::Weather(args),
            "add" => Command::Add(args),
            "remove" => Command::Remove(args),
            "list" => Command::List,
            "fav" => Command::Favorites,
            _ => return None,
        };
        Some(command)
    }

    /// Reply for commands that need neither the provider nor the store.
    pub fn static_reply(&self) -> Option<String> {
        match self {
            Command::Start => Some(format!("{GREETING}{HELP}")),
            Command::Help => Some(HELP.to_string()),
            _ => None,
        }
    }

    /// Interpret a plain-text message.
    ///
    /// The favorites button is an alias for [`Command::Favorites`]. Anything else
    /// of two or more characters is treated as a city name ([`Command::City`]).
    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();

        if text == FAVORITES_BUTTON {
            return Some(Command::Favorites);
        }
        if text.starts_with('/') || text.chars().count() < 2 {
            return None;
        }

        Some(Command::City(text.to_string()))
    }
}

fn join_args(args: &str) -> String {
    args.split_whitespace().collect::<Vec<_>>().join(" ")
}
