//! Handles settings for the application. Configuration is written in
//! `settings.toml`.
use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

/// One authorized ledger participant: a telegram account and the name
/// shown in summaries. Order matters; the first user is slot A.
#[derive(Debug, Deserialize)]
pub struct TelegramUser {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    pub pet_name: String,
    pub users: Vec<TelegramUser>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub telegram: Telegram,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .build()?;

        settings.try_deserialize()
    }
}
