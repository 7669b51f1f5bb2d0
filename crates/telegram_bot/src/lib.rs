//! Telegram transport for the shared pet ledger.
//!
//! The bot is a thin client over the reconciliation engine: it renders
//! menus, walks each multi-step flow as an explicit conversation state
//! machine, and commits a draft to the engine only at the terminal step.
use std::{collections::HashMap, sync::Arc};

use teloxide::prelude::*;

use engine::{Engine, Participant};

mod commands;
mod handlers;
mod ics;
mod parsing;
mod state;
mod ui;

pub use ics::CalendarNotifier;

use commands::LedgerCommands;

#[derive(Clone)]
pub struct ConfigParameters {
    pub(crate) users: Arc<HashMap<u64, Participant>>,
    pub(crate) engine: Arc<Engine>,
    pub(crate) sessions: state::SessionStore,
    pub(crate) pet_name: String,
}

pub struct Bot {
    token: String,
    users: HashMap<u64, Participant>,
    engine: Arc<Engine>,
    pet_name: String,
}

impl Bot {
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);
        let parameters = ConfigParameters {
            users: Arc::new(self.users.clone()),
            engine: self.engine.clone(),
            sessions: state::SessionStore::default(),
            pet_name: self.pet_name.clone(),
        };

        let handler = dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<LedgerCommands>()
                    .endpoint(handlers::handle_command),
            )
            .branch(Update::filter_message().endpoint(handlers::handle_message))
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Default)]
pub struct BotBuilder {
    token: String,
    users: HashMap<u64, Participant>,
    engine: Option<Arc<Engine>>,
    pet_name: String,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    /// Allow-list of telegram user ids, each mapped to its participant
    /// slot. Exactly two are expected.
    pub fn users(mut self, users: impl IntoIterator<Item = (u64, Participant)>) -> BotBuilder {
        self.users = users.into_iter().collect();
        self
    }

    pub fn engine(mut self, engine: Arc<Engine>) -> BotBuilder {
        self.engine = Some(engine);
        self
    }

    pub fn pet_name(mut self, pet_name: &str) -> BotBuilder {
        self.pet_name = pet_name.to_string();
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");
        if self.token.is_empty() {
            return Err("telegram bot token is required".to_string());
        }
        if self.users.len() != 2 {
            return Err(format!(
                "expected exactly 2 authorized users, got {}",
                self.users.len()
            ));
        }
        let engine = self.engine.ok_or("telegram bot requires an engine")?;

        Ok(Bot {
            token: self.token,
            users: self.users,
            engine,
            pet_name: if self.pet_name.is_empty() {
                "Pet".to_string()
            } else {
                self.pet_name
            },
        })
    }
}
