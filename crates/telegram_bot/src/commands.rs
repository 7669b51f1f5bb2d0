//! Command structs
use teloxide::utils::command::BotCommands;

/// Slash commands outside the button-driven flows.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Shared pet ledger commands:")]
pub enum LedgerCommands {
    #[command(description = "Show the welcome message.")]
    Start,
    #[command(description = "Open the main menu (cancels any entry in progress).")]
    Menu,
    #[command(description = "Show this message.")]
    Help,
    #[command(description = "Export the full ledger as a CSV file.")]
    Export,
}
