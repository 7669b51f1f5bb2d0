use std::sync::Arc;

use migration::{Migrator, MigratorTrait};

use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "pawledger={level},telegram_bot={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.database).await?;

    let telegram = settings.telegram;
    if telegram.users.len() != 2 {
        return Err(format!(
            "exactly two telegram users must be configured, got {}",
            telegram.users.len()
        )
        .into());
    }

    let participants =
        engine::Participants::new(&telegram.users[0].name, &telegram.users[1].name)?;
    let notifier = telegram_bot::CalendarNotifier::new(
        &telegram.token,
        telegram.users.iter().map(|user| user.id).collect(),
        &telegram.pet_name,
    );

    let engine = engine::Engine::builder()
        .database(db)
        .participants(participants)
        .notifier(Arc::new(notifier))
        .build()?;

    let users = [
        (telegram.users[0].id, engine::Participant::A),
        (telegram.users[1].id, engine::Participant::B),
    ];

    match telegram_bot::Bot::builder()
        .token(&telegram.token)
        .engine(Arc::new(engine))
        .users(users)
        .pet_name(&telegram.pet_name)
        .build()
    {
        Ok(bot) => bot.run().await,
        Err(err) => tracing::error!("failed to initialize telegram bot: {err}"),
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
