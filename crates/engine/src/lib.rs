//! Shared-ledger reconciliation engine.
//!
//! The engine owns the rules by which expense entries, splits,
//! settlements and recurring health events combine into balances and
//! reminder schedules. It talks to a sea-orm store for persistence and
//! to a [`ScheduleNotifier`] for reminder delivery; everything else
//! (chat transport, rendering, configuration) lives outside.
use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use dispatch::{NotifyFuture, ReminderOutcome, ScheduleNotifier};
pub use entry::{Category, Entry, EntryDraft};
pub use error::EngineError;
pub use money::Money;
pub use ops::{EntryUpdate, LoggedEntry, UpdateOutcome};
pub use participants::{Participant, Participants};
pub use schedule::{
    ReminderProjection, ReminderSchedule, next_due, project_reminders, recurrence_interval,
};
pub use split::{SplitPolicy, compute_split};
pub use summary::{Summary, compute_summary};

mod dispatch;
pub mod entry;
mod error;
mod money;
mod ops;
mod participants;
mod schedule;
mod split;
mod summary;

type ResultEngine<T> = Result<T, EngineError>;

/// The reconciliation engine: one store connection, one participant
/// pair, one optional reminder notifier.
pub struct Engine {
    database: DatabaseConnection,
    participants: Participants,
    notifier: Option<Arc<dyn ScheduleNotifier>>,
}

impl Engine {
    /// Return a builder for `Engine`.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    #[must_use]
    pub fn participants(&self) -> &Participants {
        &self.participants
    }
}

/// The builder for `Engine`.
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    participants: Option<Participants>,
    notifier: Option<Arc<dyn ScheduleNotifier>>,
}

impl EngineBuilder {
    /// Pass the required database.
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Pass the required participant pair.
    pub fn participants(mut self, participants: Participants) -> EngineBuilder {
        self.participants = Some(participants);
        self
    }

    /// Pass the reminder notifier. Without one, schedules are still
    /// computed but every delivery reports as failed.
    pub fn notifier(mut self, notifier: Arc<dyn ScheduleNotifier>) -> EngineBuilder {
        self.notifier = Some(notifier);
        self
    }

    /// Construct `Engine`.
    pub fn build(self) -> ResultEngine<Engine> {
        let participants = self.participants.ok_or_else(|| {
            EngineError::Validation("engine requires a participant pair".to_string())
        })?;
        Ok(Engine {
            database: self.database,
            participants,
            notifier: self.notifier,
        })
    }
}
