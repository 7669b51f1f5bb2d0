//! Logging and lookup operations.
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::prelude::*;

use crate::{
    Engine, Entry, EntryDraft, EngineError, Money, Participant, ReminderOutcome, ResultEngine,
    entry, schedule,
};

/// Result of a logging action: the persisted entry plus, for recurring
/// categories, the reminder pipeline outcome.
#[derive(Clone, Debug)]
pub struct LoggedEntry {
    pub entry: Entry,
    pub reminder: Option<ReminderOutcome>,
}

impl Engine {
    /// Validates and appends one expense or tracking entry, then runs
    /// the reminder pipeline for recurring categories.
    ///
    /// Append and notify are independent steps: a delivery failure is
    /// reported in the outcome, never by rolling back the entry.
    pub async fn log_expense(
        &self,
        draft: EntryDraft,
        originator_id: &str,
        logged_at: DateTime<Utc>,
    ) -> ResultEngine<LoggedEntry> {
        let new_entry = Entry::from_draft(draft, &self.participants, originator_id, logged_at)?;
        entry::ActiveModel::from(&new_entry)
            .insert(&self.database)
            .await?;

        let reminder = self.dispatch_reminder(&new_entry).await;
        Ok(LoggedEntry {
            entry: new_entry,
            reminder,
        })
    }

    /// Appends a settlement: `from` paid `amount` to the other
    /// participant, offsetting the outstanding balance.
    pub async fn log_settlement(
        &self,
        from: Participant,
        amount: Money,
        date: NaiveDate,
        originator_id: &str,
        logged_at: DateTime<Utc>,
    ) -> ResultEngine<Entry> {
        let new_entry = Entry::settlement(
            from,
            amount,
            date,
            &self.participants,
            originator_id,
            logged_at,
        )?;
        entry::ActiveModel::from(&new_entry)
            .insert(&self.database)
            .await?;
        Ok(new_entry)
    }

    /// Looks an entry up by its id.
    pub async fn entry(&self, id: &str) -> ResultEngine<Entry> {
        let model = entry::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        Entry::try_from(model)
    }

    /// All parseable entries, in storage order.
    ///
    /// Rows that fail model conversion are dropped here; the store is
    /// external and may hold partially written rows.
    pub async fn all_entries(&self) -> ResultEngine<Vec<Entry>> {
        let models = entry::Entity::find().all(&self.database).await?;
        Ok(models
            .into_iter()
            .filter_map(|model| Entry::try_from(model).ok())
            .collect())
    }

    /// The most recent entries by logical date (not entry order), newest
    /// first.
    pub async fn recent_entries(&self, limit: usize) -> ResultEngine<Vec<Entry>> {
        let mut entries = self.all_entries().await?;
        entries.sort_by(|left, right| {
            right
                .date
                .cmp(&left.date)
                .then_with(|| right.entry_timestamp.cmp(&left.entry_timestamp))
        });
        entries.truncate(limit);
        Ok(entries)
    }

    /// Runs the reminder pipeline for one just-persisted entry: project
    /// the next due date and hand it to the notifier.
    pub(crate) async fn dispatch_reminder(&self, for_entry: &Entry) -> Option<ReminderOutcome> {
        let reminder = schedule::schedule_for(for_entry)?;
        let Some(notifier) = self.notifier.as_deref() else {
            return Some(ReminderOutcome::DeliveryFailed {
                schedule: reminder,
                reason: "no notifier configured".to_string(),
            });
        };

        Some(match notifier.notify_schedule(&reminder).await {
            Ok(()) => ReminderOutcome::Delivered(reminder),
            Err(err) => ReminderOutcome::DeliveryFailed {
                schedule: reminder,
                reason: err.to_string(),
            },
        })
    }
}
