//! Edit/delete coordination.
//!
//! Edits are typed: each editable field has its own variant with its own
//! validation, so a typo'd field name can never silently no-op. Payment
//! data (amount, payer, split policy) travels as one unit because
//! editing any of it invalidates the stored shares.
use chrono::NaiveDate;
use sea_orm::prelude::*;

use crate::{
    Engine, Entry, EngineError, Money, Participant, ReminderOutcome, ResultEngine,
    entry,
    split::{SplitPolicy, compute_split},
};

/// One validated change to an existing entry.
#[derive(Clone, Debug)]
pub enum EntryUpdate {
    Date(NaiveDate),
    Description(String),
    Payment {
        amount: Money,
        paid_by: Participant,
        policy: SplitPolicy,
    },
}

/// Result of an update: the entry as persisted plus, when a recurring
/// entry was re-dated, the superseding reminder outcome.
#[derive(Clone, Debug)]
pub struct UpdateOutcome {
    pub entry: Entry,
    pub reminder: Option<ReminderOutcome>,
}

impl Engine {
    /// Applies one typed update to the entry with `id`.
    ///
    /// Settlement rows only support deletion; their shares encode a
    /// specific transfer and editing in place would corrupt balances.
    /// Re-dating a recurring entry recomputes the schedule and fires the
    /// notifier again, superseding the earlier reminder.
    pub async fn update_entry(&self, id: &str, update: EntryUpdate) -> ResultEngine<UpdateOutcome> {
        let model = entry::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        let mut updated = Entry::try_from(model)?;

        if updated.is_settlement() {
            return Err(EngineError::Validation(
                "settlement entries can only be deleted".to_string(),
            ));
        }

        let mut redated = false;
        match update {
            EntryUpdate::Date(date) => {
                updated.date = date;
                redated = true;
            }
            EntryUpdate::Description(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Err(EngineError::Validation(
                        "description must not be empty".to_string(),
                    ));
                }
                updated.description = text;
            }
            EntryUpdate::Payment {
                amount,
                paid_by,
                policy,
            } => {
                if updated.category.is_tracking_only() {
                    return Err(EngineError::Validation(
                        "tracking-only entries have no payment to edit".to_string(),
                    ));
                }
                if amount.is_negative() {
                    return Err(EngineError::Validation(
                        "amount must not be negative".to_string(),
                    ));
                }

                // Shares always come out of the split calculator, never
                // out of ad-hoc adjustment of the stored values.
                let (share_a, share_b) = if amount.is_zero() {
                    (Money::ZERO, Money::ZERO)
                } else {
                    compute_split(amount, paid_by, policy)?
                };
                updated.amount = amount;
                updated.paid_by = self.participants.name(paid_by).to_string();
                updated.share_a = share_a;
                updated.share_b = share_b;
            }
        }

        entry::ActiveModel::from(&updated)
            .update(&self.database)
            .await?;

        let reminder = if redated {
            self.dispatch_reminder(&updated).await
        } else {
            None
        };

        Ok(UpdateOutcome {
            entry: updated,
            reminder,
        })
    }

    /// Removes the entry with `id` permanently. Returns `false` when no
    /// row matched; deleting an already-absent id is not an error.
    pub async fn delete_entry(&self, id: &str) -> ResultEngine<bool> {
        let result = entry::Entity::delete_by_id(id).exec(&self.database).await?;
        Ok(result.rows_affected > 0)
    }
}
