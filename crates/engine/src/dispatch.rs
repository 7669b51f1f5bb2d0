//! The notification dispatch boundary.
//!
//! The engine computes reminder schedules; delivering them (calendar
//! invites, messages) belongs to a collaborator behind
//! [`ScheduleNotifier`]. The engine invokes the notifier right after a
//! recurring-category append or date edit and reports the delivery
//! result alongside the already-persisted entry — it never rolls the
//! entry back.
use std::{future::Future, pin::Pin};

use crate::{EngineError, schedule::ReminderSchedule};

pub type NotifyFuture<'a> = Pin<Box<dyn Future<Output = Result<(), EngineError>> + Send + 'a>>;

/// Delivery side of the reminder pipeline.
pub trait ScheduleNotifier: Send + Sync {
    /// Delivers one freshly computed schedule. A schedule recomputed for
    /// the same category supersedes the previous one; implementations
    /// should not accumulate.
    fn notify_schedule(&self, schedule: &ReminderSchedule) -> NotifyFuture<'_>;
}

/// What happened to the reminder attached to a mutation.
///
/// Append and notify are two independent steps; this type keeps both
/// outcomes visible to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReminderOutcome {
    /// Schedule computed and handed to the notifier successfully.
    Delivered(ReminderSchedule),
    /// Schedule computed but delivery failed; the entry stays persisted.
    DeliveryFailed {
        schedule: ReminderSchedule,
        reason: String,
    },
}

impl ReminderOutcome {
    #[must_use]
    pub fn schedule(&self) -> &ReminderSchedule {
        match self {
            ReminderOutcome::Delivered(schedule) => schedule,
            ReminderOutcome::DeliveryFailed { schedule, .. } => schedule,
        }
    }

    #[must_use]
    pub fn delivered(&self) -> bool {
        matches!(self, ReminderOutcome::Delivered(_))
    }
}
