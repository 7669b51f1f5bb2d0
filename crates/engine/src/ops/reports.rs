//! Read-path reports: balance summary and reminder status.
use chrono::NaiveDate;

use crate::{
    Engine, ResultEngine, Summary,
    schedule::{ReminderProjection, project_reminders},
    summary::compute_summary,
};

impl Engine {
    /// Folds the whole ledger into the spending summary.
    pub async fn summary(&self) -> ResultEngine<Summary> {
        let entries = self.all_entries().await?;
        Ok(compute_summary(&entries, &self.participants))
    }

    /// Upcoming (or overdue) reminders per recurring category, projected
    /// from the latest logged occurrence of each.
    pub async fn reminders(&self, today: NaiveDate) -> ResultEngine<Vec<ReminderProjection>> {
        let entries = self.all_entries().await?;
        Ok(project_reminders(&entries, today))
    }
}
