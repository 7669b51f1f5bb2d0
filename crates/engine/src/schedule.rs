//! Recurrence projection for the health-event categories.
//!
//! Vaccinations recur every 365 days and blood tests every 183, both as
//! fixed-day offsets from the most recent logged occurrence. Only the
//! latest logical date per category feeds the projection; earlier
//! occurrences never chain.
use chrono::{Days, NaiveDate};

use crate::{Category, Entry};

const VACCINATION_INTERVAL_DAYS: u64 = 365;
const BLOOD_TEST_INTERVAL_DAYS: u64 = 183;

/// A computed reminder for one recurring category, handed to the
/// dispatch boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReminderSchedule {
    pub category: Category,
    pub last_date: NaiveDate,
    pub next_due: NaiveDate,
    pub notes: String,
}

/// A reminder with its distance from today; negative means overdue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReminderProjection {
    pub schedule: ReminderSchedule,
    pub days_until: i64,
}

/// Days between occurrences, for recurring categories only.
#[must_use]
pub fn recurrence_interval(category: Category) -> Option<u64> {
    match category {
        Category::Vaccination => Some(VACCINATION_INTERVAL_DAYS),
        Category::BloodTest => Some(BLOOD_TEST_INTERVAL_DAYS),
        _ => None,
    }
}

/// The due date following an occurrence on `last_date`, or `None` for a
/// non-recurring category.
#[must_use]
pub fn next_due(category: Category, last_date: NaiveDate) -> Option<NaiveDate> {
    recurrence_interval(category).and_then(|days| last_date.checked_add_days(Days::new(days)))
}

/// Builds the reminder that follows logging or re-dating `entry`, if its
/// category recurs.
#[must_use]
pub fn schedule_for(entry: &Entry) -> Option<ReminderSchedule> {
    let due = next_due(entry.category, entry.date)?;
    Some(ReminderSchedule {
        category: entry.category,
        last_date: entry.date,
        next_due: due,
        notes: entry.description.clone(),
    })
}

/// Projects the upcoming reminder per recurring category from the whole
/// ledger.
///
/// The scan keeps the maximum logical date per category; entry order in
/// storage is irrelevant.
#[must_use]
pub fn project_reminders(entries: &[Entry], today: NaiveDate) -> Vec<ReminderProjection> {
    let mut projections = Vec::new();

    for category in [Category::Vaccination, Category::BloodTest] {
        let latest = entries
            .iter()
            .filter(|e| e.category == category)
            .max_by_key(|e| e.date);
        let Some(latest) = latest else {
            continue;
        };
        let Some(schedule) = schedule_for(latest) else {
            continue;
        };

        let days_until = (schedule.next_due - today).num_days();
        projections.push(ReminderProjection {
            schedule,
            days_until,
        });
    }

    projections
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::Money;

    use super::*;

    fn tracking_entry(category: Category, date: NaiveDate, second: u32) -> Entry {
        Entry {
            id: format!("20260101_00000{second}_1"),
            date,
            category,
            amount: Money::ZERO,
            paid_by: "Mabel".to_string(),
            description: "jab".to_string(),
            entry_timestamp: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, second).unwrap(),
            originator_id: "1".to_string(),
            share_a: Money::ZERO,
            share_b: Money::ZERO,
        }
    }

    #[test]
    fn fixed_offsets_match_expected_dates() {
        let last = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(
            next_due(Category::Vaccination, last).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 9).unwrap()
        );
        assert_eq!(
            next_due(Category::BloodTest, last).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 11).unwrap()
        );
        assert_eq!(next_due(Category::VetVisit, last), None);
    }

    #[test]
    fn projection_uses_only_latest_occurrence() {
        let entries = vec![
            tracking_entry(
                Category::Vaccination,
                NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
                1,
            ),
            tracking_entry(
                Category::Vaccination,
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                2,
            ),
        ];

        let today = NaiveDate::from_ymd_opt(2023, 7, 1).unwrap();
        let projections = project_reminders(&entries, today);
        assert_eq!(projections.len(), 1);
        assert_eq!(
            projections[0].schedule.last_date,
            NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
        );
        assert_eq!(
            projections[0].schedule.next_due,
            NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()
        );
    }

    #[test]
    fn days_until_goes_negative_when_overdue() {
        let entries = vec![tracking_entry(
            Category::BloodTest,
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            1,
        )];

        let today = NaiveDate::from_ymd_opt(2024, 7, 21).unwrap();
        let projections = project_reminders(&entries, today);
        assert_eq!(projections[0].days_until, -10);
    }

    #[test]
    fn empty_ledger_projects_nothing() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert!(project_reminders(&[], today).is_empty());
    }
}
