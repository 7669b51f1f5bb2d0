//! The module contains the `Entry` type, one row of the shared ledger.
//!
//! Expenses, tracking-only health events and settlement payments are all
//! represented by `Entry`; the [`Category`] decides which rules apply.
use core::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{
    EngineError, Money, Participant, Participants,
    split::{SplitPolicy, compute_split},
};

/// Storage format for logical dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Storage format for entry timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fixed set of ledger categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    VetVisit,
    Vaccination,
    BloodTest,
    OtherVet,
    OtherExpense,
    SettlementPayment,
}

impl Category {
    /// Categories a user can log through the expense flow, in menu order.
    pub const LOGGABLE: [Category; 5] = [
        Category::VetVisit,
        Category::Vaccination,
        Category::BloodTest,
        Category::OtherVet,
        Category::OtherExpense,
    ];

    /// The label stored in the `category` column.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Category::VetVisit => "Vet Visit",
            Category::Vaccination => "Vaccination",
            Category::BloodTest => "Blood Test",
            Category::OtherVet => "Other Vet",
            Category::OtherExpense => "Other Expense",
            Category::SettlementPayment => "Settlement Payment",
        }
    }

    /// Tracking-only categories are logged at zero amount with zero
    /// shares; no money changes hands.
    #[must_use]
    pub const fn is_tracking_only(self) -> bool {
        matches!(self, Category::Vaccination | Category::BloodTest)
    }

    pub fn parse(label: &str) -> Result<Category, EngineError> {
        match label {
            "Vet Visit" => Ok(Category::VetVisit),
            "Vaccination" => Ok(Category::Vaccination),
            "Blood Test" => Ok(Category::BloodTest),
            "Other Vet" => Ok(Category::OtherVet),
            "Other Expense" => Ok(Category::OtherExpense),
            "Settlement Payment" => Ok(Category::SettlementPayment),
            other => Err(EngineError::Validation(format!(
                "unknown category: {other}"
            ))),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One ledger row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub id: String,
    pub date: NaiveDate,
    pub category: Category,
    pub amount: Money,
    pub paid_by: String,
    pub description: String,
    pub entry_timestamp: DateTime<Utc>,
    pub originator_id: String,
    pub share_a: Money,
    pub share_b: Money,
}

/// Inputs collected by the logging conversation before commit.
#[derive(Clone, Debug)]
pub struct EntryDraft {
    pub date: NaiveDate,
    pub category: Category,
    pub amount: Money,
    pub paid_by: Participant,
    pub policy: SplitPolicy,
    pub description: String,
}

impl Entry {
    /// Validates a draft and builds the row for it.
    ///
    /// Tracking-only categories get amount and shares forced to zero;
    /// everything else runs the split calculator so the share-sum
    /// invariant holds from the start.
    pub fn from_draft(
        draft: EntryDraft,
        participants: &Participants,
        originator_id: &str,
        logged_at: DateTime<Utc>,
    ) -> Result<Entry, EngineError> {
        if draft.category == Category::SettlementPayment {
            return Err(EngineError::Validation(
                "settlements are recorded through the settlement flow".to_string(),
            ));
        }
        if draft.amount.is_negative() {
            return Err(EngineError::Validation(
                "amount must not be negative".to_string(),
            ));
        }
        let description = draft.description.trim().to_string();
        if description.is_empty() {
            return Err(EngineError::Validation(
                "description must not be empty".to_string(),
            ));
        }

        // Tracking-only entries have no payer; nobody spent anything.
        let (amount, paid_by, share_a, share_b) = if draft.category.is_tracking_only() {
            (Money::ZERO, "N/A".to_string(), Money::ZERO, Money::ZERO)
        } else {
            let (a, b) = compute_split(draft.amount, draft.paid_by, draft.policy)?;
            (
                draft.amount,
                participants.name(draft.paid_by).to_string(),
                a,
                b,
            )
        };

        Ok(Entry {
            id: entry_id(logged_at, originator_id, false),
            date: draft.date,
            category: draft.category,
            amount,
            paid_by,
            description,
            entry_timestamp: logged_at,
            originator_id: originator_id.to_string(),
            share_a,
            share_b,
        })
    }

    /// Builds a settlement row: `from` paid `amount` to the other
    /// participant. The amount column stays zero; the transfer lives in
    /// the shares, payer negative and receiver positive.
    pub fn settlement(
        from: Participant,
        amount: Money,
        date: NaiveDate,
        participants: &Participants,
        originator_id: &str,
        logged_at: DateTime<Utc>,
    ) -> Result<Entry, EngineError> {
        if amount.is_negative() || amount.is_zero() {
            return Err(EngineError::Validation(
                "settlement amount must be positive".to_string(),
            ));
        }

        let (share_a, share_b) = match from {
            Participant::A => (-amount, amount),
            Participant::B => (amount, -amount),
        };

        Ok(Entry {
            id: entry_id(logged_at, originator_id, true),
            date,
            category: Category::SettlementPayment,
            amount: Money::ZERO,
            paid_by: participants.settlement_label(from),
            description: format!(
                "Settlement: {} paid {}",
                participants.name(from),
                participants.name(from.other())
            ),
            entry_timestamp: logged_at,
            originator_id: originator_id.to_string(),
            share_a,
            share_b,
        })
    }

    #[must_use]
    pub fn is_settlement(&self) -> bool {
        self.category == Category::SettlementPayment
    }
}

/// Lookup/edit/delete key: creation second plus originator, with a
/// marker suffix for settlement rows.
fn entry_id(logged_at: DateTime<Utc>, originator_id: &str, settlement: bool) -> String {
    let stamp = logged_at.format("%Y%m%d_%H%M%S");
    if settlement {
        format!("{stamp}_{originator_id}_settlement")
    } else {
        format!("{stamp}_{originator_id}")
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "entries")]
pub struct Model {
    pub date: String,
    pub category: String,
    pub amount_minor: i64,
    pub paid_by: String,
    pub description: String,
    pub entry_timestamp: String,
    pub originator_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub share_a_minor: i64,
    pub share_b_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Entry {
    type Error = EngineError;

    /// Read-path conversion. Failures here mark a row as malformed;
    /// scans drop such rows instead of aborting.
    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(&model.date, DATE_FORMAT)
            .map_err(|_| EngineError::Validation(format!("unparseable date: {}", model.date)))?;
        let category = Category::parse(&model.category)?;
        let entry_timestamp =
            NaiveDateTime::parse_from_str(&model.entry_timestamp, TIMESTAMP_FORMAT)
                .map(|naive| naive.and_utc())
                .map_err(|_| {
                    EngineError::Validation(format!(
                        "unparseable timestamp: {}",
                        model.entry_timestamp
                    ))
                })?;

        Ok(Entry {
            id: model.id,
            date,
            category,
            amount: Money::from_cents(model.amount_minor),
            paid_by: model.paid_by,
            description: model.description,
            entry_timestamp,
            originator_id: model.originator_id,
            share_a: Money::from_cents(model.share_a_minor),
            share_b: Money::from_cents(model.share_b_minor),
        })
    }
}

impl From<&Entry> for ActiveModel {
    fn from(entry: &Entry) -> Self {
        Self {
            date: ActiveValue::Set(entry.date.format(DATE_FORMAT).to_string()),
            category: ActiveValue::Set(entry.category.label().to_string()),
            amount_minor: ActiveValue::Set(entry.amount.cents()),
            paid_by: ActiveValue::Set(entry.paid_by.clone()),
            description: ActiveValue::Set(entry.description.clone()),
            entry_timestamp: ActiveValue::Set(
                entry.entry_timestamp.format(TIMESTAMP_FORMAT).to_string(),
            ),
            originator_id: ActiveValue::Set(entry.originator_id.clone()),
            id: ActiveValue::Set(entry.id.clone()),
            share_a_minor: ActiveValue::Set(entry.share_a.cents()),
            share_b_minor: ActiveValue::Set(entry.share_b.cents()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn participants() -> Participants {
        Participants::new("Mabel", "Jade").unwrap()
    }

    fn logged_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()
    }

    #[test]
    fn category_labels_round_trip() {
        for category in Category::LOGGABLE {
            assert_eq!(Category::parse(category.label()).unwrap(), category);
        }
        assert!(Category::parse("Groceries").is_err());
    }

    #[test]
    fn draft_builds_expense_with_split() {
        let entry = Entry::from_draft(
            EntryDraft {
                date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
                category: Category::VetVisit,
                amount: Money::from_cents(10_000),
                paid_by: Participant::A,
                policy: SplitPolicy::Equal,
                description: "Checkup".to_string(),
            },
            &participants(),
            "179080995",
            logged_at(),
        )
        .unwrap();

        assert_eq!(entry.id, "20260314_092653_179080995");
        assert_eq!(entry.paid_by, "Mabel");
        assert_eq!(entry.share_a + entry.share_b, entry.amount);
    }

    #[test]
    fn tracking_only_forces_zero_amount_and_shares() {
        let entry = Entry::from_draft(
            EntryDraft {
                date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
                category: Category::Vaccination,
                amount: Money::from_cents(5_000),
                paid_by: Participant::B,
                policy: SplitPolicy::Equal,
                description: "Annual jab".to_string(),
            },
            &participants(),
            "75259354",
            logged_at(),
        )
        .unwrap();

        assert!(entry.amount.is_zero());
        assert!(entry.share_a.is_zero());
        assert!(entry.share_b.is_zero());
    }

    #[test]
    fn draft_rejects_empty_description_and_negative_amount() {
        let draft = EntryDraft {
            date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            category: Category::OtherExpense,
            amount: Money::from_cents(100),
            paid_by: Participant::A,
            policy: SplitPolicy::Equal,
            description: "  ".to_string(),
        };
        assert!(Entry::from_draft(draft.clone(), &participants(), "x", logged_at()).is_err());

        let draft = EntryDraft {
            amount: Money::from_cents(-100),
            description: "Food".to_string(),
            ..draft
        };
        assert!(Entry::from_draft(draft, &participants(), "x", logged_at()).is_err());
    }

    #[test]
    fn settlement_shares_are_opposed_and_id_suffixed() {
        let entry = Entry::settlement(
            Participant::B,
            Money::from_cents(2_150),
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            &participants(),
            "75259354",
            logged_at(),
        )
        .unwrap();

        assert!(entry.id.ends_with("_settlement"));
        assert_eq!(entry.paid_by, "Jade → Mabel");
        assert!(entry.amount.is_zero());
        assert_eq!(entry.share_a.cents(), 2_150);
        assert_eq!(entry.share_b.cents(), -2_150);
    }

    #[test]
    fn model_round_trip_preserves_entry() {
        let entry = Entry::from_draft(
            EntryDraft {
                date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
                category: Category::OtherVet,
                amount: Money::from_cents(4_305),
                paid_by: Participant::B,
                policy: SplitPolicy::Custom {
                    other_share: Money::from_cents(1_000),
                },
                description: "X-ray".to_string(),
            },
            &participants(),
            "75259354",
            logged_at(),
        )
        .unwrap();

        let model = Model {
            date: entry.date.format(DATE_FORMAT).to_string(),
            category: entry.category.label().to_string(),
            amount_minor: entry.amount.cents(),
            paid_by: entry.paid_by.clone(),
            description: entry.description.clone(),
            entry_timestamp: entry.entry_timestamp.format(TIMESTAMP_FORMAT).to_string(),
            originator_id: entry.originator_id.clone(),
            id: entry.id.clone(),
            share_a_minor: entry.share_a.cents(),
            share_b_minor: entry.share_b.cents(),
        };

        assert_eq!(Entry::try_from(model).unwrap(), entry);
    }

    #[test]
    fn malformed_model_fails_conversion() {
        let model = Model {
            date: "not-a-date".to_string(),
            category: "Vet Visit".to_string(),
            amount_minor: 0,
            paid_by: String::new(),
            description: String::new(),
            entry_timestamp: "2026-03-14 09:26:53".to_string(),
            originator_id: String::new(),
            id: "x".to_string(),
            share_a_minor: 0,
            share_b_minor: 0,
        };
        assert!(Entry::try_from(model).is_err());
    }
}
