//! Pure balance aggregation over the ledger.
use crate::{Entry, Money, Participant, Participants};

/// Aggregated spending figures for the whole ledger.
///
/// Indexing is by participant slot: position 0 is slot `A`, position 1
/// slot `B`. Balance sign convention: positive means the participant is
/// net owed money by the other.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub total_spent: Money,
    pub paid_in: [Money; 2],
    pub fair_share: [Money; 2],
    pub balance: [Money; 2],
}

impl Summary {
    #[must_use]
    pub fn paid_in(&self, participant: Participant) -> Money {
        self.paid_in[participant.index()]
    }

    #[must_use]
    pub fn fair_share(&self, participant: Participant) -> Money {
        self.fair_share[participant.index()]
    }

    #[must_use]
    pub fn balance(&self, participant: Participant) -> Money {
        self.balance[participant.index()]
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.balance[0].is_zero()
    }

    /// The participant currently owed money, with the amount, if any.
    #[must_use]
    pub fn creditor(&self) -> Option<(Participant, Money)> {
        let balance_a = self.balance[0];
        if balance_a.is_zero() {
            None
        } else if balance_a.is_negative() {
            Some((Participant::B, balance_a.abs()))
        } else {
            Some((Participant::A, balance_a))
        }
    }
}

/// Folds all entries into the summary figures.
///
/// Settlement rows are transfers, not expenses: they are skipped for
/// `total_spent` and `paid_in` but their shares offset `fair_share`.
/// `paid_in` only credits names that resolve to a participant.
#[must_use]
pub fn compute_summary(entries: &[Entry], participants: &Participants) -> Summary {
    let mut summary = Summary::default();

    for entry in entries {
        if !entry.is_settlement() {
            summary.total_spent += entry.amount;
            if let Some(payer) = participants.resolve(&entry.paid_by) {
                summary.paid_in[payer.index()] += entry.amount;
            }
        }
        summary.fair_share[0] += entry.share_a;
        summary.fair_share[1] += entry.share_b;
    }

    for index in 0..2 {
        summary.balance[index] = summary.paid_in[index] - summary.fair_share[index];
    }
    summary
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::{Category, Entry, EntryDraft, Participant, split::SplitPolicy};

    use super::*;

    fn participants() -> Participants {
        Participants::new("Mabel", "Jade").unwrap()
    }

    fn expense(amount_cents: i64, paid_by: Participant, policy: SplitPolicy, second: u32) -> Entry {
        Entry::from_draft(
            EntryDraft {
                date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
                category: Category::VetVisit,
                amount: Money::from_cents(amount_cents),
                paid_by,
                policy,
                description: "test".to_string(),
            },
            &participants(),
            "1",
            Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, second).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn balances_offset_between_payers() {
        let entries = vec![
            expense(10_000, Participant::A, SplitPolicy::Equal, 1),
            expense(4_000, Participant::B, SplitPolicy::Equal, 2),
        ];
        let summary = compute_summary(&entries, &participants());

        assert_eq!(summary.total_spent.cents(), 14_000);
        assert_eq!(summary.paid_in(Participant::A).cents(), 10_000);
        assert_eq!(summary.paid_in(Participant::B).cents(), 4_000);
        assert_eq!(summary.balance(Participant::A).cents(), 3_000);
        assert_eq!(summary.balance(Participant::B).cents(), -3_000);
        assert_eq!(summary.creditor(), Some((Participant::A, Money::from_cents(3_000))));
    }

    #[test]
    fn settlement_drives_balance_to_zero() {
        let mut entries = vec![expense(10_000, Participant::A, SplitPolicy::Equal, 1)];
        let owed = compute_summary(&entries, &participants())
            .creditor()
            .unwrap()
            .1;

        entries.push(
            Entry::settlement(
                Participant::B,
                owed,
                NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(),
                &participants(),
                "2",
                Utc.with_ymd_and_hms(2026, 1, 6, 10, 0, 0).unwrap(),
            )
            .unwrap(),
        );

        let summary = compute_summary(&entries, &participants());
        assert!(summary.is_settled());
        assert!(summary.creditor().is_none());
        // Transfers do not inflate spending totals.
        assert_eq!(summary.total_spent.cents(), 10_000);
        assert_eq!(summary.paid_in(Participant::B).cents(), 0);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let entries = vec![
            expense(10_000, Participant::A, SplitPolicy::Equal, 1),
            expense(333, Participant::B, SplitPolicy::Equal, 2),
        ];
        let first = compute_summary(&entries, &participants());
        let second = compute_summary(&entries, &participants());
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_payer_counts_toward_total_but_not_paid_in() {
        let mut entry = expense(5_000, Participant::A, SplitPolicy::Equal, 1);
        entry.paid_by = "Someone Else".to_string();

        let summary = compute_summary(&[entry], &participants());
        assert_eq!(summary.total_spent.cents(), 5_000);
        assert_eq!(summary.paid_in(Participant::A).cents(), 0);
        assert_eq!(summary.fair_share(Participant::A).cents(), 2_500);
    }
}
