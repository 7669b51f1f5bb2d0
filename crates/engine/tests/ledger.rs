use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Category, Engine, EngineError, EntryDraft, EntryUpdate, Money, NotifyFuture, Participant,
    Participants, ReminderOutcome, ReminderSchedule, ScheduleNotifier, SplitPolicy,
};
use migration::MigratorTrait;

#[derive(Default)]
struct RecordingNotifier {
    calls: Mutex<Vec<ReminderSchedule>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    fn calls(&self) -> Vec<ReminderSchedule> {
        self.calls.lock().unwrap().clone()
    }
}

impl ScheduleNotifier for RecordingNotifier {
    fn notify_schedule(&self, schedule: &ReminderSchedule) -> NotifyFuture<'_> {
        let schedule = schedule.clone();
        Box::pin(async move {
            self.calls.lock().unwrap().push(schedule);
            if self.fail.load(Ordering::SeqCst) {
                Err(EngineError::Dispatch("delivery refused".to_string()))
            } else {
                Ok(())
            }
        })
    }
}

async fn engine_with_db() -> (Engine, DatabaseConnection, Arc<RecordingNotifier>) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let notifier = Arc::new(RecordingNotifier::default());
    let engine = Engine::builder()
        .database(db.clone())
        .participants(Participants::new("Mabel", "Jade").unwrap())
        .notifier(notifier.clone())
        .build()
        .unwrap();
    (engine, db, notifier)
}

fn at(second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, second).unwrap()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn expense_draft(amount_cents: i64, paid_by: Participant, policy: SplitPolicy) -> EntryDraft {
    EntryDraft {
        date: date(2026, 3, 10),
        category: Category::VetVisit,
        amount: Money::from_cents(amount_cents),
        paid_by,
        policy,
        description: "Checkup".to_string(),
    }
}

#[tokio::test]
async fn log_expense_persists_with_split_shares() {
    let (engine, _db, _notifier) = engine_with_db().await;

    let logged = engine
        .log_expense(
            expense_draft(10_000, Participant::A, SplitPolicy::Equal),
            "179080995",
            at(1),
        )
        .await
        .unwrap();

    assert!(logged.reminder.is_none());
    assert_eq!(logged.entry.share_a.cents(), 5_000);
    assert_eq!(logged.entry.share_b.cents(), 5_000);

    let stored = engine.entry(&logged.entry.id).await.unwrap();
    assert_eq!(stored, logged.entry);
    assert_eq!(stored.paid_by, "Mabel");
}

#[tokio::test]
async fn tracking_categories_force_zero_and_schedule_reminder() {
    let (engine, _db, notifier) = engine_with_db().await;

    let logged = engine
        .log_expense(
            EntryDraft {
                date: date(2024, 1, 10),
                category: Category::Vaccination,
                amount: Money::from_cents(9_900),
                paid_by: Participant::B,
                policy: SplitPolicy::Equal,
                description: "Annual jab".to_string(),
            },
            "75259354",
            at(1),
        )
        .await
        .unwrap();

    assert!(logged.entry.amount.is_zero());
    assert!(logged.entry.share_a.is_zero());
    assert!(logged.entry.share_b.is_zero());

    let reminder = logged.reminder.unwrap();
    assert!(reminder.delivered());
    assert_eq!(reminder.schedule().next_due, date(2025, 1, 9));

    let calls = notifier.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].last_date, date(2024, 1, 10));
}

#[tokio::test]
async fn blood_test_reminder_uses_semiannual_offset() {
    let (engine, _db, _notifier) = engine_with_db().await;

    let logged = engine
        .log_expense(
            EntryDraft {
                date: date(2024, 1, 10),
                category: Category::BloodTest,
                amount: Money::ZERO,
                paid_by: Participant::A,
                policy: SplitPolicy::Equal,
                description: "Panel".to_string(),
            },
            "1",
            at(1),
        )
        .await
        .unwrap();

    assert_eq!(
        logged.reminder.unwrap().schedule().next_due,
        date(2024, 7, 11)
    );
}

#[tokio::test]
async fn settlement_roundtrip_settles_balance() {
    let (engine, _db, _notifier) = engine_with_db().await;

    engine
        .log_expense(
            expense_draft(10_000, Participant::A, SplitPolicy::Equal),
            "1",
            at(1),
        )
        .await
        .unwrap();

    let summary = engine.summary().await.unwrap();
    let (creditor, owed) = summary.creditor().unwrap();
    assert_eq!(creditor, Participant::A);
    assert_eq!(owed.cents(), 5_000);

    engine
        .log_settlement(Participant::B, owed, date(2026, 3, 11), "2", at(2))
        .await
        .unwrap();

    let summary = engine.summary().await.unwrap();
    assert!(summary.is_settled());
    // A transfer, not an expense: spending totals stay put.
    assert_eq!(summary.total_spent.cents(), 10_000);
    assert_eq!(summary.paid_in(Participant::B).cents(), 0);
}

#[tokio::test]
async fn summary_is_idempotent() {
    let (engine, _db, _notifier) = engine_with_db().await;

    engine
        .log_expense(
            expense_draft(10_000, Participant::A, SplitPolicy::Equal),
            "1",
            at(1),
        )
        .await
        .unwrap();
    engine
        .log_expense(
            expense_draft(333, Participant::B, SplitPolicy::Equal),
            "1",
            at(2),
        )
        .await
        .unwrap();

    let first = engine.summary().await.unwrap();
    let second = engine.summary().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn edit_payment_recomputes_shares() {
    let (engine, _db, _notifier) = engine_with_db().await;

    let logged = engine
        .log_expense(
            expense_draft(10_000, Participant::A, SplitPolicy::Equal),
            "1",
            at(1),
        )
        .await
        .unwrap();
    let before = engine.summary().await.unwrap();

    let outcome = engine
        .update_entry(
            &logged.entry.id,
            EntryUpdate::Payment {
                amount: Money::from_cents(6_000),
                paid_by: Participant::A,
                policy: SplitPolicy::Equal,
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.entry.share_a.cents(), 3_000);
    assert_eq!(outcome.entry.share_b.cents(), 3_000);
    assert!(outcome.reminder.is_none());

    let after = engine.summary().await.unwrap();
    for participant in [Participant::A, Participant::B] {
        assert_eq!(
            (before.fair_share(participant) - after.fair_share(participant)).cents(),
            2_000
        );
    }
    assert_eq!(
        after.fair_share(Participant::A) + after.fair_share(Participant::B),
        after.total_spent
    );
}

#[tokio::test]
async fn edit_payment_with_custom_split_maps_to_payer() {
    let (engine, _db, _notifier) = engine_with_db().await;

    let logged = engine
        .log_expense(
            expense_draft(10_000, Participant::A, SplitPolicy::Equal),
            "1",
            at(1),
        )
        .await
        .unwrap();

    let outcome = engine
        .update_entry(
            &logged.entry.id,
            EntryUpdate::Payment {
                amount: Money::from_cents(10_000),
                paid_by: Participant::B,
                policy: SplitPolicy::Custom {
                    other_share: Money::from_cents(2_500),
                },
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.entry.paid_by, "Jade");
    assert_eq!(outcome.entry.share_a.cents(), 2_500);
    assert_eq!(outcome.entry.share_b.cents(), 7_500);
}

#[tokio::test]
async fn edit_date_on_vaccination_refires_notifier() {
    let (engine, _db, notifier) = engine_with_db().await;

    let logged = engine
        .log_expense(
            EntryDraft {
                date: date(2026, 1, 10),
                category: Category::Vaccination,
                amount: Money::ZERO,
                paid_by: Participant::A,
                policy: SplitPolicy::Equal,
                description: "Annual jab".to_string(),
            },
            "1",
            at(1),
        )
        .await
        .unwrap();
    assert_eq!(notifier.calls().len(), 1);

    let outcome = engine
        .update_entry(&logged.entry.id, EntryUpdate::Date(date(2026, 2, 1)))
        .await
        .unwrap();

    let reminder = outcome.reminder.unwrap();
    assert!(reminder.delivered());
    assert_eq!(reminder.schedule().last_date, date(2026, 2, 1));

    // Superseding reminder, not an accumulated one: the second call
    // carries the new date.
    let calls = notifier.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].last_date, date(2026, 2, 1));
}

#[tokio::test]
async fn edit_date_on_plain_expense_stays_quiet() {
    let (engine, _db, notifier) = engine_with_db().await;

    let logged = engine
        .log_expense(
            expense_draft(500, Participant::A, SplitPolicy::Equal),
            "1",
            at(1),
        )
        .await
        .unwrap();

    let outcome = engine
        .update_entry(&logged.entry.id, EntryUpdate::Date(date(2026, 3, 1)))
        .await
        .unwrap();

    assert!(outcome.reminder.is_none());
    assert!(notifier.calls().is_empty());
    assert_eq!(outcome.entry.date, date(2026, 3, 1));
}

#[tokio::test]
async fn delivery_failure_does_not_fail_the_append() {
    let (engine, _db, notifier) = engine_with_db().await;
    notifier.fail.store(true, Ordering::SeqCst);

    let logged = engine
        .log_expense(
            EntryDraft {
                date: date(2026, 1, 10),
                category: Category::Vaccination,
                amount: Money::ZERO,
                paid_by: Participant::A,
                policy: SplitPolicy::Equal,
                description: "Annual jab".to_string(),
            },
            "1",
            at(1),
        )
        .await
        .unwrap();

    match logged.reminder.unwrap() {
        ReminderOutcome::DeliveryFailed { reason, .. } => {
            assert!(reason.contains("delivery refused"));
        }
        ReminderOutcome::Delivered(_) => panic!("delivery should have failed"),
    }

    // The entry is persisted regardless.
    assert!(engine.entry(&logged.entry.id).await.is_ok());
}

#[tokio::test]
async fn settlement_entries_only_support_deletion() {
    let (engine, _db, _notifier) = engine_with_db().await;

    let settlement = engine
        .log_settlement(
            Participant::A,
            Money::from_cents(1_000),
            date(2026, 3, 10),
            "1",
            at(1),
        )
        .await
        .unwrap();

    let err = engine
        .update_entry(
            &settlement.id,
            EntryUpdate::Description("tweak".to_string()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    assert!(engine.delete_entry(&settlement.id).await.unwrap());
}

#[tokio::test]
async fn delete_then_lookup_finds_nothing() {
    let (engine, _db, _notifier) = engine_with_db().await;

    let logged = engine
        .log_expense(
            expense_draft(500, Participant::A, SplitPolicy::Equal),
            "1",
            at(1),
        )
        .await
        .unwrap();

    assert!(engine.delete_entry(&logged.entry.id).await.unwrap());
    assert_eq!(
        engine.entry(&logged.entry.id).await.unwrap_err(),
        EngineError::NotFound(logged.entry.id.clone())
    );
    assert!(engine.all_entries().await.unwrap().is_empty());

    // Deleting an absent id reports false, not an error.
    assert!(!engine.delete_entry(&logged.entry.id).await.unwrap());
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let (engine, _db, _notifier) = engine_with_db().await;

    let err = engine
        .update_entry("20260101_000000_9", EntryUpdate::Date(date(2026, 1, 2)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("20260101_000000_9".to_string()));
}

#[tokio::test]
async fn tracking_entries_reject_payment_edits() {
    let (engine, _db, _notifier) = engine_with_db().await;

    let logged = engine
        .log_expense(
            EntryDraft {
                date: date(2026, 1, 10),
                category: Category::BloodTest,
                amount: Money::ZERO,
                paid_by: Participant::A,
                policy: SplitPolicy::Equal,
                description: "Panel".to_string(),
            },
            "1",
            at(1),
        )
        .await
        .unwrap();

    let err = engine
        .update_entry(
            &logged.entry.id,
            EntryUpdate::Payment {
                amount: Money::from_cents(100),
                paid_by: Participant::A,
                policy: SplitPolicy::Equal,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn recent_entries_sort_by_logical_date() {
    let (engine, _db, _notifier) = engine_with_db().await;

    for (second, day) in [(1, 20), (2, 5), (3, 12)] {
        engine
            .log_expense(
                EntryDraft {
                    date: date(2026, 3, day),
                    ..expense_draft(100, Participant::A, SplitPolicy::Equal)
                },
                "1",
                at(second),
            )
            .await
            .unwrap();
    }

    let recent = engine.recent_entries(2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].date, date(2026, 3, 20));
    assert_eq!(recent[1].date, date(2026, 3, 12));
}

#[tokio::test]
async fn malformed_rows_are_skipped_on_read_paths() {
    let (engine, db, _notifier) = engine_with_db().await;

    engine
        .log_expense(
            expense_draft(10_000, Participant::A, SplitPolicy::Equal),
            "1",
            at(1),
        )
        .await
        .unwrap();

    // A partially written row: garbage date and an unknown category.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO entries (date, category, amount_minor, paid_by, description, \
         entry_timestamp, originator_id, id, share_a_minor, share_b_minor) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        vec![
            "garbage".into(),
            "Mystery".into(),
            123i64.into(),
            "Mabel".into(),
            "broken".into(),
            "2026-03-14 09:00:09".into(),
            "1".into(),
            "20260314_090009_1".into(),
            61i64.into(),
            62i64.into(),
        ],
    ))
    .await
    .unwrap();

    let entries = engine.all_entries().await.unwrap();
    assert_eq!(entries.len(), 1);

    let summary = engine.summary().await.unwrap();
    assert_eq!(summary.total_spent.cents(), 10_000);

    assert!(engine.reminders(date(2026, 3, 14)).await.unwrap().is_empty());

    // Still addressable for deletion by id.
    assert!(engine.delete_entry("20260314_090009_1").await.unwrap());
}

#[tokio::test]
async fn reminders_project_from_latest_occurrence_only() {
    let (engine, _db, _notifier) = engine_with_db().await;

    for (second, day) in [(1, 1), (2, 1)] {
        let month = if second == 1 { 1 } else { 6 };
        engine
            .log_expense(
                EntryDraft {
                    date: date(2023, month, day),
                    category: Category::Vaccination,
                    amount: Money::ZERO,
                    paid_by: Participant::A,
                    policy: SplitPolicy::Equal,
                    description: "jab".to_string(),
                },
                "1",
                at(second),
            )
            .await
            .unwrap();
    }

    let projections = engine.reminders(date(2023, 7, 1)).await.unwrap();
    assert_eq!(projections.len(), 1);
    assert_eq!(projections[0].schedule.last_date, date(2023, 6, 1));
    assert_eq!(projections[0].schedule.next_due, date(2024, 5, 31));
}
