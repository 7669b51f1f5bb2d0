//! Pure screen rendering: every view is a `(text, keyboard)` pair built
//! from engine data, with no I/O.
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use engine::{Category, Entry, Participant, Participants, ReminderProjection, Summary};

const MAX_BUTTON_LABEL: usize = 60;

pub(crate) fn render_menu(pet_name: &str) -> (String, InlineKeyboardMarkup) {
    let text = format!("🐕 {pet_name} Expense Tracker\nChoose an option:");
    let kb = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "🏥 Log Vet Visit",
            "log:vet",
        )],
        vec![InlineKeyboardButton::callback(
            "💉 Log Vaccination",
            "log:vaccination",
        )],
        vec![InlineKeyboardButton::callback(
            "🩸 Log Blood Test",
            "log:blood",
        )],
        vec![InlineKeyboardButton::callback(
            "🔬 Log Other Vet Item",
            "log:othervet",
        )],
        vec![InlineKeyboardButton::callback(
            "🛒 Log Other Expense",
            "log:otherexpense",
        )],
        vec![InlineKeyboardButton::callback(
            "📋 View Recent Logs",
            "menu:recent",
        )],
        vec![InlineKeyboardButton::callback(
            "✏️ Edit Past Log",
            "menu:edit",
        )],
        vec![InlineKeyboardButton::callback(
            "💰 View Summary",
            "menu:summary",
        )],
        vec![InlineKeyboardButton::callback(
            "📅 View Reminders",
            "menu:reminders",
        )],
    ]);
    (text, kb)
}

fn back_row() -> Vec<InlineKeyboardButton> {
    vec![InlineKeyboardButton::callback(
        "🔙 Back to Menu",
        "nav:menu",
    )]
}

fn amount_line(entry: &Entry) -> String {
    if entry.amount.is_zero() && !entry.is_settlement() {
        "Tracking only".to_string()
    } else {
        format!("{} - {}", entry.amount, entry.paid_by)
    }
}

/// Recent entries view. Settlement rows are hidden here; they surface in
/// the summary and the edit list instead.
pub(crate) fn render_recent(entries: &[Entry]) -> (String, InlineKeyboardMarkup) {
    let visible: Vec<&Entry> = entries.iter().filter(|e| !e.is_settlement()).collect();

    let text = if visible.is_empty() {
        "📋 No entries found.".to_string()
    } else {
        let mut text = String::from("📋 Recent Entries\n");
        for (idx, entry) in visible.iter().enumerate() {
            text.push_str(&format!(
                "\n{}. {}\n   📅 {}\n   💰 {}\n   📝 {}\n",
                idx + 1,
                entry.category,
                entry.date,
                amount_line(entry),
                entry.description
            ));
        }
        text
    };

    (text, InlineKeyboardMarkup::new(vec![back_row()]))
}

pub(crate) fn render_summary(
    summary: &Summary,
    participants: &Participants,
) -> (String, InlineKeyboardMarkup) {
    let name_a = participants.name(Participant::A);
    let name_b = participants.name(Participant::B);

    let mut text = format!(
        "💰 Expense Summary\n\n\
         Total expenses: {}\n\n\
         Payments made:\n\
         • {name_a} paid: {}\n\
         • {name_b} paid: {}\n\n\
         Fair shares:\n\
         • {name_a}'s share: {}\n\
         • {name_b}'s share: {}\n\n\
         Settlement:",
        summary.total_spent,
        summary.paid_in(Participant::A),
        summary.paid_in(Participant::B),
        summary.fair_share(Participant::A),
        summary.fair_share(Participant::B),
    );

    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    match summary.creditor() {
        None => text.push_str("\n✅ Everyone is settled up!"),
        Some((creditor, owed)) => {
            let debtor = creditor.other();
            let creditor_name = participants.name(creditor);
            let debtor_name = participants.name(debtor);
            text.push_str(&format!(
                "\n💰 {creditor_name} is owed: {owed}\n🔄 {debtor_name} should pay {creditor_name} {owed}"
            ));
            rows.push(vec![InlineKeyboardButton::callback(
                format!("💳 Record: {debtor_name} paid {creditor_name}"),
                format!("settle:{}", slot_code(debtor)),
            )]);
        }
    }
    rows.push(back_row());

    (text, InlineKeyboardMarkup::new(rows))
}

pub(crate) fn render_reminders(
    projections: &[ReminderProjection],
) -> (String, InlineKeyboardMarkup) {
    let mut text = String::from("📅 Health Reminders\n\n");

    if projections.is_empty() {
        text.push_str(
            "ℹ️ No vaccination or blood test records found yet.\n\n\
             💡 Log your first vaccination or blood test entry to start \
             automatic reminders!",
        );
    } else {
        for projection in projections {
            let (icon, label) = match projection.schedule.category {
                Category::BloodTest => ("🩸", "blood test"),
                _ => ("💉", "vaccination"),
            };
            if projection.days_until >= 0 {
                text.push_str(&format!(
                    "{icon} Next {label}: {} ({} days)\n",
                    projection.schedule.next_due, projection.days_until
                ));
            } else {
                text.push_str(&format!(
                    "{icon} {label} overdue! Due: {} ({} days ago)\n",
                    projection.schedule.next_due,
                    projection.days_until.abs()
                ));
            }
        }
        text.push_str(
            "\nℹ️ How it works:\n\
             • Calendar invites go out when an entry is logged\n\
             • Vaccinations: annual (every 12 months)\n\
             • Blood tests: semi-annual (every 6 months)\n\
             • Both of you receive the invite",
        );
    }

    (text, InlineKeyboardMarkup::new(vec![back_row()]))
}

fn edit_button_label(entry: &Entry) -> String {
    let label = if entry.is_settlement() {
        format!("{} - Settlement - {}", entry.date, entry.paid_by)
    } else if entry.amount.is_zero() {
        format!("{} - {} (Tracking)", entry.date, entry.category)
    } else {
        format!("{} - {} - {}", entry.date, entry.category, entry.amount)
    };

    if label.len() > MAX_BUTTON_LABEL {
        let truncated: String = label.chars().take(MAX_BUTTON_LABEL - 3).collect();
        format!("{truncated}...")
    } else {
        label
    }
}

pub(crate) fn render_edit_list(entries: &[Entry]) -> (String, InlineKeyboardMarkup) {
    if entries.is_empty() {
        return (
            "📋 No entries to edit.".to_string(),
            InlineKeyboardMarkup::new(vec![back_row()]),
        );
    }

    let mut rows: Vec<Vec<InlineKeyboardButton>> = entries
        .iter()
        .map(|entry| {
            vec![InlineKeyboardButton::callback(
                edit_button_label(entry),
                format!("sel:{}", entry.id),
            )]
        })
        .collect();
    rows.push(back_row());

    (
        "✏️ Select Entry to Edit".to_string(),
        InlineKeyboardMarkup::new(rows),
    )
}

pub(crate) fn render_edit_entry(entry: &Entry) -> (String, InlineKeyboardMarkup) {
    if entry.is_settlement() {
        let text = format!(
            "✏️ Edit Settlement\n\n{}\n\nSettlement entries can only be deleted.",
            entry.description
        );
        let kb = InlineKeyboardMarkup::new(vec![
            vec![InlineKeyboardButton::callback(
                "🗑 Delete",
                format!("del:{}", entry.id),
            )],
            vec![InlineKeyboardButton::callback("❌ Cancel", "nav:menu")],
        ]);
        return (text, kb);
    }

    let text = format!(
        "✏️ Edit Entry\n\n📅 {}\n🏷 {}\n💰 {}\n📝 {}\n\nWhat do you want to change?",
        entry.date,
        entry.category,
        amount_line(entry),
        entry.description
    );

    let mut rows = vec![
        vec![InlineKeyboardButton::callback(
            "📅 Date",
            format!("ef:date:{}", entry.id),
        )],
        vec![InlineKeyboardButton::callback(
            "📝 Description",
            format!("ef:desc:{}", entry.id),
        )],
    ];
    // Tracking-only entries carry no payment to edit.
    if !entry.category.is_tracking_only() {
        rows.push(vec![InlineKeyboardButton::callback(
            "💰 Amount & Split",
            format!("ef:pay:{}", entry.id),
        )]);
    }
    rows.push(vec![InlineKeyboardButton::callback(
        "🗑 Delete",
        format!("del:{}", entry.id),
    )]);
    rows.push(vec![InlineKeyboardButton::callback("❌ Cancel", "nav:menu")]);

    (text, InlineKeyboardMarkup::new(rows))
}

pub(crate) fn render_payer_picker(
    participants: &Participants,
    prefix: &str,
    prompt: String,
) -> (String, InlineKeyboardMarkup) {
    let rows = [Participant::A, Participant::B]
        .into_iter()
        .map(|participant| {
            vec![InlineKeyboardButton::callback(
                participants.name(participant).to_string(),
                format!("{prefix}:{}", slot_code(participant)),
            )]
        })
        .collect::<Vec<_>>();
    (prompt, InlineKeyboardMarkup::new(rows))
}

pub(crate) fn render_split_picker(prefix: &str, prompt: String) -> (String, InlineKeyboardMarkup) {
    let kb = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "🔄 Split 50/50",
            format!("{prefix}:equal"),
        )],
        vec![InlineKeyboardButton::callback(
            "💰 Custom Split",
            format!("{prefix}:custom"),
        )],
    ]);
    (prompt, kb)
}

pub(crate) fn slot_code(participant: Participant) -> &'static str {
    match participant {
        Participant::A => "a",
        Participant::B => "b",
    }
}

pub(crate) fn slot_from_code(code: &str) -> Option<Participant> {
    match code {
        "a" => Some(Participant::A),
        "b" => Some(Participant::B),
        _ => None,
    }
}
