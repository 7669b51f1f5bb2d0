//! Calendar-invite delivery for reminder schedules.
//!
//! Implements the engine's dispatch boundary: each schedule becomes an
//! RFC 5545 invite (all-day event on the due date, reminders two weeks
//! and one week ahead) delivered to both participants' chats as an
//! `.ics` document. Delivery is attempted once; the engine reports a
//! failure without retrying or rolling anything back.
use chrono::{DateTime, Utc};
use teloxide::{prelude::*, types::InputFile};
use uuid::Uuid;

use engine::{Category, EngineError, NotifyFuture, ReminderSchedule, ScheduleNotifier};

pub struct CalendarNotifier {
    bot: Bot,
    recipients: Vec<ChatId>,
    pet_name: String,
}

impl CalendarNotifier {
    pub fn new(token: &str, recipients: Vec<u64>, pet_name: &str) -> Self {
        Self {
            bot: Bot::new(token),
            recipients: recipients
                .into_iter()
                .map(|id| ChatId(i64::try_from(id).unwrap_or_default()))
                .collect(),
            pet_name: pet_name.to_string(),
        }
    }
}

impl ScheduleNotifier for CalendarNotifier {
    fn notify_schedule(&self, schedule: &ReminderSchedule) -> NotifyFuture<'_> {
        let schedule = schedule.clone();
        Box::pin(async move {
            let invite = build_invite(
                &schedule,
                &self.pet_name,
                &Uuid::new_v4().to_string(),
                Utc::now(),
            );
            let message = invite_message(&schedule, &self.pet_name);
            let file_name = invite_file_name(&schedule);

            for chat in &self.recipients {
                self.bot
                    .send_message(*chat, message.clone())
                    .await
                    .map_err(|err| EngineError::Dispatch(err.to_string()))?;
                self.bot
                    .send_document(
                        *chat,
                        InputFile::memory(invite.clone().into_bytes()).file_name(file_name.clone()),
                    )
                    .await
                    .map_err(|err| EngineError::Dispatch(err.to_string()))?;
                tracing::info!("calendar invite sent to chat {chat}");
            }
            Ok(())
        })
    }
}

fn event_label(category: Category) -> &'static str {
    match category {
        Category::BloodTest => "Blood Test",
        _ => "Vaccination",
    }
}

fn cadence_label(category: Category) -> &'static str {
    match category {
        Category::BloodTest => "Semi-annual",
        _ => "Annual",
    }
}

fn invite_file_name(schedule: &ReminderSchedule) -> String {
    let slug = match schedule.category {
        Category::BloodTest => "blood_test",
        _ => "vaccination",
    };
    format!("pet_{slug}_{}.ics", schedule.next_due)
}

/// Text escaping per RFC 5545 §3.3.11.
fn escape_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

/// Builds the VCALENDAR payload for one schedule.
pub(crate) fn build_invite(
    schedule: &ReminderSchedule,
    pet_name: &str,
    uid: &str,
    created_at: DateTime<Utc>,
) -> String {
    let label = event_label(schedule.category);
    let summary = format!("🐩 {pet_name} {label} Appointment");
    let description = format!(
        "{} {} appointment for {pet_name}.\nLast {}: {}\nDue date: {}\nNotes: {}",
        cadence_label(schedule.category),
        label.to_lowercase(),
        label.to_lowercase(),
        schedule.last_date,
        schedule.next_due,
        schedule.notes,
    );
    let due = schedule.next_due.format("%Y%m%d");
    let stamp = created_at.format("%Y%m%dT%H%M%SZ");

    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//Pawledger//Calendar Event//EN".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{uid}"),
        format!("DTSTAMP:{stamp}"),
        format!("DTSTART;VALUE=DATE:{due}"),
        format!("DTEND;VALUE=DATE:{due}"),
        format!("SUMMARY:{}", escape_text(&summary)),
        format!("DESCRIPTION:{}", escape_text(&description)),
        "BEGIN:VALARM".to_string(),
        "TRIGGER:-P14D".to_string(),
        "ACTION:DISPLAY".to_string(),
        format!("DESCRIPTION:Reminder: {}", escape_text(&summary)),
        "END:VALARM".to_string(),
        "BEGIN:VALARM".to_string(),
        "TRIGGER:-P7D".to_string(),
        "ACTION:DISPLAY".to_string(),
        format!("DESCRIPTION:Reminder: {}", escape_text(&summary)),
        "END:VALARM".to_string(),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];
    lines.join("\r\n")
}

/// The chat message accompanying the `.ics` document.
fn invite_message(schedule: &ReminderSchedule, pet_name: &str) -> String {
    format!(
        "📅 {label} appointment scheduled for {pet_name}.\n\n\
         Appointment date: {next}\n\
         Last {lower}: {last}\n\
         Notes: {notes}\n\n\
         Open the attached .ics file to add it to your calendar; it \
         reminds you 2 weeks and 1 week before the date.",
        label = event_label(schedule.category),
        lower = event_label(schedule.category).to_lowercase(),
        next = schedule.next_due,
        last = schedule.last_date,
        notes = schedule.notes,
    )
}
