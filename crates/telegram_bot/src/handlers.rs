use chrono::{NaiveDate, Utc};
use teloxide::{
    prelude::*,
    types::{InlineKeyboardMarkup, InputFile, User},
};

use engine::{
    Category, EngineError, Entry, EntryDraft, EntryUpdate, Money, Participant, ReminderOutcome,
    SplitPolicy,
};

use crate::{
    ConfigParameters,
    commands::LedgerCommands,
    parsing::{parse_amount, parse_date, parse_positive_amount},
    state::{Conversation, ExpenseDraft},
    ui,
};

const RECENT_LIMIT: usize = 10;

/// The household's notion of "today".
fn today() -> NaiveDate {
    Utc::now()
        .with_timezone(&chrono_tz::Asia::Singapore)
        .date_naive()
}

fn is_allowed(cfg: &ConfigParameters, user: Option<&User>) -> bool {
    user.is_some_and(|user| cfg.users.contains_key(&user.id.0))
}

fn participant_for(cfg: &ConfigParameters, user: &User) -> Option<Participant> {
    cfg.users.get(&user.id.0).copied()
}

fn user_message_for_engine_error(err: &EngineError) -> String {
    match err {
        EngineError::Validation(msg) | EngineError::SplitOutOfRange(msg) => format!("❌ {msg}"),
        EngineError::NotFound(_) => "❌ Entry not found. Start again from /menu.".to_string(),
        EngineError::Dispatch(_) | EngineError::Database(_) => {
            "❌ Something went wrong talking to the ledger. Try again later.".to_string()
        }
    }
}

fn reminder_text(outcome: &ReminderOutcome) -> String {
    let schedule = outcome.schedule();
    let label = match schedule.category {
        Category::BloodTest => "blood test",
        _ => "vaccination",
    };
    match outcome {
        ReminderOutcome::Delivered(_) => format!(
            "\n\n📅 Next {label} appointment: {}\n📧 Calendar invite sent! Check the chat for the .ics file.",
            schedule.next_due
        ),
        ReminderOutcome::DeliveryFailed { .. } => format!(
            "\n\n⚠️ Next {label} is due {} but the calendar invite could not be sent.",
            schedule.next_due
        ),
    }
}

/// Edits the hub message in place, falling back to a fresh message when
/// there is nothing to edit (or Telegram refuses the edit).
async fn edit_or_send(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    text: String,
    kb: Option<InlineKeyboardMarkup>,
) -> ResponseResult<()> {
    let hub = cfg.sessions.get(chat_id).await.hub_message_id;
    if let Some(message_id) = hub {
        let request = bot.edit_message_text(chat_id, message_id, text.clone());
        let request = match kb.clone() {
            Some(kb) => request.reply_markup(kb),
            None => request,
        };
        if request.await.is_ok() {
            return Ok(());
        }
    }
    send_screen(bot, chat_id, cfg, text, kb).await
}

/// Sends a new message and makes it the hub for future edits.
async fn send_screen(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    text: String,
    kb: Option<InlineKeyboardMarkup>,
) -> ResponseResult<()> {
    let request = bot.send_message(chat_id, text);
    let request = match kb {
        Some(kb) => request.reply_markup(kb),
        None => request,
    };
    let sent = request.await?;
    cfg.sessions
        .update(chat_id, |s| s.hub_message_id = Some(sent.id))
        .await;
    Ok(())
}

async fn show_menu(bot: &Bot, chat_id: ChatId, cfg: &ConfigParameters) -> ResponseResult<()> {
    let (text, kb) = ui::render_menu(&cfg.pet_name);
    edit_or_send(bot, chat_id, cfg, text, Some(kb)).await
}

fn help_text() -> String {
    "🐕 Pet Expense Tracker Help\n\n\
     Categories:\n\
     • 🏥 Vet Visit - regular checkups (with cost)\n\
     • 💉 Vaccination - tracking only (no cost)\n\
     • 🩸 Blood Test - tracking only (no cost)\n\
     • 🔬 Other Vet - x-rays, tests, etc. (with cost)\n\
     • 🛒 Other Expense - food, toys, grooming (with cost)\n\n\
     Features:\n\
     • Custom expense splitting\n\
     • Settlement payment tracking\n\
     • Edit/delete entries\n\
     • Spending summaries\n\
     • Automatic health reminders with calendar invites\n\n\
     Tips:\n\
     • Type 'today' wherever a date is asked\n\
     • Settlement payments update the balances automatically\n\
     • Editing an amount re-asks who paid and how to split"
        .to_string()
}

pub(crate) async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: LedgerCommands,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    if !is_allowed(&cfg, Some(from)) {
        bot.send_message(chat_id, format!("❌ Not authorized. Your ID: {}", from.id))
            .await?;
        return Ok(());
    }

    match cmd {
        LedgerCommands::Start => {
            let name = participant_for(&cfg, from)
                .map(|p| cfg.engine.participants().name(p).to_string())
                .unwrap_or_default();
            bot.send_message(chat_id, format!("🐕 Welcome {name}! Use /menu to begin."))
                .await?;
        }
        LedgerCommands::Menu => {
            // Cancels any in-flight draft.
            cfg.sessions.reset(chat_id).await;
            let (text, kb) = ui::render_menu(&cfg.pet_name);
            send_screen(&bot, chat_id, &cfg, text, Some(kb)).await?;
        }
        LedgerCommands::Help => {
            bot.send_message(chat_id, help_text()).await?;
        }
        LedgerCommands::Export => {
            send_export(&bot, chat_id, &cfg).await?;
        }
    }

    Ok(())
}

async fn send_export(bot: &Bot, chat_id: ChatId, cfg: &ConfigParameters) -> ResponseResult<()> {
    let entries = match cfg.engine.all_entries().await {
        Ok(entries) => entries,
        Err(err) => {
            bot.send_message(chat_id, user_message_for_engine_error(&err))
                .await?;
            return Ok(());
        }
    };

    match ledger_csv(&entries) {
        Ok(data) => {
            bot.send_document(
                chat_id,
                InputFile::memory(data).file_name("pet_ledger.csv".to_string()),
            )
            .await?;
        }
        Err(err) => {
            tracing::error!("csv export failed: {err}");
            bot.send_message(chat_id, "❌ Export failed. Try again later.")
                .await?;
        }
    }
    Ok(())
}

fn csv_money(amount: Money) -> String {
    let sign = if amount.is_negative() { "-" } else { "" };
    let abs = amount.cents().unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Serializes the ledger in the store's column order.
fn ledger_csv(entries: &[Entry]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Date",
        "Category",
        "Amount",
        "Paid By",
        "Description",
        "Entry Timestamp",
        "Originator ID",
        "ID",
        "Share A",
        "Share B",
    ])?;
    for entry in entries {
        writer.write_record([
            entry.date.to_string(),
            entry.category.label().to_string(),
            csv_money(entry.amount),
            entry.paid_by.clone(),
            entry.description.clone(),
            entry
                .entry_timestamp
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            entry.originator_id.clone(),
            entry.id.clone(),
            csv_money(entry.share_a),
            csv_money(entry.share_b),
        ])?;
    }
    Ok(writer.into_inner().map_err(|err| err.into_error())?)
}

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, msg.from.as_ref()) {
        return Ok(());
    }
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;
    let originator = from.id.to_string();

    let conversation = cfg.sessions.get(chat_id).await.conversation;
    match conversation {
        Conversation::Idle => {
            bot.send_message(chat_id, "Use /menu to begin.").await?;
        }
        Conversation::AwaitingDate(mut draft) => match parse_date(text, today()) {
            Ok(date) => {
                draft.date = Some(date);
                if draft.category.is_tracking_only() {
                    draft.amount = Some(Money::ZERO);
                    prompt_description(&bot, chat_id, &cfg, draft).await?;
                } else {
                    cfg.sessions
                        .set_conversation(chat_id, Conversation::AwaitingAmount(draft.clone()))
                        .await;
                    bot.send_message(
                        chat_id,
                        format!(
                            "💰 Amount\n\nDate: {date}\nCategory: {}\n\nEnter amount:",
                            draft.category
                        ),
                    )
                    .await?;
                }
            }
            Err(err) => {
                bot.send_message(chat_id, format!("❌ {err}")).await?;
            }
        },
        Conversation::AwaitingAmount(mut draft) => match parse_positive_amount(text) {
            Ok(amount) => {
                draft.amount = Some(amount);
                cfg.sessions
                    .set_conversation(chat_id, Conversation::AwaitingPayer(draft))
                    .await;
                let (text, kb) = ui::render_payer_picker(
                    cfg.engine.participants(),
                    "payer",
                    format!("👤 Who paid?\n\nAmount: {amount}"),
                );
                send_screen(&bot, chat_id, &cfg, text, Some(kb)).await?;
            }
            Err(err) => {
                bot.send_message(chat_id, format!("❌ {err}")).await?;
            }
        },
        Conversation::AwaitingCustomSplit(mut draft) => {
            let total = draft.amount.unwrap_or(Money::ZERO);
            match parse_amount(text) {
                Ok(other_share) if other_share <= total => {
                    draft.policy = Some(SplitPolicy::Custom { other_share });
                    prompt_description(&bot, chat_id, &cfg, draft).await?;
                }
                _ => {
                    bot.send_message(
                        chat_id,
                        format!("❌ Invalid amount. Enter $0.00 to {total}"),
                    )
                    .await?;
                }
            }
        }
        Conversation::AwaitingDescription(draft) => {
            let description = text.trim();
            if description.is_empty() {
                bot.send_message(chat_id, "❌ Description required.").await?;
                return Ok(());
            }
            commit_expense(&bot, chat_id, &cfg, draft, description, &originator).await?;
        }
        Conversation::AwaitingSettlementAmount { from } => match parse_positive_amount(text) {
            Ok(amount) => {
                let result = cfg
                    .engine
                    .log_settlement(from, amount, today(), &originator, Utc::now())
                    .await;
                match result {
                    Ok(settlement) => {
                        cfg.sessions.reset(chat_id).await;
                        bot.send_message(
                            chat_id,
                            format!(
                                "✅ Settlement recorded!\n\n💳 {}: {amount}\n\nUse /menu to view the updated summary.",
                                settlement.paid_by
                            ),
                        )
                        .await?;
                    }
                    Err(err) => {
                        bot.send_message(chat_id, user_message_for_engine_error(&err))
                            .await?;
                    }
                }
            }
            Err(err) => {
                bot.send_message(chat_id, format!("❌ {err}")).await?;
            }
        },
        Conversation::AwaitingEditDate { entry_id } => match parse_date(text, today()) {
            Ok(date) => {
                apply_update(&bot, chat_id, &cfg, &entry_id, EntryUpdate::Date(date)).await?;
            }
            Err(err) => {
                bot.send_message(chat_id, format!("❌ {err}")).await?;
            }
        },
        Conversation::AwaitingEditDescription { entry_id } => {
            apply_update(
                &bot,
                chat_id,
                &cfg,
                &entry_id,
                EntryUpdate::Description(text.to_string()),
            )
            .await?;
        }
        Conversation::AwaitingEditAmount { entry_id } => match parse_amount(text) {
            Ok(amount) => {
                cfg.sessions
                    .set_conversation(
                        chat_id,
                        Conversation::AwaitingEditPayer {
                            entry_id,
                            amount,
                        },
                    )
                    .await;
                let (text, kb) = ui::render_payer_picker(
                    cfg.engine.participants(),
                    "epayer",
                    format!("💰 Amount: {amount}\n\n👤 Who paid this amount?"),
                );
                send_screen(&bot, chat_id, &cfg, text, Some(kb)).await?;
            }
            Err(err) => {
                bot.send_message(chat_id, format!("❌ {err}")).await?;
            }
        },
        Conversation::AwaitingEditCustomSplit {
            entry_id,
            amount,
            paid_by,
        } => match parse_amount(text) {
            Ok(other_share) if other_share <= amount => {
                apply_update(
                    &bot,
                    chat_id,
                    &cfg,
                    &entry_id,
                    EntryUpdate::Payment {
                        amount,
                        paid_by,
                        policy: SplitPolicy::Custom { other_share },
                    },
                )
                .await?;
            }
            _ => {
                bot.send_message(
                    chat_id,
                    format!("❌ Invalid amount. Enter $0.00 to {amount}"),
                )
                .await?;
            }
        },
        // Button-driven suspension points.
        Conversation::AwaitingPayer(_)
        | Conversation::AwaitingSplit(_)
        | Conversation::AwaitingEditPayer { .. }
        | Conversation::AwaitingEditSplit { .. } => {
            bot.send_message(chat_id, "Please use the buttons above.")
                .await?;
        }
    }

    Ok(())
}

async fn prompt_description(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    draft: ExpenseDraft,
) -> ResponseResult<()> {
    let summary = match (draft.date, draft.amount) {
        (Some(date), Some(amount)) if !amount.is_zero() => {
            format!("Date: {date}\nAmount: {amount}")
        }
        (Some(date), _) => format!("Date: {date}\nCategory: {}", draft.category),
        _ => format!("Category: {}", draft.category),
    };
    cfg.sessions
        .set_conversation(chat_id, Conversation::AwaitingDescription(draft))
        .await;
    bot.send_message(
        chat_id,
        format!("📝 Description\n\n{summary}\n\nEnter description:"),
    )
    .await?;
    Ok(())
}

/// Terminal transition of the logging flow: hand the collected draft to
/// the engine and report both the entry and the reminder outcome.
async fn commit_expense(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    draft: ExpenseDraft,
    description: &str,
    originator: &str,
) -> ResponseResult<()> {
    let (Some(date), Some(amount)) = (draft.date, draft.amount) else {
        // A draft cannot reach description without these; recover anyway.
        cfg.sessions.reset(chat_id).await;
        bot.send_message(chat_id, "❌ Something went wrong. Use /menu to restart.")
            .await?;
        return Ok(());
    };

    let entry_draft = EntryDraft {
        date,
        category: draft.category,
        amount,
        paid_by: draft.paid_by.unwrap_or(Participant::A),
        policy: draft.policy.unwrap_or(SplitPolicy::Equal),
        description: description.to_string(),
    };

    match cfg
        .engine
        .log_expense(entry_draft, originator, Utc::now())
        .await
    {
        Ok(logged) => {
            cfg.sessions.reset(chat_id).await;
            let amount_text = if logged.entry.amount.is_zero() {
                "Tracking only".to_string()
            } else {
                logged.entry.amount.to_string()
            };
            let mut text = format!(
                "✅ Logged successfully!\n\n📅 {}\n🏷 {}\n💰 {amount_text}\n📝 {}",
                logged.entry.date, logged.entry.category, logged.entry.description
            );
            if let Some(outcome) = &logged.reminder {
                text.push_str(&reminder_text(outcome));
            }
            text.push_str("\n\nUse /menu to continue.");
            bot.send_message(chat_id, text).await?;
        }
        Err(err @ (EngineError::Validation(_) | EngineError::SplitOutOfRange(_))) => {
            // Recoverable: stay on the description step.
            bot.send_message(chat_id, user_message_for_engine_error(&err))
                .await?;
        }
        Err(err) => {
            tracing::warn!("log_expense failed: {err}");
            cfg.sessions.reset(chat_id).await;
            bot.send_message(chat_id, user_message_for_engine_error(&err))
                .await?;
        }
    }
    Ok(())
}

/// Applies a typed update and reports the result, including any
/// superseding reminder for re-dated recurring entries.
async fn apply_update(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    entry_id: &str,
    update: EntryUpdate,
) -> ResponseResult<()> {
    match cfg.engine.update_entry(entry_id, update).await {
        Ok(outcome) => {
            cfg.sessions.reset(chat_id).await;
            let mut text = format!(
                "✅ Updated!\n\n📅 {}\n🏷 {}\n💰 {}\n📝 {}",
                outcome.entry.date,
                outcome.entry.category,
                if outcome.entry.amount.is_zero() && !outcome.entry.is_settlement() {
                    "Tracking only".to_string()
                } else {
                    format!("{} - {}", outcome.entry.amount, outcome.entry.paid_by)
                },
                outcome.entry.description
            );
            if let Some(reminder) = &outcome.reminder {
                text.push_str(&reminder_text(reminder));
            }
            text.push_str("\n\nUse /menu to continue.");
            bot.send_message(chat_id, text).await?;
        }
        Err(err @ EngineError::Validation(_)) => {
            bot.send_message(chat_id, user_message_for_engine_error(&err))
                .await?;
        }
        Err(err) => {
            tracing::warn!("update_entry failed: {err}");
            cfg.sessions.reset(chat_id).await;
            bot.send_message(chat_id, user_message_for_engine_error(&err))
                .await?;
        }
    }
    Ok(())
}

pub(crate) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, Some(&q.from)) {
        let _ = bot.answer_callback_query(q.id.clone()).await;
        return Ok(());
    }

    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();

    let _ = bot.answer_callback_query(q.id.clone()).await;

    // The tapped message becomes the hub for in-place edits.
    cfg.sessions
        .update(chat_id, |s| s.hub_message_id = Some(message_id))
        .await;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };

    if data == "nav:menu" {
        cfg.sessions.reset(chat_id).await;
        show_menu(&bot, chat_id, &cfg).await?;
    } else if let Some(code) = data.strip_prefix("log:") {
        start_logging(&bot, chat_id, &cfg, code).await?;
    } else if data == "menu:recent" {
        show_recent(&bot, chat_id, &cfg).await?;
    } else if data == "menu:summary" {
        show_summary(&bot, chat_id, &cfg).await?;
    } else if data == "menu:reminders" {
        show_reminders(&bot, chat_id, &cfg).await?;
    } else if data == "menu:edit" {
        show_edit_list(&bot, chat_id, &cfg).await?;
    } else if let Some(code) = data.strip_prefix("payer:") {
        choose_payer(&bot, chat_id, &cfg, code).await?;
    } else if let Some(choice) = data.strip_prefix("split:") {
        choose_split(&bot, chat_id, &cfg, choice).await?;
    } else if let Some(code) = data.strip_prefix("settle:") {
        start_settlement(&bot, chat_id, &cfg, code).await?;
    } else if let Some(entry_id) = data.strip_prefix("sel:") {
        show_edit_entry(&bot, chat_id, &cfg, entry_id).await?;
    } else if let Some(entry_id) = data.strip_prefix("ef:date:") {
        cfg.sessions
            .set_conversation(
                chat_id,
                Conversation::AwaitingEditDate {
                    entry_id: entry_id.to_string(),
                },
            )
            .await;
        edit_or_send(
            &bot,
            chat_id,
            &cfg,
            "📅 Edit Date\n\nEnter new date (YYYY-MM-DD) or 'today':".to_string(),
            None,
        )
        .await?;
    } else if let Some(entry_id) = data.strip_prefix("ef:desc:") {
        cfg.sessions
            .set_conversation(
                chat_id,
                Conversation::AwaitingEditDescription {
                    entry_id: entry_id.to_string(),
                },
            )
            .await;
        edit_or_send(
            &bot,
            chat_id,
            &cfg,
            "📝 Edit Description\n\nEnter new description:".to_string(),
            None,
        )
        .await?;
    } else if let Some(entry_id) = data.strip_prefix("ef:pay:") {
        cfg.sessions
            .set_conversation(
                chat_id,
                Conversation::AwaitingEditAmount {
                    entry_id: entry_id.to_string(),
                },
            )
            .await;
        edit_or_send(
            &bot,
            chat_id,
            &cfg,
            "💰 Edit Amount\n\nEnter new amount:\n⚠️ You will re-select who paid and how to split."
                .to_string(),
            None,
        )
        .await?;
    } else if let Some(entry_id) = data.strip_prefix("del:") {
        delete_entry(&bot, chat_id, &cfg, entry_id).await?;
    } else if let Some(code) = data.strip_prefix("epayer:") {
        choose_edit_payer(&bot, chat_id, &cfg, code).await?;
    } else if let Some(choice) = data.strip_prefix("esplit:") {
        choose_edit_split(&bot, chat_id, &cfg, choice).await?;
    } else {
        tracing::debug!("unhandled callback: {data}");
    }

    Ok(())
}

async fn start_logging(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    code: &str,
) -> ResponseResult<()> {
    let category = match code {
        "vet" => Category::VetVisit,
        "vaccination" => Category::Vaccination,
        "blood" => Category::BloodTest,
        "othervet" => Category::OtherVet,
        "otherexpense" => Category::OtherExpense,
        _ => {
            tracing::debug!("unknown log category code: {code}");
            return Ok(());
        }
    };

    cfg.sessions
        .set_conversation(
            chat_id,
            Conversation::AwaitingDate(ExpenseDraft::new(category)),
        )
        .await;
    edit_or_send(
        bot,
        chat_id,
        cfg,
        format!("📅 Logging {category}\n\nEnter date (YYYY-MM-DD) or 'today':"),
        None,
    )
    .await
}

async fn show_recent(bot: &Bot, chat_id: ChatId, cfg: &ConfigParameters) -> ResponseResult<()> {
    match cfg.engine.recent_entries(RECENT_LIMIT).await {
        Ok(entries) => {
            let (text, kb) = ui::render_recent(&entries);
            edit_or_send(bot, chat_id, cfg, text, Some(kb)).await
        }
        Err(err) => {
            edit_or_send(bot, chat_id, cfg, user_message_for_engine_error(&err), None).await
        }
    }
}

async fn show_summary(bot: &Bot, chat_id: ChatId, cfg: &ConfigParameters) -> ResponseResult<()> {
    match cfg.engine.summary().await {
        Ok(summary) => {
            let (text, kb) = ui::render_summary(&summary, cfg.engine.participants());
            edit_or_send(bot, chat_id, cfg, text, Some(kb)).await
        }
        Err(err) => {
            edit_or_send(bot, chat_id, cfg, user_message_for_engine_error(&err), None).await
        }
    }
}

async fn show_reminders(bot: &Bot, chat_id: ChatId, cfg: &ConfigParameters) -> ResponseResult<()> {
    match cfg.engine.reminders(today()).await {
        Ok(projections) => {
            let (text, kb) = ui::render_reminders(&projections);
            edit_or_send(bot, chat_id, cfg, text, Some(kb)).await
        }
        Err(err) => {
            edit_or_send(bot, chat_id, cfg, user_message_for_engine_error(&err), None).await
        }
    }
}

async fn show_edit_list(bot: &Bot, chat_id: ChatId, cfg: &ConfigParameters) -> ResponseResult<()> {
    match cfg.engine.recent_entries(RECENT_LIMIT).await {
        Ok(entries) => {
            let (text, kb) = ui::render_edit_list(&entries);
            edit_or_send(bot, chat_id, cfg, text, Some(kb)).await
        }
        Err(err) => {
            edit_or_send(bot, chat_id, cfg, user_message_for_engine_error(&err), None).await
        }
    }
}

async fn show_edit_entry(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    entry_id: &str,
) -> ResponseResult<()> {
    match cfg.engine.entry(entry_id).await {
        Ok(entry) => {
            let (text, kb) = ui::render_edit_entry(&entry);
            edit_or_send(bot, chat_id, cfg, text, Some(kb)).await
        }
        Err(err) => {
            edit_or_send(bot, chat_id, cfg, user_message_for_engine_error(&err), None).await
        }
    }
}

async fn choose_payer(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    code: &str,
) -> ResponseResult<()> {
    let Conversation::AwaitingPayer(mut draft) = cfg.sessions.get(chat_id).await.conversation
    else {
        return Ok(());
    };
    let Some(payer) = ui::slot_from_code(code) else {
        return Ok(());
    };

    draft.paid_by = Some(payer);
    let amount = draft.amount.unwrap_or(Money::ZERO);
    let payer_name = cfg.engine.participants().name(payer).to_string();

    cfg.sessions
        .set_conversation(chat_id, Conversation::AwaitingSplit(draft))
        .await;
    let (text, kb) = ui::render_split_picker(
        "split",
        format!("💸 Split Method\n\nAmount: {amount}\nPaid by: {payer_name}\n\nHow to split?"),
    );
    edit_or_send(bot, chat_id, cfg, text, Some(kb)).await
}

async fn choose_split(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    choice: &str,
) -> ResponseResult<()> {
    let Conversation::AwaitingSplit(mut draft) = cfg.sessions.get(chat_id).await.conversation
    else {
        return Ok(());
    };

    match choice {
        "equal" => {
            draft.policy = Some(SplitPolicy::Equal);
            let date = draft.date;
            let amount = draft.amount.unwrap_or(Money::ZERO);
            cfg.sessions
                .set_conversation(chat_id, Conversation::AwaitingDescription(draft))
                .await;
            edit_or_send(
                bot,
                chat_id,
                cfg,
                format!(
                    "📝 Description\n\nDate: {}\nAmount: {amount}\nSplit: 50/50\n\nEnter description:",
                    date.map(|d| d.to_string()).unwrap_or_default()
                ),
                None,
            )
            .await
        }
        "custom" => {
            let amount = draft.amount.unwrap_or(Money::ZERO);
            let payer = draft.paid_by.unwrap_or(Participant::A);
            let other_name = cfg
                .engine
                .participants()
                .name(payer.other())
                .to_string();
            cfg.sessions
                .set_conversation(chat_id, Conversation::AwaitingCustomSplit(draft))
                .await;
            edit_or_send(
                bot,
                chat_id,
                cfg,
                format!(
                    "💰 Custom Split\n\nTotal: {amount}\n\nHow much should {other_name} pay?"
                ),
                None,
            )
            .await
        }
        _ => Ok(()),
    }
}

async fn start_settlement(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    code: &str,
) -> ResponseResult<()> {
    let Some(from) = ui::slot_from_code(code) else {
        return Ok(());
    };

    let suggested = match cfg.engine.summary().await {
        Ok(summary) => summary
            .creditor()
            .map(|(_, owed)| owed)
            .unwrap_or(Money::ZERO),
        Err(err) => {
            edit_or_send(bot, chat_id, cfg, user_message_for_engine_error(&err), None).await?;
            return Ok(());
        }
    };

    let participants = cfg.engine.participants();
    let from_name = participants.name(from).to_string();
    let to_name = participants.name(from.other()).to_string();

    cfg.sessions
        .set_conversation(chat_id, Conversation::AwaitingSettlementAmount { from })
        .await;
    edit_or_send(
        bot,
        chat_id,
        cfg,
        format!(
            "💳 Record Settlement\n\nFrom: {from_name}\nTo: {to_name}\nSuggested: {suggested}\n\nEnter amount {from_name} paid:"
        ),
        None,
    )
    .await
}

async fn delete_entry(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    entry_id: &str,
) -> ResponseResult<()> {
    cfg.sessions.reset(chat_id).await;
    let text = match cfg.engine.delete_entry(entry_id).await {
        Ok(true) => "✅ Entry deleted!\n\nUse /menu to continue.".to_string(),
        Ok(false) => "❌ Entry not found.".to_string(),
        Err(err) => {
            tracing::warn!("delete_entry failed: {err}");
            user_message_for_engine_error(&err)
        }
    };
    edit_or_send(bot, chat_id, cfg, text, None).await
}

async fn choose_edit_payer(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    code: &str,
) -> ResponseResult<()> {
    let Conversation::AwaitingEditPayer { entry_id, amount } =
        cfg.sessions.get(chat_id).await.conversation
    else {
        return Ok(());
    };
    let Some(paid_by) = ui::slot_from_code(code) else {
        return Ok(());
    };

    // Zero amount turns the entry into tracking-only; no split to ask.
    if amount.is_zero() {
        apply_update(
            bot,
            chat_id,
            cfg,
            &entry_id,
            EntryUpdate::Payment {
                amount,
                paid_by,
                policy: SplitPolicy::Equal,
            },
        )
        .await?;
        return Ok(());
    }

    let payer_name = cfg.engine.participants().name(paid_by).to_string();
    cfg.sessions
        .set_conversation(
            chat_id,
            Conversation::AwaitingEditSplit {
                entry_id,
                amount,
                paid_by,
            },
        )
        .await;
    let (text, kb) = ui::render_split_picker(
        "esplit",
        format!("💸 Split {amount}\n\nPaid by: {payer_name}\n\nHow to split?"),
    );
    edit_or_send(bot, chat_id, cfg, text, Some(kb)).await
}

async fn choose_edit_split(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    choice: &str,
) -> ResponseResult<()> {
    let Conversation::AwaitingEditSplit {
        entry_id,
        amount,
        paid_by,
    } = cfg.sessions.get(chat_id).await.conversation
    else {
        return Ok(());
    };

    match choice {
        "equal" => {
            apply_update(
                bot,
                chat_id,
                cfg,
                &entry_id,
                EntryUpdate::Payment {
                    amount,
                    paid_by,
                    policy: SplitPolicy::Equal,
                },
            )
            .await
        }
        "custom" => {
            let other_name = cfg
                .engine
                .participants()
                .name(paid_by.other())
                .to_string();
            cfg.sessions
                .set_conversation(
                    chat_id,
                    Conversation::AwaitingEditCustomSplit {
                        entry_id,
                        amount,
                        paid_by,
                    },
                )
                .await;
            edit_or_send(
                bot,
                chat_id,
                cfg,
                format!(
                    "💰 Custom Split\n\nTotal: {amount}\n\nHow much should {other_name} pay?"
                ),
                None,
            )
            .await
        }
        _ => Ok(()),
    }
}
