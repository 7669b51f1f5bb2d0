//! Per-chat conversation state.
//!
//! Every multi-step flow is an explicit state machine: the current
//! [`Conversation`] names the input the chat is suspended on, and the
//! draft being collected rides inside the state. Nothing reaches the
//! engine before the terminal transition, so abandoning a flow (via
//! `/menu` or the back button) discards the draft without a trace.
use std::{collections::HashMap, sync::Arc};

use chrono::NaiveDate;
use teloxide::types::{ChatId, MessageId};
use tokio::sync::Mutex;

use engine::{Category, Money, Participant, SplitPolicy};

/// Fields collected so far by the expense-logging flow.
#[derive(Clone, Debug)]
pub(crate) struct ExpenseDraft {
    pub category: Category,
    pub date: Option<NaiveDate>,
    pub amount: Option<Money>,
    pub paid_by: Option<Participant>,
    pub policy: Option<SplitPolicy>,
}

impl ExpenseDraft {
    pub(crate) fn new(category: Category) -> Self {
        Self {
            category,
            date: None,
            amount: None,
            paid_by: None,
            policy: None,
        }
    }
}

/// The suspension point a chat is currently parked on.
#[derive(Clone, Debug, Default)]
pub(crate) enum Conversation {
    #[default]
    Idle,
    // Logging flow.
    AwaitingDate(ExpenseDraft),
    AwaitingAmount(ExpenseDraft),
    AwaitingPayer(ExpenseDraft),
    AwaitingSplit(ExpenseDraft),
    AwaitingCustomSplit(ExpenseDraft),
    AwaitingDescription(ExpenseDraft),
    // Settlement flow.
    AwaitingSettlementAmount { from: Participant },
    // Edit flow.
    AwaitingEditDate { entry_id: String },
    AwaitingEditDescription { entry_id: String },
    AwaitingEditAmount { entry_id: String },
    AwaitingEditPayer { entry_id: String, amount: Money },
    AwaitingEditSplit {
        entry_id: String,
        amount: Money,
        paid_by: Participant,
    },
    AwaitingEditCustomSplit {
        entry_id: String,
        amount: Money,
        paid_by: Participant,
    },
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Session {
    pub conversation: Conversation,
    pub hub_message_id: Option<MessageId>,
}

#[derive(Clone, Default)]
pub(crate) struct SessionStore {
    inner: Arc<Mutex<HashMap<ChatId, Session>>>,
}

impl SessionStore {
    pub(crate) async fn get(&self, chat_id: ChatId) -> Session {
        let guard = self.inner.lock().await;
        guard.get(&chat_id).cloned().unwrap_or_default()
    }

    pub(crate) async fn update<F>(&self, chat_id: ChatId, f: F) -> Session
    where
        F: FnOnce(&mut Session),
    {
        let mut guard = self.inner.lock().await;
        let session = guard.entry(chat_id).or_default();
        f(session);
        session.clone()
    }

    pub(crate) async fn set_conversation(&self, chat_id: ChatId, conversation: Conversation) {
        self.update(chat_id, |s| s.conversation = conversation)
            .await;
    }

    /// Back to idle, dropping any in-flight draft.
    pub(crate) async fn reset(&self, chat_id: ChatId) {
        self.set_conversation(chat_id, Conversation::Idle).await;
    }
}
