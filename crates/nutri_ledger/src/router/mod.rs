use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    matchers::{self, Classification},
    records::{EXPENSES_COLLECTION, ExpenseRecord, INTAKE_COLLECTION, IntakeRecord},
    replies,
    storage::{self, RecordStore},
};

/// Turns one free-text message into at most one stored record and exactly
/// one reply.
///
/// The confirmation is sent whether or not the write succeeded; storage
/// failures only reach the logs.
#[derive(Clone)]
pub struct IntentRouter {
    store: Arc<dyn RecordStore>,
}

impl IntentRouter {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn handle_text(&self, user_id: &str, text: &str) -> String {
        let classification = matchers::classify(text);
        info!(user_id, intent = classification.label(), "classified text message");

        match classification {
            Classification::Expense(expense) => {
                let reply = replies::expense_recorded(&expense);
                let record = ExpenseRecord::from_match(user_id, expense);
                self.persist(EXPENSES_COLLECTION, &record).await;
                reply
            }
            Classification::Intake(intake) => {
                let reply = replies::intake_recorded(&intake);
                let record = IntakeRecord::from_match(user_id, intake);
                self.persist(INTAKE_COLLECTION, &record).await;
                reply
            }
            Classification::Unmatched => replies::NOT_UNDERSTOOD.to_string(),
        }
    }

    async fn persist<T: serde::Serialize + Sync>(&self, collection: &str, record: &T) {
        let outcome = storage::insert_record(self.store.as_ref(), collection, record).await;
        if !outcome.success {
            warn!(collection, outcome = %outcome, "record not persisted; replying anyway");
        }
    }
}
