use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::{
    records::{PRODUCTS_COLLECTION, ProductForm, ProductRecord},
    replies,
    storage::{self, RecordStore},
};

/// Handles payloads submitted from the companion web app.
///
/// Unlike free text, a failed write is reported back to the user.
#[derive(Clone)]
pub struct FormIntake {
    store: Arc<dyn RecordStore>,
}

impl FormIntake {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, user_id: &str, raw: &str) -> String {
        let form = match decode_form(raw) {
            Ok(form) => form,
            Err(err) => {
                warn!(user_id, error = %err, "unreadable web app payload");
                return replies::FORM_UNREADABLE.to_string();
            }
        };

        let Some(record) = ProductRecord::from_form(user_id, form) else {
            info!(user_id, "web app payload is not a product definition");
            return replies::FORM_ACKNOWLEDGED.to_string();
        };

        let name = record.display_name();
        let outcome = storage::insert_record(self.store.as_ref(), PRODUCTS_COLLECTION, &record).await;
        if outcome.success {
            replies::product_saved(&name)
        } else {
            warn!(user_id, outcome = %outcome, "product not persisted");
            replies::product_failed(&outcome)
        }
    }
}

fn decode_form(raw: &str) -> Result<ProductForm, serde_json::Error> {
    // Non-object JSON (arrays, strings) carries no form fields.
    let value: Value = serde_json::from_str(raw)?;
    if value.is_object() {
        serde_json::from_value(value)
    } else {
        Ok(ProductForm::default())
    }
}
