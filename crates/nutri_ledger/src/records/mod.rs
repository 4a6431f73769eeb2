//! Storage-shaped records built from matcher output or form payloads.
//!
//! Every record serializes its full field set. Optional values that are
//! absent serialize as `null` so the receiving table always sees the same
//! columns.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::matchers::{ExpenseMatch, IntakeMatch};

pub const EXPENSES_COLLECTION: &str = "expenses";
pub const INTAKE_COLLECTION: &str = "intake";
pub const PRODUCTS_COLLECTION: &str = "products";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseRecord {
    pub user_id: String,
    pub category_name: String,
    pub amount_krw: i64,
    pub merchant: Option<String>,
}

impl ExpenseRecord {
    pub fn from_match(user_id: impl Into<String>, parsed: ExpenseMatch) -> Self {
        Self {
            user_id: user_id.into(),
            category_name: parsed.category_name,
            amount_krw: parsed.amount_krw,
            merchant: parsed.merchant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeRecord {
    pub user_id: String,
    pub product_name: String,
    pub amount: f64,
    pub amount_unit: String,
}

impl IntakeRecord {
    pub fn from_match(user_id: impl Into<String>, parsed: IntakeMatch) -> Self {
        Self {
            user_id: user_id.into(),
            product_name: parsed.product_name,
            amount: parsed.amount,
            amount_unit: parsed.amount_unit,
        }
    }
}

/// Payload submitted by the companion product form.
///
/// Every field is optional. Numeric fields are kept as raw JSON values and
/// passed through untouched, so a missing value stays distinguishable from
/// an explicit zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
    #[serde(default)]
    pub aliases: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub base_unit: Option<Value>,
    #[serde(default)]
    pub unit_weight_g: Option<Value>,
    #[serde(default)]
    pub pack_size_units: Option<Value>,
    #[serde(default)]
    pub pack_price_krw: Option<Value>,
    #[serde(default)]
    pub kcal_per_100g: Option<Value>,
    #[serde(default)]
    pub p_per_100g: Option<Value>,
    #[serde(default)]
    pub f_per_100g: Option<Value>,
    #[serde(default)]
    pub c_per_100g: Option<Value>,
    #[serde(default)]
    pub source: Option<Value>,
}

/// Keeps an explicit JSON `null` as `Some(Value::Null)` so key presence can
/// be told apart from key absence.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl ProductForm {
    /// A payload is a product definition when it carries both a `name` and a
    /// `base_unit` key.
    pub fn is_product(&self) -> bool {
        self.name.is_some() && self.base_unit.is_some()
    }
}

/// Empty-ish form values (`null`, `false`, `0`, `""`, `[]`, `{}`) carry no
/// aliases.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub user_id: String,
    pub name: Value,
    pub aliases: Value,
    pub base_unit: Value,
    pub unit_weight_g: Option<Value>,
    pub pack_size_units: Option<Value>,
    pub pack_price_krw: Option<Value>,
    pub kcal_per_100g: Option<Value>,
    pub p_per_100g: Option<Value>,
    pub f_per_100g: Option<Value>,
    pub c_per_100g: Option<Value>,
    pub image_url: Option<String>,
    pub source: Option<Value>,
}

impl ProductRecord {
    pub fn from_form(user_id: impl Into<String>, form: ProductForm) -> Option<Self> {
        if !form.is_product() {
            return None;
        }
        let aliases = form
            .aliases
            .filter(|aliases| !is_blank(aliases))
            .unwrap_or_else(|| Value::Array(Vec::new()));

        Some(Self {
            user_id: user_id.into(),
            name: form.name?,
            aliases,
            base_unit: form.base_unit?,
            unit_weight_g: form.unit_weight_g,
            pack_size_units: form.pack_size_units,
            pack_price_krw: form.pack_price_krw,
            kcal_per_100g: form.kcal_per_100g,
            p_per_100g: form.p_per_100g,
            f_per_100g: form.f_per_100g,
            c_per_100g: form.c_per_100g,
            image_url: None,
            source: form.source,
        })
    }

    /// Product name as shown back to the user.
    pub fn display_name(&self) -> String {
        match &self.name {
            Value::String(name) => name.clone(),
            Value::Null => "None".to_string(),
            other => other.to_string(),
        }
    }
}
