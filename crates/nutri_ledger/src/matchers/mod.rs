//! Pattern matchers that classify one line of chat text.
//!
//! Matchers are tried in a fixed order: expense first, then intake. The
//! first matcher that both matches and passes its validity check wins.

use std::sync::LazyLock;

use regex::Regex;

/// Category phrase, a run of at least two digits, then any trailing
/// merchant text. Unanchored at the start.
static EXPENSE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?P<cat>[^\d]+?)\s+(?P<amt>\d{2,})\s*(?P<rest>.*)$")
        .expect("Invalid regex: expense pattern")
});

/// Product name, an integer or decimal amount, then a unit token. Anchored
/// at both ends so no trailing text is accepted.
static INTAKE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<name>[^\d]+?)\s+(?P<amount>\d+(?:[.,]\d+)?)\s*(?P<unit>шт|г|мл|л)$")
        .expect("Invalid regex: intake pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseMatch {
    pub category_name: String,
    pub amount_krw: i64,
    pub merchant: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntakeMatch {
    pub product_name: String,
    pub amount: f64,
    pub amount_unit: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Expense(ExpenseMatch),
    Intake(IntakeMatch),
    Unmatched,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Expense(_) => "expense",
            Classification::Intake(_) => "intake",
            Classification::Unmatched => "unmatched",
        }
    }
}

pub fn parse_expense(text: &str) -> Option<ExpenseMatch> {
    let caps = EXPENSE_PATTERN.captures(text.trim())?;

    let category_name = caps.name("cat")?.as_str().trim().to_lowercase();
    if category_name.is_empty() {
        return None;
    }
    // Digit runs beyond i64 are not plausible amounts.
    let amount_krw = caps.name("amt")?.as_str().parse::<i64>().ok()?;
    if amount_krw <= 0 {
        return None;
    }
    let merchant = caps
        .name("rest")
        .map(|rest| rest.as_str().trim())
        .filter(|rest| !rest.is_empty())
        .map(str::to_string);

    Some(ExpenseMatch {
        category_name,
        amount_krw,
        merchant,
    })
}

pub fn parse_intake(text: &str) -> Option<IntakeMatch> {
    let caps = INTAKE_PATTERN.captures(text.trim())?;

    let product_name = caps.name("name")?.as_str().trim().to_string();
    if product_name.is_empty() {
        return None;
    }
    let amount = caps
        .name("amount")?
        .as_str()
        .replace(',', ".")
        .parse::<f64>()
        .ok()?;
    if amount <= 0.0 {
        return None;
    }
    let amount_unit = caps.name("unit")?.as_str().to_lowercase();

    Some(IntakeMatch {
        product_name,
        amount,
        amount_unit,
    })
}

/// Run the matchers in priority order over trimmed text.
pub fn classify(text: &str) -> Classification {
    let text = text.trim();
    if let Some(expense) = parse_expense(text) {
        return Classification::Expense(expense);
    }
    if let Some(intake) = parse_intake(text) {
        return Classification::Intake(intake);
    }
    Classification::Unmatched
}
