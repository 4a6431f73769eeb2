//! Fixed user-facing reply texts.

use crate::{
    matchers::{ExpenseMatch, IntakeMatch},
    storage::StorageOutcome,
};

pub const GREETING: &str = "👋 Привет! Я помогу вести калории и бюджет.\n\
Открой WebApp или пиши: `яйца 2шт`, `кофе 4800`.";

pub const APP_PROMPT: &str = "Открыть приложение:";
pub const APP_BUTTON: &str = "Открыть приложение";
pub const APP_FALLBACK_URL: &str = "https://example.com";

pub const PRODUCT_TEMPLATE: &str = "Скопируй и заполни, потом пришли обратно:\n\
```\n\
название: \nалиасы: \nединица_базовая: шт|г|мл|л\nвес_1_ед_в_г: \n\
ккал_на_100г: \nбелки_на_100г: \nжиры_на_100г: \nуглеводы_на_100г: \n\
размер_упаковки_ед: \nцена_за_упаковку_krw: \nисточник: \n\
```\nИли используй форму в WebApp.";

pub const DAY_SUMMARY: &str =
    "📅 Сегодня: калории 0 / 0 · Еда 0₩ · Расходы 0₩ · Остаток месяца: 0₩ (демо)";

pub const NOT_UNDERSTOOD: &str = "Не понял. Пример: «кофе 4800» или «яйца 2шт». Команда: /app";

pub const FORM_UNREADABLE: &str = "Не удалось прочитать данные из формы.";
pub const FORM_ACKNOWLEDGED: &str = "Получены данные формы (демо).";

pub fn expense_recorded(expense: &ExpenseMatch) -> String {
    format!(
        "💸 {}: −{}₩ записано.",
        expense.category_name, expense.amount_krw
    )
}

pub fn intake_recorded(intake: &IntakeMatch) -> String {
    format!(
        "🍽️ {} {}{} — записано.",
        intake.product_name,
        format_amount(intake.amount),
        intake.amount_unit
    )
}

pub fn product_saved(name: &str) -> String {
    format!("✅ Продукт «{name}» сохранён.")
}

pub fn product_failed(outcome: &StorageOutcome) -> String {
    format!("⚠️ Не удалось сохранить продукт: {outcome}")
}

/// Amounts always show a decimal point (`2.0`, `1.5`); very small or large
/// ones use a signed two-digit exponent (`1e-05`, `1.5e+16`).
fn format_amount(amount: f64) -> String {
    let shortest = format!("{amount:?}");
    let Some((mantissa, exponent)) = shortest.split_once('e') else {
        return shortest;
    };
    match exponent.parse::<i32>() {
        Ok(exp) => {
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        Err(_) => shortest,
    }
}
