//! Ticket pricing and currency display.
//!
//! Amounts are integer cents. The raffle is priced in Brazilian reais and
//! displayed with a comma decimal separator, e.g. `R$ 30,00`.

use serde::{Deserialize, Serialize};

/// Price of a single slot in cents (R$ 10,00).
pub const TICKET_PRICE_CENTS: i64 = 1000;

/// Currency symbol shown next to amounts.
pub const CURRENCY_SYMBOL: &str = "R$";

/// Amount due for a number of slots, in cents.
#[must_use]
pub fn total_due_cents(slot_count: usize) -> i64 {
    i64::try_from(slot_count)
        .unwrap_or(i64::MAX)
        .saturating_mul(TICKET_PRICE_CENTS)
}

/// Format cents as `R$ 1.234,50`.
#[must_use]
pub fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{sign}{CURRENCY_SYMBOL} {grouped},{fraction:02}")
}

/// Static payment instructions shown to buyers.
///
/// Nothing here is generated or verified; the admin confirms payments by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    /// PIX key buyers send money to.
    pub pix_key: String,
    /// Account holder name.
    pub pix_holder: String,
    /// Bank name.
    pub pix_bank: String,
}
