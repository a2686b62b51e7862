//! Locale formatting for reports and recommendation texts.
//!
//! Brazilian conventions: `.` groups thousands, `,` separates decimals
//! (`R$ 1.234,56`, `15,5%`). Amounts are rounded through `Decimal` so
//! half-cent values round away from zero instead of following binary
//! floating-point noise.

use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;

/// Currency formatter bound to one currency code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Money {
    symbol: String,
}

impl Money {
    /// Formatter for an ISO currency code. Unknown codes are printed verbatim.
    pub fn for_currency(code: &str) -> Self {
        let symbol = match code.to_uppercase().as_str() {
            "BRL" => "R$".to_string(),
            "USD" => "$".to_string(),
            "EUR" => "€".to_string(),
            other => other.to_string(),
        };
        Self { symbol }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// `R$ 1.000,00`; negatives as `-R$ 500,00`.
    pub fn format(&self, value: f64) -> String {
        match Decimal::from_f64(value) {
            Some(d) => self.format_decimal(d),
            None => format!("{} {value}", self.symbol),
        }
    }

    pub fn format_decimal(&self, value: Decimal) -> String {
        let rounded = round(value, 2);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!("{sign}{} {}", self.symbol, localize(rounded.abs(), 2, false))
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::for_currency("BRL")
    }
}

/// Format an amount in Brazilian reais.
pub fn format_currency(value: f64) -> String {
    Money::default().format(value)
}

/// Percentage points with one decimal: `10` → `10,0%`.
pub fn format_percentage(value: f64) -> String {
    match Decimal::from_f64(value) {
        Some(d) => format!("{}%", signed(round(d, 1), 1, false)),
        None => format!("{value}%"),
    }
}

/// Plain number with at most one decimal: `1234.56` → `1.234,6`, `12.0` → `12`.
pub fn format_number(value: f64) -> String {
    match Decimal::from_f64(value) {
        Some(d) => signed(round(d, 1), 1, true),
        None => value.to_string(),
    }
}

fn round(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

fn signed(value: Decimal, decimals: u32, trim: bool) -> String {
    let body = localize(value.abs(), decimals, trim);
    if value.is_sign_negative() && !value.is_zero() {
        format!("-{body}")
    } else {
        body
    }
}

/// Render a non-negative, already-rounded decimal with pt-BR separators.
fn localize(value: Decimal, decimals: u32, trim: bool) -> String {
    let text = value.to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut frac = frac_part.to_string();
    if trim {
        frac = frac.trim_end_matches('0').to_string();
    } else {
        while frac.len() < decimals as usize {
            frac.push('0');
        }
    }

    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3 + frac.len() + 1);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    if !frac.is_empty() {
        out.push(',');
        out.push_str(&frac);
    }
    out
}
