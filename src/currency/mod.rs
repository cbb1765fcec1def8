//! Currency codes and display formatting. Amounts are never converted
//! between currencies; a code only decides how an amount is rendered and
//! which total it is summed into.

use std::fmt;

use serde::{Deserialize, Serialize};

/// ISO 4217-style currency code, always upper case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("TRY")
    }
}

impl From<String> for CurrencyCode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for CurrencyCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    Before,
    After,
}

/// Display metadata for a supported currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub symbol: &'static str,
    pub position: SymbolPosition,
    pub decimal: char,
    pub thousand: char,
    pub name: &'static str,
}

const fn info(
    code: &'static str,
    symbol: &'static str,
    position: SymbolPosition,
    decimal: char,
    thousand: char,
    name: &'static str,
) -> CurrencyInfo {
    CurrencyInfo {
        code,
        symbol,
        position,
        decimal,
        thousand,
        name,
    }
}

pub const CURRENCIES: [CurrencyInfo; 10] = [
    info("TRY", "₺", SymbolPosition::After, ',', '.', "Turkish Lira"),
    info("USD", "$", SymbolPosition::Before, '.', ',', "US Dollar"),
    info("EUR", "€", SymbolPosition::Before, ',', '.', "Euro"),
    info("GBP", "£", SymbolPosition::Before, '.', ',', "British Pound"),
    info("JPY", "¥", SymbolPosition::Before, '.', ',', "Japanese Yen"),
    info("AUD", "A$", SymbolPosition::Before, '.', ',', "Australian Dollar"),
    info("CAD", "C$", SymbolPosition::Before, '.', ',', "Canadian Dollar"),
    info("CHF", "Fr", SymbolPosition::After, '.', ',', "Swiss Franc"),
    info("CNY", "¥", SymbolPosition::Before, '.', ',', "Chinese Yuan"),
    info("INR", "₹", SymbolPosition::Before, '.', ',', "Indian Rupee"),
];

pub fn currency_info(code: &CurrencyCode) -> Option<&'static CurrencyInfo> {
    CURRENCIES.iter().find(|info| info.code == code.as_str())
}

/// Separators used when rendering plain amounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LocaleConfig {
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            decimal_separator: ',',
            grouping_separator: '.',
        }
    }
}

/// Renders `value` with two decimals and the locale's separators.
pub fn format_number(locale: &LocaleConfig, value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed.chars().any(|c| matches!(c, '1'..='9')) {
        "-"
    } else {
        ""
    };
    format!(
        "{}{}{}{}",
        sign,
        group_digits(int_part, locale.grouping_separator),
        locale.decimal_separator,
        frac_part
    )
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

/// `1.234,56 TRY` style rendering used throughout the list screens.
pub fn format_amount(locale: &LocaleConfig, amount: f64, code: &CurrencyCode) -> String {
    format!("{} {}", format_number(locale, amount), code)
}

/// Renders with the currency's own separators and symbol placement. Codes
/// outside the table fall back to [`format_amount`].
pub fn format_with_symbol(locale: &LocaleConfig, amount: f64, code: &CurrencyCode) -> String {
    let Some(info) = currency_info(code) else {
        return format_amount(locale, amount, code);
    };
    let own = LocaleConfig {
        decimal_separator: info.decimal,
        grouping_separator: info.thousand,
    };
    let body = format_number(&own, amount);
    match info.position {
        SymbolPosition::Before => format!("{}{}", info.symbol, body),
        SymbolPosition::After => format!("{} {}", body, info.symbol),
    }
}

/// Parses user input where `,` is the decimal mark. Everything other than
/// digits and commas is dropped first, so `"1.234,50 ₺"` reads as `1234.5`.
pub fn parse_currency_input(input: &str) -> Option<f64> {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',')
        .collect();
    let normalized = cleaned.replacen(',', ".", 1);
    let numeric: String = normalized
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if !numeric.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let numeric = numeric.trim_end_matches('.');
    if numeric.is_empty() || numeric.starts_with('.') {
        return format!("0{}", numeric).parse().ok();
    }
    numeric.parse().ok()
}
