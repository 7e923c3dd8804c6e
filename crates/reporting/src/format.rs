//! Display formatting for dashboard values.
//!
//! Formatters are total: missing or non-numeric input renders a safe
//! default (`"$0.00"`, `"0"`, `"0%"`, `""`) instead of failing.

use std::fmt;
use std::str::FromStr;

use campaign_core::CampaignError;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Jpy,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Jpy => "¥",
        }
    }

    pub fn fraction_digits(&self) -> usize {
        match self {
            Currency::Jpy => 0,
            _ => 2,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            "JPY" => Ok(Currency::Jpy),
            other => Err(CampaignError::Parse(format!("unsupported currency: {other}"))),
        }
    }
}

/// What a numeric value represents when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    Currency,
    Percentage,
    Number,
    /// Unix timestamp in milliseconds.
    Date,
}

impl FromStr for FormatKind {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "currency" => Ok(FormatKind::Currency),
            "percentage" | "percent" => Ok(FormatKind::Percentage),
            "number" => Ok(FormatKind::Number),
            "date" => Ok(FormatKind::Date),
            other => Err(CampaignError::Parse(format!("unknown format kind: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    pub currency: Currency,
    /// Fixed precision for percentages; `None` keeps the adaptive rule.
    pub percentage_decimals: Option<usize>,
}

/// Render `value` according to `kind`.
pub fn format_value(value: Option<f64>, kind: FormatKind, options: &FormatOptions) -> String {
    match kind {
        FormatKind::Currency => format_currency_in(value, options.currency),
        FormatKind::Percentage => match options.percentage_decimals {
            Some(decimals) => format_percentage_with(value, decimals),
            None => format_percentage(value),
        },
        FormatKind::Number => format_number(value),
        FormatKind::Date => {
            let date = value
                .filter(|v| v.is_finite())
                .and_then(|ms| DateTime::from_timestamp_millis(ms as i64))
                .map(|dt| dt.date_naive());
            format_date(date)
        }
    }
}

pub fn format_currency(value: Option<f64>) -> String {
    format_currency_in(value, Currency::Usd)
}

/// `-$1,234.56` style rendering with the currency's own fraction digits.
/// Any negative input keeps its sign, so `-0.001` renders `-$0.00`.
pub fn format_currency_in(value: Option<f64>, currency: Currency) -> String {
    let value = value.filter(|v| v.is_finite()).unwrap_or(0.0);
    let fixed = to_fixed(value.abs(), currency.fraction_digits());
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{}{}", currency.symbol(), group_fixed(&fixed))
}

/// Compact rendering: `1.2K`, `3.4M`, otherwise the plain number.
pub fn format_number(value: Option<f64>) -> String {
    let Some(value) = value else {
        return "0".to_string();
    };
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude >= 1_000_000.0 {
        format!("{}M", to_fixed(value / 1_000_000.0, 1))
    } else if magnitude >= 1_000.0 {
        format!("{}K", to_fixed(value / 1_000.0, 1))
    } else if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// Comma-grouped rendering with up to three fraction digits, no
/// abbreviation. Used for table cells.
pub fn format_thousands(value: Option<f64>) -> String {
    let value = value.filter(|v| v.is_finite()).unwrap_or(0.0);
    let fixed = format!("{:.3}", value.abs());
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "0" {
        return "0".to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{}", group_fixed(trimmed))
}

/// Treats the input as a fraction (`0.5` renders `50.0%`). Sub-1%
/// magnitudes get two decimals, 100% and above none, everything else one.
pub fn format_percentage(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return "0%".to_string();
    };
    let percent = value * 100.0;
    let magnitude = percent.abs();
    let decimals = if magnitude < 1.0 {
        2
    } else if magnitude >= 100.0 {
        0
    } else {
        1
    };
    format!("{}%", to_fixed(percent, decimals))
}

pub fn format_percentage_with(value: Option<f64>, decimals: usize) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return "0%".to_string();
    };
    format!("{}%", to_fixed(value * 100.0, decimals))
}

/// `Jan 15, 2024`. Missing dates render as an empty string.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}

/// Accepts RFC 3339 timestamps or `YYYY-MM-DD`; anything else renders `""`.
pub fn format_date_str(raw: &str) -> String {
    format_date(parse_date(raw))
}

pub fn format_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    format!("{} - {}", format_date(start), format_date(end))
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}

/// Fixed-point rendering that rounds ties away from zero (`1.25` to one
/// decimal is `1.3`), unlike `{:.N}` which rounds them to even.
fn to_fixed(value: f64, decimals: usize) -> String {
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    // Past 2^52 every f64 is already an integer.
    let rounded = if scaled.is_finite() && scaled.abs() < 4_503_599_627_370_496.0 {
        scaled.round() / factor
    } else {
        value
    };
    format!("{rounded:.decimals$}")
}

/// Insert thousands separators into the integer part of an unsigned
/// fixed-point string.
fn group_fixed(fixed: &str) -> String {
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}
