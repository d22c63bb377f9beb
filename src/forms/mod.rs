//! Typed request payloads for every operation, plus the shared
//! sanitizers and the one numeric parser the whole crate uses. Nothing
//! outside this module turns user text into numbers.

use thiserror::Error;

pub mod customers;
pub mod orders;

/// Failures produced by the centralized numeric parsers. Bad input is
/// always a reported error, never a silent zero.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseNumberError {
    /// The text is not a money amount this parser understands.
    #[error("`{0}` is not a valid amount")]
    Amount(String),
    /// The text is not a positive whole quantity.
    #[error("`{0}` is not a valid quantity")]
    Quantity(String),
}

/// Parse a money amount into cents.
///
/// Accepts plain integers (`1234`), decimal-point amounts (`1234.5`),
/// Chilean-formatted amounts with dot grouping and comma decimals
/// (`1.234,56`, `$ 45.000`). Blank input is zero. A dot followed by
/// exactly three digits and no comma is grouping, not a decimal part.
pub fn parse_money_cents(input: &str) -> Result<i64, ParseNumberError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }

    let err = || ParseNumberError::Amount(trimmed.to_string());

    let cleaned: String = trimmed
        .chars()
        .filter(|ch| *ch != '$' && !ch.is_whitespace())
        .collect();

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else if let Some((whole, frac)) = cleaned.rsplit_once('.') {
        if frac.len() == 3 || whole.contains('.') {
            cleaned.replace('.', "")
        } else {
            cleaned.clone()
        }
    } else {
        cleaned.clone()
    };

    let (whole, frac) = match normalized.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (normalized.as_str(), ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(err());
    }
    if !whole.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(err());
    }
    if frac.len() > 2 || !frac.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(err());
    }

    let whole_value: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| err())?
    };

    let frac_value: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|_| err())? * 10,
        _ => frac.parse().map_err(|_| err())?,
    };

    whole_value
        .checked_mul(100)
        .and_then(|cents| cents.checked_add(frac_value))
        .ok_or_else(err)
}

/// Parse a line-item quantity. Blank means 1 (the grid's default row);
/// anything else must be a whole number of at least 1.
pub fn parse_quantity(input: &str) -> Result<i32, ParseNumberError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(1);
    }

    match trimmed.parse::<i32>() {
        Ok(value) if value >= 1 => Ok(value),
        _ => Err(ParseNumberError::Quantity(trimmed.to_string())),
    }
}

/// Collapse runs of whitespace into single spaces and drop control
/// characters.
pub(crate) fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}

/// Clean a phone cell the way spreadsheets mangle them: drop a trailing
/// `.0`, collapse scientific notation back to digits, and strip spaces,
/// commas and hyphens. Leaves any remaining non-digits for the caller to
/// reject.
pub(crate) fn clean_phone(input: &str) -> String {
    let mut text = input.trim().to_string();

    if let Some(stripped) = text.strip_suffix(".0") {
        text = stripped.to_string();
    }

    let lower = text.to_lowercase();
    if lower.contains("e+") || lower.contains("e-") {
        if let Ok(value) = text.parse::<f64>() {
            if value.is_finite() && value >= 0.0 {
                text = format!("{value:.0}");
            }
        }
    }

    text.chars()
        .filter(|ch| !matches!(ch, ' ' | ',' | '-'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_decimal_amounts() {
        assert_eq!(parse_money_cents(""), Ok(0));
        assert_eq!(parse_money_cents("1234"), Ok(123_400));
        assert_eq!(parse_money_cents("1234.5"), Ok(123_450));
        assert_eq!(parse_money_cents("1234.56"), Ok(123_456));
    }

    #[test]
    fn parses_chilean_formatted_amounts() {
        assert_eq!(parse_money_cents("1.234,56"), Ok(123_456));
        assert_eq!(parse_money_cents("$ 45.000"), Ok(4_500_000));
        assert_eq!(parse_money_cents("1.234"), Ok(123_400));
        assert_eq!(parse_money_cents("2.345.678"), Ok(234_567_800));
    }

    #[test]
    fn rejects_garbage_amounts() {
        assert!(matches!(
            parse_money_cents("abc"),
            Err(ParseNumberError::Amount(value)) if value == "abc"
        ));
        assert!(matches!(parse_money_cents("-5"), Err(_)));
        assert!(matches!(parse_money_cents("1.2345"), Err(_)));
        assert!(matches!(parse_money_cents("."), Err(_)));
    }

    #[test]
    fn quantity_defaults_blank_to_one() {
        assert_eq!(parse_quantity(""), Ok(1));
        assert_eq!(parse_quantity("  "), Ok(1));
        assert_eq!(parse_quantity("4"), Ok(4));
    }

    #[test]
    fn quantity_rejects_zero_negative_and_text() {
        assert!(parse_quantity("0").is_err());
        assert!(parse_quantity("-2").is_err());
        assert!(parse_quantity("dos").is_err());
    }

    #[test]
    fn phone_cleanup_undoes_spreadsheet_mangling() {
        assert_eq!(clean_phone("952288367.0"), "952288367");
        assert_eq!(clean_phone("9.5243e+08"), "952430000");
        assert_eq!(clean_phone("9 5228-8367"), "952288367");
        assert_eq!(clean_phone(""), "");
    }
}
