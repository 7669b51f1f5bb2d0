//! Parsing of free-text conversation inputs.
use chrono::NaiveDate;

use engine::Money;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ParseError {
    #[error("invalid date, use YYYY-MM-DD or 'today'")]
    InvalidDate,
    #[error("invalid amount, enter a positive number")]
    InvalidAmount,
}

/// Parses a logical date: ISO `YYYY-MM-DD` or the literal `today`
/// (case-insensitive), resolved against the caller's notion of today.
pub(crate) fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate, ParseError> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("today") {
        return Ok(today);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| ParseError::InvalidDate)
}

/// Parses a strictly positive money amount.
pub(crate) fn parse_positive_amount(input: &str) -> Result<Money, ParseError> {
    let amount: Money = input.trim().parse().map_err(|_| ParseError::InvalidAmount)?;
    if amount.is_negative() || amount.is_zero() {
        return Err(ParseError::InvalidAmount);
    }
    Ok(amount)
}

/// Parses a non-negative money amount (zero allowed; used by the edit
/// flow where zeroing an amount turns an entry into tracking-only).
pub(crate) fn parse_amount(input: &str) -> Result<Money, ParseError> {
    let amount: Money = input.trim().parse().map_err(|_| ParseError::InvalidAmount)?;
    if amount.is_negative() {
        return Err(ParseError::InvalidAmount);
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn today_keyword_resolves() {
        assert_eq!(parse_date("today", today()).unwrap(), today());
        assert_eq!(parse_date(" Today ", today()).unwrap(), today());
    }

    #[test]
    fn iso_dates_parse() {
        assert_eq!(
            parse_date("2026-01-31", today()).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()
        );
        assert!(parse_date("31/01/2026", today()).is_err());
        assert!(parse_date("2026-13-01", today()).is_err());
    }

    #[test]
    fn positive_amount_rejects_zero_and_negative() {
        assert_eq!(parse_positive_amount("12.50").unwrap().cents(), 1250);
        assert!(parse_positive_amount("0").is_err());
        assert!(parse_positive_amount("-5").is_err());
        assert!(parse_positive_amount("abc").is_err());
    }

    #[test]
    fn plain_amount_allows_zero() {
        assert_eq!(parse_amount("0").unwrap().cents(), 0);
        assert!(parse_amount("-0.01").is_err());
    }
}
