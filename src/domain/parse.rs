// Result-typed parsing of the loosely typed strings the data API returns
use chrono::{DateTime, NaiveDate, Utc};

/// Period suffixes stripped from budget strings ("$1,200/month").
const CURRENCY_SUFFIXES: [&str; 5] = ["/month", "/mo", "/year", "/yr", "/week"];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("empty value")]
    Empty,
    #[error("not a number: {0:?}")]
    InvalidNumber(String),
    #[error("not a finite number: {0:?}")]
    NonFinite(String),
    #[error("not a date: {0:?}")]
    InvalidDate(String),
}

pub fn parse_number(raw: &str) -> Result<f64, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let value: f64 = trimmed
        .parse()
        .map_err(|_| ParseError::InvalidNumber(raw.to_string()))?;

    if !value.is_finite() {
        return Err(ParseError::NonFinite(raw.to_string()));
    }

    Ok(value)
}

/// Parse a currency amount, tolerating a `$` prefix, thousands separators
/// and a billing-period suffix.
pub fn parse_currency(raw: &str) -> Result<f64, ParseError> {
    let mut text: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    for suffix in CURRENCY_SUFFIXES {
        if let Some(stripped) = text.strip_suffix(suffix) {
            text = stripped.to_string();
            break;
        }
    }

    let cleaned: String = text.chars().filter(|c| !matches!(c, '$' | ',')).collect();

    if cleaned.is_empty() {
        return Err(ParseError::Empty);
    }

    parse_number(&cleaned).map_err(|e| match e {
        ParseError::InvalidNumber(_) => ParseError::InvalidNumber(raw.to_string()),
        other => other,
    })
}

/// Currency with the zero fallback used by totals. Malformed input is
/// logged and counted as 0 rather than failing the whole summary.
pub fn currency_or_zero(raw: &str) -> f64 {
    match parse_currency(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Treating unparsable amount as 0: {}", e);
            0.0
        }
    }
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| ParseError::InvalidDate(raw.to_string()))
}

/// Optional date field: `None` when absent, blank or unparsable.
/// Unparsable values are logged so they are never silently dropped.
pub fn optional_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match parse_date(raw) {
        Ok(date) => Some(date),
        Err(ParseError::Empty) => None,
        Err(e) => {
            tracing::warn!("Ignoring unparsable date: {}", e);
            None
        }
    }
}

/// Optional numeric field, excluded (with a warning) when unparsable.
pub fn optional_number(raw: Option<&str>) -> Option<f64> {
    let raw = raw?;
    match parse_number(raw) {
        Ok(value) => Some(value),
        Err(ParseError::Empty) => None,
        Err(e) => {
            tracing::warn!("Ignoring unparsable number: {}", e);
            None
        }
    }
}
