use std::fmt;

use serde::{Deserialize, Deserializer, Serializer};

/// Stablecoin amounts are held as integer cents so that prices like 8.99
/// subtract exactly. 1 PYUSD = 100 cents, so 125.50 PYUSD = 12550 cents.
pub type Cents = i64;

/// Format cents as a decimal string with two places.
/// Example: 11651 -> "116.51", -1 -> "-0.01"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Format cents with a leading dollar sign, the way balances are displayed.
pub fn format_usd(cents: Cents) -> String {
    if cents < 0 {
        format!("-${}", format_cents(-cents))
    } else {
        format!("${}", format_cents(cents))
    }
}

/// Parse a decimal string into cents.
/// Example: "8.99" -> 899, "15.0" -> 1500, "125.5" -> 12550
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseCentsError::Empty);
    }

    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let (units_str, decimal_str) = match digits.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (digits, ""),
    };
    if decimal_str.contains('.') {
        return Err(ParseCentsError::InvalidFormat);
    }
    if units_str.is_empty() && decimal_str.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        parse_digits(units_str)?
    };

    // Anything past the second decimal place is truncated
    let decimal_cents: i64 = match decimal_str.len() {
        0 => 0,
        1 => parse_digits(decimal_str)? * 10,
        _ => parse_digits(&decimal_str[..2])?,
    };
    if decimal_str.len() > 2 {
        parse_digits(&decimal_str[2..])?;
    }

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .ok_or(ParseCentsError::Overflow)?;
    Ok(if negative { -cents } else { cents })
}

/// Parse a strictly positive amount, as required for prices and payments.
pub fn parse_positive_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let cents = parse_cents(input)?;
    if cents <= 0 {
        return Err(ParseCentsError::NotPositive);
    }
    Ok(cents)
}

fn parse_digits(s: &str) -> Result<i64, ParseCentsError> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseCentsError::InvalidFormat);
    }
    s.parse().map_err(|_| ParseCentsError::Overflow)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    Empty,
    InvalidFormat,
    NotPositive,
    Overflow,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::Empty => write!(f, "amount is empty"),
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::NotPositive => write!(f, "amount must be positive"),
            ParseCentsError::Overflow => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for ParseCentsError {}

/// Amounts in configuration files may be written as `"8.99"` or `8.99`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Int(i64),
    Float(f64),
    Text(String),
}

/// serde adapter: deserialize a decimal amount into cents.
pub fn deserialize_cents<'de, D>(deserializer: D) -> Result<Cents, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match RawAmount::deserialize(deserializer)? {
        RawAmount::Int(units) => units.to_string(),
        // Display keeps every digit so parse_cents truncates like it does for text
        RawAmount::Float(value) => value.to_string(),
        RawAmount::Text(text) => text,
    };
    parse_cents(&text).map_err(serde::de::Error::custom)
}

/// serde adapter: serialize cents back to the decimal string form.
pub fn serialize_cents<S>(cents: &Cents, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_cents(*cents))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(12550), "125.50");
        assert_eq!(format_cents(11651), "116.51");
        assert_eq!(format_cents(899), "8.99");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-425), "-4.25");
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(12550), "$125.50");
        assert_eq!(format_usd(-100), "-$1.00");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("8.99"), Ok(899));
        assert_eq!(parse_cents("15"), Ok(1500));
        assert_eq!(parse_cents("15.0"), Ok(1500));
        assert_eq!(parse_cents("125.5"), Ok(12550));
        assert_eq!(parse_cents(".50"), Ok(50));
        assert_eq!(parse_cents(" 4.25 "), Ok(425));
        assert_eq!(parse_cents("-5.00"), Ok(-500));
        assert_eq!(parse_cents("9.999"), Ok(999)); // Truncates
    }

    #[test]
    fn test_parse_cents_invalid() {
        assert_eq!(parse_cents(""), Err(ParseCentsError::Empty));
        assert_eq!(parse_cents("abc"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("1.2.3"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("."), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("1e3"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("1.5x"), Err(ParseCentsError::InvalidFormat));
    }

    #[test]
    fn test_parse_positive_cents() {
        assert_eq!(parse_positive_cents("0.01"), Ok(1));
        assert_eq!(parse_positive_cents("0"), Err(ParseCentsError::NotPositive));
        assert_eq!(parse_positive_cents("-3"), Err(ParseCentsError::NotPositive));
    }

    #[test]
    fn test_exact_subtraction() {
        let balance = parse_cents("125.50").unwrap();
        let price = parse_cents("8.99").unwrap();
        assert_eq!(format_cents(balance - price), "116.51");
    }

    #[derive(Deserialize)]
    struct Priced {
        #[serde(deserialize_with = "deserialize_cents")]
        price: Cents,
    }

    fn price_of(json: &str) -> Cents {
        serde_json::from_str::<Priced>(json).unwrap().price
    }

    #[test]
    fn test_numeric_and_text_amounts_agree() {
        assert_eq!(price_of(r#"{"price": 9.999}"#), 999);
        assert_eq!(price_of(r#"{"price": "9.999"}"#), 999);
        assert_eq!(price_of(r#"{"price": 8.99}"#), 899);
        assert_eq!(price_of(r#"{"price": 12.5}"#), 1250);
        assert_eq!(price_of(r#"{"price": 20}"#), 2000);
    }
}
