use crate::config::InputFormat;
use crate::types::{Order, Side};
use chrono::NaiveTime;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Wall-clock format every timestamp token must satisfy
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// `<id> <side> <symbol> <price> <volume> <timestamp>`
pub const FIELD_COUNT: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Invalid order id: {0:?}")]
    InvalidId(String),

    #[error("Invalid side: {0:?} (expected BUY or SELL)")]
    InvalidSide(String),

    #[error("Symbol is empty")]
    EmptySymbol,

    #[error("Invalid price: {0:?}")]
    InvalidPrice(String),

    #[error("Price {0} is negative")]
    NegativePrice(Decimal),

    #[error("Invalid volume: {0:?}")]
    InvalidVolume(String),

    #[error("Volume {0} is negative")]
    NegativeVolume(i64),

    #[error("Invalid timestamp: {0:?} (expected HH:MM:SS)")]
    InvalidTimestamp(String),

    #[error("Malformed CSV record: {0}")]
    Csv(#[from] csv::Error),
}

impl FromStr for Side {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" | "B" => Ok(Side::Buy),
            "SELL" | "S" => Ok(Side::Sell),
            _ => Err(ParseError::InvalidSide(s.to_string())),
        }
    }
}

/// Blank lines and `#` comments carry no order and are not rejected.
pub fn is_ignorable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Check a timestamp token is a real `HH:MM:SS` time. The token itself is
/// kept verbatim; queries compare it as a string.
pub fn validate_timestamp(token: &str) -> Result<(), ParseError> {
    if token.len() != 8 || NaiveTime::parse_from_str(token, TIMESTAMP_FORMAT).is_err() {
        return Err(ParseError::InvalidTimestamp(token.to_string()));
    }
    Ok(())
}

/// Parse one log line into an order
pub fn parse_line(line: &str, format: InputFormat) -> Result<Order, ParseError> {
    let fields = split_fields(line, format)?;
    if fields.len() != FIELD_COUNT {
        return Err(ParseError::FieldCount {
            expected: FIELD_COUNT,
            found: fields.len(),
        });
    }

    let id = fields[0]
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidId(fields[0].clone()))?;

    let side = fields[1].parse::<Side>()?;

    let symbol = fields[2].clone();
    if symbol.is_empty() {
        return Err(ParseError::EmptySymbol);
    }

    let price =
        Decimal::from_str(&fields[3]).map_err(|_| ParseError::InvalidPrice(fields[3].clone()))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ParseError::NegativePrice(price));
    }

    let volume = fields[4]
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidVolume(fields[4].clone()))?;
    if volume < 0 {
        return Err(ParseError::NegativeVolume(volume));
    }

    validate_timestamp(&fields[5])?;

    Ok(Order {
        id,
        symbol,
        side,
        price,
        volume,
        timestamp: fields[5].clone(),
    })
}

fn split_fields(line: &str, format: InputFormat) -> Result<Vec<String>, ParseError> {
    match format {
        InputFormat::Whitespace => Ok(line.split_whitespace().map(str::to_string).collect()),
        InputFormat::Csv => {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .trim(csv::Trim::All)
                .from_reader(line.as_bytes());
            match reader.records().next() {
                Some(record) => Ok(record?.iter().map(str::to_string).collect()),
                None => Ok(Vec::new()),
            }
        }
    }
}
