use crate::config::{IngestPolicy, InputConfig};
use crate::parser::{self, ParseError};
use crate::types::Order;
use serde::Serialize;
use std::io::BufRead;
use tracing::{info, warn};

/// A line that failed to parse under the lenient policy
#[derive(Debug)]
pub struct RejectedLine {
    /// 1-based position in the input
    pub line_number: usize,
    pub line: String,
    pub error: ParseError,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Malformed order on line {line_number}: {source}")]
    Malformed {
        line_number: usize,
        #[source]
        source: ParseError,
    },
}

/// Read raw log lines to EOF. Bytes that are not UTF-8 are replaced rather
/// than failing the read, so such a line reaches the parser and is rejected
/// like any other malformed order.
pub fn read_lines<R: BufRead>(reader: R) -> std::io::Result<Vec<String>> {
    let mut lines = Vec::new();
    for raw in reader.split(b'\n') {
        let mut raw = raw?;
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
        lines.push(String::from_utf8_lossy(&raw).into_owned());
    }
    Ok(lines)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub total_lines: usize,
    pub parsed: usize,
    pub skipped_blank: usize,
    pub rejected: usize,
}

/// Raw order-log lines plus the orders parsed from them.
///
/// Parsing happens once, at construction. Nothing is mutated afterwards.
#[derive(Debug)]
pub struct OrderLog {
    lines: Vec<String>,
    orders: Vec<Order>,
    rejected: Vec<RejectedLine>,
    skipped_blank: usize,
}

impl OrderLog {
    pub fn parse(lines: Vec<String>, config: &InputConfig) -> Result<Self, IngestError> {
        let mut orders = Vec::with_capacity(lines.len());
        let mut rejected = Vec::new();
        let mut skipped_blank = 0;

        for (idx, line) in lines.iter().enumerate() {
            let line_number = idx + 1;
            if parser::is_ignorable(line) {
                skipped_blank += 1;
                continue;
            }

            match parser::parse_line(line, config.format) {
                Ok(order) => orders.push(order),
                Err(source) => match config.policy {
                    IngestPolicy::Strict => {
                        return Err(IngestError::Malformed {
                            line_number,
                            source,
                        });
                    }
                    IngestPolicy::Lenient => {
                        warn!(line_number, line = %line, error = %source, "Skipping malformed order line");
                        rejected.push(RejectedLine {
                            line_number,
                            line: line.clone(),
                            error: source,
                        });
                    }
                },
            }
        }

        info!(
            total_lines = lines.len(),
            parsed = orders.len(),
            rejected = rejected.len(),
            skipped_blank,
            "Order log ingested"
        );

        Ok(Self {
            lines,
            orders,
            rejected,
            skipped_blank,
        })
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn rejected(&self) -> &[RejectedLine] {
        &self.rejected
    }

    pub fn summary(&self) -> IngestSummary {
        IngestSummary {
            total_lines: self.lines.len(),
            parsed: self.orders.len(),
            skipped_blank: self.skipped_blank,
            rejected: self.rejected.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputFormat;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_lenient_skips_malformed() {
        let log = OrderLog::parse(
            lines(&[
                "1 BUY DVAM1 10.50 100 15:29:00",
                "garbage",
                "2 SELL DVAM1 10.40 50 15:30:00",
                "3 SELL DVAM1 10.45 75 15:30:00",
            ]),
            &InputConfig::default(),
        )
        .unwrap();

        assert_eq!(log.orders().len(), 3);
        assert_eq!(log.rejected().len(), 1);
        assert_eq!(log.rejected()[0].line_number, 2);
        assert_eq!(log.rejected()[0].line, "garbage");
        assert!(matches!(
            log.rejected()[0].error,
            ParseError::FieldCount { found: 1, .. }
        ));
        assert_eq!(log.lines().len(), 4);
    }

    #[test]
    fn test_strict_fails_with_line_number() {
        let config = InputConfig {
            format: InputFormat::Whitespace,
            policy: IngestPolicy::Strict,
        };
        let err = OrderLog::parse(
            lines(&[
                "1 BUY DVAM1 10.50 100 15:29:00",
                "2 SELL DVAM1 10.40 -50 15:30:00",
            ]),
            &config,
        )
        .unwrap_err();

        let IngestError::Malformed { line_number, source } = err;
        assert_eq!(line_number, 2);
        assert!(matches!(source, ParseError::NegativeVolume(-50)));
    }

    #[test]
    fn test_strict_accepts_clean_log() {
        let config = InputConfig {
            format: InputFormat::Csv,
            policy: IngestPolicy::Strict,
        };
        let log = OrderLog::parse(
            lines(&["1,BUY,DVAM1,10.50,100,15:29:00", "", "# comment"]),
            &config,
        )
        .unwrap();
        assert_eq!(log.orders().len(), 1);
    }

    #[test]
    fn test_summary_accounts_for_every_line() {
        let log = OrderLog::parse(
            lines(&[
                "",
                "1 BUY DVAM1 10.50 100 15:29:00",
                "# note",
                "1 BUY DVAM1 10.50 100 15:29:00",
                "bad line",
            ]),
            &InputConfig::default(),
        )
        .unwrap();

        let summary = log.summary();
        assert_eq!(summary.total_lines, 5);
        assert_eq!(summary.parsed, 2);
        assert_eq!(summary.skipped_blank, 2);
        assert_eq!(summary.rejected, 1);
        assert_eq!(
            summary.parsed + summary.skipped_blank + summary.rejected,
            summary.total_lines
        );
    }

    #[test]
    fn test_read_lines_keeps_invalid_utf8_as_rejected_line() {
        let input: &[u8] = b"1 BUY DVAM1 10.50 100 15:29:00\r\n\xff\xfe bad\n2 SELL DVAM1 10.40 50 15:30:00";
        let lines = read_lines(input).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "1 BUY DVAM1 10.50 100 15:29:00");
        assert_eq!(lines[2], "2 SELL DVAM1 10.40 50 15:30:00");

        let log = OrderLog::parse(lines, &InputConfig::default()).unwrap();
        assert_eq!(log.orders().len(), 2);
        assert_eq!(log.rejected().len(), 1);
        assert_eq!(log.rejected()[0].line_number, 2);
    }

    #[test]
    fn test_read_lines_empty_input() {
        let input: &[u8] = b"";
        assert!(read_lines(input).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_ids_are_kept() {
        let log = OrderLog::parse(
            lines(&[
                "1 BUY DVAM1 10.50 100 15:29:00",
                "1 SELL XYZ 1.00 5 15:29:00",
            ]),
            &InputConfig::default(),
        )
        .unwrap();
        assert_eq!(log.orders().len(), 2);
    }
}
