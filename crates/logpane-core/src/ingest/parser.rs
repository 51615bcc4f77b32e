use std::sync::LazyLock;

use regex::Regex;

use logpane_types::{LogEntry, Severity};

use crate::error::IngestError;

/// Time (`HH:MM:SS.mmm`), elapsed (`(  1.234s)`) and logger name (`[ name ]`)
static PREAMBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r".*?(\d{2}:\d{2}:\d{2}\.\d{3})\s+\(\s*([0-9.]+s)\)\s+\[\s*(.*?)\s*\]")
        .expect("preamble pattern is valid")
});

/// Turns raw log callbacks into entries. Pure: no locks, no side effects.
pub struct RecordParser;

impl RecordParser {
    /// Parse one record. Fails when the preamble lacks time, elapsed or logger name.
    pub fn parse(verbosity: i32, preamble: &str, message: &str) -> Result<LogEntry, IngestError> {
        let captures = PREAMBLE
            .captures(preamble)
            .ok_or_else(|| IngestError::MalformedRecord {
                preamble: preamble.to_string(),
            })?;

        Ok(LogEntry::new(
            Severity::from_verbosity(verbosity),
            &captures[3],
            &captures[1],
            &captures[2],
            message,
        ))
    }

    /// `name` made safe to place between the preamble's brackets. A closing
    /// bracket would end the logger capture early.
    pub fn logger_field(name: &str) -> String {
        name.replace('[', "(").replace(']', ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_loguru_preamble() {
        let preamble = "2024-01-15 10:30:00.123 (   0.002s) [main thread     ]         sample.cpp:42    INFO| ";
        let entry = RecordParser::parse(0, preamble, "hello").unwrap();

        assert_eq!(entry.level, Severity::Info);
        assert_eq!(entry.timestamp, "10:30:00.123");
        assert_eq!(entry.elapsed, "0.002s");
        assert_eq!(entry.logger_name, "main thread");
        assert_eq!(entry.message, "hello");
    }

    #[test]
    fn test_parse_severity() {
        let preamble = "10:30:00.123 (12.500s) [worker-1]";
        let entry = RecordParser::parse(-2, preamble, "boom").unwrap();
        assert_eq!(entry.level, Severity::Error);
        assert_eq!(entry.elapsed, "12.500s");
        assert_eq!(entry.logger_name, "worker-1");
    }

    #[test]
    fn test_parse_malformed() {
        for preamble in ["", "no structure here", "10:30:00 (0.1s) [x]", "10:30:00.123 [x]"] {
            assert_eq!(
                RecordParser::parse(0, preamble, "m"),
                Err(IngestError::MalformedRecord {
                    preamble: preamble.to_string()
                })
            );
        }
    }

    #[test]
    fn test_parse_multibyte_no_panic() {
        let preamble = "╭── 10:30:00.123 (0.100s) [スレッド] ──╮";
        let entry = RecordParser::parse(0, preamble, "─────").unwrap();
        assert_eq!(entry.logger_name, "スレッド");
    }

    #[test]
    fn test_bracketed_logger_survives_round_trip() {
        let preamble = format!(
            "10:30:00.123 (0.100s) [{}] target",
            RecordParser::logger_field("pool[1]")
        );
        let entry = RecordParser::parse(0, &preamble, "m").unwrap();
        assert_eq!(entry.logger_name, "pool(1)");
    }
}
