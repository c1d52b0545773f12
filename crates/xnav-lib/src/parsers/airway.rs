//! Parser for `earth_awy.dat` airway segments.
//!
//! Each row is one segment shared by one or more airways:
//! `<from id> <from region> <from type> <to id> <to region> <to type> <dir> <level> <base> <top> <names>`
//! where `names` joins the airway names with `-`.

use std::io::BufRead;

use tracing::debug;

use super::{Acceptor, END_OF_DATA};
use crate::error::{Error, Result, TokenKind};
use crate::model::{AirwayDirection, AirwayLevel, FixKey};
use crate::tokenizer::RowTokenizer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirwayRecord {
    pub from: FixKey,
    /// Navaid type code of the start fix (11 fix, 2 NDB, 3 VOR).
    pub from_type: i32,
    pub to: FixKey,
    pub to_type: i32,
    pub direction: AirwayDirection,
    pub level: AirwayLevel,
    pub base_fl: i32,
    pub top_fl: i32,
    pub names: Vec<String>,
}

pub struct AirwayParser<'a, R> {
    tokenizer: RowTokenizer<R>,
    header: String,
    acceptor: Option<Acceptor<'a, AirwayRecord>>,
}

impl<'a, R: BufRead> AirwayParser<'a, R> {
    pub fn new(reader: R) -> Result<Self> {
        let mut tokenizer = RowTokenizer::new(reader);
        let header = tokenizer.parse_header()?;
        Ok(Self {
            tokenizer,
            header,
            acceptor: None,
        })
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn set_acceptor<F>(&mut self, acceptor: F)
    where
        F: FnMut(AirwayRecord) + 'a,
    {
        self.acceptor = Some(Box::new(acceptor));
    }

    pub fn load_airways(&mut self) -> Result<usize> {
        let sink = self
            .acceptor
            .as_deref_mut()
            .ok_or(Error::AcceptorMissing { parser: "airway" })?;

        let mut emitted = 0;
        let mut finished = false;
        self.tokenizer.each_line(|row| {
            if finished || row.peek_word() == Some(END_OF_DATA) {
                finished = true;
                return Ok(());
            }
            sink(parse_segment(row)?);
            emitted += 1;
            Ok(())
        })?;

        debug!(emitted, "finished airway scan");
        Ok(emitted)
    }
}

fn parse_segment<R: BufRead>(row: &mut RowTokenizer<R>) -> Result<AirwayRecord> {
    let from_id = row.parse_word()?;
    let from_region = row.parse_word()?;
    let from_type = row.parse_int()?;
    let to_id = row.parse_word()?;
    let to_region = row.parse_word()?;
    let to_type = row.parse_int()?;
    let direction = parse_direction(row)?;
    let level = parse_level(row)?;
    let base_fl = row.parse_int()?;
    let top_fl = row.parse_int()?;
    let names = row
        .parse_word()?
        .split('-')
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    Ok(AirwayRecord {
        from: FixKey {
            region: from_region,
            id: from_id,
        },
        from_type,
        to: FixKey {
            region: to_region,
            id: to_id,
        },
        to_type,
        direction,
        level,
        base_fl,
        top_fl,
        names,
    })
}

fn parse_direction<R: BufRead>(row: &mut RowTokenizer<R>) -> Result<AirwayDirection> {
    let line = row.line_number();
    let code = row.parse_word()?;
    match code.as_str() {
        "N" => Ok(AirwayDirection::TwoWay),
        "F" => Ok(AirwayDirection::Forward),
        "B" => Ok(AirwayDirection::Backward),
        _ => Err(Error::MalformedToken {
            line,
            expected: TokenKind::Code,
            found: Some(code),
        }),
    }
}

fn parse_level<R: BufRead>(row: &mut RowTokenizer<R>) -> Result<AirwayLevel> {
    let line = row.line_number();
    match row.parse_int()? {
        1 => Ok(AirwayLevel::Low),
        2 => Ok(AirwayLevel::High),
        other => Err(Error::MalformedToken {
            line,
            expected: TokenKind::Code,
            found: Some(other.to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<Vec<AirwayRecord>> {
        let data = format!("I\n1100 Version - test\n{body}");
        let mut records = Vec::new();
        let mut parser = AirwayParser::new(data.as_bytes())?;
        parser.set_acceptor(|record| records.push(record));
        parser.load_airways()?;
        drop(parser);
        Ok(records)
    }

    #[test]
    fn parses_shared_segment() {
        let records = parse("ALKIA K1 11 SEA K1 3 N 1 18 180 V4-V12\n99\n").unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.from, FixKey::new("K1", "ALKIA"));
        assert_eq!(record.from_type, 11);
        assert_eq!(record.to, FixKey::new("K1", "SEA"));
        assert_eq!(record.to_type, 3);
        assert_eq!(record.direction, AirwayDirection::TwoWay);
        assert_eq!(record.level, AirwayLevel::Low);
        assert_eq!(record.base_fl, 18);
        assert_eq!(record.top_fl, 180);
        assert_eq!(record.names, vec!["V4", "V12"]);
    }

    #[test]
    fn directional_high_segment() {
        let records = parse("SEA K1 3 BANGR K1 11 F 2 180 450 J5\n").unwrap();
        assert_eq!(records[0].direction, AirwayDirection::Forward);
        assert_eq!(records[0].level, AirwayLevel::High);
    }

    #[test]
    fn rejects_unknown_direction() {
        let err = parse("SEA K1 3 BANGR K1 11 X 2 180 450 J5\n").unwrap_err();
        match err {
            Error::MalformedToken {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 3);
                assert_eq!(expected, TokenKind::Code);
                assert_eq!(found.as_deref(), Some("X"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_level() {
        let err = parse("SEA K1 3 BANGR K1 11 B 3 180 450 J5\n").unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedToken {
                expected: TokenKind::Code,
                ..
            }
        ));
    }
}
