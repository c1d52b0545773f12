//! Parser for `earth_fix.dat` waypoint files.
//!
//! `<lat> <lon> <id> <terminal area|ENRT> <region> [<description code>]`

use std::io::BufRead;

use tracing::debug;

use super::{Acceptor, END_OF_DATA};
use crate::error::{Error, Result};
use crate::model::LatLon;
use crate::tokenizer::RowTokenizer;

/// Terminal-area token marking an en-route fix.
const EN_ROUTE: &str = "ENRT";

#[derive(Debug, Clone, PartialEq)]
pub struct FixRecord {
    pub id: String,
    pub region: String,
    pub position: LatLon,
    pub terminal_area: Option<String>,
    pub description_code: Option<i32>,
}

pub struct FixParser<'a, R> {
    tokenizer: RowTokenizer<R>,
    header: String,
    acceptor: Option<Acceptor<'a, FixRecord>>,
}

impl<'a, R: BufRead> FixParser<'a, R> {
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
        F: FnMut(FixRecord) + 'a,
    {
        self.acceptor = Some(Box::new(acceptor));
    }

    /// Emit every fix up to the `99` terminator. Returns the number emitted.
    pub fn load_fixes(&mut self) -> Result<usize> {
        let sink = self
            .acceptor
            .as_deref_mut()
            .ok_or(Error::AcceptorMissing { parser: "fix" })?;

        let mut emitted = 0;
        let mut finished = false;
        self.tokenizer.each_line(|row| {
            if finished || row.peek_word() == Some(END_OF_DATA) {
                finished = true;
                return Ok(());
            }
            sink(parse_fix(row)?);
            emitted += 1;
            Ok(())
        })?;

        debug!(emitted, "finished fix scan");
        Ok(emitted)
    }
}

fn parse_fix<R: BufRead>(row: &mut RowTokenizer<R>) -> Result<FixRecord> {
    let latitude = row.parse_double()?;
    let longitude = row.parse_double()?;
    let id = row.parse_word()?;
    let terminal_area = Some(row.parse_word()?).filter(|area| area != EN_ROUTE);
    let region = row.parse_word()?;
    let description_code = match row.peek_word() {
        Some(_) => Some(row.parse_int()?),
        None => None,
    };

    Ok(FixRecord {
        id,
        region,
        position: LatLon::new(latitude, longitude),
        terminal_area,
        description_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<Vec<FixRecord>> {
        let data = format!("I\n1101 Version - test\n\n{body}");
        let mut records = Vec::new();
        let mut parser = FixParser::new(data.as_bytes())?;
        parser.set_acceptor(|record| records.push(record));
        parser.load_fixes()?;
        drop(parser);
        Ok(records)
    }

    #[test]
    fn parses_enroute_and_terminal_fixes() {
        let records = parse(
            " 47.352800000 -122.127194444  ALKIA ENRT K1 4530263\n\
             47.392500000 -122.311944444  SUMMA KSEA K1 4194371\n\
             99\n",
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "ALKIA");
        assert_eq!(records[0].region, "K1");
        assert_eq!(records[0].terminal_area, None);
        assert_eq!(records[0].description_code, Some(4530263));
        assert_eq!(records[0].position, LatLon::new(47.3528, -122.127194444));
        assert_eq!(records[1].terminal_area.as_deref(), Some("KSEA"));
    }

    #[test]
    fn description_code_is_optional() {
        let records = parse("43.5 1.3 FISTO ENRT LF\n").unwrap();
        assert_eq!(records[0].description_code, None);
    }

    #[test]
    fn stops_at_terminator() {
        let records = parse("47.0 -122.0 ABCDE ENRT K1\n99\n48.0 -123.0 IGNRD ENRT K1\n").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn malformed_latitude_is_fatal() {
        let err = parse("north -122.0 ABCDE ENRT K1\n").unwrap_err();
        assert!(matches!(err, Error::MalformedToken { line: 4, .. }));
    }
}
