//! Parser for `earth_nav.dat` radio navaids.
//!
//! Only NDB (`2`), VOR (`3`) and DME (`12`, `13`) rows are read. Localizers,
//! glideslopes and markers describe approach equipment rather than fixes and
//! are skipped.

use std::io::BufRead;

use tracing::debug;

use super::{Acceptor, END_OF_DATA};
use crate::error::{Error, Result};
use crate::model::{FixKind, LatLon};
use crate::tokenizer::RowTokenizer;

#[derive(Debug, Clone, PartialEq)]
pub struct NavaidRecord {
    pub kind: FixKind,
    pub id: String,
    pub region: String,
    pub position: LatLon,
    pub terminal_area: Option<String>,
    pub elevation_ft: i32,
    /// Raw frequency value: kHz for NDBs, 10 kHz units otherwise.
    pub frequency: i32,
    pub range_nm: i32,
    pub name: String,
}

fn navaid_kind(code: i32) -> Option<FixKind> {
    match code {
        2 => Some(FixKind::Ndb),
        3 => Some(FixKind::Vor),
        12 | 13 => Some(FixKind::Dme),
        _ => None,
    }
}

pub struct NavaidParser<'a, R> {
    tokenizer: RowTokenizer<R>,
    header: String,
    acceptor: Option<Acceptor<'a, NavaidRecord>>,
}

impl<'a, R: BufRead> NavaidParser<'a, R> {
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
        F: FnMut(NavaidRecord) + 'a,
    {
        self.acceptor = Some(Box::new(acceptor));
    }

    pub fn load_navaids(&mut self) -> Result<usize> {
        let sink = self
            .acceptor
            .as_deref_mut()
            .ok_or(Error::AcceptorMissing { parser: "navaid" })?;

        let mut emitted = 0;
        let mut skipped = 0;
        let mut finished = false;
        self.tokenizer.each_line(|row| {
            if finished || row.peek_word() == Some(END_OF_DATA) {
                finished = true;
                return Ok(());
            }
            match navaid_kind(row.parse_int()?) {
                Some(kind) => {
                    sink(parse_navaid(row, kind)?);
                    emitted += 1;
                }
                None => skipped += 1,
            }
            Ok(())
        })?;

        debug!(emitted, skipped, "finished navaid scan");
        Ok(emitted)
    }
}

/// `<lat> <lon> <elev> <freq> <range> <variation|bias> <id> <terminal> <region> <name...>`
fn parse_navaid<R: BufRead>(row: &mut RowTokenizer<R>, kind: FixKind) -> Result<NavaidRecord> {
    let latitude = row.parse_double()?;
    let longitude = row.parse_double()?;
    let elevation_ft = row.parse_int()?;
    let frequency = row.parse_int()?;
    let range_nm = row.parse_int()?;
    row.parse_double()?;
    let id = row.parse_word()?;
    let terminal_area = Some(row.parse_word()?).filter(|area| area != "ENRT");
    let region = row.parse_word()?;
    let name = row.rest_of_line();

    Ok(NavaidRecord {
        kind,
        id,
        region,
        position: LatLon::new(latitude, longitude),
        terminal_area,
        elevation_ft,
        frequency,
        range_nm,
        name,
    })
}
