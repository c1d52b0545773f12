//! Parser for X-Plane's `apt.dat` airport database.
//!
//! Every line starts with an integer row code. Code `1` (airport), `16`
//! (seaplane base) or `17` (heliport) opens a new airport block; runway,
//! metadata and frequency rows that follow belong to it until the next block
//! or the `99` terminator. Row codes not listed in [`AirportRow`] (taxiways,
//! signs, lighting, ...) are skipped.

use std::io::BufRead;

use tracing::{debug, trace};

use super::Acceptor;
use crate::error::{Error, Result};
use crate::model::{Frequency, LatLon, Runway, RunwayEnd};
use crate::tokenizer::RowTokenizer;

/// Airport block as read from `apt.dat`, before insertion into the World.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AirportRecord {
    pub id: String,
    pub name: String,
    pub elevation_ft: i32,
    pub icao_code: Option<String>,
    pub datum_latitude: Option<f64>,
    pub datum_longitude: Option<f64>,
    pub country: Option<String>,
    pub region_code: Option<String>,
    pub runways: Vec<Runway>,
    pub frequencies: Vec<Frequency>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AirportRow {
    Start,
    Runway,
    Metadata,
    Frequency(i32),
    EndOfData,
    Ignored,
}

impl AirportRow {
    fn from_code(code: i32) -> Self {
        match code {
            1 | 16 | 17 => AirportRow::Start,
            100 => AirportRow::Runway,
            1302 => AirportRow::Metadata,
            50..=56 | 1050..=1056 => AirportRow::Frequency(code),
            99 => AirportRow::EndOfData,
            _ => AirportRow::Ignored,
        }
    }
}

/// Streaming `apt.dat` parser.
///
/// ```
/// use xnav_lib::parsers::AirportParser;
///
/// let data = "I\n1100 Version\n1 433 0 0 KSEA Seattle-Tacoma Intl\n99\n";
/// let mut ids = Vec::new();
/// let mut parser = AirportParser::new(data.as_bytes())?;
/// parser.set_acceptor(|airport| ids.push(airport.id));
/// parser.load_airports()?;
/// drop(parser);
/// assert_eq!(ids, vec!["KSEA"]);
/// # Ok::<(), xnav_lib::Error>(())
/// ```
pub struct AirportParser<'a, R> {
    tokenizer: RowTokenizer<R>,
    header: String,
    acceptor: Option<Acceptor<'a, AirportRecord>>,
}

impl<'a, R: BufRead> AirportParser<'a, R> {
    /// Create a parser and read the file header.
    pub fn new(reader: R) -> Result<Self> {
        let mut tokenizer = RowTokenizer::new(reader);
        let header = tokenizer.parse_header()?;
        Ok(Self {
            tokenizer,
            header,
            acceptor: None,
        })
    }

    /// Header line identifying the format version.
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn set_acceptor<F>(&mut self, acceptor: F)
    where
        F: FnMut(AirportRecord) + 'a,
    {
        self.acceptor = Some(Box::new(acceptor));
    }

    /// Scan the rest of the file, emitting every completed airport.
    ///
    /// Returns the number of airports emitted. A malformed token aborts the
    /// scan; airports emitted before the failure have already been handed to
    /// the acceptor.
    pub fn load_airports(&mut self) -> Result<usize> {
        let sink = self
            .acceptor
            .as_deref_mut()
            .ok_or(Error::AcceptorMissing { parser: "airport" })?;

        let mut state = AirportState::default();
        self.tokenizer
            .each_line(|row| state.parse_line(row, sink))?;
        state.finish_airport(sink);

        debug!(
            emitted = state.emitted,
            discarded = state.discarded,
            "finished airport scan"
        );
        Ok(state.emitted)
    }
}

#[derive(Default)]
struct AirportState {
    current: AirportRecord,
    started: bool,
    finished: bool,
    emitted: usize,
    discarded: usize,
}

impl AirportState {
    fn parse_line<R: BufRead>(
        &mut self,
        row: &mut RowTokenizer<R>,
        sink: &mut dyn FnMut(AirportRecord),
    ) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        match AirportRow::from_code(row.parse_int()?) {
            AirportRow::Start => {
                self.finish_airport(sink);
                self.start_airport(row)?;
            }
            AirportRow::Runway => self.parse_runway(row)?,
            AirportRow::Metadata => self.parse_metadata(row)?,
            AirportRow::Frequency(code) => self.parse_frequency(row, code)?,
            AirportRow::EndOfData => {
                self.finish_airport(sink);
                self.finished = true;
            }
            AirportRow::Ignored => {}
        }
        Ok(())
    }

    /// `1 <elevation> <deprecated> <deprecated> <id> <name...>`
    fn start_airport<R: BufRead>(&mut self, row: &mut RowTokenizer<R>) -> Result<()> {
        self.started = true;
        self.current.elevation_ft = row.parse_int()?;
        row.parse_int()?;
        row.parse_int()?;
        self.current.id = row.next_word().unwrap_or_default();
        self.current.name = row.rest_of_line();
        Ok(())
    }

    fn parse_runway<R: BufRead>(&mut self, row: &mut RowTokenizer<R>) -> Result<()> {
        let width = row.parse_double()?;
        let surface_type = row.parse_int()?;
        row.parse_int()?; // shoulder
        row.parse_double()?; // smoothness
        row.parse_int()?; // centre lights
        row.parse_int()?; // edge lights
        row.parse_int()?; // autogen distance signs

        let mut ends = Vec::with_capacity(2);
        while let Some(name) = row.next_word() {
            ends.push(parse_runway_end(row, name)?);
        }

        self.current.runways.push(Runway {
            width,
            surface_type,
            ends,
        });
        Ok(())
    }

    /// `1302 <key> <value>`; X-Plane writes some keys with an empty value,
    /// which leaves the field unset.
    fn parse_metadata<R: BufRead>(&mut self, row: &mut RowTokenizer<R>) -> Result<()> {
        let key = row.parse_word()?;
        let has_value = row.peek_word().is_some();

        match key.as_str() {
            "country" if has_value => self.current.country = Some(row.rest_of_line()),
            "region_code" if has_value => self.current.region_code = Some(row.rest_of_line()),
            "datum_lat" if has_value => self.current.datum_latitude = Some(row.parse_double()?),
            "datum_lon" if has_value => self.current.datum_longitude = Some(row.parse_double()?),
            "icao_code" if has_value => self.current.icao_code = Some(row.parse_word()?),
            _ => {}
        }
        Ok(())
    }

    fn parse_frequency<R: BufRead>(&mut self, row: &mut RowTokenizer<R>, code: i32) -> Result<()> {
        let value = row.parse_int()?;
        let description = row.rest_of_line();
        self.current.frequencies.push(Frequency {
            code,
            value,
            description,
        });
        Ok(())
    }

    fn finish_airport(&mut self, sink: &mut dyn FnMut(AirportRecord)) {
        let record = std::mem::take(&mut self.current);
        let started = std::mem::take(&mut self.started);

        if !record.id.is_empty() {
            self.emitted += 1;
            sink(record);
        } else if started {
            self.discarded += 1;
            trace!(name = %record.name, "discarding airport without identifier");
        }
    }
}

/// `<name> <lat> <lon> <displaced> <overrun> <markings> <approach lights> <TDZ> <REIL>`
fn parse_runway_end<R: BufRead>(row: &mut RowTokenizer<R>, name: String) -> Result<RunwayEnd> {
    let latitude = row.parse_double()?;
    let longitude = row.parse_double()?;
    let displace = row.parse_double()?;
    row.parse_double()?; // overrun
    row.parse_int()?; // markings
    row.parse_int()?; // approach lights
    row.parse_int()?; // touchdown zone lights
    row.parse_int()?; // REIL

    Ok(RunwayEnd {
        name,
        position: LatLon::new(latitude, longitude),
        displace,
    })
}
