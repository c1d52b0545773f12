//! Wiring between the file parsers and the [`World`].
//!
//! Each parser pushes records into an acceptor; the loader supplies acceptors
//! that turn records into World entities. [`load_world`] drives a full ingest
//! from a [`NavDataSources`] description and either returns a complete World
//! or an error naming the file that failed.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{AirwaySegment, Fix, FixKind};
use crate::parsers::{
    AirportParser, AirportRecord, AirwayParser, AirwayRecord, FixParser, FixRecord, NavaidParser,
    NavaidRecord, ProcedureParser,
};
use crate::sources::NavDataSources;
use crate::world::World;

const AIRPORT_VERSIONS: &[u32] = &[850, 1000, 1050, 1100, 1130, 1200];
const FIX_VERSIONS: &[u32] = &[1100, 1101, 1200];
const NAVAID_VERSIONS: &[u32] = &[1100, 1150, 1200];
const AIRWAY_VERSIONS: &[u32] = &[1100];

/// Extension of per-airport procedure files.
const PROCEDURE_EXTENSION: &str = "dat";

/// Parse the format version at the start of a header line.
///
/// ```
/// use xnav_lib::loader::check_header;
///
/// assert_eq!(check_header("1100 Version - data cycle 1802").unwrap(), 1100);
/// assert!(check_header("Generated by hand").is_err());
/// ```
pub fn check_header(header: &str) -> Result<u32> {
    header
        .split_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| Error::UnsupportedHeader {
            header: header.to_string(),
        })
}

fn check_version(family: &str, header: &str, known: &[u32]) -> Result<u32> {
    let version = check_header(header)?;
    if !known.contains(&version) {
        warn!(family, version, "unrecognised data format version; parsing anyway");
    }
    Ok(version)
}

/// Populates a [`World`] from individual data files.
pub struct WorldLoader<'w> {
    world: &'w mut World,
    unresolved_endpoints: usize,
}

impl<'w> WorldLoader<'w> {
    pub fn new(world: &'w mut World) -> Self {
        Self {
            world,
            unresolved_endpoints: 0,
        }
    }

    /// Airway endpoints seen so far that did not match a loaded fix.
    pub fn unresolved_endpoints(&self) -> usize {
        self.unresolved_endpoints
    }

    /// Load an `apt.dat` file. Airports already present are overwritten
    /// attribute by attribute.
    pub fn load_airports<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let mut parser = AirportParser::new(reader)?;
        let version = check_version("airport", parser.header(), AIRPORT_VERSIONS)?;

        let world = &mut *self.world;
        parser.set_acceptor(|record| insert_airport(world, record));
        let count = parser.load_airports()?;

        debug!(version, airports = count, "loaded airports");
        Ok(count)
    }

    pub fn load_fixes<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let mut parser = FixParser::new(reader)?;
        let version = check_version("fix", parser.header(), FIX_VERSIONS)?;

        let world = &mut *self.world;
        parser.set_acceptor(|record| insert_fix(world, record));
        let count = parser.load_fixes()?;

        debug!(version, fixes = count, "loaded fixes");
        Ok(count)
    }

    /// Load `earth_nav.dat`. VORs and NDBs become fixes; a DME co-located
    /// with one of them only marks it as DME-equipped.
    pub fn load_navaids<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let mut merged = 0;
        let mut parser = NavaidParser::new(reader)?;
        let version = check_version("navaid", parser.header(), NAVAID_VERSIONS)?;

        let world = &mut *self.world;
        parser.set_acceptor(|record| {
            if insert_navaid(world, record) {
                merged += 1;
            }
        });
        let count = parser.load_navaids()?;
        drop(parser);

        debug!(version, navaids = count, merged_dme = merged, "loaded navaids");
        Ok(count)
    }

    /// Load `earth_awy.dat`. Must run after fixes and navaids so segment
    /// endpoints can be checked.
    pub fn load_airways<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let mut unresolved = 0;
        let mut parser = AirwayParser::new(reader)?;
        let version = check_version("airway", parser.header(), AIRWAY_VERSIONS)?;

        let world = &mut *self.world;
        parser.set_acceptor(|record| unresolved += insert_airway_segment(world, record));
        let count = parser.load_airways()?;
        drop(parser);

        if unresolved > 0 {
            warn!(
                unresolved,
                "airway segments reference fixes missing from the fix and navaid data"
            );
        }
        self.unresolved_endpoints += unresolved;

        debug!(version, segments = count, "loaded airways");
        Ok(count)
    }

    /// Load one CIFP file whose procedures belong to `airport_id`.
    pub fn load_procedures<R: BufRead>(&mut self, airport_id: &str, reader: R) -> Result<usize> {
        let mut orphaned = 0;
        let mut parser = ProcedureParser::new(reader, airport_id);

        let world = &mut *self.world;
        parser.set_acceptor(|record| {
            if !world.attach_procedure(&record.airport, record.procedure) {
                orphaned += 1;
            }
        });
        let count = parser.load_procedures()?;
        drop(parser);

        if orphaned > 0 {
            warn!(
                airport = airport_id,
                orphaned, "skipping procedures for unknown airport"
            );
        }
        Ok(count - orphaned)
    }

    /// Load every `*.dat` file under a CIFP directory, in file name order.
    pub fn load_procedure_dir(&mut self, dir: &Path) -> Result<usize> {
        let mut total = 0;
        for path in procedure_files(dir)? {
            let Some(airport_id) = path.file_stem().and_then(OsStr::to_str) else {
                continue;
            };
            let airport_id = airport_id.to_string();
            total += load_file(&path, |reader| self.load_procedures(&airport_id, reader))?;
        }
        debug!(dir = %dir.display(), procedures = total, "loaded procedures");
        Ok(total)
    }
}

fn insert_airport(world: &mut World, record: AirportRecord) {
    let AirportRecord {
        id,
        name,
        elevation_ft,
        icao_code,
        datum_latitude,
        datum_longitude,
        country,
        region_code,
        runways,
        frequencies,
    } = record;

    if let Some(region) = &region_code {
        world.create_or_find_region(region);
    }

    let airport = world.create_or_find_airport(&id);
    airport.name = name;
    airport.elevation_ft = elevation_ft;
    airport.icao_code = icao_code;
    airport.datum_latitude = datum_latitude;
    airport.datum_longitude = datum_longitude;
    airport.country = country;
    airport.region = region_code;
    airport.runways = runways;
    airport.frequencies = frequencies;
}

fn insert_fix(world: &mut World, record: FixRecord) {
    world.create_or_find_region(&record.region);
    world.add_fix(Fix {
        id: record.id,
        region: record.region,
        kind: FixKind::Waypoint,
        position: record.position,
        terminal_area: record.terminal_area,
        frequency: None,
        name: None,
        description_code: record.description_code,
        has_dme: false,
    });
}

/// Returns `true` when the record was merged into an existing navaid.
fn insert_navaid(world: &mut World, record: NavaidRecord) -> bool {
    if record.kind == FixKind::Dme {
        if let Some(navaid) = world.find_navaid_mut(&record.region, &record.id) {
            navaid.has_dme = true;
            return true;
        }
    }

    world.create_or_find_region(&record.region);
    world.add_fix(Fix {
        id: record.id,
        region: record.region,
        kind: record.kind,
        position: record.position,
        terminal_area: record.terminal_area,
        frequency: Some(record.frequency),
        name: Some(record.name).filter(|name| !name.is_empty()),
        description_code: None,
        has_dme: record.kind == FixKind::Dme,
    });
    false
}

/// Returns the number of segment endpoints that did not resolve to a fix.
fn insert_airway_segment(world: &mut World, record: AirwayRecord) -> usize {
    let unresolved = [&record.from, &record.to]
        .into_iter()
        .filter(|key| {
            world
                .find_fix_by_region_and_id(&key.region, &key.id)
                .is_none()
        })
        .inspect(|key| debug!(fix = %key, "unresolved airway endpoint"))
        .count();

    let segment = AirwaySegment {
        from: record.from,
        to: record.to,
        direction: record.direction,
        base_fl: record.base_fl,
        top_fl: record.top_fl,
    };
    for name in &record.names {
        world
            .create_or_find_airway(name, record.level)
            .segments
            .push(segment.clone());
    }
    unresolved
}

fn procedure_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|err| Error::from(err).in_file(dir))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.extension()
                .and_then(OsStr::to_str)
                .is_some_and(|ext| ext.eq_ignore_ascii_case(PROCEDURE_EXTENSION))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn load_file<F>(path: &Path, load: F) -> Result<usize>
where
    F: FnOnce(BufReader<File>) -> Result<usize>,
{
    let file = File::open(path).map_err(|err| Error::from(err).in_file(path))?;
    load(BufReader::new(file)).map_err(|err| err.in_file(path))
}

/// Build a complete [`World`] from the configured sources.
///
/// Files are loaded in dependency order: fixes, navaids, airports, airways,
/// then procedures. Later airport files override earlier ones. The first
/// failure aborts the load and is wrapped in [`Error::NavDataFile`].
pub fn load_world(sources: &NavDataSources) -> Result<World> {
    let mut world = World::new();
    let mut loader = WorldLoader::new(&mut world);

    if let Some(path) = &sources.fixes {
        load_file(path, |reader| loader.load_fixes(reader))?;
    }
    if let Some(path) = &sources.navaids {
        load_file(path, |reader| loader.load_navaids(reader))?;
    }
    for path in &sources.airports {
        load_file(path, |reader| loader.load_airports(reader))?;
    }
    if let Some(path) = &sources.airways {
        load_file(path, |reader| loader.load_airways(reader))?;
    }
    if let Some(dir) = &sources.procedures {
        loader.load_procedure_dir(dir)?;
    }
    let unresolved_endpoints = loader.unresolved_endpoints();

    let summary = world.summary();
    info!(
        regions = summary.regions,
        airports = summary.airports,
        fixes = summary.fixes,
        airways = summary.airways,
        procedures = summary.procedures,
        unresolved_endpoints,
        "loaded navigation data"
    );
    Ok(world)
}
