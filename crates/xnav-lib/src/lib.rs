//! X-Plane navigation data library entry points.
//!
//! This crate reads X-Plane's plain-text navigation databases (airports,
//! fixes, navaids, airways and CIFP procedures), streams every file through a
//! line tokenizer into per-format parsers, and assembles the records into a
//! queryable [`World`]. Higher-level consumers (the CLI) should only depend on
//! the functions exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod error;
pub mod index;
pub mod loader;
pub mod model;
pub mod parsers;
pub mod sources;
pub mod spatial;
pub mod tokenizer;
pub mod world;

pub use error::{Error, Result, TokenKind};
pub use loader::{check_header, load_world, WorldLoader};
pub use model::{
    Airport, Airway, AirwayDirection, AirwayLevel, AirwaySegment, Fix, FixKey, FixKind, Frequency,
    FrequencyKind, LatLon, Procedure, ProcedureKind, ProcedureLeg, Region, Runway, RunwayEnd,
    Transition,
};
pub use sources::{resolve_xplane_root, NavDataSources, XPLANE_ROOT_ENV};
pub use spatial::AirportIndex;
pub use tokenizer::RowTokenizer;
pub use world::{SharedWorld, World, WorldSummary, KM_TO_NM};
