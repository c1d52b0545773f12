//! Per-file-family parsers.
//!
//! Every parser owns a [`RowTokenizer`](crate::tokenizer::RowTokenizer),
//! dispatches each line on its row code and pushes completed records, in file
//! order, into the acceptor registered with `set_acceptor`. Parsers never
//! touch the [`World`](crate::World); the [`loader`](crate::loader) wires
//! acceptors to World insertion.

pub mod airport;
pub mod airway;
pub mod fix;
pub mod navaid;
pub mod procedure;

pub use airport::{AirportParser, AirportRecord};
pub use airway::{AirwayParser, AirwayRecord};
pub use fix::{FixParser, FixRecord};
pub use navaid::{NavaidParser, NavaidRecord};
pub use procedure::{ProcedureParser, ProcedureRecord};

/// Sink receiving one completed record per call.
pub type Acceptor<'a, T> = Box<dyn FnMut(T) + 'a>;

/// Row code terminating the data section of X-Plane files.
pub(crate) const END_OF_DATA: &str = "99";
