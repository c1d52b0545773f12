//! Airport lookup, search and nearest-airport handlers.

use anyhow::{bail, Result};

use xnav_cli::output::{
    format_airport_entries_text, format_airport_text, AirportEntry, OutputFormat,
};
use xnav_lib::{AirportIndex, LatLon, World};

use super::emit;

/// Handle the `airport` subcommand. Unknown identifiers fail with close
/// matches suggested.
pub fn handle_airport(world: &World, id: &str, format: OutputFormat) -> Result<()> {
    let airport = world.resolve_airport(&id.to_uppercase())?;
    emit(format, airport, || format_airport_text(airport))
}

pub fn handle_search(world: &World, query: &str, limit: usize, format: OutputFormat) -> Result<()> {
    let entries: Vec<AirportEntry> = world
        .search_airports(query, limit)
        .into_iter()
        .map(|airport| AirportEntry::from_airport(airport, None))
        .collect();

    if entries.is_empty() && format == OutputFormat::Text {
        println!("No airports match '{query}'.");
        return Ok(());
    }
    emit(format, &entries, || format_airport_entries_text(&entries))
}

pub fn handle_nearest(
    world: &World,
    latitude: f64,
    longitude: f64,
    count: usize,
    format: OutputFormat,
) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        bail!("position {latitude}, {longitude} is outside valid latitude/longitude ranges");
    }

    let index = AirportIndex::build(world);
    let entries: Vec<AirportEntry> = index
        .nearest(LatLon::new(latitude, longitude), count)
        .into_iter()
        .filter_map(|(id, distance)| {
            world
                .find_airport_by_id(id)
                .map(|airport| AirportEntry::from_airport(airport, Some(distance)))
        })
        .collect();

    emit(format, &entries, || format_airport_entries_text(&entries))
}
