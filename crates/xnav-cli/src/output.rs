//! Rendering of query results as plain text or JSON.

use clap::ValueEnum;
use serde::Serialize;

use xnav_lib::{Airport, Airway, AirwayDirection, Fix, WorldSummary};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Airport as listed by `search` and `nearest`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportEntry {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icao_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_nm: Option<f64>,
}

impl AirportEntry {
    pub fn from_airport(airport: &Airport, distance_nm: Option<f64>) -> Self {
        Self {
            id: airport.id.clone(),
            name: airport.name.clone(),
            icao_code: airport.icao_code.clone(),
            distance_nm,
        }
    }
}

/// Format an integer with thousands separators.
pub fn format_with_separators(n: u64) -> String {
    if n < 1000 {
        return n.to_string();
    }
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

pub fn format_summary_text(summary: &WorldSummary) -> String {
    let rows = [
        ("Regions", summary.regions),
        ("Airports", summary.airports),
        ("Fixes", summary.fixes),
        ("Airways", summary.airways),
        ("Procedures", summary.procedures),
    ];
    rows.iter()
        .map(|(label, count)| {
            format!(
                "{:<11} {}",
                format!("{label}:"),
                format_with_separators(*count as u64)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_airport_text(airport: &Airport) -> String {
    let mut lines = vec![format!("{}  {}", airport.id, airport.name)];

    let mut details = Vec::new();
    if let Some(icao) = &airport.icao_code {
        details.push(format!("ICAO: {icao}"));
    }
    if let Some(region) = &airport.region {
        details.push(format!("Region: {region}"));
    }
    if let Some(country) = &airport.country {
        details.push(format!("Country: {country}"));
    }
    if !details.is_empty() {
        lines.push(format!("  {}", details.join("   ")));
    }
    lines.push(format!("  Elevation: {} ft", airport.elevation_ft));
    if let Some(point) = airport.reference_point() {
        lines.push(format!(
            "  Reference point: {:.5}, {:.5}",
            point.latitude, point.longitude
        ));
    }

    if !airport.runways.is_empty() {
        lines.push("Runways:".to_string());
        for runway in &airport.runways {
            let names: Vec<&str> = runway.ends.iter().map(|end| end.name.as_str()).collect();
            lines.push(format!(
                "  {:<8} width {:.1} m",
                names.join("/"),
                runway.width
            ));
        }
    }

    if !airport.frequencies.is_empty() {
        lines.push("Frequencies:".to_string());
        for frequency in &airport.frequencies {
            let kind = frequency
                .kind()
                .map(|kind| kind.to_string())
                .unwrap_or_default();
            lines.push(format!(
                "  {:<7} {:.3}  {}",
                kind,
                frequency.mhz(),
                frequency.description
            ));
        }
    }

    if !airport.procedures.is_empty() {
        lines.push("Procedures:".to_string());
        for procedure in &airport.procedures {
            lines.push(format!(
                "  {:<6} {} ({} transitions)",
                procedure.kind.to_string(),
                procedure.ident,
                procedure.transitions.len()
            ));
        }
    }

    lines.join("\n")
}

pub fn format_fixes_text(fixes: &[&Fix]) -> String {
    fixes
        .iter()
        .map(|fix| {
            let mut line = format!(
                "{:<6} {:<3} {:<8} {:>10.5} {:>11.5}",
                fix.id,
                fix.region,
                fix.kind.to_string(),
                fix.position.latitude,
                fix.position.longitude
            );
            if fix.has_dme && fix.kind != xnav_lib::FixKind::Dme {
                line.push_str("  DME");
            }
            if let Some(area) = &fix.terminal_area {
                line.push_str(&format!("  terminal {area}"));
            }
            if let Some(name) = &fix.name {
                line.push_str(&format!("  {name}"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_airways_text(airways: &[Airway]) -> String {
    let mut lines = Vec::new();
    for airway in airways {
        lines.push(format!(
            "{} ({}, {} segments)",
            airway.name,
            airway.level,
            airway.segments.len()
        ));
        for segment in &airway.segments {
            let arrow = match segment.direction {
                AirwayDirection::TwoWay => "<->",
                AirwayDirection::Forward => "->",
                AirwayDirection::Backward => "<-",
            };
            lines.push(format!(
                "  {} {} {}  FL{:03}-FL{:03}",
                segment.from, arrow, segment.to, segment.base_fl, segment.top_fl
            ));
        }
    }
    lines.join("\n")
}

pub fn format_airport_entries_text(entries: &[AirportEntry]) -> String {
    entries
        .iter()
        .map(|entry| match entry.distance_nm {
            Some(distance) => format!("{:<6} {:>8.1} nm  {}", entry.id, distance, entry.name),
            None => format!("{:<6} {}", entry.id, entry.name),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
