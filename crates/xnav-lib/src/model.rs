//! Entities stored in the [`World`](crate::World).

use std::fmt;

use serde::Serialize;

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLon {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// ICAO region, e.g. `K1` or `LF`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    pub id: String,
}

/// An airport, heliport or seaplane base.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Airport {
    pub id: String,
    pub name: String,
    pub icao_code: Option<String>,
    /// Elevation in feet.
    pub elevation_ft: i32,
    pub datum_latitude: Option<f64>,
    pub datum_longitude: Option<f64>,
    pub country: Option<String>,
    /// Code of the [`Region`] the airport belongs to.
    pub region: Option<String>,
    pub runways: Vec<Runway>,
    pub frequencies: Vec<Frequency>,
    pub procedures: Vec<Procedure>,
}

impl Airport {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    /// Airport reference point.
    ///
    /// Uses the datum coordinates when both are present and falls back to the
    /// first runway end otherwise.
    pub fn reference_point(&self) -> Option<LatLon> {
        if let (Some(latitude), Some(longitude)) = (self.datum_latitude, self.datum_longitude) {
            return Some(LatLon::new(latitude, longitude));
        }

        self.runways
            .iter()
            .flat_map(|runway| runway.ends.first())
            .map(|end| end.position)
            .next()
    }

    /// Procedures of a given kind, in the order they were attached.
    pub fn procedures_of(&self, kind: ProcedureKind) -> impl Iterator<Item = &Procedure> {
        self.procedures.iter().filter(move |p| p.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Runway {
    /// Width in metres.
    pub width: f64,
    pub surface_type: i32,
    pub ends: Vec<RunwayEnd>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunwayEnd {
    pub name: String,
    pub position: LatLon,
    /// Displaced threshold length in metres.
    pub displace: f64,
}

/// Usage category of an airport frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FrequencyKind {
    Recorded,
    Unicom,
    Clearance,
    Ground,
    Tower,
    Approach,
    Departure,
}

impl fmt::Display for FrequencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            FrequencyKind::Recorded => "ATIS",
            FrequencyKind::Unicom => "UNICOM",
            FrequencyKind::Clearance => "CLD",
            FrequencyKind::Ground => "GND",
            FrequencyKind::Tower => "TWR",
            FrequencyKind::Approach => "APP",
            FrequencyKind::Departure => "DEP",
        };
        f.write_str(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frequency {
    /// Row code the frequency was declared with (50-56 or 1050-1056).
    pub code: i32,
    /// Raw value as stored in the file.
    pub value: i32,
    pub description: String,
}

impl Frequency {
    pub fn kind(&self) -> Option<FrequencyKind> {
        let kind = match self.code % 1000 {
            50 => FrequencyKind::Recorded,
            51 => FrequencyKind::Unicom,
            52 => FrequencyKind::Clearance,
            53 => FrequencyKind::Ground,
            54 => FrequencyKind::Tower,
            55 => FrequencyKind::Approach,
            56 => FrequencyKind::Departure,
            _ => return None,
        };
        Some(kind)
    }

    /// Frequency in MHz. Legacy rows store 10 kHz units, 8.33 kHz rows store kHz.
    pub fn mhz(&self) -> f64 {
        if self.code >= 1000 {
            f64::from(self.value) / 1000.0
        } else {
            f64::from(self.value) / 100.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FixKind {
    Waypoint,
    Ndb,
    Vor,
    Dme,
}

impl fmt::Display for FixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            FixKind::Waypoint => "waypoint",
            FixKind::Ndb => "NDB",
            FixKind::Vor => "VOR",
            FixKind::Dme => "DME",
        };
        f.write_str(value)
    }
}

/// Reference to a fix by region and identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FixKey {
    pub region: String,
    pub id: String,
}

impl FixKey {
    pub fn new(region: &str, id: &str) -> Self {
        Self {
            region: region.to_string(),
            id: id.to_string(),
        }
    }
}

impl fmt::Display for FixKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.region, self.id)
    }
}

/// Navigational point: waypoint or radio navaid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fix {
    pub id: String,
    pub region: String,
    pub kind: FixKind,
    pub position: LatLon,
    /// Airport the fix belongs to, `None` for en-route fixes.
    pub terminal_area: Option<String>,
    pub frequency: Option<i32>,
    pub name: Option<String>,
    /// ARINC 424 waypoint description code.
    pub description_code: Option<i32>,
    pub has_dme: bool,
}

impl Fix {
    pub fn key(&self) -> FixKey {
        FixKey::new(&self.region, &self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AirwayLevel {
    Low,
    High,
}

impl fmt::Display for AirwayLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            AirwayLevel::Low => "low",
            AirwayLevel::High => "high",
        };
        f.write_str(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AirwayDirection {
    TwoWay,
    Forward,
    Backward,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AirwaySegment {
    pub from: FixKey,
    pub to: FixKey,
    pub direction: AirwayDirection,
    pub base_fl: i32,
    pub top_fl: i32,
}

/// Airway, unique per (name, level).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Airway {
    pub name: String,
    pub level: AirwayLevel,
    pub segments: Vec<AirwaySegment>,
}

impl Airway {
    pub fn new(name: &str, level: AirwayLevel) -> Self {
        Self {
            name: name.to_string(),
            level,
            segments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProcedureKind {
    Sid,
    Star,
    Approach,
}

impl fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            ProcedureKind::Sid => "SID",
            ProcedureKind::Star => "STAR",
            ProcedureKind::Approach => "APPCH",
        };
        f.write_str(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcedureLeg {
    pub fix: Option<FixKey>,
    /// ARINC 424 path terminator, e.g. `TF` or `VA`.
    pub path_terminator: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Empty for the common route.
    pub name: String,
    pub route_type: String,
    pub legs: Vec<ProcedureLeg>,
}

/// SID, STAR or approach attached to an airport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Procedure {
    pub kind: ProcedureKind,
    pub ident: String,
    pub transitions: Vec<Transition>,
}

impl Procedure {
    pub fn transition(&self, name: &str) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runway_end(name: &str, latitude: f64, longitude: f64) -> RunwayEnd {
        RunwayEnd {
            name: name.to_string(),
            position: LatLon::new(latitude, longitude),
            displace: 0.0,
        }
    }

    #[test]
    fn reference_point_prefers_datum() {
        let mut airport = Airport::new("TEST");
        airport.runways.push(Runway {
            width: 45.0,
            surface_type: 1,
            ends: vec![runway_end("09", 10.0, 20.0)],
        });
        assert_eq!(airport.reference_point(), Some(LatLon::new(10.0, 20.0)));

        airport.datum_latitude = Some(11.0);
        assert_eq!(
            airport.reference_point(),
            Some(LatLon::new(10.0, 20.0)),
            "half a datum is not a datum"
        );

        airport.datum_longitude = Some(21.0);
        assert_eq!(airport.reference_point(), Some(LatLon::new(11.0, 21.0)));
    }

    #[test]
    fn airport_without_position_has_no_reference_point() {
        assert_eq!(Airport::new("NONE").reference_point(), None);
    }

    #[test]
    fn frequency_units_follow_row_code() {
        let legacy = Frequency {
            code: 53,
            value: 12190,
            description: "GND".to_string(),
        };
        assert_eq!(legacy.kind(), Some(FrequencyKind::Ground));
        assert!((legacy.mhz() - 121.9).abs() < 1e-9);

        let modern = Frequency {
            code: 1054,
            value: 118305,
            description: "TWR".to_string(),
        };
        assert_eq!(modern.kind(), Some(FrequencyKind::Tower));
        assert!((modern.mhz() - 118.305).abs() < 1e-9);

        let unknown = Frequency {
            code: 57,
            value: 0,
            description: String::new(),
        };
        assert_eq!(unknown.kind(), None);
    }
}
