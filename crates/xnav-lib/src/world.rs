//! Central registry of navigation entities.
//!
//! A [`World`] is built by a single writer (the [`loader`](crate::loader))
//! and then published read-only, usually through a [`SharedWorld`] which
//! swaps in a freshly built World on reload. Nothing is ever removed
//! individually; a reload discards the whole World.

use std::cmp::Ordering;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::index::{MultiIndex, UniqueIndex};
use crate::model::{Airport, Airway, AirwayLevel, Fix, FixKind, Procedure, Region};

/// Conversion factor from kilometres to nautical miles.
pub const KM_TO_NM: f64 = 0.539957;

/// Minimum Jaro-Winkler similarity for a fuzzy airport suggestion.
const FUZZY_THRESHOLD: f64 = 0.8;

/// Entity counts of a World.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorldSummary {
    pub regions: usize,
    pub airports: usize,
    pub fixes: usize,
    pub airways: usize,
    pub procedures: usize,
}

/// Deduplicated, indexed navigation data.
#[derive(Debug, Clone, Default)]
pub struct World {
    regions: UniqueIndex<Region>,
    airports: UniqueIndex<Airport>,
    // Unique only within a region
    fixes: MultiIndex<Fix>,
    // Unique only within a level
    airways: MultiIndex<Airway>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_or_find_region(&mut self, id: &str) -> &mut Region {
        self.regions.get_or_insert_with(id, || Region { id: id.to_string() })
    }

    pub fn create_or_find_airport(&mut self, id: &str) -> &mut Airport {
        self.airports.get_or_insert_with(id, || Airport::new(id))
    }

    /// Airway for (`name`, `level`); the same name on another level is a
    /// different airway.
    pub fn create_or_find_airway(&mut self, name: &str, level: AirwayLevel) -> &mut Airway {
        self.airways.find_or_insert_with(
            name,
            |airway| airway.level == level,
            || Airway::new(name, level),
        )
    }

    /// Insert a fix without deduplication.
    pub fn add_fix(&mut self, fix: Fix) {
        let id = fix.id.clone();
        self.fixes.insert(&id, fix);
    }

    pub fn find_region(&self, id: &str) -> Option<&Region> {
        self.regions.get(id)
    }

    pub fn find_airport_by_id(&self, id: &str) -> Option<&Airport> {
        self.airports.get(id)
    }

    pub fn airport_mut(&mut self, id: &str) -> Option<&mut Airport> {
        self.airports.get_mut(id)
    }

    pub fn find_fix_by_region_and_id(&self, region: &str, id: &str) -> Option<&Fix> {
        self.fixes.find(id, |fix| fix.region == region)
    }

    pub fn find_fix_mut(&mut self, region: &str, id: &str) -> Option<&mut Fix> {
        self.fixes.find_mut(id, |fix| fix.region == region)
    }

    /// VOR or NDB with the given region and identifier, skipping waypoints
    /// that share the identifier.
    pub fn find_navaid_mut(&mut self, region: &str, id: &str) -> Option<&mut Fix> {
        self.fixes.find_mut(id, |fix| {
            fix.region == region && matches!(fix.kind, FixKind::Vor | FixKind::Ndb)
        })
    }

    /// Every fix sharing `id`, across all regions.
    pub fn fixes_by_id(&self, id: &str) -> &[Fix] {
        self.fixes.candidates(id)
    }

    /// Every airway named `name`, one per level.
    pub fn airways_by_name(&self, name: &str) -> &[Airway] {
        self.airways.candidates(name)
    }

    pub fn find_airway(&self, name: &str, level: AirwayLevel) -> Option<&Airway> {
        self.airways.find(name, |airway| airway.level == level)
    }

    /// Attach a procedure to an existing airport. Returns `false` if the
    /// airport is unknown.
    pub fn attach_procedure(&mut self, airport_id: &str, procedure: Procedure) -> bool {
        match self.airports.get_mut(airport_id) {
            Some(airport) => {
                airport.procedures.push(procedure);
                true
            }
            None => false,
        }
    }

    /// Visit every airport once, in unspecified order.
    pub fn for_each_airport<F>(&self, visitor: F)
    where
        F: FnMut(&Airport),
    {
        self.airports.values().for_each(visitor);
    }

    pub fn airports(&self) -> impl Iterator<Item = &Airport> {
        self.airports.values()
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    pub fn fixes(&self) -> impl Iterator<Item = &Fix> {
        self.fixes.values()
    }

    pub fn airways(&self) -> impl Iterator<Item = &Airway> {
        self.airways.values()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn airport_count(&self) -> usize {
        self.airports.len()
    }

    pub fn fix_count(&self) -> usize {
        self.fixes.len()
    }

    pub fn airway_count(&self) -> usize {
        self.airways.len()
    }

    pub fn summary(&self) -> WorldSummary {
        WorldSummary {
            regions: self.region_count(),
            airports: self.airport_count(),
            fixes: self.fix_count(),
            airways: self.airway_count(),
            procedures: self.airports().map(|a| a.procedures.len()).sum(),
        }
    }

    /// Look up an airport, suggesting close identifiers when it is unknown.
    pub fn resolve_airport(&self, id: &str) -> Result<&Airport> {
        self.find_airport_by_id(id).ok_or_else(|| {
            let suggestions = self.fuzzy_airport_matches(id, 3);
            Error::UnknownAirport {
                name: id.to_string(),
                suggestions,
            }
        })
    }

    /// Airport identifiers similar to `query`, best match first.
    ///
    /// Both the airport identifier and its ICAO code are compared; the
    /// identifier is what gets returned.
    pub fn fuzzy_airport_matches(&self, query: &str, limit: usize) -> Vec<String> {
        let needle = query.to_ascii_uppercase();
        let mut scored: Vec<(f64, &str)> = self
            .airports()
            .filter_map(|airport| {
                let by_id = strsim::jaro_winkler(&needle, &airport.id.to_ascii_uppercase());
                let by_icao = airport
                    .icao_code
                    .as_deref()
                    .map(|icao| strsim::jaro_winkler(&needle, &icao.to_ascii_uppercase()))
                    .unwrap_or(0.0);
                let score = by_id.max(by_icao);
                (score >= FUZZY_THRESHOLD).then_some((score, airport.id.as_str()))
            })
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(b.1))
        });
        scored
            .into_iter()
            .take(limit)
            .map(|(_, id)| id.to_string())
            .collect()
    }

    /// Airports whose identifier, ICAO code or name contains `query`
    /// (case-insensitive), ordered by identifier.
    pub fn search_airports(&self, query: &str, limit: usize) -> Vec<&Airport> {
        let needle = query.to_lowercase();
        let contains = |value: &str| value.to_lowercase().contains(&needle);

        let mut matches: Vec<&Airport> = self
            .airports()
            .filter(|airport| {
                contains(&airport.id)
                    || contains(&airport.name)
                    || airport.icao_code.as_deref().is_some_and(contains)
            })
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        matches.truncate(limit);
        matches
    }
}

/// A published World that can be rebuilt without readers ever observing a
/// partially built graph.
#[derive(Debug, Default)]
pub struct SharedWorld {
    current: RwLock<Arc<World>>,
}

impl SharedWorld {
    pub fn new(world: World) -> Self {
        Self {
            current: RwLock::new(Arc::new(world)),
        }
    }

    /// The currently published World. Readers keep their snapshot across
    /// rebuilds.
    pub fn snapshot(&self) -> Arc<World> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Publish `world` and return the previously published one.
    pub fn replace(&self, world: World) -> Arc<World> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(world))
    }

    /// Build a new World with `build` and publish it on success.
    ///
    /// On failure the error is returned and the current World stays
    /// published unchanged.
    pub fn rebuild<F>(&self, build: F) -> Result<Arc<World>>
    where
        F: FnOnce() -> Result<World>,
    {
        let world = Arc::new(build()?);
        debug!(summary = ?world.summary(), "publishing rebuilt world");
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::clone(&world);
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FixKind, LatLon};

    fn fix(id: &str, region: &str) -> Fix {
        Fix {
            id: id.to_string(),
            region: region.to_string(),
            kind: FixKind::Waypoint,
            position: LatLon::new(0.0, 0.0),
            terminal_area: None,
            frequency: None,
            name: None,
            description_code: None,
            has_dme: false,
        }
    }

    #[test]
    fn create_or_find_region_is_idempotent() {
        let mut world = World::new();
        world.create_or_find_region("K1");
        world.create_or_find_region("K1");
        world.create_or_find_region("K2");
        assert_eq!(world.region_count(), 2);
        assert_eq!(world.find_region("K1").map(|r| r.id.as_str()), Some("K1"));
    }

    #[test]
    fn create_or_find_airport_returns_same_entity() {
        let mut world = World::new();
        let first: *const Airport = world.create_or_find_airport("KSEA");
        world.create_or_find_airport("KSEA").name = "Seattle-Tacoma Intl".to_string();
        let second: *const Airport = world.create_or_find_airport("KSEA");

        assert_eq!(first, second);
        assert_eq!(world.airport_count(), 1);
        assert_eq!(
            world.find_airport_by_id("KSEA").map(|a| a.name.as_str()),
            Some("Seattle-Tacoma Intl")
        );
    }

    #[test]
    fn fixes_are_disambiguated_by_region() {
        let mut world = World::new();
        world.add_fix(fix("ABCDE", "K1"));
        world.add_fix(fix("ABCDE", "K2"));

        let k1 = world.find_fix_by_region_and_id("K1", "ABCDE").unwrap();
        let k2 = world.find_fix_by_region_and_id("K2", "ABCDE").unwrap();
        assert_eq!(k1.region, "K1");
        assert_eq!(k2.region, "K2");
        assert!(!std::ptr::eq(k1, k2));
        assert!(world.find_fix_by_region_and_id("K3", "ABCDE").is_none());
        assert_eq!(world.fixes_by_id("ABCDE").len(), 2);
        assert_eq!(world.fix_count(), 2);
    }

    #[test]
    fn airways_are_unique_per_level() {
        let mut world = World::new();
        world.create_or_find_airway("V12", AirwayLevel::Low);
        world.create_or_find_airway("V12", AirwayLevel::High);
        world.create_or_find_airway("V12", AirwayLevel::Low);

        assert_eq!(world.airway_count(), 2);
        assert_eq!(world.airways_by_name("V12").len(), 2);
        assert!(world.find_airway("V12", AirwayLevel::High).is_some());
        assert!(world.find_airway("V4", AirwayLevel::Low).is_none());
    }

    #[test]
    fn for_each_airport_visits_every_airport_once() {
        let mut world = World::new();
        for id in ["KSEA", "KBFI", "LFBO"] {
            world.create_or_find_airport(id);
        }
        let mut seen = Vec::new();
        world.for_each_airport(|airport| seen.push(airport.id.clone()));
        seen.sort();
        assert_eq!(seen, vec!["KBFI", "KSEA", "LFBO"]);
    }

    #[test]
    fn attach_procedure_requires_known_airport() {
        use crate::model::ProcedureKind;

        let mut world = World::new();
        world.create_or_find_airport("KSEA");
        let procedure = Procedure {
            kind: ProcedureKind::Sid,
            ident: "BANGR9".to_string(),
            transitions: Vec::new(),
        };
        assert!(world.attach_procedure("KSEA", procedure.clone()));
        assert!(!world.attach_procedure("KXXX", procedure));
        assert_eq!(world.summary().procedures, 1);
    }

    #[test]
    fn unknown_airport_suggests_close_identifiers() {
        let mut world = World::new();
        world.create_or_find_airport("KSEA");
        world.create_or_find_airport("LFBO");

        let err = world.resolve_airport("KSEB").unwrap_err();
        match err {
            Error::UnknownAirport { name, suggestions } => {
                assert_eq!(name, "KSEB");
                assert_eq!(suggestions, vec!["KSEA".to_string()]);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(world.fuzzy_airport_matches("ZZZZZZZZ", 3).is_empty());
    }

    #[test]
    fn search_matches_name_and_identifier() {
        let mut world = World::new();
        world.create_or_find_airport("KSEA").name = "Seattle-Tacoma Intl".to_string();
        world.create_or_find_airport("KBFI").name = "Boeing Field".to_string();
        world.create_or_find_airport("LFBO").name = "Toulouse-Blagnac".to_string();

        let ids: Vec<&str> = world
            .search_airports("seattle", 10)
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, vec!["KSEA"]);

        let ids: Vec<&str> = world
            .search_airports("k", 10)
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, vec!["KBFI", "KSEA"]);
        assert_eq!(world.search_airports("k", 1).len(), 1);
    }

    #[test]
    fn rebuild_keeps_current_world_on_failure() {
        let mut initial = World::new();
        initial.create_or_find_airport("KSEA");
        let shared = SharedWorld::new(initial);
        let before = shared.snapshot();

        let result = shared.rebuild(|| Err(Error::MissingHeader));
        assert!(result.is_err());
        assert!(Arc::ptr_eq(&before, &shared.snapshot()));

        let rebuilt = shared
            .rebuild(|| {
                let mut world = World::new();
                world.create_or_find_airport("LFBO");
                Ok(world)
            })
            .unwrap();
        assert!(rebuilt.find_airport_by_id("LFBO").is_some());
        assert!(Arc::ptr_eq(&rebuilt, &shared.snapshot()));
        assert!(before.find_airport_by_id("KSEA").is_some());
        assert!(shared.snapshot().find_airport_by_id("KSEA").is_none());
    }

    #[test]
    fn concurrent_rebuilds_return_their_own_world() {
        let shared = SharedWorld::new(World::new());
        let ids = ["KSEA", "KBFI", "LFBO", "EGLL"];

        std::thread::scope(|scope| {
            for id in ids {
                let shared = &shared;
                scope.spawn(move || {
                    for _ in 0..50 {
                        let rebuilt = shared
                            .rebuild(|| {
                                let mut world = World::new();
                                world.create_or_find_airport(id);
                                Ok(world)
                            })
                            .unwrap();
                        assert_eq!(rebuilt.airport_count(), 1);
                        assert!(rebuilt.find_airport_by_id(id).is_some());
                    }
                });
            }
        });

        let last = shared.snapshot();
        assert!(ids.iter().any(|id| last.find_airport_by_id(id).is_some()));
    }
}
