//! KD-tree index answering "which airports are closest to this position".
//!
//! Airport reference points are projected onto an Earth-radius sphere in
//! 3D Cartesian space. Straight-line (chord) distance there is monotonic with
//! great-circle distance, so the tree's Euclidean ordering is the geographic
//! ordering; results are converted back to great-circle nautical miles.

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use tracing::info;

use crate::model::LatLon;
use crate::world::{World, KM_TO_NM};

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// Nearest-neighbour index over airport reference points.
pub struct AirportIndex {
    tree: KdTree<f32, usize, 3, BUCKET_SIZE, u32>,
    ids: Vec<String>,
}

impl AirportIndex {
    /// Index every airport with a reference point. Airports without datum or
    /// runways cannot be placed and are left out.
    pub fn build(world: &World) -> Self {
        let mut tree: KdTree<f32, usize, 3, BUCKET_SIZE, u32> = KdTree::new();
        let mut ids = Vec::with_capacity(world.airport_count());
        let mut unplaced = 0;

        world.for_each_airport(|airport| match airport.reference_point() {
            Some(position) => {
                tree.add(&to_cartesian(position), ids.len());
                ids.push(airport.id.clone());
            }
            None => unplaced += 1,
        });

        info!(
            airports = ids.len(),
            unplaced, "built airport spatial index"
        );
        Self { tree, ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The `k` airports closest to `position`.
    ///
    /// Returns (airport id, distance in nautical miles) pairs sorted by distance.
    pub fn nearest(&self, position: LatLon, k: usize) -> Vec<(&str, f64)> {
        if k == 0 || self.ids.is_empty() {
            return Vec::new();
        }

        let query = to_cartesian(position);
        self.tree
            .nearest_n::<SquaredEuclidean>(&query, k)
            .into_iter()
            .map(|neighbour| {
                let id = self.ids[neighbour.item].as_str();
                (id, chord_to_nm(f64::from(neighbour.distance).sqrt()))
            })
            .collect()
    }

    /// Every airport within `radius_nm` nautical miles of `position`.
    ///
    /// Returns (airport id, distance in nautical miles) pairs sorted by distance.
    pub fn within_radius(&self, position: LatLon, radius_nm: f64) -> Vec<(&str, f64)> {
        if radius_nm <= 0.0 || self.ids.is_empty() {
            return Vec::new();
        }

        let query = to_cartesian(position);
        let chord = nm_to_chord(radius_nm);
        let mut neighbours: Vec<(&str, f64)> = self
            .tree
            .within::<SquaredEuclidean>(&query, (chord * chord) as f32)
            .into_iter()
            .map(|neighbour| {
                let id = self.ids[neighbour.item].as_str();
                (id, chord_to_nm(f64::from(neighbour.distance).sqrt()))
            })
            .collect();

        neighbours.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        neighbours
    }
}

fn to_cartesian(position: LatLon) -> [f32; 3] {
    let latitude = position.latitude.to_radians();
    let longitude = position.longitude.to_radians();
    [
        (EARTH_RADIUS_KM * latitude.cos() * longitude.cos()) as f32,
        (EARTH_RADIUS_KM * latitude.cos() * longitude.sin()) as f32,
        (EARTH_RADIUS_KM * latitude.sin()) as f32,
    ]
}

/// Great-circle distance in nautical miles for a chord length in kilometres.
fn chord_to_nm(chord_km: f64) -> f64 {
    let half_angle = (chord_km / (2.0 * EARTH_RADIUS_KM)).clamp(-1.0, 1.0).asin();
    2.0 * EARTH_RADIUS_KM * half_angle * KM_TO_NM
}

/// Chord length in kilometres spanning `distance_nm` along the surface.
fn nm_to_chord(distance_nm: f64) -> f64 {
    let angle = (distance_nm / KM_TO_NM / EARTH_RADIUS_KM).min(std::f64::consts::PI);
    2.0 * EARTH_RADIUS_KM * (angle / 2.0).sin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        let mut world = World::new();
        for (id, latitude, longitude) in [
            ("KSEA", 47.449, -122.309),
            ("KBFI", 47.530, -122.302),
            ("LFBO", 43.629, 1.363),
        ] {
            let airport = world.create_or_find_airport(id);
            airport.datum_latitude = Some(latitude);
            airport.datum_longitude = Some(longitude);
        }
        world.create_or_find_airport("NOWHERE");
        world
    }

    #[test]
    fn skips_airports_without_position() {
        let index = AirportIndex::build(&world());
        assert_eq!(index.len(), 3);
        assert!(!index.is_empty());
    }

    #[test]
    fn nearest_orders_by_distance() {
        let index = AirportIndex::build(&world());
        let results = index.nearest(LatLon::new(47.45, -122.31), 2);

        let ids: Vec<&str> = results.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec!["KSEA", "KBFI"]);
        assert!(results[0].1 < 0.5);
        assert!(
            (4.0..6.0).contains(&results[1].1),
            "KSEA-KBFI is about 5 nm, got {}",
            results[1].1
        );
    }

    #[test]
    fn within_radius_filters_far_airports() {
        let index = AirportIndex::build(&world());
        let results = index.within_radius(LatLon::new(47.449, -122.309), 50.0);
        let ids: Vec<&str> = results.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec!["KSEA", "KBFI"]);

        assert!(index.within_radius(LatLon::new(0.0, 0.0), 0.0).is_empty());
    }

    #[test]
    fn chord_conversion_round_trips() {
        for nm in [1.0, 100.0, 5000.0] {
            assert!((chord_to_nm(nm_to_chord(nm)) - nm).abs() < 1e-6);
        }
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index = AirportIndex::build(&World::new());
        assert!(index.is_empty());
        assert!(index.nearest(LatLon::new(0.0, 0.0), 5).is_empty());
    }
}
