use std::path::PathBuf;

use xnav_lib::{load_world, AirportIndex, LatLon, NavDataSources, Result};

fn xplane_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures/xplane")
}

#[test]
fn indexes_airports_with_position() -> Result<()> {
    let world = load_world(&NavDataSources::from_xplane_root(&xplane_root()))?;
    let index = AirportIndex::build(&world);

    // WA64 has neither datum nor runway ends
    assert_eq!(index.len(), 4);
    Ok(())
}

#[test]
fn nearest_airports_to_seattle() -> Result<()> {
    let world = load_world(&NavDataSources::from_xplane_root(&xplane_root()))?;
    let index = AirportIndex::build(&world);

    let results = index.nearest(LatLon::new(47.45, -122.31), 3);
    let ids: Vec<&str> = results.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec!["KSEA", "KBFI", "W36"]);
    assert!(results.windows(2).all(|pair| pair[0].1 <= pair[1].1));

    let far = index.within_radius(LatLon::new(43.63, 1.36), 100.0);
    let ids: Vec<&str> = far.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec!["LFBO"]);
    Ok(())
}
