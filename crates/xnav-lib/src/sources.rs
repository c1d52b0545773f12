//! Locating navigation data files inside an X-Plane installation.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable overriding X-Plane installation discovery.
pub const XPLANE_ROOT_ENV: &str = "XNAV_XPLANE_ROOT";

/// Install reference files written by the X-Plane installer, newest first.
const INSTALL_REFERENCE_FILES: [&str; 2] = ["x-plane_install_12.txt", "x-plane_install_11.txt"];

/// User-installed navigation data (e.g. a Navigraph cycle) takes precedence.
const NAV_DATA_DIRS: [&str; 2] = ["Custom Data", "Resources/default data"];

const AIRPORT_FILES: [&str; 2] = [
    "Global Scenery/Global Airports/Earth nav data/apt.dat",
    "Resources/default scenery/default apt dat/Earth nav data/apt.dat",
];

const FIX_FILE: &str = "earth_fix.dat";
const NAVAID_FILE: &str = "earth_nav.dat";
const AIRWAY_FILE: &str = "earth_awy.dat";
const PROCEDURE_DIR: &str = "CIFP";

/// Paths of the files making up one navigation data set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavDataSources {
    /// Airport files, loaded in order; later files override earlier ones.
    pub airports: Vec<PathBuf>,
    pub fixes: Option<PathBuf>,
    pub navaids: Option<PathBuf>,
    pub airways: Option<PathBuf>,
    /// Directory holding one CIFP file per airport.
    pub procedures: Option<PathBuf>,
}

impl NavDataSources {
    /// Discover the data files of an X-Plane installation. Files that do not
    /// exist are left unset.
    pub fn from_xplane_root(root: &Path) -> Self {
        let airports = AIRPORT_FILES
            .iter()
            .map(|relative| root.join(relative))
            .find(|path| path.is_file())
            .into_iter()
            .collect();

        let sources = Self {
            airports,
            fixes: nav_data_path(root, FIX_FILE),
            navaids: nav_data_path(root, NAVAID_FILE),
            airways: nav_data_path(root, AIRWAY_FILE),
            procedures: nav_data_path(root, PROCEDURE_DIR),
        };
        debug!(root = %root.display(), ?sources, "discovered navigation data");
        sources
    }

    /// Append an airport file loaded after those already configured.
    pub fn with_airport_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.airports.push(path.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
            && self.fixes.is_none()
            && self.navaids.is_none()
            && self.airways.is_none()
            && self.procedures.is_none()
    }

    /// Fail with [`Error::NavDataNotFound`] for the first configured path that
    /// does not exist.
    pub fn validate(&self) -> Result<()> {
        let configured = self.airports.iter().chain(
            [&self.fixes, &self.navaids, &self.airways, &self.procedures]
                .into_iter()
                .flatten(),
        );
        for path in configured {
            if !path.exists() {
                return Err(Error::NavDataNotFound { path: path.clone() });
            }
        }
        Ok(())
    }
}

fn nav_data_path(root: &Path, name: &str) -> Option<PathBuf> {
    NAV_DATA_DIRS
        .iter()
        .map(|dir| root.join(dir).join(name))
        .find(|path| path.exists())
}

/// Resolve the X-Plane installation to read data from.
///
/// The resolution order is:
/// 1. Explicit `explicit` argument when provided.
/// 2. `XNAV_XPLANE_ROOT` environment variable.
/// 3. The install reference file left by the X-Plane installer
///    (`~/.x-plane/x-plane_install_12.txt`, then `_11`; on Windows under
///    `%LOCALAPPDATA%\x-plane`).
pub fn resolve_xplane_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(explicit) = explicit {
        return Ok(explicit.to_path_buf());
    }

    if let Some(env_path) = env::var_os(XPLANE_ROOT_ENV) {
        return Ok(PathBuf::from(env_path));
    }

    detect_xplane_install().ok_or(Error::XPlaneRootUnavailable)
}

fn install_reference_dir() -> Option<PathBuf> {
    let dirs = BaseDirs::new()?;
    #[cfg(windows)]
    {
        Some(dirs.data_local_dir().join("x-plane"))
    }
    #[cfg(not(windows))]
    {
        Some(dirs.home_dir().join(".x-plane"))
    }
}

fn detect_xplane_install() -> Option<PathBuf> {
    let dir = install_reference_dir()?;
    INSTALL_REFERENCE_FILES
        .iter()
        .find_map(|name| read_install_reference(&dir.join(name)))
}

/// First existing installation directory listed in an install reference file.
fn read_install_reference(path: &Path) -> Option<PathBuf> {
    let contents = fs::read_to_string(path).ok()?;
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .find(|candidate| candidate.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "I\n1100\n99\n").unwrap();
    }

    #[test]
    fn custom_data_overrides_default_data() {
        let root = tempfile::tempdir().unwrap();
        let root = root.path();
        touch(&root.join("Resources/default data/earth_fix.dat"));
        touch(&root.join("Custom Data/earth_fix.dat"));
        touch(&root.join("Resources/default data/earth_nav.dat"));
        fs::create_dir_all(root.join("Custom Data/CIFP")).unwrap();

        let sources = NavDataSources::from_xplane_root(root);
        assert_eq!(sources.fixes, Some(root.join("Custom Data/earth_fix.dat")));
        assert_eq!(
            sources.navaids,
            Some(root.join("Resources/default data/earth_nav.dat"))
        );
        assert_eq!(sources.airways, None);
        assert_eq!(sources.procedures, Some(root.join("Custom Data/CIFP")));
        assert!(sources.airports.is_empty());
    }

    #[test]
    fn global_airports_preferred_over_default_apt() {
        let root = tempfile::tempdir().unwrap();
        let root = root.path();
        for relative in AIRPORT_FILES {
            touch(&root.join(relative));
        }

        let sources = NavDataSources::from_xplane_root(root);
        assert_eq!(sources.airports, vec![root.join(AIRPORT_FILES[0])]);
    }

    #[test]
    fn validate_reports_missing_path() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("apt.dat");
        let sources = NavDataSources::default().with_airport_file(&missing);

        match sources.validate() {
            Err(Error::NavDataNotFound { path }) => assert_eq!(path, missing),
            other => panic!("unexpected result {other:?}"),
        }
        assert!(NavDataSources::default().validate().is_ok());
        assert!(NavDataSources::default().is_empty());
    }

    #[test]
    fn explicit_root_wins() {
        let root = Path::new("/opt/X-Plane 12");
        assert_eq!(resolve_xplane_root(Some(root)).unwrap(), root);
    }

    #[test]
    fn install_reference_skips_missing_installs() {
        let dir = tempfile::tempdir().unwrap();
        let install = dir.path().join("X-Plane 12");
        fs::create_dir_all(&install).unwrap();

        let reference = dir.path().join("x-plane_install_12.txt");
        fs::write(
            &reference,
            format!("/nonexistent/X-Plane\n\n{}\n", install.display()),
        )
        .unwrap();

        assert_eq!(read_install_reference(&reference), Some(install));
        assert_eq!(read_install_reference(&dir.path().join("absent.txt")), None);
    }
}
