//! Subcommand handlers.
//!
//! `main.rs` loads the World once and dispatches to the handler of the
//! requested subcommand; handlers only query and print.

pub mod airport;
pub mod navigation;
pub mod summary;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;

use xnav_cli::output::OutputFormat;
use xnav_lib::{load_world, resolve_xplane_root, Error as LibError, NavDataSources, World};

/// Resolve the data sources from the command line and load them.
///
/// Extra airport files are enough on their own; without them an X-Plane
/// installation is required.
pub fn load_world_for(xplane_root: Option<&Path>, extra_apt: &[PathBuf]) -> Result<World> {
    let sources = match resolve_xplane_root(xplane_root) {
        Ok(root) => NavDataSources::from_xplane_root(&root),
        Err(LibError::XPlaneRootUnavailable) if !extra_apt.is_empty() => {
            NavDataSources::default()
        }
        Err(err) => return Err(err).context("failed to locate navigation data"),
    };
    let sources = extra_apt
        .iter()
        .fold(sources, |sources, path| sources.with_airport_file(path));

    if sources.is_empty() {
        bail!("no navigation data files found; check --xplane-root");
    }
    sources
        .validate()
        .context("navigation data is incomplete")?;

    load_world(&sources).context("failed to load navigation data")
}

/// Print `value` as JSON, or the text produced by `text` otherwise.
pub(crate) fn emit<T, F>(format: OutputFormat, value: &T, text: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce() -> String,
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).context("failed to encode JSON")?;
            println!("{json}");
        }
        OutputFormat::Text => println!("{}", text()),
    }
    Ok(())
}
