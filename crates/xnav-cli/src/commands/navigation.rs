//! Fix and airway handlers.

use anyhow::{bail, Result};

use xnav_cli::output::{format_airways_text, format_fixes_text, OutputFormat};
use xnav_lib::{Fix, World};

use super::emit;

pub fn handle_fix(
    world: &World,
    id: &str,
    region: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let id = id.to_uppercase();
    let fixes: Vec<&Fix> = match region {
        Some(region) => world
            .find_fix_by_region_and_id(&region.to_uppercase(), &id)
            .into_iter()
            .collect(),
        None => world.fixes_by_id(&id).iter().collect(),
    };

    if fixes.is_empty() {
        match region {
            Some(region) => bail!("no fix {id} in region {region}"),
            None => bail!("no fix named {id}"),
        }
    }
    emit(format, &fixes, || format_fixes_text(&fixes))
}

pub fn handle_airway(world: &World, name: &str, format: OutputFormat) -> Result<()> {
    let airways = world.airways_by_name(&name.to_uppercase());
    if airways.is_empty() {
        bail!("no airway named {name}");
    }
    emit(format, airways, || format_airways_text(airways))
}
