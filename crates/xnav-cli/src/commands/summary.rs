use anyhow::Result;

use xnav_cli::output::{format_summary_text, OutputFormat};
use xnav_lib::World;

use super::emit;

pub fn handle_summary(world: &World, format: OutputFormat) -> Result<()> {
    let summary = world.summary();
    emit(format, &summary, || format_summary_text(&summary))
}
