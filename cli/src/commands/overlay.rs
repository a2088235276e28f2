use anyhow::Result;
use fra_atlas::{io::geojson, write_outputs, RunOutputs};
use tracing::info;

use crate::cli::{Cli, OverlayArgs};

pub fn run(cli: &Cli, args: &OverlayArgs) -> Result<()> {
    let atlas = super::build_atlas(cli, None)?;
    let cancel = super::cancel_on_interrupt()?;

    let villages = geojson::read_matched_villages(&args.villages)?;
    info!("[overlay] {} villages from {}", villages.len(), args.villages.display());

    let result = atlas.overlay_file(&args.raster, &villages, &cancel)?;
    write_outputs(&args.output, RunOutputs { matches: None, villages: &villages, overlay: Some(&result) })?;
    Ok(())
}
