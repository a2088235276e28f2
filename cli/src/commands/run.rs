use anyhow::Result;
use fra_atlas::{write_outputs, RunOutputs};
use tracing::warn;

use crate::cli::{Cli, RunArgs};

pub fn run(cli: &Cli, args: &RunArgs) -> Result<()> {
    let atlas = super::build_atlas(cli, Some(&args.options))?;
    let cancel = super::cancel_on_interrupt()?;

    let matches = atlas.match_files(&args.boundaries, &args.beneficiaries)?;
    for miss in &matches.unmatched {
        warn!("[run] unmatched {} ({})", miss.key, miss.reason);
    }

    let overlay = atlas.overlay_file(&args.raster, &matches.matched, &cancel)?;
    write_outputs(&args.output, RunOutputs {
        matches: Some(&matches),
        villages: &matches.matched,
        overlay: Some(&overlay),
    })?;

    if overlay.cancelled {
        warn!("[run] Stopped early; outputs hold {} completed villages", overlay.land_stats.len() + overlay.faults.len());
    }
    Ok(())
}
