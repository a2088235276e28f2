use anyhow::Result;
use fra_atlas::{write_outputs, RunOutputs};
use tracing::{info, warn};

use crate::cli::{Cli, MatchArgs};

pub fn run(cli: &Cli, args: &MatchArgs) -> Result<()> {
    let atlas = super::build_atlas(cli, Some(&args.options))?;

    info!("[match] {} x {}", args.boundaries.display(), args.beneficiaries.display());
    let matches = atlas.match_files(&args.boundaries, &args.beneficiaries)?;
    for miss in &matches.unmatched {
        warn!("[match] unmatched {} ({})", miss.key, miss.reason);
    }

    write_outputs(&args.output, RunOutputs { matches: Some(&matches), villages: &matches.matched, overlay: None })?;
    Ok(())
}
