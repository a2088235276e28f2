pub mod matching;
pub mod overlay;
pub mod run;

use anyhow::Result;
use fra_atlas::{Atlas, AtlasConfig, CancelToken};
use tracing::warn;

use crate::cli::{Cli, MatchOptions};

/// Load the configuration file and apply command-line overrides.
pub(crate) fn build_atlas(cli: &Cli, options: Option<&MatchOptions>) -> Result<Atlas> {
    let mut config = AtlasConfig::load(cli.config.as_deref())?;
    if let Some(options) = options {
        if let Some(threshold) = options.threshold { config.threshold = threshold }
        if let Some(state) = &options.state { config.state_name = state.clone() }
    }
    Atlas::new(config)
}

/// Cancel token tripped by Ctrl-C.
pub(crate) fn cancel_on_interrupt() -> Result<CancelToken> {
    let token = CancelToken::new();
    let handle = token.clone();
    ctrlc::set_handler(move || {
        warn!("[cli] Interrupt received; finishing villages in progress");
        handle.cancel();
    })?;
    Ok(token)
}
