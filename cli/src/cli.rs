use std::path::PathBuf;

/// Village boundary matching and land-cover overlay
#[derive(clap::Parser, Debug)]
#[command(name = "fra-atlas", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Match beneficiary villages to boundary polygons
    Match(MatchArgs),

    /// Overlay a land-cover raster on previously matched villages
    Overlay(OverlayArgs),

    /// Match, then overlay, in one run
    Run(RunArgs),
}

/// Overrides applied on top of the configuration file.
#[derive(clap::Args, Debug, Clone)]
pub struct MatchOptions {
    /// Minimum fuzzy score in [0, 100]
    #[arg(long)]
    pub threshold: Option<f64>,

    /// State name attached to every matched village
    #[arg(long)]
    pub state: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct MatchArgs {
    /// Boundary polygons (.shp, zipped shapefile, or GeoJSON)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub boundaries: PathBuf,

    /// Beneficiary table (.csv)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub beneficiaries: PathBuf,

    /// Output directory
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: PathBuf,

    #[command(flatten)]
    pub options: MatchOptions,
}

#[derive(clap::Args, Debug)]
pub struct OverlayArgs {
    /// Categorical raster (.tif or .asc)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub raster: PathBuf,

    /// Matched villages GeoJSON written by `match`
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub villages: PathBuf,

    /// Output directory
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Boundary polygons (.shp, zipped shapefile, or GeoJSON)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub boundaries: PathBuf,

    /// Beneficiary table (.csv)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub beneficiaries: PathBuf,

    /// Categorical raster (.tif or .asc)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub raster: PathBuf,

    /// Output directory
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: PathBuf,

    #[command(flatten)]
    pub options: MatchOptions,
}
