use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use voxfield::core::models::field::{FieldComponent, FieldKind};

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Voxfield Developers",
    version,
    about = "Voxfield CLI - Gravity and magnetic forward modelling of voxelized earth models.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Upper bound on the number of worker threads of a forward run.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a voxel model from the lithologies and bodies of a configuration file.
    Model(ModelArgs),
    /// Compute the gravity or magnetic field of a voxel model over a survey.
    Forward(ForwardArgs),
    /// Compute gravity and total-field magnetics over the footprint of a voxel model.
    Survey(SurveyArgs),
}

/// Field kinds accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldArg {
    Gravity,
    Magnetic,
}

impl From<FieldArg> for FieldKind {
    fn from(arg: FieldArg) -> Self {
        match arg {
            FieldArg::Gravity => FieldKind::Gravity,
            FieldArg::Magnetic => FieldKind::Magnetic,
        }
    }
}

/// Raster components accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentArg {
    Gz,
    Bx,
    By,
    Bz,
    Total,
}

impl From<ComponentArg> for FieldComponent {
    fn from(arg: ComponentArg) -> Self {
        match arg {
            ComponentArg::Gz => FieldComponent::Gz,
            ComponentArg::Bx => FieldComponent::Bx,
            ComponentArg::By => FieldComponent::By,
            ComponentArg::Bz => FieldComponent::Bz,
            ComponentArg::Total => FieldComponent::Total,
        }
    }
}

/// Arguments for the `model` subcommand.
#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Path to the configuration file holding the `[model]` section.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Path for the output voxel model (TOML).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S model.background-density=2700
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `forward` subcommand.
#[derive(Args, Debug)]
pub struct ForwardArgs {
    // --- Core Arguments ---
    /// Path to the input voxel model (TOML).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub model: PathBuf,

    /// Path for the output sample table (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path to the configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Compute Overrides ---
    /// Override the field to compute.
    #[arg(short, long, value_enum, value_name = "FIELD")]
    pub field: Option<FieldArg>,

    /// Override the number of observations per chunk.
    #[arg(long, value_name = "INT")]
    pub chunk_size: Option<usize>,

    /// Abandon the run after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    // --- Output Options ---
    /// Also write the result as an ASCII grid (regular surveys only).
    #[arg(long, value_name = "PATH")]
    pub grid_out: Option<PathBuf>,

    /// Component written to the ASCII grid. Defaults to `gz` or `total`.
    #[arg(long, value_enum, value_name = "COMPONENT", requires = "grid_out")]
    pub component: Option<ComponentArg>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S constants.field-inclination=-65
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `survey` subcommand.
#[derive(Args, Debug)]
pub struct SurveyArgs {
    /// Path to the input voxel model (TOML).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub model: PathBuf,

    /// Output prefix; writes `<PREFIX>_gravity.asc` and `<PREFIX>_magnetics.asc`.
    #[arg(short, long, required = true, value_name = "PREFIX")]
    pub output: PathBuf,

    /// Path to the configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the gravity observation height above the model top, in metres.
    #[arg(long, value_name = "METRES")]
    pub gravity_height: Option<f64>,

    /// Override the magnetic observation height above the model top, in metres.
    #[arg(long, value_name = "METRES")]
    pub magnetic_height: Option<f64>,

    /// Abandon the run after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S footprint.magnetic-height=150
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
