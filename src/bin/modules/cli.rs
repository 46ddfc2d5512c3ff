use clap::{ArgAction, Args, Parser};
use std::path::PathBuf;

const ABOUT: &str =
    "A command-line tool for generating Obara-Saika one-electron integral kernels.";
const AFTER_HELP: &str = "Set RUST_LOG to override the log filter chosen by -v/-q.";
const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser)]
#[command(
    version,
    about = ABOUT,
    after_help = AFTER_HELP,
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub generation: GenerationOptions,

    #[command(flatten)]
    pub output: OutputOptions,

    #[command(flatten)]
    pub emission: EmissionOptions,

    #[command(flatten)]
    pub logging: LoggingOptions,
}

/// Options for choosing what is generated.
#[derive(Args)]
#[command(next_help_heading = "Generation Options")]
pub struct GenerationOptions {
    /// Generator configuration file in TOML format.
    ///
    /// If not specified, the built-in configuration is used: every shell pair up to [F|F] is
    /// dispatched and differentiated.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit DEBUG_OEI-guarded prints and the debug stream, regardless of the configuration.
    #[arg(short, long)]
    pub debug: bool,
}

/// Options for controlling where results go.
#[derive(Args)]
#[command(next_help_heading = "Output Options")]
pub struct OutputOptions {
    /// Directory receiving the generated files. Created if missing.
    #[arg(short, long, value_name = "DIR", default_value = "generated")]
    pub output: PathBuf,

    /// Print a table of every generated shell pair after writing the files.
    #[arg(short, long)]
    pub summary: bool,
}

/// Options for spelling the emitted source.
#[derive(Args)]
#[command(next_help_heading = "Emission Options")]
pub struct EmissionOptions {
    /// Qualifier placed before every generated constructor. Pass an empty string for none.
    #[arg(long, value_name = "STR", default_value = "__device__ __inline__")]
    pub qualifier: String,

    /// Scalar type of integral values and geometric factors.
    #[arg(long, value_name = "TYPE", default_value = "QUICKDouble")]
    pub scalar: String,
}

/// Options for controlling log output.
#[derive(Args)]
#[command(next_help_heading = "Logging Options")]
pub struct LoggingOptions {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable logging and the progress spinner.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
