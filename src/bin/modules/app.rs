use super::cli::{Cli, LoggingOptions};
use super::error::CliError;
use super::io;
use indicatif::{ProgressBar, ProgressStyle};
use oeigen::{EmitOptions, Generator, GeneratorConfig, get_default_config};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub fn run(args: Cli) -> Result<(), CliError> {
    init_logging(&args.logging);

    let mut config = if let Some(config_path) = &args.generation.config {
        GeneratorConfig::load_from_file(config_path)?
    } else {
        get_default_config().clone()
    };
    if args.generation.debug {
        config.debug = true;
    }

    let emit_options = EmitOptions {
        qualifier: args.emission.qualifier.clone(),
        scalar: args.emission.scalar.clone(),
    };
    let generator = Generator::new(&config).with_options(emit_options);

    let pb = if args.logging.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Generating integral kernels...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let sources = generator.generate();
    pb.finish_and_clear();
    let sources = sources?;

    let written = io::write_sources(&args.output.output, &sources.sinks)?;
    info!(
        files = written.len(),
        dir = %args.output.output.display(),
        "wrote generated sources"
    );

    if args.output.summary {
        io::write_summary(std::io::stdout(), &sources.summary, &written)?;
    }

    Ok(())
}

fn init_logging(options: &LoggingOptions) {
    let level = if options.quiet {
        "off"
    } else {
        match options.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A second initialisation only happens in tests driving `run` twice; keep the first.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
