use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use covterm::cli;
use covterm::config::Settings;
use covterm::layout::MarkerStyle;
use covterm::render::SourceListing;
use covterm::source::FsSourceReader;

/// Terminal code coverage reports for test runs.
#[derive(Parser)]
#[command(name = "covterm", version, about)]
struct Cli {
    /// Path to a TOML settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// When to emit ANSI colors.
    #[arg(long, global = true, value_enum, default_value = "auto")]
    color: ColorChoice,

    /// Log diagnostics at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn use_color(self) -> bool {
        match self {
            ColorChoice::Auto => colored::control::SHOULD_COLORIZE.should_colorize(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

#[derive(Args)]
struct RenderArgs {
    /// Directory that relative source paths are resolved against.
    #[arg(long)]
    source_root: Option<PathBuf>,

    /// Print only the summary block.
    #[arg(long)]
    summary_only: bool,

    /// Skip classes without any executed statement.
    #[arg(long)]
    hide_uncovered: bool,

    /// Highest percentage still shown as low coverage.
    #[arg(long)]
    low_upper_bound: Option<f64>,

    /// Lowest percentage shown as high coverage.
    #[arg(long)]
    high_lower_bound: Option<f64>,

    /// Prefix for source listing lines.
    #[arg(long, value_enum)]
    marker: Option<MarkerStyle>,

    /// When to print a class's source listing.
    #[arg(long, value_enum)]
    source_listing: Option<SourceListing>,
}

impl RenderArgs {
    fn apply(&self, settings: &mut Settings) {
        if self.summary_only {
            settings.report.show_only_summary = true;
        }
        if self.hide_uncovered {
            settings.report.show_uncovered_files = false;
        }
        if let Some(bound) = self.low_upper_bound {
            settings.report.low_upper_bound = bound;
        }
        if let Some(bound) = self.high_lower_bound {
            settings.report.high_lower_bound = bound;
        }
        if let Some(marker) = self.marker {
            settings.render.marker_style = marker;
        }
        if let Some(listing) = self.source_listing {
            settings.render.source_listing = listing;
        }
    }

    fn sources(&self) -> FsSourceReader {
        FsSourceReader::new(self.source_root.clone())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render a coverage report dump.
    Report {
        /// Path to the JSON report dump.
        file: PathBuf,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Drive the coverage listener with a recorded test-run event log.
    Replay {
        /// JSON-lines file of lifecycle events.
        events: PathBuf,

        /// JSON report dump the engine measures from.
        #[arg(long)]
        snapshot: PathBuf,

        /// Largest suite (in specs) that is still measured.
        #[arg(long)]
        max_specs: Option<usize>,

        #[command(flatten)]
        render: RenderArgs,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(Settings::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = load_settings(cli.config.as_ref())?;
    let use_color = cli.color.use_color();

    let output = match cli.command {
        Commands::Report { file, render } => {
            render.apply(&mut settings);
            settings.validate()?;
            cli::cmd_report(&file, &settings, use_color, &render.sources())?
        }
        Commands::Replay {
            events,
            snapshot,
            max_specs,
            render,
        } => {
            render.apply(&mut settings);
            if let Some(max) = max_specs {
                settings.max_specs = max;
            }
            settings.validate()?;
            cli::cmd_replay(
                &events,
                &snapshot,
                &settings,
                use_color,
                Box::new(render.sources()),
            )?
        }
    };

    print!("{output}");
    Ok(())
}
