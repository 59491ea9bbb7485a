use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use tallygraph::config::DashboardConfig;
use tallygraph::dashboard::Dashboard;
use tallygraph::parser::ChartSpec;
use tallygraph::source::{self, LoadOptions, Source};
use tallygraph::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "tallygraph")]
#[command(about = "Group-by count dashboards from CSV data", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the dashboard to an image
    Render {
        #[command(flatten)]
        input: InputArgs,

        /// Image width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Image height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Image format
        #[arg(long, value_enum)]
        format: Option<Format>,

        /// Output file path (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print the per-chart group counts as JSON
    Summary {
        #[command(flatten)]
        input: InputArgs,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Parse a chart spec and show the result (for debugging)
    Parse {
        /// Chart spec, e.g. 'bar(column: Make, top: 10) | labs(title: "Makes")'
        spec: String,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Dashboard configuration file (JSON)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Data location: URL, file path, or '-' for stdin
    #[arg(long, short)]
    source: Option<String>,

    /// Chart spec; repeat to build a custom dashboard
    #[arg(long = "chart")]
    charts: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Png,
    Svg,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Png => OutputFormat::Png,
            Format::Svg => OutputFormat::Svg,
        }
    }
}

impl InputArgs {
    fn resolve(&self) -> Result<(DashboardConfig, Source)> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::from_path(path)?,
            None => DashboardConfig::default(),
        };
        if let Some(source) = &self.source {
            config.source = source.clone();
        }
        let config = config.with_chart_specs(&self.charts);
        let source = Source::parse(&config.source);
        Ok((config, source))
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn write_stdout(bytes: &[u8]) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(bytes)
        .context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render {
            input,
            width,
            height,
            format,
            output,
        } => {
            let (mut config, source) = input.resolve()?;
            if let Some(width) = width {
                config.render.width = width;
            }
            if let Some(height) = height {
                config.render.height = height;
            }
            if let Some(format) = format {
                config.render.format = format.into();
            }

            let dashboard = Dashboard::load(&config, &source)?;
            let bytes = dashboard.render(&config.render)?;

            match output {
                Some(path) => std::fs::write(&path, &bytes)
                    .with_context(|| format!("Failed to write '{}'", path.display()))?,
                None => write_stdout(&bytes)?,
            }
        }
        Commands::Summary { input, pretty } => {
            let (config, source) = input.resolve()?;
            let options = LoadOptions {
                timeout: config.fetch_timeout(),
            };
            let dataset = source::load(&source, &options)?;
            let dashboard = Dashboard::build(&config, &dataset)?;

            let summaries = dashboard.summaries();
            let mut json = if pretty {
                serde_json::to_string_pretty(&summaries)?
            } else {
                serde_json::to_string(&summaries)?
            };
            json.push('\n');
            write_stdout(json.as_bytes())?;
        }
        Commands::Parse { spec } => {
            let spec = ChartSpec::parse(&spec)?;
            println!("{:#?}", spec);
        }
    }

    Ok(())
}
