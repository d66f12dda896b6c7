use std::{path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand};

mod output;
mod render;

use render::{OutputFormat, RenderOptions};

#[derive(Parser)]
#[command(name = "mosaic")]
#[command(version, about = "Preview randomized mosaic feed layouts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a layout for a viewport and print it
    Render(RenderArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// JSON array of `{id, content_path}` posts, newest first
    #[arg(long)]
    posts: Option<PathBuf>,
    /// Number of synthetic posts used when `--posts` is not given
    #[arg(long, default_value_t = 24)]
    demo: usize,
    /// TOML feed configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Viewport width in logical pixels
    #[arg(long, default_value_t = 1024.0)]
    width: f32,
    /// Viewport height in logical pixels
    #[arg(long, default_value_t = 768.0)]
    height: f32,
    /// Seed for the randomizer, overriding the config file
    #[arg(long)]
    seed: Option<u64>,
    /// Number of extensions to apply after the initial layout
    #[arg(long, default_value_t = 0)]
    extend: usize,
    #[arg(long, value_enum, default_value_t = OutputFormat::Ascii)]
    format: OutputFormat,
    /// Public base URL that stored content paths are joined to
    #[arg(long, default_value = "")]
    storage_url: String,
}

const DEFAULT_FILTER: &str = "warn,mosaic_feed=info,mosaic_shard=info";

fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match tracing_subscriber::EnvFilter::try_new(DEFAULT_FILTER) {
            Ok(filter) => filter,
            Err(_) => tracing_subscriber::EnvFilter::new("warn"),
        },
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .try_init();
}

fn main() -> ExitCode {
    init_tracing();
    let Cli { command } = Cli::parse();

    let result = match command {
        Commands::Render(args) => render::execute(RenderOptions {
            posts: args.posts.as_deref(),
            demo: args.demo,
            config: args.config.as_deref(),
            width: args.width,
            height: args.height,
            seed: args.seed,
            extend: args.extend,
            format: args.format,
            storage_url: &args.storage_url,
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
