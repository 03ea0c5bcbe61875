//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `visitor_map` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! Each subcommand plays one part of the widget's life in a page: a page load,
//! a hover, the hidden debug keys or the manual preview.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use visitor_map::config::{
    COUNTRY_THRESHOLD, DEFAULT_ATLAS_OBJECT, DEFAULT_ATLAS_SOURCE, DEFAULT_GEOLOCATION_URL,
    DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH, DEFAULT_STORAGE_PATH, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT, PREVIEW_DURATION, VISIT_THRESHOLD,
};
use visitor_map::initialization::{init_client, init_logger_with};
use visitor_map::{
    build_renderer, open_store, render_svg, run_page_load, Config, DebugController, DedupMode,
    LogFormat, LogLevel, MapRenderer, RecordOutcome, VisibilityPolicy, DEBUG_SEED, DEMO_SEED,
};

#[derive(Debug, Parser)]
#[command(name = "visitor-map", version, about = "Visitor world map widget")]
struct Cli {
    #[command(flatten)]
    options: GlobalOptions,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalOptions {
    /// JSON file backing the visit store
    #[arg(long, global = true, default_value = DEFAULT_STORAGE_PATH)]
    storage_path: PathBuf,

    /// IP geolocation endpoint
    #[arg(long, global = true, default_value = DEFAULT_GEOLOCATION_URL)]
    geolocation_url: String,

    /// TopoJSON world atlas (URL or local path)
    #[arg(long, global = true, default_value = DEFAULT_ATLAS_SOURCE)]
    atlas: String,

    /// Geometry collection inside the atlas
    #[arg(long, global = true, default_value = DEFAULT_ATLAS_OBJECT)]
    atlas_object: String,

    /// Distinct countries required before the map is shown
    #[arg(long, global = true, default_value_t = COUNTRY_THRESHOLD)]
    country_threshold: usize,

    /// Total visits required before the map is shown
    #[arg(long, global = true, default_value_t = VISIT_THRESHOLD)]
    visit_threshold: u64,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_seconds: u64,

    /// HTTP User-Agent header
    #[arg(long, global = true, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// How reloads are counted
    #[arg(long, global = true, value_enum, default_value_t = DedupMode::None)]
    dedup: DedupMode,

    /// Session identifier for `--dedup session`
    #[arg(long, global = true)]
    session_id: Option<String>,

    /// Country highlighted as home (any code scheme)
    #[arg(long, global = true)]
    home_country: Option<String>,

    /// Log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,
}

impl From<GlobalOptions> for Config {
    fn from(o: GlobalOptions) -> Self {
        Config {
            storage_path: o.storage_path,
            geolocation_url: o.geolocation_url,
            atlas_source: o.atlas,
            atlas_object: o.atlas_object,
            country_threshold: o.country_threshold,
            visit_threshold: o.visit_threshold,
            timeout_seconds: o.timeout_seconds,
            user_agent: o.user_agent,
            dedup: o.dedup,
            session_id: o.session_id,
            home_country: o.home_country,
            log_level: o.log_level,
            log_format: o.log_format,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Simulate a page load: record this visitor and evaluate the map
    Visit,
    /// Print the current visibility status
    Status,
    /// Print the tooltip for a region id (numeric, alpha-2 or alpha-3)
    Hover { region_id: String },
    /// Write the map as SVG
    Render {
        #[arg(long, short)]
        output: PathBuf,
        #[arg(long, default_value_t = DEFAULT_MAP_WIDTH)]
        width: u32,
        #[arg(long, default_value_t = DEFAULT_MAP_HEIGHT)]
        height: u32,
        /// Render even while the map is hidden
        #[arg(long)]
        force: bool,
    },
    /// Feed key presses to the debug trigger
    Keys { sequence: String },
    /// Write preset visit counts
    Seed {
        /// Use the larger demo data set instead of the debug preset
        #[arg(long)]
        demo: bool,
    },
    /// Clear all visit data
    Reset,
    /// Show the map regardless of the thresholds, then revert
    Preview {
        #[arg(long, default_value_t = PREVIEW_DURATION.as_millis() as u64)]
        duration_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config: Config = cli.options.into();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    if let Err(e) = execute(cli.command, &config).await {
        eprintln!("visitor-map error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn execute(command: Command, config: &Config) -> Result<()> {
    let policy = VisibilityPolicy::from_config(config);

    match command {
        Command::Visit => {
            let report = run_page_load(config).await?;
            match &report.outcome {
                RecordOutcome::Recorded { country, record } => println!(
                    "Recorded visit from {} ({}): {} visit{}",
                    record.name,
                    country.code,
                    record.count,
                    if record.count == 1 { "" } else { "s" }
                ),
                RecordOutcome::DuplicateSession => println!("Session already counted"),
                RecordOutcome::LookupFailed => println!("Visitor country unavailable"),
                RecordOutcome::StorageFailed => println!("Visit could not be stored"),
            }
            println!("{}", policy.status_text(&report.state));
            println!(
                "Map: {} ({:.1}s)",
                report.renderer.state(),
                report.elapsed_seconds
            );
        }
        Command::Status => {
            let state = policy.evaluate(&open_store(config).get_all());
            println!("{}", policy.status_text(&state));
            println!("Map visible: {}", state.is_map_visible);
        }
        Command::Hover { region_id } => {
            let records = open_store(config).get_all();
            let state = policy.evaluate(&records);
            let client = init_client(config).context("Failed to initialize HTTP client")?;
            let (mut renderer, _) = build_renderer(config, &client, &records, &state).await;
            println!("{}", renderer.on_hover(&region_id, &records));
        }
        Command::Render {
            output,
            width,
            height,
            force,
        } => {
            let records = open_store(config).get_all();
            let state = policy.evaluate_logged(&records);
            let client = init_client(config).context("Failed to initialize HTTP client")?;
            let (renderer, loaded) = build_renderer(config, &client, &records, &state).await;
            if !loaded {
                bail!("Map data could not be loaded from {}", config.atlas_source);
            }
            if !renderer.is_visible() && !force {
                bail!(
                    "Map is hidden ({}/{} countries, {}/{} visits); use --force to render anyway",
                    state.distinct_countries,
                    policy.country_threshold,
                    state.total_visits,
                    policy.visit_threshold
                );
            }
            tokio::fs::write(&output, render_svg(&renderer, width, height))
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Map written to {}", output.display());
        }
        Command::Keys { sequence } => {
            let mut store = open_store(config);
            let records = store.get_all();
            let mut renderer = MapRenderer::new();
            renderer.sync_with(&policy.evaluate(&records));

            let mut controller = DebugController::default();
            let mut activated = None;
            for key in sequence.chars() {
                if let Some(state) = controller.handle_key(key, &mut store, &policy, &mut renderer) {
                    activated = Some(state);
                }
            }
            match activated {
                Some(state) => {
                    println!("Debug data seeded");
                    println!("{}", policy.status_text(&state));
                }
                None => println!("No debug sequence entered"),
            }
        }
        Command::Seed { demo } => {
            let seed = if demo { DEMO_SEED } else { DEBUG_SEED };
            let mut store = open_store(config);
            store
                .try_seed(seed.iter().copied())
                .context("Failed to seed visitor data")?;
            let state = policy.evaluate_logged(&store.get_all());
            println!("{}", policy.status_text(&state));
        }
        Command::Reset => {
            open_store(config)
                .try_reset()
                .context("Failed to reset visitor data")?;
            println!("Visitor data cleared");
        }
        Command::Preview { duration_ms } => {
            let records = open_store(config).get_all();
            let state = policy.evaluate(&records);
            let mut renderer = MapRenderer::new();
            renderer.sync_with(&state);

            let duration = Duration::from_millis(duration_ms);
            println!("Map preview for {:.1}s", duration.as_secs_f64());
            println!("{}", policy.status_text(&state));
            renderer.preview_temporarily(duration).await;
            println!("Preview ended; map {}", renderer.state());
        }
    }
    Ok(())
}
