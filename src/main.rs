use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use vitrine::config::{self, CONFIG_FILE};
use vitrine::content::{self, SITE_FILE};
use vitrine::engine::{Capability, EngineSettings, Viewport};
use vitrine::generate;
use vitrine::output;
use vitrine::simulate::Simulator;

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(about = "Single-page portfolio builder with viewport-driven reveals")]
#[command(long_about = "\
Single-page portfolio builder with viewport-driven reveals

The page is rendered once at build time. In the browser a small wasm engine
watches the viewport: sections and cards slide in the first time they come
into view, project images are fetched only when they get close, and the
mobile menu and contact form swap their contents with exit-then-enter
transitions. Without JavaScript everything is simply shown.

Content structure:

  content/
  ├── site.toml       # Brand, navigation, hero, features, projects, contact copy
  ├── about.md        # Optional: markdown intro for the about section
  ├── config.toml     # Optional: motion, timing, colors (overrides defaults)
  └── assets/         # Copied to <output>/assets/ (favicon, fonts, images)

Run 'vitrine init' to start from the stock content, or 'vitrine gen-config'
to see every config option documented.")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG wins if set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the page and copy assets into the output directory
    Build {
        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
    },
    /// Validate content and config without writing anything
    Check,
    /// Drive the engine headlessly through a visit and print what it does
    Simulate(SimulateArgs),
    /// Write stock site.toml and config.toml into the content directory
    Init {
        /// Replace files that already exist
        #[arg(long)]
        force: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// Print a stock site.toml
    GenContent,
}

#[derive(clap::Args)]
struct SimulateArgs {
    /// Viewport width in CSS pixels
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Viewport height in CSS pixels
    #[arg(long, default_value_t = 800.0)]
    height: f64,

    /// Pixels scrolled per step
    #[arg(long, default_value_t = 400.0)]
    step: f64,

    /// Milliseconds spent at each scroll position
    #[arg(long, default_value_t = 150)]
    dwell: u64,

    /// Behave like a browser without IntersectionObserver
    #[arg(long)]
    no_observer: bool,

    /// Also list events that produced no effects
    #[arg(long)]
    all: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Build { output: out_dir } => {
            println!("==> Building {}", cli.source.display());
            let report = generate::build(&cli.source, &out_dir)?;
            output::print_build_output(&report);
            println!("==> Build complete: {}", out_dir.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let (site, summary) = generate::check(&cli.source)?;
            output::print_check_output(&site, &summary);
            println!("==> Content is valid");
        }
        Command::Simulate(args) => simulate(&cli.source, &args)?,
        Command::Init { force } => {
            std::fs::create_dir_all(&cli.source)?;
            write_stock(&cli.source.join(SITE_FILE), content::stock_site_toml(), force)?;
            write_stock(&cli.source.join(CONFIG_FILE), config::stock_config_toml(), force)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::GenContent => {
            print!("{}", content::stock_site_toml());
        }
    }

    Ok(())
}

/// Route `tracing` output to stderr. `RUST_LOG` overrides the flags.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vitrine={level}")));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// A visit: land on the page, jump to the projects from the menu, scroll to
/// the bottom, send the contact form and ask for a fresh one.
fn simulate(source: &Path, args: &SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (site, config) = generate::load(source)?;
    let settings = EngineSettings::from(&config);
    let mut sim = Simulator::new(&site, settings, Viewport::new(args.width, args.height));
    let capability = if args.no_observer {
        Capability::Unavailable
    } else {
        Capability::Available
    };

    sim.mount(capability);
    sim.settle();
    sim.toggle_menu();
    sim.advance(Duration::from_millis(args.dwell));
    sim.click_nav("#projects");
    sim.settle();
    sim.scroll_to(0.0);
    sim.scroll_through(args.step, Duration::from_millis(args.dwell));
    sim.submit();
    sim.settle();
    sim.request_reset();
    sim.settle();
    sim.teardown();

    output::print_simulation(&sim, args.all);
    Ok(())
}

fn write_stock(path: &Path, contents: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        warn!(path = %path.display(), "exists, leaving it alone (use --force to replace)");
        println!("skipped {}", path.display());
        return Ok(());
    }
    std::fs::write(path, contents)?;
    info!(path = %path.display(), "wrote stock file");
    println!("wrote {}", path.display());
    Ok(())
}
