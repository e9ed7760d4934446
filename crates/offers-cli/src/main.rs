//! offers CLI: zero-shot offer search

mod shell;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use offers_core::search::ProgressEvent;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use offers_core::{
    discover, load_classifier, Classifier, Config, OfferIndex, SearchKind, Searcher, CONFIG_FILE,
};

#[derive(Parser)]
#[command(name = "offers")]
#[command(about = "Search offers by retailer, brand or category", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Project root (default: nearest directory with offers.json or data/)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default offers.json in the current directory
    Init,

    /// Show configuration and dataset statistics
    Status,

    /// Start an interactive search session (default)
    Shell,

    /// Search offers by retailer
    Retailer {
        /// Retailer name (case-insensitive)
        query: Vec<String>,
    },

    /// Search offers by brand
    Brand {
        /// Brand name (case-insensitive)
        query: Vec<String>,
    },

    /// Search offers by product category
    Category {
        /// Category name (case-sensitive)
        query: Vec<String>,
    },

    /// Search a randomly chosen retailer, brand or category
    Random {
        #[arg(value_enum)]
        kind: KindArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Retailer,
    Brand,
    Category,
}

impl From<KindArg> for SearchKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Retailer => SearchKind::Retailer,
            KindArg::Brand => SearchKind::Brand,
            KindArg::Category => SearchKind::Category,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(rust_log.as_deref()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => cmd_init(cli.root)?,
        Some(Commands::Status) => cmd_status(cli.root)?,
        Some(Commands::Shell) | None => cmd_shell(cli.root)?,
        Some(Commands::Retailer { query }) => {
            cmd_search(cli.root, SearchKind::Retailer, &query.join(" "))?
        }
        Some(Commands::Brand { query }) => {
            cmd_search(cli.root, SearchKind::Brand, &query.join(" "))?
        }
        Some(Commands::Category { query }) => {
            cmd_search(cli.root, SearchKind::Category, &query.join(" "))?
        }
        Some(Commands::Random { kind }) => cmd_random(cli.root, kind.into())?,
    }

    Ok(())
}

/// Directives from `RUST_LOG` when set, `warn` otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(directives.unwrap_or_default())
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(root) => Ok(root),
        None => {
            let cwd = std::env::current_dir()?;
            discover::find_project_root(&cwd).context(
                "Not in an offers project. \
                 Run 'offers init' or create a data/ directory with the CSV files.",
            )
        }
    }
}

fn cmd_init(root: Option<PathBuf>) -> Result<()> {
    let dir = match root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    Config::init(&dir)?;

    println!("Wrote {}", dir.join(CONFIG_FILE).display());
    println!("Put brand_category.csv, categories.csv and offer_retailer.csv in data/.");

    Ok(())
}

fn cmd_status(root: Option<PathBuf>) -> Result<()> {
    let root = resolve_root(root)?;
    let config = Config::load(&root)?;
    let index = load_index(&config, &root)?;
    let stats = index.stats();

    println!("offers project: {}", root.display());
    println!();
    println!("Configuration:");
    println!("  Data dir: {}", root.join(&config.data_dir).display());
    println!("  Model: {}", config.model);
    println!("  Hypothesis: {}", config.hypothesis_template);
    println!(
        "  Thresholds: retailer > {:.2}, brand > {:.2}, category > {:.2}",
        config.thresholds.retailer, config.thresholds.brand, config.thresholds.category
    );
    println!();
    println!("Dataset:");
    println!("  Retailers:  {}", stats.retailers);
    println!("  Brands:     {}", stats.brands);
    println!("  Categories: {}", stats.categories);
    println!("  Offers:     {}", stats.offers);
    println!("  Category groups: {}", stats.parent_categories);

    Ok(())
}

fn cmd_shell(root: Option<PathBuf>) -> Result<()> {
    let searcher = open_searcher(root)?;
    let mut shell = shell::Shell::new(&searcher, rand::rng());

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    shell.run(stdin.lock(), &mut stdout)
}

fn cmd_search(root: Option<PathBuf>, kind: SearchKind, query: &str) -> Result<()> {
    let searcher = open_searcher(root)?;
    shell::search(&searcher, kind, query, &mut std::io::stdout())
}

fn cmd_random(root: Option<PathBuf>, kind: SearchKind) -> Result<()> {
    let searcher = open_searcher(root)?;
    shell::random(&searcher, kind, &mut rand::rng(), &mut std::io::stdout())
}

/// Load the data and the model, and wire scoring progress to a progress bar.
fn open_searcher(root: Option<PathBuf>) -> Result<Searcher<Box<dyn Classifier>>> {
    let root = resolve_root(root)?;
    let config = Config::load(&root)?;
    tracing::debug!(root = %root.display(), model = %config.model, "Opening project");

    let pb = spinner("Loading offers...");
    let index = load_index(&config, &root)?;

    pb.set_message(format!("Loading model {}...", config.model));
    let classifier = load_classifier(&config).context("Failed to load relevance model")?;
    pb.finish_and_clear();

    let mut searcher = Searcher::new(index, classifier, config.thresholds);
    searcher.set_progress_callback(scoring_progress());
    Ok(searcher)
}

fn load_index(config: &Config, root: &Path) -> Result<OfferIndex> {
    OfferIndex::load(config, root).context("Failed to load offers data")
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb
}

/// A fresh bar per search, cleared once the last candidate is scored.
fn scoring_progress() -> offers_core::search::ProgressCallback {
    let current_bar: Mutex<Option<ProgressBar>> = Mutex::new(None);

    Box::new(move |event| match event {
        ProgressEvent::Scoring { current, total } => {
            let Ok(mut slot) = current_bar.lock() else {
                return;
            };
            let pb = slot.get_or_insert_with(|| {
                let pb = ProgressBar::new(total as u64);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                        .unwrap()
                        .progress_chars("█▓░"),
                );
                pb.set_message("Scoring offers...");
                pb
            });
            pb.set_position(current as u64);

            if current >= total {
                pb.finish_and_clear();
                *slot = None;
            }
        }
    })
}
