//! Solar Event Tree CLI Application
//!
//! This is the command-line host for the event-tree library.
//! It drives several tree instances side by side and adds:
//! - Catalog loading from a data directory
//! - Scripted check/expand/hover interactions (command line or config.toml)
//! - Merging of the per-source selections and hover sets
//! - Text and JSON reports

use anyhow::{bail, Result};
use clap::Parser;
use event_tree::{FetchOutcome, JsonFileFetcher, NodeKey, TreeController};
use std::io;
use std::path::PathBuf;

mod config;
mod host;
mod report;

use config::{ActionConfig, ActionKind, AppConfig, OutputFormat};
use host::Host;

/// Solar Event Tree - Browse and select solar event catalogs
#[derive(Parser, Debug)]
#[command(name = "event-tree-cli")]
#[command(about = "Browse solar event catalogs as selectable trees", long_about = None)]
#[command(version)]
struct Args {
    /// Directory holding <source>/<YYYY-MM-DD>.json catalogs
    #[arg(short, long, value_name = "DIR")]
    data: Option<PathBuf>,

    /// Source to show (can be repeated; default: HEK, CCMC, RHESSI)
    #[arg(short, long, value_name = "SOURCE")]
    source: Vec<String>,

    /// Date of the catalogs (YYYY-MM-DD or RFC 3339; default: now)
    #[arg(long, value_name = "DATE")]
    date: Option<String>,

    /// Toggle a node, given as SOURCE:NODE (can be repeated)
    #[arg(long, value_name = "SOURCE:NODE")]
    check: Vec<String>,

    /// Hover a node, given as SOURCE:NODE (can be repeated)
    #[arg(long, value_name = "SOURCE:NODE")]
    hover: Vec<String>,

    /// Expand every category before printing
    #[arg(long)]
    expand_all: bool,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Solar Event Tree CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using event-tree library v{}", event_tree::VERSION);

    let mut app = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };
    merge_args(&mut app, &args)?;
    app.validate()?;

    let date = match &app.data.date {
        Some(date) => config::parse_date(date)?,
        None => chrono::Utc::now(),
    };
    let data_dir = app.data.dir.clone().unwrap_or_else(|| PathBuf::from("data"));
    let fetcher = JsonFileFetcher::new(&data_dir);

    let mut host = Host::new(app.tree_configs(date));
    for tree in host.trees_mut() {
        load_tree(tree, &fetcher);
    }

    for action in &app.actions {
        apply_action(&mut host, action);
    }
    if app.output.expand_all {
        for tree in host.trees_mut() {
            tree.expand_all();
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match app.output.format {
        OutputFormat::Text => report::write_text(&mut out, &host)?,
        OutputFormat::Json => report::write_json(&mut out, &host)?,
    }

    Ok(())
}

/// Fold command-line arguments into the loaded configuration
///
/// Sources and dates from the command line replace the config's; interactions are
/// appended after the scripted ones.
fn merge_args(app: &mut AppConfig, args: &Args) -> Result<()> {
    if let Some(dir) = &args.data {
        app.data.dir = Some(dir.clone());
    }
    if let Some(date) = &args.date {
        app.data.date = Some(date.clone());
    }
    if !args.source.is_empty() {
        app.trees = args
            .source
            .iter()
            .map(|source| config::TreeEntry {
                source: source.clone(),
                api_url: None,
            })
            .collect();
    }

    for arg in &args.check {
        app.actions.push(parse_node_arg(arg, ActionKind::Toggle)?);
    }
    for arg in &args.hover {
        app.actions.push(parse_node_arg(arg, ActionKind::Hover)?);
    }

    if args.expand_all {
        app.output.expand_all = true;
    }
    if args.json {
        app.output.format = OutputFormat::Json;
    }
    Ok(())
}

/// Split `SOURCE:NODE`; the node part may itself contain colons
fn parse_node_arg(arg: &str, action: ActionKind) -> Result<ActionConfig> {
    let Some((source, node)) = arg.split_once(':') else {
        bail!("Expected SOURCE:NODE, got '{}'", arg);
    };
    if source.is_empty() || node.is_empty() {
        bail!("Expected SOURCE:NODE, got '{}'", arg);
    }
    Ok(ActionConfig {
        source: source.to_string(),
        action,
        node: node.to_string(),
    })
}

fn load_tree(tree: &mut TreeController, fetcher: &JsonFileFetcher) {
    match tree.reload(fetcher) {
        FetchOutcome::Ready { nodes } => {
            log::info!("{}: loaded {} nodes", tree.slot_key(), nodes)
        }
        FetchOutcome::Failed => {
            log::warn!("{}: {:?}", tree.slot_key(), tree.state())
        }
        FetchOutcome::Discarded => {}
    }
}

fn apply_action(host: &mut Host, action: &ActionConfig) {
    let Some(tree) = host.tree_mut(&action.source) else {
        log::warn!("No tree for source {}", action.source);
        return;
    };
    let key = NodeKey::from(action.node.as_str());

    let applied = match action.action {
        ActionKind::Check => tree.set_category_checked(&key, true),
        ActionKind::Uncheck => tree.set_category_checked(&key, false),
        ActionKind::Toggle => tree.toggle(&key),
        ActionKind::Expand => tree.set_expanded(&key, true),
        ActionKind::Collapse => tree.set_expanded(&key, false),
        ActionKind::Hover => tree.hover_enter(&key),
        ActionKind::Unhover => tree.hover_leave(&key),
    };
    if !applied {
        log::warn!(
            "{:?} on {}:{} had no effect",
            action.action,
            action.source,
            action.node
        );
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
