//! Standalone event tree browser
//!
//! Loads one catalog from a data directory, expands it, selects the given nodes and
//! prints the rendered rows followed by the selection the host would receive.
//!
//! Usage:
//!   browse_tree <data_dir> <source> <YYYY-MM-DD> [--check <node>]... [--hover <node>]...
//!
//! Example:
//!   browse_tree demos/data HEK 2023-01-01 --check path:0 --hover ivo://hek/FL_2

use chrono::{NaiveDate, TimeZone, Utc};
use event_tree::{FetchOutcome, JsonFileFetcher, NodeKey, TreeConfig, TreeController};
use std::cell::Cell;
use std::env;
use std::rc::Rc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!(
            "Usage: {} <data_dir> <source> <YYYY-MM-DD> [--check <node>]... [--hover <node>]...",
            args[0]
        );
        eprintln!("\nExample:");
        eprintln!("  {} demos/data HEK 2023-01-01 --check path:0", args[0]);
        std::process::exit(1);
    }

    let fetcher = JsonFileFetcher::new(&args[1]);
    let source = args[2].clone();
    let day = NaiveDate::parse_from_str(&args[3], "%Y-%m-%d")?;
    let date = Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap_or_default());

    let mut checks = Vec::new();
    let mut hovers = Vec::new();
    let mut i = 4;
    while i < args.len() {
        match args[i].as_str() {
            "--check" => {
                i += 1;
                if i < args.len() {
                    checks.push(NodeKey::from(args[i].as_str()));
                }
            }
            "--hover" => {
                i += 1;
                if i < args.len() {
                    hovers.push(NodeKey::from(args[i].as_str()));
                }
            }
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    let updates = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&updates);
    let mut tree = TreeController::new(TreeConfig::new(source, date))
        .on_events_update(move |_| counter.set(counter.get() + 1))
        .on_hovered_events_update(|keys| {
            let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
            println!("hover -> [{}]", keys.join(", "));
        });

    match tree.reload(&fetcher) {
        FetchOutcome::Ready { nodes } => println!("Loaded {} ({} nodes)\n", tree.slot_key(), nodes),
        _ => {
            eprintln!("Could not load {}: {:?}", tree.slot_key(), tree.state());
            std::process::exit(1);
        }
    }

    for key in &checks {
        if !tree.toggle(key) {
            eprintln!("No selectable node {}", key);
        }
    }
    for key in &hovers {
        tree.hover_enter(key);
    }
    tree.expand_all();

    println!("\n=== TREE ===");
    for row in tree.rows() {
        let marker = if row.hovered { ">" } else { " " };
        println!(
            "{}{}{} {} ({})",
            marker,
            "  ".repeat(row.depth),
            row.check_state,
            row.title,
            row.key
        );
    }

    let selected = tree.selected_events();
    println!("\n=== SELECTED ({}) after {} updates ===", selected.len(), updates.get());
    for event in &selected {
        println!("  [{}] {}", event.source, event.title);
    }

    Ok(())
}
