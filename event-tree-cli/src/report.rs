//! Report generation
//!
//! Text output draws each tree the way a tree view would show it; JSON output
//! carries the same information for scripting.

use crate::host::Host;
use event_tree::{SlotState, TreeController, TreeRow};
use serde::Serialize;
use std::io::{self, Write};

/// State of one tree instance in a JSON report
#[derive(Debug, Serialize)]
pub struct TreeReport {
    pub slot: String,
    pub state: String,
    pub rows: Vec<TreeRow>,
}

/// Complete JSON report of a host
#[derive(Debug, Serialize)]
pub struct HostReport {
    pub trees: Vec<TreeReport>,
    pub selected: Vec<event_tree::SelectedEvent>,
    pub hovered: Vec<crate::host::HoveredNode>,
}

fn state_label(state: &SlotState) -> String {
    match state {
        SlotState::Empty => "empty".to_string(),
        SlotState::Loading => "loading".to_string(),
        SlotState::Ready => "ready".to_string(),
        SlotState::Error(msg) => format!("error: {}", msg),
    }
}

impl HostReport {
    pub fn from_host(host: &Host) -> Self {
        Self {
            trees: host
                .trees()
                .iter()
                .map(|tree| TreeReport {
                    slot: tree.slot_key().to_string(),
                    state: state_label(tree.state()),
                    rows: tree.rows(),
                })
                .collect(),
            selected: host.selected(),
            hovered: host.hovered(),
        }
    }
}

/// Draw one tree instance
pub fn write_tree(out: &mut impl Write, tree: &TreeController) -> io::Result<()> {
    writeln!(out, "── {} ({}) ──", tree.slot_key(), state_label(tree.state()))?;

    let rows = tree.rows();
    if rows.is_empty() {
        writeln!(out, "  (no events)")?;
    }
    for row in &rows {
        let fold = match (row.is_category, row.expanded) {
            (false, _) => " ",
            (true, true) => "▾",
            (true, false) => "▸",
        };
        let hover = if row.hovered { " ◀" } else { "" };
        let count = if row.is_category {
            format!(" ({})", row.child_count)
        } else {
            String::new()
        };
        writeln!(
            out,
            "  {}{} {} {}{}{}",
            "  ".repeat(row.depth),
            fold,
            row.check_state,
            row.title,
            count,
            hover
        )?;
    }
    writeln!(out)
}

/// Draw every tree followed by the merged selection and hover set
pub fn write_text(out: &mut impl Write, host: &Host) -> io::Result<()> {
    for tree in host.trees() {
        write_tree(out, tree)?;
    }

    let selected = host.selected();
    writeln!(out, "Selected events: {}", selected.len())?;
    for event in &selected {
        writeln!(out, "  [{}] {} ({})", event.source, event.title, event.key)?;
    }

    let hovered = host.hovered();
    if !hovered.is_empty() {
        writeln!(out, "Hovered:")?;
        for node in &hovered {
            writeln!(out, "  [{}] {}", node.source, node.key)?;
        }
    }
    Ok(())
}

/// Pretty-printed JSON report
pub fn write_json(out: &mut impl Write, host: &Host) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &HostReport::from_host(host))?;
    writeln!(out)?;
    Ok(())
}
