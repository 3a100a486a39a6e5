//! Horizon TreeGrid Job History Example
//!
//! Loads a flat job-history result set, prints the tree the grid would
//! draw, and walks through a few clicks, key presses, and filters.
//!
//! Run with: cargo run -p horizon-treegrid --example job_history
//!
//! Set `RUST_LOG=horizon_treegrid=debug` to see the annotator and filter logs.

use horizon_treegrid::prelude::*;
use horizon_treegrid::{HierarchyDebug, TreeFormatOptions};
use tracing_subscriber::EnvFilter;

fn job(name: &str, status: &str, duration_secs: i64) -> Record {
    let mut record = Record::new();
    record.insert("name".into(), name.into());
    record.insert("status".into(), status.into());
    record.insert("duration".into(), duration_secs.into());
    record
}

/// Rows as a job-history query returns them: runs and their steps in one
/// flat list, with each step pointing back at its run.
fn history() -> Vec<Row<Record>> {
    vec![
        Row::from_parent_field(None, job("nightly backup", "Failed", 312)),
        Row::from_parent_field(Some(0), job("snapshot volumes", "Succeeded", 120)),
        Row::from_parent_field(Some(0), job("upload to archive", "Failed", 190)),
        Row::from_parent_field(Some(2), job("retry upload", "Failed", 2)),
        Row::from_parent_field(None, job("log rotation", "Succeeded", 4)),
        Row::from_parent_field(None, job("index rebuild", "Succeeded", 840)),
        Row::from_parent_field(Some(5), job("scan tables", "Succeeded", 600)),
        Row::from_parent_field(Some(5), job("write indexes", "Succeeded", 240)),
        // Parent row 99 was trimmed from the result set.
        Row::from_parent_field(Some(99), job("orphaned step", "Unknown", 0)),
    ]
}

fn print_tree(grid: &TreeGrid<Record>, title: &str) {
    println!("--- {title} ---");
    println!("{}", grid.debug_tree(TreeFormatOptions::visible_only()));
    for row in grid.visible_rows() {
        let Ok(aria) = grid.aria(row.index()) else {
            continue;
        };
        let attributes: Vec<String> = aria
            .to_pairs()
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        println!("  {:<20} {}", row.data().label(), attributes.join(" "));
    }
    println!();
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut grid = TreeGrid::new(TreeGridConfig::default());

    grid.signals().render_requested.connect(|request| {
        println!("[render] {} visible rows ({:?})", request.visible_rows, request.reason);
    });
    grid.signals().focus_requested.connect(|row| {
        println!("[focus] row {row}");
    });

    grid.load(history())?;
    println!(
        "{}",
        HierarchyDebug::with_options(TreeFormatOptions::default()).format_all(&grid)
    );
    print_tree(&grid, "after load");

    grid.handle_input(TreeGridInput::click(0))?;
    grid.handle_input(TreeGridInput::key(2, TreeGridKey::Enter, 0, 3))?;
    print_tree(&grid, "backup expanded");

    // Clicking a leaf does nothing.
    let transition = grid.handle_input(TreeGridInput::click(1))?;
    println!("click on leaf: {transition:?}\n");

    grid.handle_input(TreeGridInput::key(0, TreeGridKey::ArrowLeft, 0, 3))?;
    print_tree(&grid, "backup collapsed");

    grid.batch_update(|grid| {
        grid.add_column_filter(ColumnFilter::one_of("status", ["Failed"]));
        grid.expand_all()
    })?;
    print_tree(&grid, "failed runs, all expanded");

    grid.clear_column_filters();
    grid.set_search_text("index");
    print_tree(&grid, "search: index");

    if let Err(err) = grid.toggle(42) {
        println!("toggle(42): {err}");
    }

    Ok(())
}
