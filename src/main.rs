// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use chrono::Local;
use std::env;
use std::path::PathBuf;

// Use library instead of local modules
use kharcha::{
    dashboard_stats, export_csv, format_date, format_inr, import_csv, ExpenseStore, Storage,
};

/// Database path: KHARCHA_DB env var, else ./kharcha.db
fn db_path() -> PathBuf {
    env::var("KHARCHA_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("kharcha.db"))
}

/// Open storage and hydrate the store. A storage failure degrades to an
/// empty in-memory session instead of refusing to start.
fn open_session() -> (ExpenseStore, Option<Storage>) {
    let mut store = ExpenseStore::new();

    match Storage::open(&db_path()) {
        Ok(storage) => {
            match storage.load() {
                Ok(expenses) => store.load(expenses),
                Err(e) => eprintln!("⚠ Could not read saved expenses ({}), starting empty", e),
            }
            (store, Some(storage))
        }
        Err(e) => {
            eprintln!("⚠ Storage unavailable ({}), changes will not persist", e);
            (store, None)
        }
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("summary") => run_summary(),
        Some("export") => run_export(args.get(2).map(String::as_str)),
        Some("import") => run_import(args.get(2).map(String::as_str)),
        _ => run_ui_mode(),
    }
}

/// Print the dashboard figures to stdout.
fn run_summary() -> Result<()> {
    let (store, _) = open_session();
    let today = Local::now().date_naive();
    let stats = dashboard_stats(store.all(), today);

    println!("💸 kharcha — expense summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("This month:   {}", format_inr(stats.month_total));
    println!("Last month:   {}", format_inr(stats.previous_month_total));
    println!(
        "Change:       {}{:.1}%",
        if stats.monthly_change >= 0.0 { "+" } else { "" },
        stats.monthly_change
    );
    println!("All time:     {}", format_inr(stats.all_time_total));
    println!("Transactions: {}", stats.transaction_count);

    if !stats.top_categories.is_empty() {
        println!("\nTop categories:");
        for share in &stats.top_categories {
            println!(
                "  {:<20} {:>12}  {:.1}%",
                share.category,
                format_inr(share.amount),
                share.percentage
            );
        }
    }

    if !stats.recent.is_empty() {
        println!("\nRecent expenses:");
        for expense in &stats.recent {
            println!(
                "  {}  {:<24} {:>12}",
                format_date(expense.date),
                expense.description,
                format_inr(expense.amount)
            );
        }
    }

    Ok(())
}

fn run_export(path: Option<&str>) -> Result<()> {
    let (store, _) = open_session();
    let path = PathBuf::from(path.unwrap_or("kharcha-export.csv"));

    let written = export_csv(&path, store.all())?;
    println!("✓ Exported {} expenses to {:?}", written, path);
    Ok(())
}

fn run_import(path: Option<&str>) -> Result<()> {
    let (mut store, storage) = open_session();
    let path = PathBuf::from(path.unwrap_or("kharcha-export.csv"));

    let (inputs, rejected) = import_csv(&path)?;
    let mut added = 0;
    for input in inputs {
        if store.add(input).is_ok() {
            added += 1;
        }
    }

    if let Some(mut storage) = storage {
        storage.save(&store.snapshot())?;
    }

    println!("✓ Imported {} expenses from {:?}", added, path);
    if !rejected.is_empty() {
        println!("⚠ Rejected {} invalid rows:", rejected.len());
        for error in rejected {
            println!("  - {}", error);
        }
    }
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode() -> Result<()> {
    let (store, storage) = open_session();

    println!("📊 Loaded {} expenses", store.len());
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(store, storage);
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode() -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin kharcha-server --features server");
    eprintln!("   CLI fallback:  kharcha summary | export | import");
    std::process::exit(1);
}
