// Durable storage boundary - SQLite file + CSV transfer
//
// The store is the source of truth while the app runs; this module only
// hydrates it at startup and receives the full snapshot after each mutation.
// A fresh or unreadable database means "nothing persisted yet", never a
// fatal error.

use crate::store::{Expense, ExpenseInput, ValidationError};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {:?}", path))?;
        let storage = Storage { conn };
        storage.setup()?;
        Ok(storage)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        let storage = Storage { conn };
        storage.setup()?;
        Ok(storage)
    }

    fn setup(&self) -> Result<()> {
        // WAL keeps the frequent full-snapshot writes cheap
        let _ = self.conn.pragma_update(None, "journal_mode", "WAL");

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS expenses (
                id TEXT PRIMARY KEY,
                amount REAL NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date)",
            [],
        )?;

        Ok(())
    }

    /// Read the persisted collection in its persisted order. Rows that no
    /// longer parse (hand-edited files) are skipped rather than failing the
    /// whole load.
    pub fn load(&self) -> Result<Vec<Expense>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, amount, description, category, date, created_at
             FROM expenses
             ORDER BY rowid ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let date_str: String = row.get(4)?;
            let created_str: String = row.get(5)?;
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                date_str,
                created_str,
            ))
        })?;

        let mut expenses = Vec::new();
        for row in rows {
            let (id, amount, description, category, date_str, created_str) = row?;

            let date: NaiveDate = match date_str.parse() {
                Ok(d) => d,
                Err(_) => continue,
            };
            let created_at = match DateTime::parse_from_rfc3339(&created_str) {
                Ok(dt) => dt.with_timezone(&Utc),
                Err(_) => continue,
            };

            expenses.push(Expense {
                id,
                amount,
                description,
                category,
                date,
                created_at,
            });
        }

        Ok(expenses)
    }

    /// Replace the persisted collection with the given snapshot, atomically.
    pub fn save(&mut self, expenses: &[Expense]) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM expenses", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO expenses (id, amount, description, category, date, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for expense in expenses {
                stmt.execute(params![
                    expense.id,
                    expense.amount,
                    expense.description,
                    expense.category,
                    expense.date.to_string(),
                    expense.created_at.to_rfc3339(),
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    pub fn count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?;
        Ok(count)
    }
}

// ============================================================================
// CSV TRANSFER
// ============================================================================

/// Row shape shared by export and import.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRecord {
    date: String,
    amount: f64,
    description: String,
    category: String,
}

/// Write the collection as CSV (date, amount, description, category).
pub fn export_csv(path: &Path, expenses: &[Expense]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create CSV file at {:?}", path))?;

    for expense in expenses {
        writer.serialize(CsvRecord {
            date: expense.date.to_string(),
            amount: expense.amount,
            description: expense.description.clone(),
            category: expense.category.clone(),
        })?;
    }
    writer.flush()?;

    Ok(expenses.len())
}

/// Read rows back as validated [`ExpenseInput`]s. Rows failing validation
/// are returned separately so the caller can report them without aborting
/// the import.
pub fn import_csv(path: &Path) -> Result<(Vec<ExpenseInput>, Vec<ValidationError>)> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("failed to open CSV at {:?}", path))?;

    let mut inputs = Vec::new();
    let mut rejected = Vec::new();

    for record in reader.deserialize() {
        let record: CsvRecord = record.context("failed to parse CSV row")?;

        let date: NaiveDate = match record.date.parse() {
            Ok(d) => d,
            Err(_) => {
                rejected.push(ValidationError {
                    field: "date".to_string(),
                    message: format!("'{}' is not a valid date", record.date),
                });
                continue;
            }
        };

        let input = ExpenseInput {
            amount: record.amount,
            description: record.description,
            category: record.category,
            date,
        };
        match input.validate() {
            Ok(()) => inputs.push(input),
            Err(mut errors) => rejected.append(&mut errors),
        }
    }

    Ok((inputs, rejected))
}

// ============================================================================
// TESTS
// ============================================================================
