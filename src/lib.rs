// kharcha - personal expense tracker core
// Exposes all modules for use in the CLI, API server, and tests

pub mod analytics;
pub mod calc;
pub mod category;
pub mod format;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use analytics::{
    available_years, category_breakdown, dashboard_stats, monthly_series, monthly_trend,
    year_report, CategoryShare, DashboardStats, MonthBucket, YearReport,
};
pub use calc::{evaluate, CalcError};
pub use category::CATEGORIES;
pub use format::{format_date, format_date_short, format_inr, group_indian, month_name};
pub use storage::{export_csv, import_csv, Storage};
pub use store::{Expense, ExpenseInput, ExpensePatch, ExpenseStore, ValidationError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
