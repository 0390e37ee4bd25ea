// Aggregation engine - pure functions from the record collection to the
// derived figures the dashboard and analytics pages display.
//
// Everything here is recomputed in full on every call. At the data volumes
// this tool targets (hundreds to low thousands of records) that is cheaper
// than carrying an invalidation scheme.

use crate::store::Expense;
use chrono::{Datelike, NaiveDate};

pub const MONTHS_PER_YEAR: usize = 12;

/// Number of dashboard top categories and recent records.
pub const DASHBOARD_TOP_N: usize = 5;

// ============================================================================
// OUTPUT SHAPES
// ============================================================================

/// One category's slice of a year's spending.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub amount: f64,
    /// Share of the year total, 0..=100. 0 when the year total is 0.
    pub percentage: f64,
}

/// One calendar month's bucket in a year-scoped series.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthBucket {
    pub amount: f64,
    pub count: usize,
}

/// Year-scoped analytics, as rendered by the analytics page.
#[derive(Debug, Clone)]
pub struct YearReport {
    pub year: i32,
    pub breakdown: Vec<CategoryShare>,
    pub monthly: [MonthBucket; MONTHS_PER_YEAR],
    pub total: f64,
    /// Year total / 12, regardless of how many months carry data.
    pub monthly_average: f64,
    /// (month index 0..=11, amount) of the highest-spending month; first
    /// occurrence wins ties. None when the year has no records.
    pub highest_month: Option<(usize, f64)>,
    pub monthly_trend: f64,
    pub transaction_count: usize,
}

/// Dashboard figures. Not year-scoped: current/previous month are filtered
/// on explicit (month, year) pairs from the raw dates.
#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub month_total: f64,
    pub previous_month_total: f64,
    /// Percentage change vs the previous calendar month, 0 when that month
    /// had no spending.
    pub monthly_change: f64,
    pub all_time_total: f64,
    pub transaction_count: usize,
    pub top_categories: Vec<CategoryShare>,
    pub recent: Vec<Expense>,
}

// ============================================================================
// YEAR-SCOPED QUERIES
// ============================================================================

fn in_year<'a>(expenses: &'a [Expense], year: i32) -> impl Iterator<Item = &'a Expense> {
    expenses.iter().filter(move |e| e.date.year() == year)
}

fn percentage_of(amount: f64, total: f64) -> f64 {
    if total > 0.0 {
        (amount / total) * 100.0
    } else {
        0.0
    }
}

/// Group a year's records by category and size each group against the year
/// total. Sorted descending by amount; equal amounts keep the order in which
/// the groups were first formed.
pub fn category_breakdown(expenses: &[Expense], year: i32) -> Vec<CategoryShare> {
    let mut groups: Vec<(String, f64)> = Vec::new();

    for expense in in_year(expenses, year) {
        match groups.iter_mut().find(|(name, _)| *name == expense.category) {
            Some((_, sum)) => *sum += expense.amount,
            None => groups.push((expense.category.clone(), expense.amount)),
        }
    }

    let total: f64 = groups.iter().map(|(_, sum)| sum).sum();

    let mut breakdown: Vec<CategoryShare> = groups
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            category,
            amount,
            percentage: percentage_of(amount, total),
        })
        .collect();

    // Stable sort keeps first-formation order among equal amounts
    breakdown.sort_by(|a, b| b.amount.partial_cmp(&a.amount).unwrap_or(std::cmp::Ordering::Equal));
    breakdown
}

/// Sum and count per calendar month of the given year. Always 12 buckets,
/// index 0 = January; months without records stay at {0, 0}.
pub fn monthly_series(expenses: &[Expense], year: i32) -> [MonthBucket; MONTHS_PER_YEAR] {
    let mut series = [MonthBucket::default(); MONTHS_PER_YEAR];

    for expense in in_year(expenses, year) {
        let slot = &mut series[expense.date.month0() as usize];
        slot.amount += expense.amount;
        slot.count += 1;
    }

    series
}

/// Month-over-month change within the 12-slot series of the selected year.
///
/// The previous slot of January is index 11 - the *selected year's*
/// December, not the prior year's. For the current year that slot holds
/// future months and is usually 0, which makes a January trend read as 0.
/// This mirrors the shipped behavior; reports would silently change if the
/// wrap ever crossed the year boundary, so it stays.
pub fn monthly_trend(series: &[MonthBucket; MONTHS_PER_YEAR], current_month0: usize) -> f64 {
    let current = series[current_month0 % MONTHS_PER_YEAR].amount;
    let previous = series[(current_month0 + MONTHS_PER_YEAR - 1) % MONTHS_PER_YEAR].amount;

    if previous > 0.0 {
        ((current - previous) / previous) * 100.0
    } else {
        0.0
    }
}

/// Everything the analytics page needs for one year, in one pass over the
/// individual queries. `today` supplies the reference month for the trend.
pub fn year_report(expenses: &[Expense], year: i32, today: NaiveDate) -> YearReport {
    let breakdown = category_breakdown(expenses, year);
    let monthly = monthly_series(expenses, year);

    let total: f64 = monthly.iter().map(|m| m.amount).sum();
    let transaction_count: usize = monthly.iter().map(|m| m.count).sum();

    let highest_month = if transaction_count == 0 {
        None
    } else {
        let mut best = (0usize, monthly[0].amount);
        for (index, bucket) in monthly.iter().enumerate().skip(1) {
            if bucket.amount > best.1 {
                best = (index, bucket.amount);
            }
        }
        Some(best)
    };

    YearReport {
        year,
        monthly_trend: monthly_trend(&monthly, today.month0() as usize),
        breakdown,
        monthly,
        total,
        monthly_average: total / MONTHS_PER_YEAR as f64,
        highest_month,
        transaction_count,
    }
}

/// Distinct years present across all records, newest first. An empty store
/// still offers the current year so the year selector has something to show.
pub fn available_years(expenses: &[Expense], today: NaiveDate) -> Vec<i32> {
    let mut years: Vec<i32> = expenses.iter().map(|e| e.date.year()).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();

    if years.is_empty() {
        years.push(today.year());
    }
    years
}

// ============================================================================
// DASHBOARD QUERIES
// ============================================================================

fn month_total(expenses: &[Expense], month: u32, year: i32) -> f64 {
    expenses
        .iter()
        .filter(|e| e.date.month() == month && e.date.year() == year)
        .map(|e| e.amount)
        .sum()
}

/// Dashboard stats over the whole collection.
///
/// Unlike [`monthly_trend`], the previous month here is a real (month, year)
/// pair: January looks back at December of the prior year.
pub fn dashboard_stats(expenses: &[Expense], today: NaiveDate) -> DashboardStats {
    let month = today.month();
    let year = today.year();
    let (prev_month, prev_year) = if month == 1 {
        (12, year - 1)
    } else {
        (month - 1, year)
    };

    let current = month_total(expenses, month, year);
    let previous = month_total(expenses, prev_month, prev_year);

    let monthly_change = if previous > 0.0 {
        ((current - previous) / previous) * 100.0
    } else {
        0.0
    };

    let all_time_total: f64 = expenses.iter().map(|e| e.amount).sum();

    // All-time category totals, top five
    let mut groups: Vec<(String, f64)> = Vec::new();
    for expense in expenses {
        match groups.iter_mut().find(|(name, _)| *name == expense.category) {
            Some((_, sum)) => *sum += expense.amount,
            None => groups.push((expense.category.clone(), expense.amount)),
        }
    }
    groups.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let top_categories: Vec<CategoryShare> = groups
        .into_iter()
        .take(DASHBOARD_TOP_N)
        .map(|(category, amount)| CategoryShare {
            category,
            amount,
            percentage: percentage_of(amount, all_time_total),
        })
        .collect();

    DashboardStats {
        month_total: current,
        previous_month_total: previous,
        monthly_change,
        all_time_total,
        transaction_count: expenses.len(),
        top_categories,
        recent: expenses.iter().take(DASHBOARD_TOP_N).cloned().collect(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn expense(id: &str, amount: f64, category: &str, date: &str) -> Expense {
        Expense {
            id: id.to_string(),
            amount,
            description: format!("test {}", id),
            category: category.to_string(),
            date: date.parse().unwrap(),
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_breakdown_two_records_splits_75_25() {
        // Store order is newest-first; dates are what matter here
        let expenses = vec![
            expense("b", 100.0, "Transportation", "2024-01-10"),
            expense("a", 300.0, "Food & Dining", "2024-01-05"),
        ];

        let breakdown = category_breakdown(&expenses, 2024);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].category, "Food & Dining");
        assert_eq!(breakdown[0].amount, 300.0);
        assert!((breakdown[0].percentage - 75.0).abs() < 1e-9);
        assert_eq!(breakdown[1].category, "Transportation");
        assert_eq!(breakdown[1].amount, 100.0);
        assert!((breakdown[1].percentage - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_percentages_sum_to_100() {
        let expenses = vec![
            expense("a", 333.33, "Food & Dining", "2024-01-05"),
            expense("b", 123.45, "Travel", "2024-03-09"),
            expense("c", 0.01, "Others", "2024-07-21"),
            expense("d", 999.99, "Groceries", "2024-11-30"),
        ];

        let breakdown = category_breakdown(&expenses, 2024);
        let sum: f64 = breakdown.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_empty_year_has_no_entries_and_no_division() {
        let expenses = vec![expense("a", 300.0, "Food & Dining", "2023-01-05")];

        let breakdown = category_breakdown(&expenses, 2024);
        assert!(breakdown.is_empty());
    }

    #[test]
    fn test_breakdown_single_record_is_100_percent() {
        let expenses = vec![expense("a", 42.0, "Healthcare", "2024-05-01")];

        let breakdown = category_breakdown(&expenses, 2024);
        assert_eq!(breakdown.len(), 1);
        assert!((breakdown[0].percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_all_one_category_is_single_entry() {
        let expenses = vec![
            expense("a", 10.0, "Groceries", "2024-01-01"),
            expense("b", 20.0, "Groceries", "2024-06-15"),
            expense("c", 30.0, "Groceries", "2024-12-31"),
        ];

        let breakdown = category_breakdown(&expenses, 2024);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].amount, 60.0);
        assert!((breakdown[0].percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_ties_keep_first_seen_order() {
        let expenses = vec![
            expense("a", 50.0, "Travel", "2024-02-01"),
            expense("b", 50.0, "Education", "2024-02-02"),
        ];

        let breakdown = category_breakdown(&expenses, 2024);
        assert_eq!(breakdown[0].category, "Travel");
        assert_eq!(breakdown[1].category, "Education");
    }

    #[test]
    fn test_monthly_series_buckets_by_month() {
        let expenses = vec![
            expense("a", 300.0, "Food & Dining", "2024-01-05"),
            expense("b", 100.0, "Transportation", "2024-01-10"),
        ];

        let series = monthly_series(&expenses, 2024);
        assert_eq!(series.len(), MONTHS_PER_YEAR);
        assert_eq!(series[0].amount, 400.0);
        assert_eq!(series[0].count, 2);
        for bucket in &series[1..] {
            assert_eq!(bucket.amount, 0.0);
            assert_eq!(bucket.count, 0);
        }
    }

    #[test]
    fn test_monthly_series_sums_to_year_total() {
        let expenses = vec![
            expense("a", 120.0, "Shopping", "2024-02-14"),
            expense("b", 80.0, "Shopping", "2024-02-20"),
            expense("c", 55.5, "Travel", "2024-08-01"),
            expense("d", 1000.0, "Travel", "2023-08-01"), // other year, excluded
        ];

        let series = monthly_series(&expenses, 2024);
        let total: f64 = series.iter().map(|m| m.amount).sum();
        assert!((total - 255.5).abs() < 1e-9);
        assert_eq!(series[1].count, 2);
        assert_eq!(series[7].count, 1);
    }

    #[test]
    fn test_trend_zero_previous_month_is_exactly_zero() {
        let mut series = [MonthBucket::default(); MONTHS_PER_YEAR];
        series[3].amount = 500.0; // April spending, March empty

        let trend = monthly_trend(&series, 3);
        assert_eq!(trend, 0.0);
        assert!(trend.is_finite());
    }

    #[test]
    fn test_trend_percentage_change() {
        let mut series = [MonthBucket::default(); MONTHS_PER_YEAR];
        series[4].amount = 200.0;
        series[5].amount = 300.0;

        // June vs May: +50%
        assert!((monthly_trend(&series, 5) - 50.0).abs() < 1e-9);
        // May vs April (empty): 0
        assert_eq!(monthly_trend(&series, 4), 0.0);
    }

    #[test]
    fn test_trend_january_wraps_to_same_years_december_slot() {
        let mut series = [MonthBucket::default(); MONTHS_PER_YEAR];
        series[0].amount = 100.0;
        series[11].amount = 400.0;

        // January compares against slot 11 of the same series: -75%
        assert!((monthly_trend(&series, 0) - -75.0).abs() < 1e-9);
    }

    #[test]
    fn test_year_report_summary_figures() {
        let expenses = vec![
            expense("a", 300.0, "Food & Dining", "2024-01-05"),
            expense("b", 100.0, "Transportation", "2024-01-10"),
            expense("c", 600.0, "Travel", "2024-03-15"),
        ];

        let report = year_report(&expenses, 2024, day("2024-06-20"));
        assert_eq!(report.total, 1000.0);
        assert!((report.monthly_average - 1000.0 / 12.0).abs() < 1e-9);
        assert_eq!(report.transaction_count, 3);
        // March (index 2) is the highest month
        assert_eq!(report.highest_month, Some((2, 600.0)));
    }

    #[test]
    fn test_year_report_highest_month_ties_resolve_to_first() {
        let expenses = vec![
            expense("a", 100.0, "Others", "2024-04-01"),
            expense("b", 100.0, "Others", "2024-09-01"),
        ];

        let report = year_report(&expenses, 2024, day("2024-10-01"));
        assert_eq!(report.highest_month, Some((3, 100.0)));
    }

    #[test]
    fn test_year_report_empty_year_is_all_zero_with_sentinel() {
        let report = year_report(&[], 2024, day("2024-06-20"));
        assert_eq!(report.total, 0.0);
        assert_eq!(report.monthly_average, 0.0);
        assert_eq!(report.monthly_trend, 0.0);
        assert_eq!(report.transaction_count, 0);
        assert_eq!(report.highest_month, None);
        assert!(report.breakdown.is_empty());
    }

    #[test]
    fn test_available_years_descending_distinct() {
        let expenses = vec![
            expense("a", 1.0, "Others", "2022-05-01"),
            expense("b", 1.0, "Others", "2024-01-01"),
            expense("c", 1.0, "Others", "2022-11-11"),
            expense("d", 1.0, "Others", "2023-06-06"),
        ];

        assert_eq!(available_years(&expenses, day("2024-06-01")), vec![2024, 2023, 2022]);
    }

    #[test]
    fn test_available_years_empty_store_defaults_to_current() {
        assert_eq!(available_years(&[], day("2026-02-01")), vec![2026]);
    }

    #[test]
    fn test_dashboard_month_totals_and_change() {
        let expenses = vec![
            expense("a", 500.0, "Groceries", "2024-06-05"),
            expense("b", 250.0, "Groceries", "2024-05-20"),
            expense("c", 99.0, "Travel", "2023-06-05"), // same month, other year
        ];

        let stats = dashboard_stats(&expenses, day("2024-06-20"));
        assert_eq!(stats.month_total, 500.0);
        assert_eq!(stats.previous_month_total, 250.0);
        assert!((stats.monthly_change - 100.0).abs() < 1e-9);
        assert_eq!(stats.all_time_total, 849.0);
        assert_eq!(stats.transaction_count, 3);
    }

    #[test]
    fn test_dashboard_january_looks_at_prior_years_december() {
        let expenses = vec![
            expense("a", 100.0, "Others", "2024-01-10"),
            expense("b", 200.0, "Others", "2023-12-15"),
        ];

        let stats = dashboard_stats(&expenses, day("2024-01-20"));
        assert_eq!(stats.month_total, 100.0);
        assert_eq!(stats.previous_month_total, 200.0);
        assert!((stats.monthly_change - -50.0).abs() < 1e-9);
    }

    #[test]
    fn test_dashboard_change_is_zero_when_previous_month_empty() {
        let expenses = vec![expense("a", 100.0, "Others", "2024-06-10")];

        let stats = dashboard_stats(&expenses, day("2024-06-20"));
        assert_eq!(stats.monthly_change, 0.0);
        assert!(stats.monthly_change.is_finite());
    }

    #[test]
    fn test_dashboard_top_categories_capped_at_five() {
        let expenses = vec![
            expense("a", 60.0, "Food & Dining", "2024-01-01"),
            expense("b", 50.0, "Transportation", "2024-01-01"),
            expense("c", 40.0, "Shopping", "2024-01-01"),
            expense("d", 30.0, "Entertainment", "2024-01-01"),
            expense("e", 20.0, "Healthcare", "2024-01-01"),
            expense("f", 10.0, "Travel", "2024-01-01"),
        ];

        let stats = dashboard_stats(&expenses, day("2024-06-01"));
        assert_eq!(stats.top_categories.len(), 5);
        assert_eq!(stats.top_categories[0].category, "Food & Dining");
        assert_eq!(stats.top_categories[4].category, "Healthcare");
        assert!(stats
            .top_categories
            .iter()
            .all(|s| s.category != "Travel"));
    }

    #[test]
    fn test_dashboard_recent_follows_store_order_not_date_order() {
        // Newest-first store order, deliberately not date-sorted
        let expenses = vec![
            expense("f", 6.0, "Others", "2024-01-03"),
            expense("e", 5.0, "Others", "2024-09-01"),
            expense("d", 4.0, "Others", "2024-02-14"),
            expense("c", 3.0, "Others", "2024-08-30"),
            expense("b", 2.0, "Others", "2024-05-05"),
            expense("a", 1.0, "Others", "2024-12-25"),
        ];

        let stats = dashboard_stats(&expenses, day("2024-12-31"));
        let ids: Vec<&str> = stats.recent.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["f", "e", "d", "c", "b"]);
    }

    #[test]
    fn test_dashboard_empty_store() {
        let stats = dashboard_stats(&[], day("2024-06-20"));
        assert_eq!(stats.all_time_total, 0.0);
        assert_eq!(stats.transaction_count, 0);
        assert!(stats.top_categories.is_empty());
        assert!(stats.recent.is_empty());
        assert_eq!(stats.monthly_change, 0.0);
    }
}
