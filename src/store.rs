// Record Store - owns the expense collection
// Single-writer, newest-first; analytics read it through all()

use crate::category;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// EXPENSE RECORD
// ============================================================================

/// One logged spending event.
///
/// `id` and `created_at` are assigned by the store at creation and never
/// change afterwards. `created_at` only drives default (insertion) ordering;
/// analytics always work off the calendar `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub amount: f64,
    pub description: String,
    pub category: String,
    /// Calendar date of the spend (no time component).
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted from the boundary when creating a record.
#[derive(Debug, Clone)]
pub struct ExpenseInput {
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
}

/// Partial update: only `Some` fields are merged into the record.
#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
}

// ============================================================================
// VALIDATION
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

fn check_amount(amount: f64, errors: &mut Vec<ValidationError>) {
    if !amount.is_finite() || amount <= 0.0 {
        errors.push(ValidationError {
            field: "amount".to_string(),
            message: "must be a positive number".to_string(),
        });
    }
}

fn check_description(description: &str, errors: &mut Vec<ValidationError>) {
    if description.trim().is_empty() {
        errors.push(ValidationError {
            field: "description".to_string(),
            message: "must not be empty".to_string(),
        });
    }
}

fn check_category(name: &str, errors: &mut Vec<ValidationError>) {
    if !category::is_valid(name) {
        errors.push(ValidationError {
            field: "category".to_string(),
            message: format!("'{}' is not a known category", name),
        });
    }
}

impl ExpenseInput {
    /// Validate the underlying record invariants. The form layer is expected
    /// to have validated already; the store re-checks before mutating.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        check_amount(self.amount, &mut errors);
        check_description(&self.description, &mut errors);
        check_category(&self.category, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl ExpensePatch {
    /// Validate only the fields present in the patch.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Some(amount) = self.amount {
            check_amount(amount, &mut errors);
        }
        if let Some(ref description) = self.description {
            check_description(description, &mut errors);
        }
        if let Some(ref name) = self.category {
            check_category(name, &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.date.is_none()
    }
}

// ============================================================================
// EXPENSE STORE
// ============================================================================

/// The owned collection of expense records, most-recently-added first.
///
/// Exclusively owned and mutated by the single UI-event actor; there is no
/// interior mutability and no locking. Persistence is the caller's job:
/// flush `snapshot()` to storage after each mutation.
#[derive(Debug, Default)]
pub struct ExpenseStore {
    expenses: Vec<Expense>,
}

impl ExpenseStore {
    pub fn new() -> Self {
        ExpenseStore {
            expenses: Vec::new(),
        }
    }

    /// Create a record: assign id + creation timestamp, prepend, return it.
    pub fn add(&mut self, input: ExpenseInput) -> Result<&Expense, Vec<ValidationError>> {
        input.validate()?;

        let expense = Expense {
            id: uuid::Uuid::new_v4().to_string(),
            amount: input.amount,
            description: input.description.trim().to_string(),
            category: input.category,
            date: input.date,
            created_at: Utc::now(),
        };
        self.expenses.insert(0, expense);
        Ok(&self.expenses[0])
    }

    /// Merge the patch into the record matching `id`. Returns false when the
    /// id is absent (stale reference from the UI) - that is a no-op, not an
    /// error. An invalid patch leaves the record untouched.
    pub fn update(&mut self, id: &str, patch: ExpensePatch) -> Result<bool, Vec<ValidationError>> {
        patch.validate()?;

        match self.expenses.iter_mut().find(|e| e.id == id) {
            Some(expense) => {
                if let Some(amount) = patch.amount {
                    expense.amount = amount;
                }
                if let Some(description) = patch.description {
                    expense.description = description.trim().to_string();
                }
                if let Some(category) = patch.category {
                    expense.category = category;
                }
                if let Some(date) = patch.date {
                    expense.date = date;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove the record matching `id`. Absent id is a no-op.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id != id);
        self.expenses.len() != before
    }

    /// Current records in store order (most-recently-added first).
    pub fn all(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn get(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Bulk replace, used to hydrate from durable storage at startup.
    pub fn load(&mut self, expenses: Vec<Expense>) {
        self.expenses = expenses;
    }

    /// Bulk read, used to flush to durable storage after a mutation.
    pub fn snapshot(&self) -> Vec<Expense> {
        self.expenses.clone()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn input(amount: f64, description: &str, category: &str, date: &str) -> ExpenseInput {
        ExpenseInput {
            amount,
            description: description.to_string(),
            category: category.to_string(),
            date: date.parse().unwrap(),
        }
    }

    #[test]
    fn test_add_returns_record_with_matching_fields() {
        let mut store = ExpenseStore::new();
        let created = store
            .add(input(300.0, "Lunch thali", "Food & Dining", "2024-01-05"))
            .unwrap()
            .clone();

        assert_eq!(store.len(), 1);
        let stored = &store.all()[0];
        assert_eq!(stored, &created);
        assert_eq!(stored.amount, 300.0);
        assert_eq!(stored.description, "Lunch thali");
        assert_eq!(stored.category, "Food & Dining");
        assert_eq!(stored.date.to_string(), "2024-01-05");
        assert!(!stored.id.is_empty());
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let mut store = ExpenseStore::new();
        for i in 0..50 {
            store
                .add(input(10.0 + i as f64, "x", "Others", "2024-03-01"))
                .unwrap();
        }

        let mut ids: Vec<String> = store.all().iter().map(|e| e.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_add_prepends_newest_first() {
        let mut store = ExpenseStore::new();
        store.add(input(1.0, "first", "Others", "2024-01-01")).unwrap();
        store.add(input(2.0, "second", "Others", "2024-01-01")).unwrap();

        assert_eq!(store.all()[0].description, "second");
        assert_eq!(store.all()[1].description, "first");
    }

    #[test]
    fn test_add_rejects_invalid_input() {
        let mut store = ExpenseStore::new();

        let errors = store
            .add(input(0.0, "", "Rent", "2024-01-01"))
            .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["amount", "description", "category"]);
        assert!(store.is_empty());

        assert!(store
            .add(input(f64::NAN, "ok", "Others", "2024-01-01"))
            .is_err());
        assert!(store
            .add(input(-5.0, "ok", "Others", "2024-01-01"))
            .is_err());
    }

    #[test]
    fn test_update_amount_only_leaves_other_fields() {
        let mut store = ExpenseStore::new();
        let id = store
            .add(input(250.0, "Auto fare", "Transportation", "2024-02-10"))
            .unwrap()
            .id
            .clone();

        let patch = ExpensePatch {
            amount: Some(275.0),
            ..Default::default()
        };
        assert!(store.update(&id, patch).unwrap());

        let updated = store.get(&id).unwrap();
        assert_eq!(updated.amount, 275.0);
        assert_eq!(updated.description, "Auto fare");
        assert_eq!(updated.category, "Transportation");
        assert_eq!(updated.date.to_string(), "2024-02-10");
        assert_eq!(updated.id, id);
    }

    #[test]
    fn test_update_missing_id_is_noop() {
        let mut store = ExpenseStore::new();
        store.add(input(100.0, "x", "Others", "2024-01-01")).unwrap();

        let patch = ExpensePatch {
            amount: Some(1.0),
            ..Default::default()
        };
        assert!(!store.update("no-such-id", patch).unwrap());
        assert_eq!(store.all()[0].amount, 100.0);
    }

    #[test]
    fn test_update_rejects_invalid_patch_without_touching_record() {
        let mut store = ExpenseStore::new();
        let id = store
            .add(input(100.0, "x", "Others", "2024-01-01"))
            .unwrap()
            .id
            .clone();

        let patch = ExpensePatch {
            amount: Some(-3.0),
            category: Some("Bogus".to_string()),
            ..Default::default()
        };
        let errors = store.update(&id, patch).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(store.get(&id).unwrap().amount, 100.0);
        assert_eq!(store.get(&id).unwrap().category, "Others");
    }

    #[test]
    fn test_delete_removes_matching_record() {
        let mut store = ExpenseStore::new();
        let id = store
            .add(input(100.0, "x", "Others", "2024-01-01"))
            .unwrap()
            .id
            .clone();
        store.add(input(200.0, "y", "Travel", "2024-01-02")).unwrap();

        assert!(store.delete(&id));
        assert_eq!(store.len(), 1);
        assert!(store.get(&id).is_none());
    }

    #[test]
    fn test_delete_missing_id_leaves_collection_unchanged() {
        let mut store = ExpenseStore::new();
        store.add(input(100.0, "x", "Others", "2024-01-01")).unwrap();
        let before = store.snapshot();

        assert!(!store.delete("no-such-id"));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_load_snapshot_round_trip() {
        let mut store = ExpenseStore::new();
        store.add(input(300.0, "a", "Food & Dining", "2024-01-05")).unwrap();
        store.add(input(100.0, "b", "Transportation", "2024-01-10")).unwrap();
        store.add(input(50.0, "c", "Groceries", "2023-12-31")).unwrap();

        let snapshot = store.snapshot();
        let mut restored = ExpenseStore::new();
        restored.load(snapshot.clone());

        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.all(), store.all());
    }
}
