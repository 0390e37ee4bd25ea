// Category vocabulary - fixed set of spending categories
// Names are the stable key; display metadata (color, icon) hangs off them

/// The fixed category vocabulary, in display order.
///
/// This set is closed: records are validated against it on add/update, and
/// the analytics engine only ever groups by these names. "Others" doubles as
/// the display fallback for anything unrecognized.
pub const CATEGORIES: [&str; 10] = [
    "Food & Dining",
    "Transportation",
    "Shopping",
    "Entertainment",
    "Bills & Utilities",
    "Healthcare",
    "Education",
    "Travel",
    "Groceries",
    "Others",
];

/// Check membership in the vocabulary (exact match).
pub fn is_valid(name: &str) -> bool {
    CATEGORIES.contains(&name)
}

/// Display color for a category (hex). Total: unknown names get the
/// "Others" gray.
pub fn color(name: &str) -> &'static str {
    match name {
        "Food & Dining" => "#F97316",
        "Transportation" => "#3B82F6",
        "Shopping" => "#EC4899",
        "Entertainment" => "#A855F7",
        "Bills & Utilities" => "#EF4444",
        "Healthcare" => "#22C55E",
        "Education" => "#6366F1",
        "Travel" => "#14B8A6",
        "Groceries" => "#EAB308",
        _ => "#6B7280",
    }
}

/// Display icon for a category. Total: unknown names get the "Others" box.
pub fn icon(name: &str) -> &'static str {
    match name {
        "Food & Dining" => "🍽️",
        "Transportation" => "🚗",
        "Shopping" => "🛍️",
        "Entertainment" => "🎬",
        "Bills & Utilities" => "⚡",
        "Healthcare" => "⚕️",
        "Education" => "📚",
        "Travel" => "✈️",
        "Groceries" => "🛒",
        _ => "📦",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_is_fixed_at_ten() {
        assert_eq!(CATEGORIES.len(), 10);
        assert_eq!(CATEGORIES[0], "Food & Dining");
        assert_eq!(CATEGORIES[9], "Others");
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid("Food & Dining"));
        assert!(is_valid("Others"));
        assert!(!is_valid("food & dining")); // exact match only
        assert!(!is_valid("Rent"));
        assert!(!is_valid(""));
    }

    #[test]
    fn test_every_category_has_distinct_display_metadata() {
        for name in CATEGORIES {
            assert!(color(name).starts_with('#'));
            assert!(!icon(name).is_empty());
        }

        // No two categories share a color
        let mut colors: Vec<&str> = CATEGORIES.iter().map(|c| color(c)).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), CATEGORIES.len());
    }

    #[test]
    fn test_unknown_category_falls_back_to_others() {
        assert_eq!(color("Cryptocurrency"), color("Others"));
        assert_eq!(icon("Cryptocurrency"), icon("Others"));
        assert_eq!(icon(""), "📦");
    }
}
