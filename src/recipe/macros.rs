//! Nutritional macro calculator.
//!
//! [`compute`] is a pure, total function from an ingredient list to
//! [`Macros`]: every input, including the empty list, yields a valid
//! (possibly all-zero) result. Malformed lines and unknown foods contribute
//! zero rather than failing the whole computation.
//!
//! The model is a compact built-in table of per-serving macro values keyed by
//! food keyword, scaled by an optional leading quantity on the ingredient
//! line ("2 cups rice" counts the rice entry twice). It is intentionally
//! coarse — good enough for relative comparison and search annotation, not a
//! lab analysis.

use crate::recipe::types::Macros;

/// Per-serving macro contributions: (keyword, calories, protein, carbs, fat).
///
/// Longest-match wins so "chicken broth" resolves before "chicken".
const NUTRITION_TABLE: &[(&str, f64, f64, f64, f64)] = &[
    ("chicken broth", 15.0, 1.5, 1.0, 0.5),
    ("chicken", 230.0, 43.0, 0.0, 5.0),
    ("beef", 250.0, 26.0, 0.0, 15.0),
    ("pork", 240.0, 27.0, 0.0, 14.0),
    ("salmon", 208.0, 20.0, 0.0, 13.0),
    ("tuna", 130.0, 28.0, 0.0, 1.0),
    ("shrimp", 99.0, 24.0, 0.2, 0.3),
    ("tofu", 94.0, 10.0, 2.3, 6.0),
    ("tempeh", 195.0, 20.0, 8.0, 11.0),
    ("egg", 72.0, 6.3, 0.4, 4.8),
    ("lentil", 230.0, 18.0, 40.0, 0.8),
    ("chickpea", 269.0, 14.5, 45.0, 4.2),
    ("black bean", 227.0, 15.0, 41.0, 0.9),
    ("pasta", 220.0, 8.0, 43.0, 1.3),
    ("spaghetti", 220.0, 8.0, 43.0, 1.3),
    ("noodle", 190.0, 7.0, 37.0, 1.0),
    ("rice", 205.0, 4.3, 45.0, 0.4),
    ("quinoa", 222.0, 8.1, 39.0, 3.6),
    ("bread", 79.0, 2.7, 14.7, 1.0),
    ("flour", 455.0, 13.0, 95.0, 1.2),
    ("tortilla", 140.0, 4.0, 24.0, 3.5),
    ("oat", 150.0, 5.0, 27.0, 2.5),
    ("potato", 161.0, 4.3, 37.0, 0.2),
    ("sweet potato", 114.0, 2.1, 27.0, 0.1),
    ("olive oil", 119.0, 0.0, 0.0, 13.5),
    ("butter", 102.0, 0.1, 0.0, 11.5),
    ("cream", 101.0, 0.6, 0.8, 10.8),
    ("milk", 103.0, 8.0, 12.0, 2.4),
    ("yogurt", 100.0, 10.0, 6.0, 3.8),
    ("parmesan", 111.0, 10.0, 0.9, 7.3),
    ("mozzarella", 85.0, 6.3, 0.6, 6.3),
    ("cheddar", 113.0, 7.0, 0.4, 9.3),
    ("cheese", 110.0, 7.0, 1.0, 9.0),
    ("tomato", 22.0, 1.1, 4.8, 0.2),
    ("onion", 44.0, 1.2, 10.0, 0.1),
    ("garlic", 4.5, 0.2, 1.0, 0.0),
    ("carrot", 25.0, 0.6, 6.0, 0.1),
    ("broccoli", 31.0, 2.5, 6.0, 0.3),
    ("spinach", 7.0, 0.9, 1.1, 0.1),
    ("mushroom", 15.0, 2.2, 2.3, 0.2),
    ("pepper", 24.0, 1.0, 6.0, 0.2),
    ("zucchini", 33.0, 2.4, 6.1, 0.6),
    ("eggplant", 20.0, 0.8, 4.8, 0.2),
    ("avocado", 240.0, 3.0, 12.8, 22.0),
    ("basil", 1.0, 0.1, 0.1, 0.0),
    ("banana", 105.0, 1.3, 27.0, 0.4),
    ("apple", 95.0, 0.5, 25.0, 0.3),
    ("honey", 64.0, 0.1, 17.3, 0.0),
    ("sugar", 49.0, 0.0, 12.6, 0.0),
    ("almond", 164.0, 6.0, 6.1, 14.2),
    ("peanut butter", 188.0, 8.0, 6.3, 16.1),
    ("coconut milk", 445.0, 4.6, 6.4, 48.2),
];

/// Compute nutritional totals for an ingredient list.
///
/// Pure, deterministic, and total — never returns an error and never
/// produces negative values.
pub fn compute(ingredients: &[String]) -> Macros {
    let mut totals = Macros::default();

    for line in ingredients {
        let line = line.trim().to_lowercase();
        if line.is_empty() {
            continue;
        }

        let quantity = leading_quantity(&line);
        if let Some((_, cal, protein, carbs, fat)) = lookup(&line) {
            totals.calories += cal * quantity;
            totals.protein += protein * quantity;
            totals.carbs += carbs * quantity;
            totals.fat += fat * quantity;
        }
    }

    totals
}

/// Find the longest table keyword contained in the line.
fn lookup(line: &str) -> Option<&'static (&'static str, f64, f64, f64, f64)> {
    NUTRITION_TABLE
        .iter()
        .filter(|entry| line.contains(entry.0))
        .max_by_key(|entry| entry.0.len())
}

/// Parse an optional leading quantity: "2 cups rice" → 2.0, "1/2 onion" → 0.5,
/// "1.5 lbs beef" → 1.5. Anything unparsable counts as a single serving.
/// Quantities are clamped to keep one absurd line from dominating the totals.
fn leading_quantity(line: &str) -> f64 {
    let token = match line.split_whitespace().next() {
        Some(t) => t,
        None => return 1.0,
    };

    let value = if let Some((num, den)) = token.split_once('/') {
        match (num.parse::<f64>(), den.parse::<f64>()) {
            (Ok(n), Ok(d)) if d > 0.0 => n / d,
            _ => return 1.0,
        }
    } else {
        match token.parse::<f64>() {
            Ok(v) => v,
            Err(_) => return 1.0,
        }
    };

    if !value.is_finite() || value <= 0.0 {
        1.0
    } else {
        value.min(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_list_yields_zero_macros() {
        let m = compute(&[]);
        assert_eq!(m, Macros::default());
    }

    #[test]
    fn unknown_ingredients_contribute_zero() {
        let m = compute(&lines(&["unobtainium", "3 widgets"]));
        assert_eq!(m, Macros::default());
    }

    #[test]
    fn known_ingredients_accumulate() {
        let m = compute(&lines(&["pasta", "tomato", "basil"]));
        assert!(m.calories > 220.0);
        assert!(m.protein > 8.0);
        assert!(m.is_non_negative());
    }

    #[test]
    fn compute_is_idempotent() {
        let l = lines(&["2 cups rice", "1 lb chicken", "1/2 onion"]);
        assert_eq!(compute(&l), compute(&l));
    }

    #[test]
    fn leading_quantity_scales_contribution() {
        let one = compute(&lines(&["1 egg"]));
        let three = compute(&lines(&["3 egg"]));
        assert!((three.calories - one.calories * 3.0).abs() < 1e-9);
    }

    #[test]
    fn fractional_quantities_parse() {
        let half = compute(&lines(&["1/2 avocado"]));
        let whole = compute(&lines(&["avocado"]));
        assert!((half.fat - whole.fat / 2.0).abs() < 1e-9);
    }

    #[test]
    fn malformed_lines_degrade_gracefully() {
        let m = compute(&lines(&["", "   ", "-5 chicken", "NaN tofu"]));
        // Bad quantities fall back to a single serving; blanks contribute zero
        assert!(m.is_non_negative());
        assert!(m.protein > 0.0);
    }

    #[test]
    fn longest_keyword_wins() {
        let broth = compute(&lines(&["1 cup chicken broth"]));
        let chicken = compute(&lines(&["chicken"]));
        assert!(broth.protein < chicken.protein);
    }

    #[test]
    fn chicken_and_tofu_differ_in_protein() {
        let chicken = compute(&lines(&["chicken", "rice"]));
        let tofu = compute(&lines(&["tofu", "rice"]));
        assert!(chicken.protein > tofu.protein);
    }

    #[test]
    fn absurd_quantities_are_clamped() {
        let m = compute(&lines(&["99999 cups sugar"]));
        assert!(m.calories <= 49.0 * 100.0 + 1e-9);
    }
}
