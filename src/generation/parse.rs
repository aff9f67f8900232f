//! Strict decode-then-validate boundary for provider output.
//!
//! Raw provider text is reduced to its JSON payload (models often wrap JSON
//! in markdown fences or prose), decoded into a typed
//! [`RecipeCandidate`], and checked against the structural invariants.
//! Anything that fails any of those steps is a
//! [`GenerationError::InvalidStructure`] — never a silent empty candidate.

use crate::error::GenerationError;
use crate::recipe::types::RecipeCandidate;

/// Parse and validate raw provider output into a [`RecipeCandidate`].
pub fn parse_candidate(raw: &str) -> Result<RecipeCandidate, GenerationError> {
    let json = extract_json(raw).ok_or_else(|| {
        GenerationError::InvalidStructure(format!(
            "no JSON object in provider output (first 80 chars): {}",
            truncate(raw, 80)
        ))
    })?;

    let candidate: RecipeCandidate = serde_json::from_str(json)
        .map_err(|e| GenerationError::InvalidStructure(format!("bad recipe JSON: {e}")))?;

    candidate
        .validate()
        .map_err(|invariant| GenerationError::InvalidStructure(invariant.to_string()))?;

    Ok(candidate)
}

/// Locate the outermost JSON object in the text, tolerating markdown fences
/// and surrounding prose.
fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub(crate) fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "name": "Vegetarian Pasta",
        "description": "Bright tomato basil pasta",
        "category": "dinner",
        "cuisine": "italian",
        "ingredients": ["pasta", "tomato", "basil"],
        "instructions": ["boil pasta", "toss with sauce"],
        "tags": ["vegetarian"]
    }"#;

    #[test]
    fn parses_plain_json() {
        let c = parse_candidate(VALID).unwrap();
        assert_eq!(c.name, "Vegetarian Pasta");
        assert_eq!(c.ingredients.len(), 3);
    }

    #[test]
    fn parses_fenced_json() {
        let fenced = format!("Here is your recipe:\n```json\n{VALID}\n```\nEnjoy!");
        let c = parse_candidate(&fenced).unwrap();
        assert_eq!(c.name, "Vegetarian Pasta");
    }

    #[test]
    fn rejects_no_json() {
        let err = parse_candidate("Sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, GenerationError::InvalidStructure(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_candidate("{\"name\": \"Soup\",").unwrap_err();
        assert!(matches!(err, GenerationError::InvalidStructure(_)));
    }

    #[test]
    fn rejects_candidate_violating_invariants() {
        let empty_ingredients =
            r#"{"name": "Air", "ingredients": [], "instructions": ["breathe"]}"#;
        let err = parse_candidate(empty_ingredients).unwrap_err();
        match err {
            GenerationError::InvalidStructure(msg) => {
                assert!(msg.contains("ingredient"));
            }
            other => panic!("expected InvalidStructure, got {other:?}"),
        }
    }
}
