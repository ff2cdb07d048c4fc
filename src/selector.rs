//! Filename filtering
//!
//! A selector keeps a candidate iff the regex search result differs from
//! the negate flag. Matching is a search, not a full match, so `.` (or an
//! empty expression) selects every name.

use regex::{Regex, RegexBuilder};

use crate::error::{IglooError, IglooResult};

/// Compiled filename filter, built once per invocation from CLI flags
#[derive(Debug, Clone)]
pub struct Selector {
    regex: Regex,
    negate: bool,
}

impl Selector {
    /// Compile a selector from an expression and flags
    pub fn new(expr: &str, negate: bool, case_insensitive: bool) -> IglooResult<Self> {
        let regex = RegexBuilder::new(expr)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| IglooError::InvalidPattern {
                expr: expr.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { regex, negate })
    }

    /// Selector that keeps every candidate
    pub fn match_all() -> Self {
        Self {
            regex: Regex::new("").expect("empty pattern compiles"),
            negate: false,
        }
    }

    /// Whether a single name survives the filter
    pub fn keeps(&self, name: &str) -> bool {
        self.regex.is_match(name) != self.negate
    }

    /// Filter candidates, preserving input order
    pub fn filter<I, S>(&self, candidates: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        candidates
            .into_iter()
            .map(Into::into)
            .filter(|name| self.keeps(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["a.txt".to_string(), "b.log".to_string(), "c.jpeg".to_string()]
    }

    #[test]
    fn dot_matches_everything_in_order() {
        let selector = Selector::new(".", false, false).unwrap();
        assert_eq!(selector.filter(names()), names());
    }

    #[test]
    fn empty_expression_matches_everything() {
        let selector = Selector::new("", false, false).unwrap();
        assert_eq!(selector.filter(names()), names());
        assert_eq!(Selector::match_all().filter(names()), names());
    }

    #[test]
    fn search_semantics_not_full_match() {
        let selector = Selector::new(r"\.log$", false, false).unwrap();
        assert_eq!(selector.filter(names()), vec!["b.log".to_string()]);
    }

    #[test]
    fn negate_inverts_selection() {
        let selector = Selector::new(r"\.log$", true, false).unwrap();
        assert_eq!(
            selector.filter(names()),
            vec!["a.txt".to_string(), "c.jpeg".to_string()]
        );
    }

    #[test]
    fn case_insensitive_matching() {
        let selector = Selector::new(r"jpe?g$", false, true).unwrap();
        assert_eq!(
            selector.filter(vec!["photo.JPG", "photo.jpeg", "notes.txt"]),
            vec!["photo.JPG".to_string(), "photo.jpeg".to_string()]
        );
    }

    #[test]
    fn empty_candidate_set_yields_empty_result() {
        let selector = Selector::new(".", false, false).unwrap();
        assert!(selector.filter(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = Selector::new("(", false, false).unwrap_err();
        assert!(matches!(err, IglooError::InvalidPattern { .. }));
    }

    #[test]
    fn match_and_no_match_partition_candidates() {
        let keep = Selector::new(r"\.log$", false, false).unwrap();
        let drop = Selector::new(r"\.log$", true, false).unwrap();
        for name in names() {
            assert_ne!(keep.keeps(&name), drop.keeps(&name));
        }
    }
}
