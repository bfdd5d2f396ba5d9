//! Batch-code normalization and character statistics.
//!
//! Batch codes arrive as free text: scanned, typed, or pasted. Only
//! surrounding whitespace is removed; case is preserved because some
//! heuristics are case-sensitive.

use std::collections::HashSet;

/// Trim surrounding whitespace
pub fn normalize(batch_code: &str) -> &str {
    batch_code.trim()
}

/// Length in characters, not bytes
pub fn char_len(code: &str) -> usize {
    code.chars().count()
}

/// Longest run of one repeated character among characters matching `pred`
pub fn longest_run_by<F>(code: &str, pred: F) -> usize
where
    F: Fn(char) -> bool,
{
    let mut longest = 0;
    let mut current = 0;
    let mut previous: Option<char> = None;

    for c in code.chars() {
        if !pred(c) {
            current = 0;
            previous = None;
            continue;
        }
        if previous == Some(c) {
            current += 1;
        } else {
            current = 1;
            previous = Some(c);
        }
        longest = longest.max(current);
    }
    longest
}

/// Longest run of any repeated character
pub fn longest_run(code: &str) -> usize {
    longest_run_by(code, |_| true)
}

/// Number of distinct characters, ignoring case
pub fn distinct_chars(code: &str) -> usize {
    code.to_lowercase().chars().collect::<HashSet<_>>().len()
}

pub fn is_all_digits(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_digit())
}

pub fn is_all_letters(code: &str) -> bool {
    !code.is_empty() && code.chars().all(char::is_alphabetic)
}

/// Has at least one letter and at least one digit
pub fn is_alphanumeric_mix(code: &str) -> bool {
    code.chars().any(char::is_alphabetic) && code.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_only() {
        assert_eq!(normalize("  cpl-123456\n"), "cpl-123456");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_char_len_counts_unicode() {
        assert_eq!(char_len("ÄÖÜ"), 3);
        assert_eq!(char_len("AB-12"), 5);
    }

    #[test]
    fn test_longest_run() {
        assert_eq!(longest_run("AAAB"), 3);
        assert_eq!(longest_run("A1111B"), 4);
        assert_eq!(longest_run(""), 0);
        assert_eq!(longest_run("ABAB"), 1);
    }

    #[test]
    fn test_longest_run_by_predicate() {
        assert_eq!(longest_run_by("AAAA11111", |c| c.is_ascii_digit()), 5);
        assert_eq!(longest_run_by("AAAA11111", |c| c.is_ascii_uppercase()), 4);
        assert_eq!(longest_run_by("aaaa", |c| c.is_ascii_uppercase()), 0);
        assert_eq!(longest_run_by("11-11", |c| c.is_ascii_digit()), 2);
    }

    #[test]
    fn test_character_classes() {
        assert_eq!(distinct_chars("AaAa11"), 2);
        assert!(is_all_digits("0123456789"));
        assert!(!is_all_digits(""));
        assert!(is_all_letters("Paracetamol"));
        assert!(!is_all_letters("BATCH001"));
        assert!(is_alphanumeric_mix("BATCH001"));
        assert!(!is_alphanumeric_mix("------"));
    }
}
