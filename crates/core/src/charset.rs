//! The eight-symbol output alphabet
//!
//! Every encoded program is spelled with exactly these symbols:
//!
//! ```text
//! e  x  c  %  (  )  '  =
//! ```
//!
//! The letters spell `exec`, the grouping symbols call it, the quote opens
//! string literals, `=` gives assignment and comparison, and `%` is the
//! format-substitution operator everything else is built from.

/// The alphabet, in canonical order.
pub const CHARSET: [char; 8] = ['e', 'x', 'c', '%', '(', ')', '\'', '='];

/// Letter that spells a binary `1` in digit variable names.
pub const ONE_LETTER: char = 'e';

/// Letter that spells a binary `0` in digit variable names.
pub const ZERO_LETTER: char = 'c';

/// Boolean `True`: two empty strings compare equal.
pub const TRUE_LITERAL: &str = "(''=='')";

/// Boolean `False`: an empty string never equals an empty tuple.
pub const FALSE_LITERAL: &str = "(''==())";

/// Name the bootstrap statement binds to the integer eleven.
///
/// `'%x'%x` formats eleven in hexadecimal, which is the only way to reach
/// the letter `b` needed for `0b…` binary literals.
pub const BOOTSTRAP_VAR: &str = "x";

/// Returns true if `c` is one of the eight permitted symbols.
pub fn is_member(c: char) -> bool {
    CHARSET.contains(&c)
}

/// Find the first symbol outside the alphabet.
///
/// Returns the offending character and its index (in characters, not bytes).
pub fn find_violation(text: &str) -> Option<(usize, char)> {
    text.chars().enumerate().find(|(_, c)| !is_member(*c))
}

/// Check that `text` is spelled entirely with the alphabet.
pub fn is_restricted(text: &str) -> bool {
    find_violation(text).is_none()
}

/// The distinct alphabet symbols that occur in `text`, in canonical order.
pub fn symbols_used(text: &str) -> Vec<char> {
    CHARSET
        .iter()
        .copied()
        .filter(|symbol| text.contains(*symbol))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_has_eight_distinct_symbols() {
        let mut symbols = CHARSET.to_vec();
        symbols.sort();
        symbols.dedup();
        assert_eq!(symbols.len(), 8);
    }

    #[test]
    fn test_literals_are_restricted() {
        assert!(is_restricted(TRUE_LITERAL));
        assert!(is_restricted(FALSE_LITERAL));
        assert!(is_restricted(BOOTSTRAP_VAR));
    }

    #[test]
    fn test_find_violation_reports_char_index() {
        assert_eq!(find_violation("exec('')"), None);
        assert_eq!(find_violation("ex(b)"), Some((3, 'b')));
        // Index counts characters, not UTF-8 bytes
        assert_eq!(find_violation("é"), Some((0, 'é')));
    }

    #[test]
    fn test_symbols_used_keeps_canonical_order() {
        assert_eq!(symbols_used("=='x"), vec!['x', '\'', '=']);
        assert!(symbols_used("").is_empty());
    }
}
