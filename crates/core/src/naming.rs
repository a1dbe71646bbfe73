//! Digit variable names
//!
//! Every character code an encoded program needs is bound to a variable
//! whose name is the code's binary expansion spelled with two letters of
//! the alphabet: `0` becomes `c` and `1` becomes `e`.
//!
//! ```text
//! 123 -> 1111011 -> eeeecee
//! ```
//!
//! Names only ever contain `c` and `e`, so they cannot collide with the
//! bootstrap variable `x`, the accumulator `xx` or the `exec` builtin.

use crate::charset::{ONE_LETTER, ZERO_LETTER};

/// Name of the variable holding the integer `n`.
pub fn digit_var(n: u32) -> String {
    format!("{:b}", n)
        .chars()
        .map(|bit| if bit == '1' { ONE_LETTER } else { ZERO_LETTER })
        .collect()
}

/// Inverse of [`digit_var`], for names produced by it.
pub fn parse_digit_var(name: &str) -> Option<u32> {
    if name.is_empty() || name.len() > 32 {
        return None;
    }
    name.chars().try_fold(0u32, |acc, letter| {
        let bit = match letter {
            ONE_LETTER => 1,
            ZERO_LETTER => 0,
            _ => return None,
        };
        Some((acc << 1) | bit)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_known_names() {
        assert_eq!(digit_var(0), "c");
        assert_eq!(digit_var(1), "e");
        assert_eq!(digit_var(2), "ec");
        assert_eq!(digit_var(123), "eeeecee");
        assert_eq!(digit_var(0x10FFFF), format!("ecccc{}", "e".repeat(16)));
    }

    #[test]
    fn test_names_are_injective() {
        let names: HashSet<String> = (0..4096).map(digit_var).collect();
        assert_eq!(names.len(), 4096);
    }

    #[test]
    fn test_names_use_two_letters() {
        for n in [0, 7, 37, 127, 0x1F600] {
            let name = digit_var(n);
            assert!(!name.is_empty());
            assert!(name.chars().all(|c| c == 'c' || c == 'e'), "{}", name);
        }
    }

    #[test]
    fn test_parse_round_trips() {
        for n in [0, 1, 11, 99, 0x10FFFF] {
            assert_eq!(parse_digit_var(&digit_var(n)), Some(n));
        }
        assert_eq!(parse_digit_var("x"), None);
        assert_eq!(parse_digit_var(""), None);
    }
}
