//! Statement emitters
//!
//! Each function here returns one restricted-alphabet expression that
//! evaluates to a string of Python source. The program encoder wraps each
//! one in `exec(...)`, so evaluating the expression and executing the
//! resulting source is what "running a statement" means.
//!
//! Statements depend on each other through variables:
//!
//! 1. [`bootstrap`] runs `x=11` and needs nothing.
//! 2. [`digit_assignment`] runs `<name>=0b…` and needs `x` (for the `b`).
//! 3. [`encode_str`] rebuilds arbitrary text and needs a digit variable for
//!    every character in it.

use pyfck_core::charset::{BOOTSTRAP_VAR, FALSE_LITERAL, TRUE_LITERAL};
use pyfck_core::naming::digit_var;
use pyfck_core::template::{FormatTemplate, Placeholder, format_template};
use std::fmt;

/// One executable fragment of restricted-alphabet text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement(String);

impl Statement {
    /// Wrap text that is already spelled with the alphabet.
    pub fn verbatim(text: impl Into<String>) -> Self {
        Statement(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `'<template>'%a%b…`, or just `'<template>'` when there are no arguments.
fn apply_template<S: AsRef<str>>(literal: &str, args: &[S]) -> Statement {
    let args_len: usize = args.iter().map(|a| a.as_ref().len() + 1).sum();
    let mut out = String::with_capacity(literal.len() + 2 + args_len);
    out.push('\'');
    out.push_str(literal);
    out.push('\'');
    for arg in args {
        out.push('%');
        out.push_str(arg.as_ref());
    }
    Statement(out)
}

/// The statement that runs `x=11`.
///
/// `True` formats as `1` under `%x`, so two of them through a two-slot
/// template spell the numeral.
pub fn bootstrap() -> Statement {
    let literal = format!("{}={}", BOOTSTRAP_VAR, format_template(Placeholder::Hex, 2));
    apply_template(&literal, &[TRUE_LITERAL, TRUE_LITERAL])
}

/// Arguments spelling `0b…` for `n` under `%x`.
///
/// `b` comes from the bootstrap variable, `0` from `False` and `1` from
/// `True`.
fn binary_literal_args(n: u32) -> Vec<&'static str> {
    format!("{:#b}", n)
        .chars()
        .map(|c| match c {
            'b' => BOOTSTRAP_VAR,
            '1' => TRUE_LITERAL,
            _ => FALSE_LITERAL,
        })
        .collect()
}

/// Arguments consumed by [`digit_assignment`] for `n`.
pub fn digit_assignment_slots(n: u32) -> usize {
    // "0b" plus one digit per significant bit (one for zero)
    2 + (u32::BITS - n.leading_zeros()).max(1) as usize
}

/// The statement that binds `digit_var(n)` to `n`.
///
/// Must run after [`bootstrap`].
pub fn digit_assignment(n: u32) -> Statement {
    let args = binary_literal_args(n);
    let literal = format!(
        "{}={}",
        digit_var(n),
        format_template(Placeholder::Hex, args.len())
    );
    apply_template(&literal, &args)
}

/// Arguments consumed by [`encode_str`] for `s`.
///
/// `%` characters are written into the template instead of being passed in.
pub fn string_slots(s: &str) -> usize {
    s.chars().filter(|c| *c != '%').count()
}

/// An expression evaluating to the text `s`.
///
/// Every character of `s` other than `%` must already have its digit
/// variable bound. The template doubles in size with each such character.
pub fn encode_str(s: &str) -> Statement {
    let mut template = FormatTemplate::new(Placeholder::Char);
    let mut args = Vec::with_capacity(s.len());
    for c in s.chars() {
        if c == '%' {
            template.push_percent();
        } else {
            template.push_slot();
            args.push(digit_var(c as u32));
        }
    }
    apply_template(&template.render(), &args)
}
