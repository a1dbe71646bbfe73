//! pyfck core: the alphabet an encoded program is written in
//!
//! This crate holds the pieces of the eight-symbol encoding that have no
//! notion of a program: the symbol set itself, the exponential `%` format
//! templates, and the naming scheme for digit variables. Statement
//! emission and program assembly live in the `pyfck` compiler crate.
//!
//! # Modules
//!
//! - `charset`: the eight symbols and the boolean literals built from them
//! - `template`: `%c%%c%%%%c…` templates with literal percent support
//! - `naming`: integer to `{c, e}` variable name mapping

pub mod charset;
pub mod naming;
pub mod template;

pub use charset::{
    BOOTSTRAP_VAR, CHARSET, FALSE_LITERAL, TRUE_LITERAL, find_violation, is_member,
    is_restricted, symbols_used,
};
pub use naming::{digit_var, parse_digit_var};
pub use template::{FormatTemplate, Placeholder, format_template};
