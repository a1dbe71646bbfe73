//! Payload strategies
//!
//! After the bootstrap and digit assignments, an encoded program needs a
//! payload: statements whose execution ends with the original program being
//! run. How the payload is spelled decides how the output grows.
//!
//! - [`Direct`] spells the whole program with one template. The template
//!   doubles per character, so output is exponential in program length.
//! - [`Accumulator`] spells `xx=''`, then one `xx+=chr(N)` per character,
//!   then executes `xx`. Each append opcode is a few characters long, so
//!   its template has a bounded size and output grows linearly.
//!
//! New strategies implement [`PayloadStrategy`]; the program encoder only
//! sees the steps they return.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Variable the accumulator strategy builds the program in.
pub const ACCUMULATOR_VAR: &str = "xx";

/// Opcode that starts an empty accumulator.
pub const ACCUMULATOR_INIT: &str = "xx=''";

/// Opcode that appends the character with code `code` to the accumulator.
pub fn append_opcode(code: u32) -> String {
    format!("{}+=chr({})", ACCUMULATOR_VAR, code)
}

/// One payload statement, before emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadStep {
    /// Source text to rebuild from digit variables and then execute
    Encoded(String),
    /// Text already spelled with the alphabet, executed as is
    Verbatim(&'static str),
}

/// A way of turning a program into payload steps.
pub trait PayloadStrategy {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Payload steps for `program`, in execution order.
    ///
    /// Executing them after the digit assignments must have the effect of
    /// executing `program`.
    fn payload(&self, program: &str) -> Vec<PayloadStep>;
}

/// Spell the whole program with a single template.
#[derive(Debug, Clone, Copy, Default)]
pub struct Direct;

impl PayloadStrategy for Direct {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn payload(&self, program: &str) -> Vec<PayloadStep> {
        vec![PayloadStep::Encoded(program.to_string())]
    }
}

/// Build the program one character at a time in an accumulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accumulator;

impl PayloadStrategy for Accumulator {
    fn name(&self) -> &'static str {
        "accumulator"
    }

    fn payload(&self, program: &str) -> Vec<PayloadStep> {
        let mut steps = Vec::with_capacity(program.chars().count() + 2);
        steps.push(PayloadStep::Encoded(ACCUMULATOR_INIT.to_string()));
        steps.extend(
            program
                .chars()
                .map(|c| PayloadStep::Encoded(append_opcode(c as u32))),
        );
        steps.push(PayloadStep::Verbatim(ACCUMULATOR_VAR));
        steps
    }
}

/// Selects a [`PayloadStrategy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingStrategy {
    /// Exponential output; only usable for very short programs
    Direct,
    /// Linear output (default)
    #[default]
    Accumulator,
}

static DIRECT: Direct = Direct;
static ACCUMULATOR: Accumulator = Accumulator;

impl EncodingStrategy {
    /// Every strategy, in declaration order.
    pub const ALL: [EncodingStrategy; 2] = [EncodingStrategy::Direct, EncodingStrategy::Accumulator];

    pub fn payload_strategy(self) -> &'static dyn PayloadStrategy {
        match self {
            EncodingStrategy::Direct => &DIRECT,
            EncodingStrategy::Accumulator => &ACCUMULATOR,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.payload_strategy().name()
    }
}

impl fmt::Display for EncodingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncodingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EncodingStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Unknown strategy '{}'. Expected 'direct' or 'accumulator'",
                    s
                )
            })
    }
}
