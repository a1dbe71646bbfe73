//! Program assembly
//!
//! An encoded program is a list of statements joined into one expression:
//!
//! ```text
//! exec(<bootstrap>)==exec(<digit 9>)==…==exec(<payload>)==…
//! ```
//!
//! `exec` returns `None`, and a chained `==` comparison evaluates its
//! operands left to right while they keep comparing equal, so every
//! statement runs in order. An exception in one statement stops the chain
//! and surfaces unchanged.

use crate::config::EncoderConfig;
use crate::error::EncodeError;
use crate::statements::{
    Statement, bootstrap, digit_assignment, digit_assignment_slots, encode_str, string_slots,
};
use crate::strategy::PayloadStep;
use crate::unfold::unfold;
use pyfck_core::charset::find_violation;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Join statements into one expression that runs them in order.
pub fn sequence(statements: &[Statement]) -> String {
    let len: usize = statements.iter().map(|s| s.len() + "exec()==".len()).sum();
    let mut out = String::with_capacity(len);
    for (i, statement) in statements.iter().enumerate() {
        if i > 0 {
            out.push_str("==");
        }
        out.push_str("exec(");
        out.push_str(statement.as_str());
        out.push(')');
    }
    out
}

/// The output of one encoding run.
#[derive(Debug, Clone)]
pub struct EncodedProgram {
    statements: Vec<Statement>,
    text: String,
}

impl EncodedProgram {
    pub fn new(statements: Vec<Statement>) -> Self {
        let text = sequence(&statements);
        EncodedProgram { statements, text }
    }

    /// Statements in execution order, before wrapping.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// The full restricted-alphabet text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Fails if any emitted symbol is outside the alphabet.
    pub fn check_charset(&self) -> Result<(), EncodeError> {
        match find_violation(&self.text) {
            Some((position, symbol)) => Err(EncodeError::CharsetViolation { symbol, position }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for EncodedProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Encodes programs with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct ProgramEncoder {
    config: EncoderConfig,
}

impl ProgramEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        ProgramEncoder { config }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encode `program`.
    ///
    /// Either the whole text is produced or an error is returned; nothing
    /// partial escapes.
    pub fn encode(&self, program: &str) -> Result<EncodedProgram, EncodeError> {
        self.check_supported(program)?;

        let strategy = self.config.strategy.payload_strategy();
        let steps = strategy.payload(program);

        // Sorted so identical input always yields identical output
        let mut codes: BTreeSet<u32> = program.chars().map(u32::from).collect();
        for step in &steps {
            if let PayloadStep::Encoded(text) = step {
                codes.extend(text.chars().map(u32::from));
            }
        }

        let mut statements = Vec::with_capacity(1 + codes.len() + steps.len());
        statements.push(bootstrap());
        for &code in &codes {
            self.check_slots(digit_assignment_slots(code))?;
            statements.push(digit_assignment(code));
        }
        for step in steps {
            match step {
                PayloadStep::Encoded(text) => {
                    self.check_slots(string_slots(&text))?;
                    statements.push(encode_str(&text));
                }
                PayloadStep::Verbatim(text) => statements.push(Statement::verbatim(text)),
            }
        }

        let encoded = EncodedProgram::new(statements);
        encoded.check_charset()?;

        debug!(
            strategy = strategy.name(),
            input_chars = program.chars().count(),
            digit_bindings = codes.len(),
            statements = encoded.statements().len(),
            output_len = encoded.len(),
            "encoded program"
        );

        if self.config.verify {
            self.verify(program, &encoded)?;
        }

        Ok(encoded)
    }

    fn check_supported(&self, program: &str) -> Result<(), EncodeError> {
        match program
            .chars()
            .enumerate()
            .find(|(_, c)| u32::from(*c) > self.config.max_code_point)
        {
            Some((position, character)) => Err(EncodeError::UnsupportedCharacter {
                character,
                position,
            }),
            None => Ok(()),
        }
    }

    fn check_slots(&self, slots: usize) -> Result<(), EncodeError> {
        if slots > self.config.max_template_slots {
            return Err(EncodeError::TemplateTooLarge {
                slots,
                limit: self.config.max_template_slots,
            });
        }
        Ok(())
    }

    fn verify(&self, program: &str, encoded: &EncodedProgram) -> Result<(), EncodeError> {
        let unfolded = unfold(encoded.as_str())
            .map_err(|e| EncodeError::VerificationFailed(e.to_string()))?;
        match unfolded.payload() {
            Some(payload) if payload == program => Ok(()),
            Some(payload) => Err(EncodeError::VerificationFailed(format!(
                "encoded text executes {:?}, expected {:?}",
                payload, program
            ))),
            None => Err(EncodeError::VerificationFailed(
                "encoded text executes nothing".to_string(),
            )),
        }
    }
}
