//! pyfck: Python in eight symbols
//!
//! Encodes any Python 3 program as an equivalent program written only with
//! `e x c % ( ) ' =`.
//!
//! ```rust,ignore
//! use pyfck::{EncoderConfig, EncodingStrategy, ProgramEncoder};
//!
//! let encoder = ProgramEncoder::new(EncoderConfig::new());
//! let encoded = encoder.encode("print(3)")?;
//! // python3 -c "$encoded" prints 3
//! ```
//!
//! # How it works
//!
//! 1. `x=11` is built from two `True`s formatted with `%x`. Formatting `x`
//!    with `%x` then yields `b`.
//! 2. Every character code the program needs is bound to a `{c, e}` named
//!    variable by formatting a `0b…` literal out of `b`, `True` and `False`.
//! 3. The payload rebuilds the program text from those variables with `%c`
//!    and executes it, either in one go ([`EncodingStrategy::Direct`]) or
//!    one `xx+=chr(N)` at a time ([`EncodingStrategy::Accumulator`]).
//! 4. All statements are chained as `exec(a)==exec(b)==…`.

pub mod config;
pub mod error;
pub mod executor;
pub mod growth;
pub mod harness;
pub mod program;
pub mod statements;
pub mod strategy;
pub mod unfold;

pub use config::EncoderConfig;
pub use error::EncodeError;
pub use executor::{ExecutionOutcome, Executor, PythonExecutor};
pub use harness::{Case, CaseSuite, Harness, HarnessSummary};
pub use program::{EncodedProgram, ProgramEncoder, sequence};
pub use statements::Statement;
pub use strategy::{EncodingStrategy, PayloadStrategy};
pub use unfold::{UnfoldError, Unfolded, unfold};

/// Encode `program` with the default configuration and the given strategy.
pub fn encode(program: &str, strategy: EncodingStrategy) -> Result<String, EncodeError> {
    let config = EncoderConfig::new().with_strategy(strategy);
    ProgramEncoder::new(config)
        .encode(program)
        .map(EncodedProgram::into_string)
}

/// Recover the program an encoded text runs.
pub fn decode(encoded: &str) -> Result<String, UnfoldError> {
    let unfolded = unfold(encoded)?;
    Ok(unfolded.payload().unwrap_or_default().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_then_decode() {
        let encoded = encode("print(3)", EncodingStrategy::Accumulator).unwrap();
        assert_eq!(decode(&encoded).unwrap(), "print(3)");
    }

    #[test]
    fn test_decode_rejects_plain_python() {
        assert!(decode("print(3)").is_err());
    }
}
