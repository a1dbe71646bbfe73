//! Encoding error types.

/// Error type for encoding operations.
///
/// Encoding is all-or-nothing: any error means no text was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A character whose code point is above the configured maximum
    UnsupportedCharacter { character: char, position: usize },
    /// A format template needs more arguments than the configured limit
    TemplateTooLarge { slots: usize, limit: usize },
    /// Emitted text contains a symbol outside the alphabet
    CharsetViolation { symbol: char, position: usize },
    /// The encoded text does not unfold back to the input
    VerificationFailed(String),
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::UnsupportedCharacter {
                character,
                position,
            } => write!(
                f,
                "Unsupported character {:?} (U+{:04X}) at position {}",
                character, *character as u32, position
            ),
            EncodeError::TemplateTooLarge { slots, limit } => write!(
                f,
                "Format template would need {} arguments (limit is {}); \
                 use the accumulator strategy for longer programs",
                slots, limit
            ),
            EncodeError::CharsetViolation { symbol, position } => write!(
                f,
                "Emitted symbol {:?} at position {} is outside the charset",
                symbol, position
            ),
            EncodeError::VerificationFailed(msg) => write!(f, "Verification failed: {}", msg),
        }
    }
}

impl std::error::Error for EncodeError {}

impl From<EncodeError> for String {
    fn from(e: EncodeError) -> Self {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_character_message() {
        let e = EncodeError::UnsupportedCharacter {
            character: 'é',
            position: 4,
        };
        assert_eq!(
            e.to_string(),
            "Unsupported character 'é' (U+00E9) at position 4"
        );
    }

    #[test]
    fn test_into_string() {
        let e = EncodeError::CharsetViolation {
            symbol: 'b',
            position: 0,
        };
        let s: String = e.into();
        assert!(s.contains("outside the charset"));
    }
}
