//! Encoder configuration
//!
//! [`EncoderConfig`] carries every knob the encoder has. It can be built in
//! code with the builder methods or read from a TOML file:
//!
//! ```toml
//! strategy = "direct"
//! max_code_point = 127
//! verify = true
//! ```
//!
//! Missing keys fall back to the defaults.

use crate::strategy::EncodingStrategy;
use serde::Deserialize;
use std::path::Path;

/// Highest code point Python's `%c` conversion accepts.
pub const DEFAULT_MAX_CODE_POINT: u32 = 0x10FFFF;

/// Largest template the encoder will render (2^24 symbols).
///
/// Digit assignments for the whole Unicode range need at most 23
/// arguments, so the default only ever rejects long direct-mode payloads.
pub const DEFAULT_MAX_TEMPLATE_SLOTS: usize = 24;

/// Configuration for [`ProgramEncoder`](crate::ProgramEncoder)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderConfig {
    /// How the payload is spelled out
    pub strategy: EncodingStrategy,

    /// Characters above this code point are rejected
    pub max_code_point: u32,

    /// Upper bound on the arguments any single format template consumes
    pub max_template_slots: usize,

    /// Unfold every encoded program and compare it against the input
    pub verify: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            strategy: EncodingStrategy::default(),
            max_code_point: DEFAULT_MAX_CODE_POINT,
            max_template_slots: DEFAULT_MAX_TEMPLATE_SLOTS,
            verify: false,
        }
    }
}

impl EncoderConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        EncoderConfig::default()
    }

    /// Parse a configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse encoder config: {}", e))
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        Self::from_toml(&content)
    }

    pub fn with_strategy(mut self, strategy: EncodingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_code_point(mut self, max_code_point: u32) -> Self {
        self.max_code_point = max_code_point;
        self
    }

    pub fn with_max_template_slots(mut self, slots: usize) -> Self {
        self.max_template_slots = slots;
        self
    }

    /// Enable or disable post-encoding verification
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EncoderConfig::new();
        assert_eq!(config.strategy, EncodingStrategy::Accumulator);
        assert_eq!(config.max_code_point, 0x10FFFF);
        assert!(!config.verify);
    }

    #[test]
    fn test_config_builder() {
        let config = EncoderConfig::new()
            .with_strategy(EncodingStrategy::Direct)
            .with_max_code_point(127)
            .with_verify(true);

        assert_eq!(config.strategy, EncodingStrategy::Direct);
        assert_eq!(config.max_code_point, 127);
        assert!(config.verify);
        assert_eq!(config.max_template_slots, DEFAULT_MAX_TEMPLATE_SLOTS);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = EncoderConfig::from_toml("strategy = \"direct\"\n").unwrap();
        assert_eq!(config.strategy, EncodingStrategy::Direct);
        assert_eq!(config.max_code_point, DEFAULT_MAX_CODE_POINT);
    }

    #[test]
    fn test_from_toml_rejects_unknown_keys() {
        let err = EncoderConfig::from_toml("stratgey = \"direct\"\n").unwrap_err();
        assert!(err.starts_with("Failed to parse encoder config"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_code_point = 127").unwrap();
        writeln!(file, "verify = true").unwrap();

        let config = EncoderConfig::load(file.path()).unwrap();
        assert_eq!(config.max_code_point, 127);
        assert!(config.verify);
        assert_eq!(config.strategy, EncodingStrategy::Accumulator);
    }
}
