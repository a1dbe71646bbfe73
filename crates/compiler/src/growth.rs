//! Output growth sampling
//!
//! Encodes random programs of increasing length and records how long the
//! encodings are. The random source is passed in by the caller, so a fixed
//! seed reproduces a run exactly.

use crate::config::EncoderConfig;
use crate::error::EncodeError;
use crate::program::ProgramEncoder;
use rand::Rng;
use std::ops::RangeInclusive;

/// Code points random programs are drawn from.
///
/// Technically everything up to U+10FFFF is supported, but ASCII is a good
/// enough approximation of real programs.
pub const SAMPLE_CODE_POINTS: std::ops::Range<u32> = 0..127;

/// One measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthSample {
    pub input_len: usize,
    pub output_len: usize,
}

/// A series of measurements, in increasing input length
#[derive(Debug, Clone, Default)]
pub struct GrowthReport {
    pub samples: Vec<GrowthSample>,
}

impl GrowthReport {
    /// Output characters per input character at the largest sample.
    pub fn gradient(&self) -> Option<f64> {
        self.samples
            .last()
            .filter(|s| s.input_len > 0)
            .map(|s| s.output_len as f64 / s.input_len as f64)
    }
}

/// A random program of `len` characters drawn from [`SAMPLE_CODE_POINTS`].
pub fn random_program<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| {
            let code = rng.gen_range(SAMPLE_CODE_POINTS);
            char::from_u32(code).unwrap_or('\0')
        })
        .collect()
}

/// Encode one random program per length and record the output lengths.
pub fn sample<R: Rng>(
    rng: &mut R,
    lengths: RangeInclusive<usize>,
    config: &EncoderConfig,
) -> Result<GrowthReport, EncodeError> {
    let encoder = ProgramEncoder::new(config.clone());
    let mut report = GrowthReport::default();
    for len in lengths {
        let program = random_program(rng, len);
        let encoded = encoder.encode(&program)?;
        report.samples.push(GrowthSample {
            input_len: len,
            output_len: encoded.len(),
        });
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_program_is_ascii() {
        let mut rng = StdRng::seed_from_u64(0);
        let program = random_program(&mut rng, 200);
        assert_eq!(program.chars().count(), 200);
        assert!(program.chars().all(|c| (c as u32) < 127));
    }

    #[test]
    fn test_same_seed_same_samples() {
        let config = EncoderConfig::default();
        let a = sample(&mut StdRng::seed_from_u64(7), 1..=10, &config).unwrap();
        let b = sample(&mut StdRng::seed_from_u64(7), 1..=10, &config).unwrap();
        assert_eq!(a.samples, b.samples);
        assert_eq!(a.samples.len(), 10);
    }

    #[test]
    fn test_gradient() {
        let report = GrowthReport {
            samples: vec![
                GrowthSample {
                    input_len: 1,
                    output_len: 10,
                },
                GrowthSample {
                    input_len: 4,
                    output_len: 100,
                },
            ],
        };
        assert_eq!(report.gradient(), Some(25.0));
        assert_eq!(GrowthReport::default().gradient(), None);
    }
}
