//! Equivalence harness
//!
//! Checks encodings empirically: a program and its encoding must print the
//! same stdout and fail with the same error, and assertions appended to
//! both must still hold afterwards.
//!
//! Cases come from TOML (see `cases.toml` for the embedded defaults):
//!
//! ```toml
//! [[case]]
//! name = "assignment"
//! program = "c=8"
//! post_checks = ["assert(c==8)"]
//! ```

use crate::config::EncoderConfig;
use crate::executor::Executor;
use crate::program::ProgramEncoder;
use crate::strategy::EncodingStrategy;
use pyfck_core::charset::{CHARSET, is_restricted, symbols_used};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Embedded default cases
pub static DEFAULT_CASES: &str = include_str!("cases.toml");

/// One program with its expected behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Case {
    /// Unique identifier, used when merging suites
    pub name: String,
    pub program: String,
    /// Exact expected stdout
    #[serde(default)]
    pub stdout: String,
    /// Substring expected in stderr
    #[serde(default)]
    pub stderr: String,
    /// Statements appended after the program, one per line
    #[serde(default)]
    pub post_checks: Vec<String>,
}

impl Case {
    /// `text` followed by the post checks.
    pub fn with_post_checks(&self, text: &str) -> String {
        format!("{}\n{}", text, self.post_checks.join("\n"))
    }
}

/// A set of cases.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseSuite {
    #[serde(rename = "case", default)]
    pub cases: Vec<Case>,
}

impl CaseSuite {
    /// Parse cases from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse cases: {}", e))
    }

    /// Load the embedded default cases
    pub fn default_suite() -> Result<Self, String> {
        Self::from_toml(DEFAULT_CASES)
    }

    /// Load cases from a file
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cases {}: {}", path.display(), e))?;
        Self::from_toml(&content)
    }

    /// Merge another suite into this one; cases with the same name replace
    /// existing ones.
    pub fn merge(&mut self, other: CaseSuite) {
        for case in other.cases {
            if let Some(existing) = self.cases.iter_mut().find(|c| c.name == case.name) {
                *existing = case;
            } else {
                self.cases.push(case);
            }
        }
    }
}

/// Which text a run executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Original,
    OriginalChecked,
    Encoded,
    EncodedChecked,
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunKind::Original => "original",
            RunKind::OriginalChecked => "original + checks",
            RunKind::Encoded => "encoded",
            RunKind::EncodedChecked => "encoded + checks",
        })
    }
}

/// Result of a single run
#[derive(Debug)]
pub struct RunResult {
    pub kind: RunKind,
    /// Why the run did not match, if it did not
    pub failure: Option<String>,
}

/// Result of checking one case under one strategy
#[derive(Debug)]
pub struct CaseResult {
    pub name: String,
    pub strategy: EncodingStrategy,
    pub input_len: usize,
    pub encoded_len: usize,
    pub runs: Vec<RunResult>,
    /// Encoding or charset failure; no runs happen after one
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.runs.iter().all(|r| r.failure.is_none())
    }
}

/// Summary of a harness run
#[derive(Debug, Default)]
pub struct HarnessSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<CaseResult>,
}

/// Runs cases through an [`Executor`].
pub struct Harness<E: Executor> {
    executor: E,
    strategies: Vec<EncodingStrategy>,
    config: EncoderConfig,
    /// Show lengths and timing for every case
    pub verbose: bool,
}

impl<E: Executor> Harness<E> {
    pub fn new(executor: E) -> Self {
        Harness {
            executor,
            strategies: vec![EncodingStrategy::default()],
            config: EncoderConfig::default(),
            verbose: false,
        }
    }

    /// Strategies every case is checked under
    pub fn with_strategies(mut self, strategies: Vec<EncodingStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Base encoder configuration; the strategy is overridden per run
    pub fn with_config(mut self, config: EncoderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Check every case under every strategy
    pub fn run(&self, suite: &CaseSuite) -> HarnessSummary {
        let mut summary = HarnessSummary::default();
        for case in &suite.cases {
            for &strategy in &self.strategies {
                let result = self.run_case(case, strategy);
                summary.total += 1;
                if result.passed() {
                    summary.passed += 1;
                } else {
                    summary.failed += 1;
                }
                summary.results.push(result);
            }
        }
        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            "harness finished"
        );
        summary
    }

    /// Check one case under one strategy
    pub fn run_case(&self, case: &Case, strategy: EncodingStrategy) -> CaseResult {
        let start = Instant::now();
        let mut result = CaseResult {
            name: case.name.clone(),
            strategy,
            input_len: case.program.len(),
            encoded_len: 0,
            runs: Vec::new(),
            error: None,
            duration_ms: 0,
        };

        let encoder = ProgramEncoder::new(self.config.clone().with_strategy(strategy));
        match encoder.encode(&case.program) {
            Ok(encoded) => {
                let encoded = encoded.into_string();
                result.encoded_len = encoded.len();
                if !is_restricted(&encoded) || symbols_used(&encoded) != CHARSET.to_vec() {
                    result.error = Some(format!(
                        "Encoded program uses symbols {:?}, expected exactly {:?}",
                        symbols_used(&encoded),
                        CHARSET
                    ));
                } else {
                    let texts = [
                        (RunKind::Original, case.program.clone()),
                        (RunKind::OriginalChecked, case.with_post_checks(&case.program)),
                        (RunKind::Encoded, encoded.clone()),
                        (RunKind::EncodedChecked, case.with_post_checks(&encoded)),
                    ];
                    for (kind, text) in texts {
                        result.runs.push(RunResult {
                            kind,
                            failure: self.check_run(case, &text),
                        });
                    }
                }
            }
            Err(e) => result.error = Some(format!("Encoding failed: {}", e)),
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        if !result.passed() {
            warn!(case = %case.name, %strategy, "case failed");
        }
        result
    }

    /// Run `text` and compare against the case's expectations
    fn check_run(&self, case: &Case, text: &str) -> Option<String> {
        let outcome = match self.executor.run(text) {
            Ok(outcome) => outcome,
            Err(e) => return Some(e),
        };
        if outcome.stdout != case.stdout {
            return Some(format!(
                "Expected stdout: {:?}, but got: {:?}",
                case.stdout, outcome.stdout
            ));
        }
        // Tracebacks differ in line numbers and code, so only a substring
        // is required
        if !outcome.stderr.contains(&case.stderr) {
            return Some(format!(
                "Expected stderr to contain {:?}, but got: {:?}",
                case.stderr, outcome.stderr
            ));
        }
        None
    }

    /// Print harness results
    pub fn print_results(&self, summary: &HarnessSummary) {
        for result in &summary.results {
            let status = if result.passed() { "ok" } else { "FAILED" };
            if self.verbose {
                println!(
                    "  {} [{}] ... {} ({} -> {} chars, {}ms)",
                    result.name,
                    result.strategy,
                    status,
                    result.input_len,
                    result.encoded_len,
                    result.duration_ms
                );
            } else {
                println!("  {} [{}] ... {}", result.name, result.strategy, status);
            }
        }

        println!("\n========================================");
        println!(
            "Results: {} passed, {} failed",
            summary.passed, summary.failed
        );

        let failures: Vec<_> = summary.results.iter().filter(|r| !r.passed()).collect();
        if !failures.is_empty() {
            println!("\nFAILURES:\n");
            for result in failures {
                println!("{} [{}]", result.name, result.strategy);
                if let Some(ref error) = result.error {
                    println!("  {}", error);
                }
                for run in &result.runs {
                    if let Some(ref failure) = run.failure {
                        println!("  {}: {}", run.kind, failure);
                    }
                }
                println!();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ExecutionOutcome;
    use crate::unfold::unfold;

    /// Stands in for Python: unfolds encoded text to the program it runs,
    /// then answers from a tiny table of known programs.
    struct FakePython;

    impl FakePython {
        fn effective_program(text: &str) -> String {
            let (first, rest) = match text.split_once('\n') {
                Some((first, rest)) => (first, Some(rest)),
                None => (text, None),
            };
            if !is_restricted(first) {
                return text.to_string();
            }
            let payload = unfold(first)
                .ok()
                .and_then(|u| u.payload().map(str::to_string))
                .unwrap_or_default();
            match rest {
                Some(rest) => format!("{}\n{}", payload, rest),
                None => payload,
            }
        }
    }

    impl Executor for FakePython {
        fn run(&self, program: &str) -> Result<ExecutionOutcome, String> {
            let program = Self::effective_program(program);
            let outcome = if program.starts_with("print(3)") {
                ExecutionOutcome {
                    stdout: "3\n".to_string(),
                    stderr: String::new(),
                    success: true,
                }
            } else if program.starts_with("1/0") {
                ExecutionOutcome {
                    stdout: String::new(),
                    stderr: "ZeroDivisionError: division by zero".to_string(),
                    success: false,
                }
            } else {
                ExecutionOutcome {
                    success: true,
                    ..Default::default()
                }
            };
            Ok(outcome)
        }
    }

    struct Unavailable;

    impl Executor for Unavailable {
        fn run(&self, _program: &str) -> Result<ExecutionOutcome, String> {
            Err("Failed to run python3: not found".to_string())
        }
    }

    fn case(name: &str, program: &str, stdout: &str, stderr: &str) -> Case {
        Case {
            name: name.to_string(),
            program: program.to_string(),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            post_checks: vec![],
        }
    }

    #[test]
    fn test_default_suite_parses() {
        let suite = CaseSuite::default_suite().unwrap();
        assert_eq!(suite.cases.len(), 6);
        let function = suite.cases.iter().find(|c| c.name == "function").unwrap();
        assert_eq!(function.program, "def f(k):\n    print(k)\nf(1)\nf(2)");
        assert_eq!(function.post_checks, vec!["assert(callable(f))"]);
        let percent = suite.cases.iter().find(|c| c.name == "percent").unwrap();
        assert_eq!(percent.program, "print(\"%\", 100 % 7)");
    }

    #[test]
    fn test_merge_replaces_by_name() {
        let mut suite = CaseSuite::default_suite().unwrap();
        let extra = CaseSuite::from_toml(
            r#"
[[case]]
name = "print"
program = "print(4)"
stdout = "4\n"

[[case]]
name = "new"
program = "pass"
"#,
        )
        .unwrap();
        suite.merge(extra);
        assert_eq!(suite.cases.len(), 7);
        let print = suite.cases.iter().find(|c| c.name == "print").unwrap();
        assert_eq!(print.program, "print(4)");
    }

    #[test]
    fn test_with_post_checks() {
        let mut c = case("a", "c=8", "", "");
        assert_eq!(c.with_post_checks("c=8"), "c=8\n");
        c.post_checks = vec!["assert(c==8)".to_string(), "print(c)".to_string()];
        assert_eq!(c.with_post_checks("c=8"), "c=8\nassert(c==8)\nprint(c)");
    }

    #[test]
    fn test_passing_cases() {
        let harness = Harness::new(FakePython)
            .with_strategies(vec![EncodingStrategy::Direct, EncodingStrategy::Accumulator]);
        let suite = CaseSuite {
            cases: vec![
                case("print", "print(3)", "3\n", ""),
                case("zero", "1/0", "", "ZeroDivisionError"),
            ],
        };
        let summary = harness.run(&suite);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.failed, 0, "{:?}", summary.results);
        assert!(summary.results.iter().all(|r| r.runs.len() == 4));
    }

    #[test]
    fn test_wrong_stdout_fails() {
        let harness = Harness::new(FakePython);
        let result = harness.run_case(
            &case("print", "print(3)", "4\n", ""),
            EncodingStrategy::Accumulator,
        );
        assert!(!result.passed());
        let failure = result.runs[0].failure.as_deref().unwrap();
        assert!(failure.starts_with("Expected stdout"));
    }

    #[test]
    fn test_encoding_error_is_reported() {
        let harness =
            Harness::new(FakePython).with_config(EncoderConfig::new().with_max_code_point(127));
        let result = harness.run_case(
            &case("accent", "print('é')", "é\n", ""),
            EncodingStrategy::Accumulator,
        );
        assert!(!result.passed());
        assert!(result.runs.is_empty());
        assert!(result.error.unwrap().contains("Unsupported character"));
    }

    #[test]
    fn test_executor_failure_fails_run() {
        let harness = Harness::new(Unavailable);
        let result = harness.run_case(
            &case("print", "print(3)", "3\n", ""),
            EncodingStrategy::Accumulator,
        );
        assert!(!result.passed());
        assert_eq!(result.runs.len(), 4);
        assert!(result.runs.iter().all(|r| r.failure.is_some()));
    }
}
