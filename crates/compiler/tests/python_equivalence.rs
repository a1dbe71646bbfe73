//! End-to-end equivalence against a real interpreter
//!
//! These tests need `python3` on PATH and return early without it.

use pyfck::executor::MAX_INLINE_PROGRAM;
use pyfck::{
    CaseSuite, EncoderConfig, EncodingStrategy, Executor, Harness, ProgramEncoder,
    PythonExecutor,
};

fn python() -> Option<PythonExecutor> {
    let executor = PythonExecutor::default();
    if executor.is_available() {
        Some(executor)
    } else {
        eprintln!("python3 not available, skipping");
        None
    }
}

#[test]
fn test_default_cases_accumulator() {
    let Some(executor) = python() else { return };
    let harness = Harness::new(executor).with_strategies(vec![EncodingStrategy::Accumulator]);
    let summary = harness.run(&CaseSuite::default_suite().unwrap());

    assert_eq!(summary.total, 6);
    for result in &summary.results {
        assert!(result.passed(), "{:?}", result);
    }
}

#[test]
fn test_short_cases_direct() {
    let Some(executor) = python() else { return };
    let suite = CaseSuite::from_toml(
        r#"
[[case]]
name = "assignment"
program = "c=8"
post_checks = ["assert(c==8)"]

[[case]]
name = "print"
program = "print(3)"
stdout = "3\n"

[[case]]
name = "percent"
program = 'print("%%")'
stdout = "%%\n"

[[case]]
name = "zero-division"
program = "1/0"
stderr = "ZeroDivisionError: division by zero"
"#,
    )
    .unwrap();
    let harness = Harness::new(executor).with_strategies(vec![EncodingStrategy::Direct]);
    let summary = harness.run(&suite);

    assert_eq!(summary.failed, 0, "{:?}", summary.results);
}

#[test]
fn test_long_program_goes_through_stdin() {
    let Some(executor) = python() else { return };
    let program = format!("s='{}'\nprint(len(s))", "ab".repeat(40));
    let encoded = ProgramEncoder::new(EncoderConfig::new())
        .encode(&program)
        .unwrap();
    assert!(encoded.len() > MAX_INLINE_PROGRAM);

    let outcome = executor.run(encoded.as_str()).unwrap();
    assert!(outcome.success, "{}", outcome.stderr);
    assert_eq!(outcome.stdout, "80\n");
}

#[test]
fn test_non_ascii_program() {
    let Some(executor) = python() else { return };
    let program = "print('h\u{e9}llo', chr(0x1F600) == '\u{1F600}')";
    let encoded = ProgramEncoder::new(EncoderConfig::new())
        .encode(program)
        .unwrap();

    let outcome = executor.run(encoded.as_str()).unwrap();
    assert_eq!(outcome.stdout, "h\u{e9}llo True\n");
}
