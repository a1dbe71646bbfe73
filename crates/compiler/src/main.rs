//! pyfck CLI
//!
//! Encode Python programs into the eight-symbol alphabet, decode them
//! again, check encodings against a real interpreter, and sample output
//! growth.

use clap::{CommandFactory, Parser as ClapParser, Subcommand};
use clap_complete::{Shell, generate};
use pyfck::{
    CaseSuite, EncoderConfig, EncodingStrategy, Harness, ProgramEncoder, PythonExecutor,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;

#[derive(ClapParser)]
#[command(name = "pyfck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "pyfck - write any Python program with eight symbols", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a Python program
    Encode {
        /// Input program (reads stdin when omitted or `-`)
        input: Option<PathBuf>,

        /// Write the encoded program here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Payload strategy: accumulator (linear) or direct (exponential)
        #[arg(short, long)]
        strategy: Option<EncodingStrategy>,

        /// Encoder configuration file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Unfold the result and compare it with the input
        #[arg(long)]
        verify: bool,
    },

    /// Recover the program an encoded text runs
    Decode {
        /// Encoded program (reads stdin when omitted or `-`)
        input: Option<PathBuf>,
    },

    /// Check encodings against a Python interpreter
    Check {
        /// Additional case files (TOML), merged over the built-in cases
        #[arg(long = "cases", value_name = "PATH")]
        cases: Vec<PathBuf>,

        /// Skip the built-in cases
        #[arg(long)]
        no_defaults: bool,

        /// Interpreter to run programs with
        #[arg(long, default_value = pyfck::executor::DEFAULT_PYTHON)]
        python: String,

        /// Strategies to check (repeatable)
        #[arg(short, long, default_value = "accumulator")]
        strategy: Vec<EncodingStrategy>,

        /// Verbose output (lengths and timing for each case)
        #[arg(short, long)]
        verbose: bool,
    },

    /// Measure encoded length against input length for random programs
    Growth {
        /// Largest random program length
        #[arg(long, default_value_t = 100)]
        max_len: usize,

        /// Seed for the random programs
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Payload strategy
        #[arg(short, long, default_value = "accumulator")]
        strategy: EncodingStrategy,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    // RUST_LOG wins; otherwise only warnings
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pyfck=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            input,
            output,
            strategy,
            config,
            verify,
        } => run_encode(input.as_deref(), output.as_deref(), strategy, config.as_deref(), verify),
        Commands::Decode { input } => run_decode(input.as_deref()),
        Commands::Check {
            cases,
            no_defaults,
            python,
            strategy,
            verbose,
        } => run_check(&cases, no_defaults, python, strategy, verbose),
        Commands::Growth {
            max_len,
            seed,
            strategy,
        } => run_growth(max_len, seed, strategy),
        Commands::Completions { shell } => run_completions(shell),
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Read a file, or stdin for `None` / `-`
fn read_input(input: Option<&Path>) -> Result<String, String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e)),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            Ok(buf)
        }
    }
}

fn run_encode(
    input: Option<&Path>,
    output: Option<&Path>,
    strategy: Option<EncodingStrategy>,
    config_path: Option<&Path>,
    verify: bool,
) {
    let mut config = match config_path {
        Some(path) => EncoderConfig::load(path).unwrap_or_else(|e| fail(e)),
        None => EncoderConfig::default(),
    };
    if let Some(strategy) = strategy {
        config.strategy = strategy;
    }
    if verify {
        config.verify = true;
    }

    let program = read_input(input).unwrap_or_else(|e| fail(e));
    let encoded = ProgramEncoder::new(config)
        .encode(&program)
        .unwrap_or_else(|e| fail(e));

    info!(
        input_len = program.len(),
        output_len = encoded.len(),
        "encoded"
    );

    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, encoded.as_str()) {
                fail(format!("Failed to write {}: {}", path.display(), e));
            }
            eprintln!(
                "Encoded {} chars -> {} chars in {}",
                program.chars().count(),
                encoded.len(),
                path.display()
            );
        }
        None => println!("{}", encoded),
    }
}

fn run_decode(input: Option<&Path>) {
    let encoded = read_input(input).unwrap_or_else(|e| fail(e));
    // Tolerate the trailing newline `encode` prints
    let encoded = encoded.trim_end_matches(['\n', '\r']);
    match pyfck::decode(encoded) {
        Ok(program) => print!("{}", program),
        Err(e) => fail(e),
    }
}

fn run_check(
    case_files: &[PathBuf],
    no_defaults: bool,
    python: String,
    strategies: Vec<EncodingStrategy>,
    verbose: bool,
) {
    let mut suite = if no_defaults {
        CaseSuite::default()
    } else {
        CaseSuite::default_suite().unwrap_or_else(|e| fail(e))
    };
    for path in case_files {
        suite.merge(CaseSuite::load(path).unwrap_or_else(|e| fail(e)));
    }

    let executor = PythonExecutor::new(python);
    if !executor.is_available() {
        fail(format!("Interpreter '{}' is not available", executor.interpreter()));
    }

    let harness = Harness::new(executor)
        .with_strategies(strategies)
        .with_verbose(verbose);
    let summary = harness.run(&suite);
    harness.print_results(&summary);

    if summary.failed > 0 {
        process::exit(1);
    } else if summary.total == 0 {
        eprintln!("No cases found");
        process::exit(2);
    }
}

fn run_growth(max_len: usize, seed: u64, strategy: EncodingStrategy) {
    let mut rng = StdRng::seed_from_u64(seed);
    let config = EncoderConfig::new()
        .with_strategy(strategy)
        .with_max_code_point(pyfck::growth::SAMPLE_CODE_POINTS.end);
    let report =
        pyfck::growth::sample(&mut rng, 1..=max_len, &config).unwrap_or_else(|e| fail(e));

    println!("{:>8} {:>12}", "input", "output");
    for sample in &report.samples {
        println!("{:>8} {:>12}", sample.input_len, sample.output_len);
    }
    if let Some(gradient) = report.gradient() {
        println!("\nApproximate gradient: {:.1}", gradient);
    }
}

fn run_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "pyfck", &mut io::stdout());
}
