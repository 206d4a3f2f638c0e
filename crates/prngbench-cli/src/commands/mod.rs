pub mod generate;
pub mod server;

use clap::Args;

use prngbench_core::{GeneratorKind, GeneratorParameters, ScaleRange};
use prngbench_server::MAX_COUNT;

/// Generator selection shared by `generate` and `test`.
#[derive(Args, Debug, Clone, Default)]
pub struct GeneratorArgs {
    /// Generator: middle-square, linear (lcg) or multiplicative (mcg)
    #[arg(long)]
    pub method: Option<String>,

    /// Middle-square seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Congruential seed X0
    #[arg(long)]
    pub x0: Option<u64>,

    /// Linear congruential: multiplier a = 1 + 2k
    #[arg(long)]
    pub k: Option<u64>,

    /// Linear congruential: increment c
    #[arg(long)]
    pub c: Option<u64>,

    /// Multiplicative congruential: multiplier a = 8t + 3
    #[arg(long)]
    pub t: Option<u64>,

    /// Modulus exponent: m = 2^g
    #[arg(long)]
    pub g: Option<u32>,

    /// Number of values to generate (1-100000, same cap as the HTTP API)
    #[arg(long, default_value = "100", value_parser = parse_count)]
    pub count: usize,
}

impl GeneratorArgs {
    /// Resolve flags into generator parameters.
    pub fn to_parameters(&self) -> Result<GeneratorParameters, String> {
        let method = self
            .method
            .as_deref()
            .ok_or("--method is required to generate values")?;
        let kind =
            GeneratorKind::parse(method).ok_or_else(|| format!("unknown method '{method}'"))?;

        Ok(match kind {
            GeneratorKind::MiddleSquare => GeneratorParameters::MiddleSquare {
                seed: required(self.seed, "--seed", kind)?,
                range: None,
            },
            GeneratorKind::LinearCongruential => GeneratorParameters::LinearCongruential {
                x0: required(self.x0, "--x0", kind)?,
                k: required(self.k, "--k", kind)?,
                c: required(self.c, "--c", kind)?,
                g: required(self.g, "--g", kind)?,
            },
            GeneratorKind::MultiplicativeCongruential => {
                GeneratorParameters::MultiplicativeCongruential {
                    x0: required(self.x0, "--x0", kind)?,
                    t: required(self.t, "--t", kind)?,
                    g: required(self.g, "--g", kind)?,
                }
            }
        })
    }
}

fn required<T>(value: Option<T>, flag: &str, kind: GeneratorKind) -> Result<T, String> {
    value.ok_or_else(|| format!("{flag} is required for {kind}"))
}

/// `--count` within `1..=MAX_COUNT`.
pub fn parse_count(s: &str) -> Result<usize, String> {
    let count: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a non-negative integer"))?;
    if !(1..=MAX_COUNT).contains(&count) {
        return Err(format!("count must be in 1..={MAX_COUNT}, got {count}"));
    }
    Ok(count)
}

/// Both bounds or neither.
pub fn parse_range(lower: Option<f64>, upper: Option<f64>) -> Result<Option<ScaleRange>, String> {
    match (lower, upper) {
        (None, None) => Ok(None),
        (Some(lower), Some(upper)) => ScaleRange::new(lower, upper)
            .map(Some)
            .map_err(|e| e.to_string()),
        _ => Err("--lower and --upper must be given together".to_string()),
    }
}

/// Print `Error: {message}` and exit with status 1.
pub fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}
