//! CLI for prngbench: classical pseudorandom generators and the statistical
//! tests that judge them.

mod commands;

use clap::{Parser, Subcommand};

use commands::GeneratorArgs;

#[derive(Parser)]
#[command(name = "prngbench")]
#[command(about = "prngbench: generate pseudorandom sequences and test them for randomness")]
#[command(version = prngbench_core::VERSION)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a sequence with middle-square, linear or multiplicative congruential
    Generate {
        #[command(flatten)]
        generator: GeneratorArgs,

        /// Lower bound for scaled output Ni (requires --upper)
        #[arg(long)]
        lower: Option<f64>,

        /// Upper bound for scaled output Ni (requires --lower)
        #[arg(long)]
        upper: Option<f64>,

        /// Also emit Box-Muller normal deviates with this mean (default 0)
        #[arg(long)]
        normal_mean: Option<f64>,

        /// Also emit Box-Muller normal deviates with this standard deviation (default 1)
        #[arg(long)]
        normal_std: Option<f64>,

        /// Output format
        #[arg(long, default_value = "table", value_parser = ["table", "csv", "json"])]
        format: String,

        /// Write output to a file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },

    /// Run the randomness test battery on a file of values or a generated sequence
    Test {
        /// File with one value per line ('#' comments allowed); omit to generate inline
        #[arg(long)]
        input: Option<String>,

        #[command(flatten)]
        generator: GeneratorArgs,

        /// Comma-separated tests, e.g. "means,chi:10,ks:5" or "all"
        #[arg(long)]
        tests: Option<String>,

        /// JSON test config, e.g. {"means": true, "chi": {"k": 10}}
        #[arg(long)]
        config: Option<String>,

        /// Significance level
        #[arg(long, default_value = "0.05")]
        alpha: f64,

        /// Run tests on separate threads
        #[arg(long)]
        parallel: bool,

        /// Write results: .json for the verdict map, anything else for Markdown
        #[arg(long)]
        output: Option<String>,
    },

    /// Start the HTTP API server
    Server {
        /// Port to listen on
        #[arg(long, default_value = "8042")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Generate {
            generator,
            lower,
            upper,
            normal_mean,
            normal_std,
            format,
            output,
        } => commands::generate::run(commands::generate::GenerateCommandConfig {
            generator: &generator,
            lower,
            upper,
            normal_mean,
            normal_std,
            format: &format,
            output_path: output.as_deref(),
        }),
        Commands::Test {
            input,
            generator,
            tests,
            config,
            alpha,
            parallel,
            output,
        } => commands::test::run(commands::test::TestCommandConfig {
            input_path: input.as_deref(),
            generator: &generator,
            tests: tests.as_deref(),
            config_path: config.as_deref(),
            alpha,
            parallel,
            output_path: output.as_deref(),
        }),
        Commands::Server { port, host } => commands::server::run(&host, port),
    }
}
