use anyhow::Context;
use clap::{Parser, ValueEnum};
use mapcolor::graph::{ColoringOptions, GraphOptions, Polarity};
use mapcolor::region::LabelOptions;
use mapcolor::{BackendKind, PipelineOptions, RenderOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mapcolor")]
#[command(about = "Color the regions of a 32-bit BMP map with at most four colors")]
struct Cli {
    /// Source 32-bit BMP file
    input: PathBuf,

    /// Destination BMP file, written only on success
    output: PathBuf,

    /// Spread rounds per pixel during region labeling
    #[arg(long, default_value_t = 1000)]
    spread_timeout: u32,

    /// Pixels darker than this luma are borders
    #[arg(long, default_value_t = 128)]
    border_threshold: u8,

    /// Bit value marking an edge in the adjacency matrix
    #[arg(long, value_enum, default_value_t = PolarityArg::One)]
    polarity: PolarityArg,

    /// Largest acceptable number of colors
    #[arg(long, default_value_t = 4)]
    max_colors: u32,

    /// Seed for the visiting-order perturbation (random if absent)
    #[arg(long)]
    seed: Option<u64>,

    /// Give up after this many coloring attempts
    #[arg(long)]
    max_attempts: Option<u64>,

    /// Paint region ids instead of map colors
    #[arg(long)]
    debug_mask: bool,

    /// Worker threads (default: one per core)
    #[arg(long, conflicts_with = "serial")]
    threads: Option<usize>,

    /// Run every pass on the calling thread
    #[arg(long)]
    serial: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolarityArg {
    One,
    Zero,
}

impl From<PolarityArg> for Polarity {
    fn from(arg: PolarityArg) -> Self {
        match arg {
            PolarityArg::One => Polarity::EdgeIsOne,
            PolarityArg::Zero => Polarity::EdgeIsZero,
        }
    }
}

impl Cli {
    fn options(&self) -> PipelineOptions {
        let mut coloring = ColoringOptions::default().with_max_colors(self.max_colors);
        if let Some(seed) = self.seed {
            coloring = coloring.with_seed(seed);
        }
        if let Some(attempts) = self.max_attempts {
            coloring = coloring.with_max_attempts(attempts);
        }
        let mut options = PipelineOptions::default()
            .with_label(
                LabelOptions::default()
                    .with_spread_timeout(self.spread_timeout)
                    .with_border_threshold(self.border_threshold),
            )
            .with_graph(GraphOptions::default().with_polarity(self.polarity.into()))
            .with_coloring(coloring)
            .with_render(RenderOptions::default().with_debug_mask(self.debug_mask))
            .with_backend(if self.serial {
                BackendKind::Serial
            } else {
                BackendKind::Rayon
            });
        options.threads = self.threads;
        options
    }
}

/// Status for a command line clap refused: help and version succeed, usage
/// errors fail like any other error.
fn parse_status(err: &clap::Error) -> u8 {
    u8::from(err.use_stderr())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_status(&e));
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mapcolor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<mapcolor::Error>().and_then(mapcolor::Error::format_code) {
                Some(code) => eprintln!("Error (format check {code}): {e:#}"),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let report = mapcolor::run(&cli.input, &cli.output, &cli.options())
        .with_context(|| format!("failed to color {}", cli.input.display()))?;
    println!(
        "{}x{}: {} regions, {} colors after {} attempt(s), {:.3}s",
        report.width,
        report.height,
        report.regions,
        report.colors,
        report.attempts,
        report.total_time.as_secs_f64()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_fail_with_status_one() {
        let missing = Cli::try_parse_from(["mapcolor", "in.bmp"]).err().unwrap();
        assert_eq!(parse_status(&missing), 1);
        let bad_value =
            Cli::try_parse_from(["mapcolor", "in.bmp", "out.bmp", "--max-colors", "four"])
                .err()
                .unwrap();
        assert_eq!(parse_status(&bad_value), 1);
        let conflict =
            Cli::try_parse_from(["mapcolor", "in.bmp", "out.bmp", "--serial", "--threads", "2"])
                .err()
                .unwrap();
        assert_eq!(parse_status(&conflict), 1);
    }

    #[test]
    fn test_help_succeeds() {
        let help = Cli::try_parse_from(["mapcolor", "--help"]).err().unwrap();
        assert_eq!(parse_status(&help), 0);
    }

    #[test]
    fn test_options_from_flags() {
        let cli = Cli::try_parse_from([
            "mapcolor", "in.bmp", "out.bmp", "--polarity", "zero", "--seed", "9", "--serial",
        ])
        .unwrap();
        let options = cli.options();
        assert_eq!(options.graph.polarity, Polarity::EdgeIsZero);
        assert_eq!(options.coloring.seed, Some(9));
        assert_eq!(options.backend, BackendKind::Serial);
        assert_eq!(options.label.spread_timeout, 1000);
    }
}
