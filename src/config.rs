use std::path::PathBuf;

use clap::Args;
use log::LevelFilter;

use crate::fitter::GradientDescent;

#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Seed for the synthetic data and the train/test shuffle
    #[clap(short, long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Args, Debug, Clone)]
pub struct DescentArgs {
    #[clap(short, long)]
    pub learning_rate: Option<f64>,

    #[clap(short = 'n', long)]
    pub iterations: Option<usize>,

    /// Stop once the gradient norm falls below this
    #[clap(short, long)]
    pub tolerance: Option<f64>,

    /// Always run every iteration
    #[clap(long, conflicts_with = "tolerance")]
    pub no_tolerance: bool,
}

impl DescentArgs {
    /// Overrides whatever was given on the command line.
    pub fn apply(&self, mut descent: GradientDescent) -> GradientDescent {
        if let Some(learning_rate) = self.learning_rate {
            descent = descent.with_learning_rate(learning_rate);
        }

        if let Some(iterations) = self.iterations {
            descent = descent.with_max_iterations(iterations);
        }

        if self.no_tolerance {
            descent = descent.with_tolerance(None);
        } else if self.tolerance.is_some() {
            descent = descent.with_tolerance(self.tolerance);
        }

        descent
    }
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Directory for SVG plots, nothing is drawn when absent
    #[clap(short, long)]
    pub plots_dir: Option<PathBuf>,

    /// Write the loss trace as `iteration,loss` rows
    #[clap(long)]
    pub loss_csv: Option<PathBuf>,

    #[clap(short, long)]
    pub verbose: bool,
}

impl OutputArgs {
    pub fn level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        }
    }

    /// `RUST_LOG` wins over `--verbose`.
    pub fn init_logger(&self) {
        env_logger::Builder::new()
            .filter_level(self.level())
            .parse_default_env()
            .init();
    }
}
