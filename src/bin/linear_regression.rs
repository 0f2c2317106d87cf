use clap::Parser;
use plotters::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use regression_from_scratch::config::{DataArgs, DescentArgs, OutputArgs};
use regression_from_scratch::data::{linear_dataset, with_intercept, LinearDataConfig};
use regression_from_scratch::metrics::{orthogonality, RegressionReport};
use regression_from_scratch::plots::{plot_fit, plot_loss_trace};
use regression_from_scratch::{normal_equation, trace, GradientDescent};

/// Linear regression from scratch: normal equation vs gradient descent
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[clap(flatten)]
    data: DataArgs,

    #[clap(long, default_value_t = 100)]
    samples: usize,

    /// Standard deviation of the gaussian noise added to y
    #[clap(long, default_value_t = 0.5)]
    noise: f64,

    #[clap(flatten)]
    descent: DescentArgs,

    #[clap(flatten)]
    output: OutputArgs,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    args.output.init_logger();

    let mut rng = StdRng::seed_from_u64(args.data.seed);

    let config = LinearDataConfig {
        n_samples: args.samples,
        noise: args.noise,
        ..Default::default()
    };

    let (x_raw, y) = linear_dataset(&config, &mut rng);
    let x = with_intercept(x_raw.view());

    log::info!("{} samples, seed {}", x.nrows(), args.data.seed);

    let beta_normal = normal_equation(x.view(), y.view())?;

    println!("=== Normal Equation ===");
    println!(
        "Intercept (β₀): {:.4}  (true: {:.1})",
        beta_normal[0], config.intercept
    );
    println!(
        "Slope     (β₁): {:.4}  (true: {:.1})",
        beta_normal[1], config.slope
    );

    let descent = args.descent.apply(GradientDescent::linear());
    let fit = descent.fit(x.view(), y.view())?;

    if let Some(i) = fit.converged_at {
        println!("  Converged at iteration {i}");
    }

    let beta_gd = &fit.coefficients;

    println!("\n=== Gradient Descent ===");
    println!(
        "Intercept (β₀): {:.4}  (true: {:.1})",
        beta_gd[0], config.intercept
    );
    println!("Slope     (β₁): {:.4}  (true: {:.1})", beta_gd[1], config.slope);

    let max_difference = (&beta_normal - beta_gd)
        .iter()
        .fold(0f64, |acc, d| acc.max(d.abs()));

    println!("\n=== Comparison ===");
    println!("Max difference between methods: {:.8}", max_difference);

    let prediction = x.dot(&beta_normal);
    let residuals = &y - &prediction;

    let report = RegressionReport::new(y.view(), prediction.view());

    println!("\n=== Metrics ===");
    println!("MSE:  {:.4}", report.mse);
    println!(
        "RMSE: {:.4}  (average prediction error in original units)",
        report.rmse
    );
    println!("MAE:  {:.4}", report.mae);
    println!("R²:   {:.4}  (fraction of variance explained)", report.r2);

    let check = orthogonality(x.view(), residuals.view());

    println!("\n=== Orthogonality Check ===");
    println!("Xᵀe = {:e}", check);
    println!("(Should be ~0. This confirms the projection interpretation.)");

    if let Some(path) = &args.output.loss_csv {
        trace::save_losses(path, &fit.losses)?;
        println!("\nloss trace written to {}", path.display());
    }

    if let Some(dir) = &args.output.plots_dir {
        std::fs::create_dir_all(dir)?;

        let path = dir.join("linear_regression.svg");
        let drawing_area = SVGBackend::new(&path, (1200, 600)).into_drawing_area();
        let (left, right) = drawing_area.split_horizontally(600);

        plot_fit(
            x_raw.column(0),
            y.view(),
            &[
                ("normal equation", beta_normal[0], beta_normal[1]),
                ("gradient descent", beta_gd[0], beta_gd[1]),
            ],
            "y = 3 + 2x + noise",
            &left,
        )?;

        plot_loss_trace(&fit.losses, "MSE", &right)?;

        drawing_area.present()?;

        println!("plots written to {}", path.display());
    }

    Ok(())
}
