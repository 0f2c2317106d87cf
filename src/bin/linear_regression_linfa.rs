use clap::Parser;
use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;

use regression_from_scratch::config::{DataArgs, OutputArgs};
use regression_from_scratch::data::{linear_dataset, train_test_split, LinearDataConfig};
use regression_from_scratch::metrics::ResidualSummary;

/// Linear regression with linfa on the same synthetic data
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[clap(flatten)]
    data: DataArgs,

    #[clap(long, default_value_t = 0.2)]
    test_size: f64,

    #[clap(flatten)]
    output: OutputArgs,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    args.output.init_logger();

    let mut rng = StdRng::seed_from_u64(args.data.seed);

    let config = LinearDataConfig::default();
    let (x, y) = linear_dataset(&config, &mut rng);

    let split = train_test_split(x.view(), y.view(), args.test_size, &mut rng)?;

    log::info!(
        "train rows {}, test rows {}",
        split.x_train.nrows(),
        split.x_test.nrows()
    );

    let train = Dataset::new(split.x_train, split.y_train);
    let test = Dataset::new(split.x_test, split.y_test);

    let model = LinearRegression::new().fit(&train)?;

    let intercept = model.intercept();
    let slope = model.params()[0];

    println!("=== Model Parameters ===");
    println!(
        "Intercept (β₀): {:.4}  (true: {:.1})",
        intercept, config.intercept
    );
    println!("Slope     (β₁): {:.4}  (true: {:.1})", slope, config.slope);

    let prediction: Array1<f64> = model.predict(&test);

    let mse = prediction.mean_squared_error(&test)?;
    let rmse = mse.sqrt();
    let r2 = prediction.r2(&test)?;

    println!("\n=== Test Set Metrics ===");
    println!("MSE:  {:.4}", mse);
    println!(
        "RMSE: {:.4}  (on average, we're off by ~{:.2} units)",
        rmse, rmse
    );
    println!(
        "R²:   {:.4}  (model explains {:.1}% of test variance)",
        r2,
        r2 * 100.
    );

    println!("\n=== Interpretation ===");
    println!("For every 1-unit increase in X, y increases by ~{:.2}", slope);
    println!("When X = 0, predicted y = {:.2}", intercept);
    println!(
        "Our model captures ~{:.0}% of the variance in the test data.",
        r2 * 100.
    );

    let residuals = test.targets() - &prediction;
    let summary = ResidualSummary::new(residuals.view());

    println!("\n=== Residual Sanity Check ===");
    println!("Mean of residuals:  {:.4}  (should be ~0)", summary.mean);
    println!(
        "Std of residuals:   {:.4}  (should be ~{}, our noise level)",
        summary.std, config.noise
    );
    println!("Max residual:       {:.4}", summary.max_abs);
    println!("(If mean ≈ 0 and std ≈ noise level, we're on track.)");

    Ok(())
}
