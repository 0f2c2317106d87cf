use clap::Parser;
use plotters::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use regression_from_scratch::config::{DataArgs, DescentArgs, OutputArgs};
use regression_from_scratch::data::{
    labels_as_targets, two_clusters, with_intercept, ClusterDataConfig,
};
use regression_from_scratch::metrics::{
    accuracy, predict_labels, ConfusionMatrix, DecisionBoundary,
};
use regression_from_scratch::plots::{plot_decision_boundary, plot_error_matrix, plot_loss_trace};
use regression_from_scratch::{trace, GradientDescent};

/// Binary logistic regression from scratch with batch gradient descent
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[clap(flatten)]
    data: DataArgs,

    #[clap(long, default_value_t = 100)]
    per_class: usize,

    /// Print training progress every n iterations
    #[clap(long, default_value_t = 200)]
    report_every: usize,

    #[clap(flatten)]
    descent: DescentArgs,

    #[clap(flatten)]
    output: OutputArgs,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    args.output.init_logger();

    let mut rng = StdRng::seed_from_u64(args.data.seed);

    let config = ClusterDataConfig {
        n_per_class: args.per_class,
        ..Default::default()
    };

    let (x_raw, labels) = two_clusters(&config, &mut rng);
    let y = labels_as_targets(labels.view());
    let x = with_intercept(x_raw.view());

    println!("=== Training Logistic Regression from Scratch ===\n");

    let descent = args.descent.apply(
        GradientDescent::logistic()
            .with_learning_rate(0.5)
            .with_report_every(Some(args.report_every)),
    );

    let fit = descent.fit_observed(x.view(), y.view(), |progress| {
        if let Some(accuracy) = progress.accuracy {
            println!(
                "  Iteration {:4} | Loss: {:.4} | Accuracy: {:.2}%",
                progress.iteration,
                progress.loss,
                accuracy * 100.
            );
        }
    })?;

    if let Some(i) = fit.converged_at {
        println!("  Converged at iteration {i}");
    }

    let beta = &fit.coefficients;

    println!("\n=== Learned Parameters ===");
    println!("Intercept (β₀): {:.4}", beta[0]);
    println!("Weight x₁ (β₁): {:.4}", beta[1]);
    println!("Weight x₂ (β₂): {:.4}", beta[2]);

    let probabilities = fit.predict(x.view());
    let predictions = predict_labels(probabilities.view(), 0.5);

    let final_loss = fit.final_loss().unwrap_or(f64::NAN);

    println!("\n=== Final Performance ===");
    println!(
        "Accuracy: {:.2}%",
        accuracy(labels.view(), predictions.view()) * 100.
    );
    println!("Final loss: {:.4}", final_loss);

    println!("\n=== Sample Predictions ===");
    println!(
        "{:>20} | {:>5} | {:>7} | {:>5}",
        "Features", "True", "P(y=1)", "Pred"
    );
    println!("{}", "-".repeat(50));
    for i in 0..x_raw.nrows().min(10) {
        let features = format!("({:+.2}, {:+.2})", x_raw[[i, 0]], x_raw[[i, 1]]);
        println!(
            "{:>20} | {:>5} | {:>7.4} | {:>5}",
            features, labels[i], probabilities[i], predictions[i]
        );
    }

    let cm = ConfusionMatrix::new(labels.view(), predictions.view());

    println!("\n=== Confusion Matrix ===");
    println!("              Pred 1   Pred 0");
    println!(
        "  Actual 1:    {:4}     {:4}",
        cm.true_positive, cm.false_negative
    );
    println!(
        "  Actual 0:    {:4}     {:4}",
        cm.false_positive, cm.true_negative
    );
    println!("\nPrecision: {:.4}", cm.precision());
    println!("Recall:    {:.4}", cm.recall());
    println!("F1-score:  {:.4}", cm.f1());

    let boundary = DecisionBoundary::from_coefficients(beta.view())
        .ok_or("expected an intercept and two weights")?;

    println!("\n=== Decision Boundary ===");
    println!("{boundary}");

    println!("\n=== Loss Convergence Check ===");
    println!("Initial loss: {:.4}", fit.losses[0]);
    println!("Final loss:   {:.4}", final_loss);
    println!(
        "Loss decreased monotonically: {}",
        fit.loss_is_non_increasing(1e-10)
    );

    if let Some(path) = &args.output.loss_csv {
        trace::save_losses(path, &fit.losses)?;
        println!("\nloss trace written to {}", path.display());
    }

    if let Some(dir) = &args.output.plots_dir {
        std::fs::create_dir_all(dir)?;

        let path = dir.join("logistic_regression.svg");
        let drawing_area = SVGBackend::new(&path, (1800, 600)).into_drawing_area();

        if let [boundary_area, loss_area, matrix_area, ..] =
            drawing_area.split_evenly((1, 3)).as_slice()
        {
            plot_decision_boundary(
                x_raw.view(),
                labels.view(),
                &boundary,
                "Decision boundary",
                boundary_area,
            )?;

            plot_loss_trace(&fit.losses, "Cross-entropy", loss_area)?;

            plot_error_matrix(
                labels.as_slice().ok_or("labels are not contiguous")?,
                predictions.as_slice().ok_or("predictions are not contiguous")?,
                2,
                &|c| format!("class {c}"),
                "Confusion matrix",
                matrix_area,
            )?;
        }

        drawing_area.present()?;

        println!("plots written to {}", path.display());
    }

    Ok(())
}
