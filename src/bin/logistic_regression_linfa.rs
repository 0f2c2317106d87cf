use clap::Parser;
use linfa::prelude::*;
use linfa_logistic::LogisticRegression;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;

use regression_from_scratch::config::{DataArgs, OutputArgs};
use regression_from_scratch::data::{stratified_train_test_split, two_clusters, ClusterDataConfig};
use regression_from_scratch::metrics::{
    accuracy, class_orientation, odds_ratio, oriented_probabilities, roc_auc,
    ClassificationReport, ConfusionMatrix, DecisionBoundary,
};

/// Logistic regression with linfa on the same two-cluster data
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[clap(flatten)]
    data: DataArgs,

    #[clap(long, default_value_t = 0.2)]
    test_size: f64,

    /// Inverse regularization strength, C = 1/λ
    #[clap(short = 'c', long, default_value_t = 1.0)]
    inverse_regularization: f64,

    #[clap(long, default_value_t = 1000)]
    max_iterations: u64,

    #[clap(flatten)]
    output: OutputArgs,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    args.output.init_logger();

    let mut rng = StdRng::seed_from_u64(args.data.seed);

    let (x, labels) = two_clusters(&ClusterDataConfig::default(), &mut rng);

    let split = stratified_train_test_split(x.view(), labels.view(), args.test_size, &mut rng)?;

    let x_test = split.x_test.clone();
    let y_test = split.y_test.clone();

    let train = Dataset::new(split.x_train, split.y_train);

    let fit_with = |c: f64| {
        LogisticRegression::default()
            .alpha(1. / c)
            .max_iterations(args.max_iterations)
            .fit(&train)
    };

    let model = fit_with(args.inverse_regularization)?;

    let y_pred: Array1<usize> = model.predict(&x_test);
    let raw_probabilities = model.predict_probabilities(&x_test);

    // linfa scores whichever label it saw as positive
    let sign = class_orientation(y_pred.view(), raw_probabilities.view());
    let y_probs = oriented_probabilities(raw_probabilities.view(), sign);

    let b0 = sign * model.intercept();
    let b1 = sign * model.params()[0];
    let b2 = sign * model.params()[1];

    println!("=== Model Parameters ===");
    println!("Intercept (β₀):  {:.4}", b0);
    println!("Weight x₁ (β₁):  {:.4}", b1);
    println!("Weight x₂ (β₂):  {:.4}", b2);

    println!("\n=== Sample Predictions ===");
    println!(
        "{:>8} {:>8} | {:>8} | {:>5} | {:>5}",
        "x₁", "x₂", "P(y=1)", "Pred", "True"
    );
    println!("{}", "-".repeat(45));
    for i in 0..x_test.nrows().min(8) {
        println!(
            "{:>8.3} {:>8.3} | {:>8.4} | {:>5} | {:>5}",
            x_test[[i, 0]],
            x_test[[i, 1]],
            y_probs[i],
            y_pred[i],
            y_test[i]
        );
    }

    let cm = ConfusionMatrix::new(y_test.view(), y_pred.view());

    println!("\n=== Test Set Metrics ===");
    println!("Accuracy:  {:.4}", cm.accuracy());
    println!(
        "Precision: {:.4}  (when I say 1, am I right?)",
        cm.precision()
    );
    println!("Recall:    {:.4}  (did I find all the 1s?)", cm.recall());
    println!("F1-score:  {:.4}  (harmonic mean of P and R)", cm.f1());
    match roc_auc(y_test.view(), y_probs.view()) {
        Some(auc) => println!("ROC-AUC:   {:.4}  (ranking quality)", auc),
        None => println!("ROC-AUC:   undefined, test set holds a single class"),
    }

    println!("\n=== Confusion Matrix ===");
    println!("              Pred 0   Pred 1");
    println!(
        "  Actual 0:    {:4}     {:4}",
        cm.true_negative, cm.false_positive
    );
    println!(
        "  Actual 1:    {:4}     {:4}",
        cm.false_negative, cm.true_positive
    );

    println!("\n=== Classification Report ===");
    println!(
        "{}",
        ClassificationReport::new(y_test.view(), y_pred.view(), &["Class 0", "Class 1"])
    );

    println!("=== Decision Boundary ===");
    println!("{}", DecisionBoundary::new(b0, b1, b2));

    println!("\n=== Coefficient Interpretation ===");
    for (name, coef) in [("x₁", b1), ("x₂", b2)] {
        let odds = odds_ratio(coef);

        println!("  {}: β = {:.4}", name, coef);
        println!(
            "       → 1-unit increase multiplies odds by e^{:.4} = {:.4}",
            coef, odds
        );
        if odds > 1. {
            println!("       → Odds increase by {:.1}% per unit", (odds - 1.) * 100.);
        } else {
            println!("       → Odds decrease by {:.1}% per unit", (1. - odds) * 100.);
        }
    }

    println!("\n=== Regularization Effect ===");
    for c in [0.01, 1.0, 100.0] {
        let model = fit_with(c)?;

        let predicted: Array1<usize> = model.predict(&x_test);

        let acc = accuracy(y_test.view(), predicted.view());
        let norm = model.params().dot(model.params()).sqrt();

        let note = if c < 0.1 {
            "(heavy reg)"
        } else if c == 1.0 {
            "(default)"
        } else {
            "(light reg)"
        };

        println!(
            "  C={:6.2} | Accuracy: {:.4} | ||β||: {:.4}  {}",
            c, acc, norm, note
        );
    }

    Ok(())
}
