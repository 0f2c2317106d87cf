use approx::assert_abs_diff_eq;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rstest::rstest;

use regression_from_scratch::data::{
    labels_as_targets, linear_dataset, two_clusters, with_intercept, ClusterDataConfig,
    LinearDataConfig,
};
use regression_from_scratch::metrics::{accuracy, orthogonality, predict_labels};
use regression_from_scratch::{normal_equation, sigmoid, GradientDescent, Link};

fn regression_data(seed: u64) -> (Array2<f64>, Array1<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let (x, y) = linear_dataset(&LinearDataConfig::default(), &mut rng);

    (with_intercept(x.view()), y)
}

fn classification_data(seed: u64) -> (Array2<f64>, Array1<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let (x, labels) = two_clusters(&ClusterDataConfig::default(), &mut rng);

    (with_intercept(x.view()), labels)
}

fn data_for(link: Link, seed: u64) -> (Array2<f64>, Array1<f64>) {
    match link {
        Link::Identity => regression_data(seed),
        Link::Logistic => {
            let (x, labels) = classification_data(seed);
            (x, labels_as_targets(labels.view()))
        }
    }
}

#[rstest]
#[case(Link::Identity, 0.1)]
#[case(Link::Logistic, 0.5)]
#[case(Link::Logistic, 0.1)]
fn loss_never_increases_for_small_steps(#[case] link: Link, #[case] learning_rate: f64) {
    let (x, y) = data_for(link, 42);

    let fit = GradientDescent::new(link)
        .with_learning_rate(learning_rate)
        .with_tolerance(None)
        .fit(x.view(), y.view())
        .unwrap();

    assert_eq!(fit.losses.len(), 1000);
    assert!(fit.loss_is_non_increasing(1e-10));
    assert!(fit.final_loss().unwrap() < fit.losses[0]);
}

#[rstest]
#[case(42)]
#[case(7)]
fn gradient_descent_agrees_with_normal_equation(#[case] seed: u64) {
    let (x, y) = regression_data(seed);

    let closed_form = normal_equation(x.view(), y.view()).unwrap();
    let fit = GradientDescent::linear().fit(x.view(), y.view()).unwrap();

    let max_difference = (&closed_form - &fit.coefficients)
        .iter()
        .fold(0f64, |acc, d| acc.max(d.abs()));

    assert!(max_difference < 1e-3, "max difference {max_difference}");
}

#[test]
fn recovers_known_line() {
    let (x, y) = regression_data(42);

    let fit = GradientDescent::linear().fit(x.view(), y.view()).unwrap();

    assert_abs_diff_eq!(fit.coefficients[0], 3., epsilon = 0.3);
    assert_abs_diff_eq!(fit.coefficients[1], 2., epsilon = 0.3);
}

#[test]
fn recovers_known_line_from_more_data() {
    let mut rng = StdRng::seed_from_u64(3);
    let config = LinearDataConfig {
        n_samples: 2000,
        ..Default::default()
    };
    let (x, y) = linear_dataset(&config, &mut rng);
    let x = with_intercept(x.view());

    let fit = GradientDescent::linear()
        .with_max_iterations(5000)
        .fit(x.view(), y.view())
        .unwrap();

    assert_abs_diff_eq!(fit.coefficients[0], 3., epsilon = 0.1);
    assert_abs_diff_eq!(fit.coefficients[1], 2., epsilon = 0.1);
}

#[test]
fn default_linear_settings_stop_early() {
    let (x, y) = regression_data(42);

    let fit = GradientDescent::linear()
        .with_max_iterations(5000)
        .fit(x.view(), y.view())
        .unwrap();

    let stopped = fit.converged_at.expect("gradient norm should fall below 1e-8");
    assert_eq!(fit.losses.len(), stopped + 1);
    assert!(fit.losses.len() < 5000);
}

#[test]
fn logistic_separates_two_clusters() {
    let (x, labels) = classification_data(42);
    let y = labels_as_targets(labels.view());

    let fit = GradientDescent::logistic()
        .with_learning_rate(0.5)
        .fit(x.view(), y.view())
        .unwrap();

    let probabilities = fit.predict(x.view());
    let predictions = predict_labels(probabilities.view(), 0.5);

    assert!(accuracy(labels.view(), predictions.view()) > 0.85);
    // both features push towards class 1
    assert!(fit.coefficients[1] > 0.);
    assert!(fit.coefficients[2] > 0.);
}

#[test]
fn logistic_early_stopping_is_available() {
    let (x, labels) = classification_data(42);
    let y = labels_as_targets(labels.view());

    let fit = GradientDescent::logistic()
        .with_learning_rate(0.5)
        .with_max_iterations(20_000)
        .with_tolerance(Some(1e-4))
        .fit(x.view(), y.view())
        .unwrap();

    let stopped = fit.converged_at.expect("logistic fit should converge");
    assert_eq!(fit.losses.len(), stopped + 1);
}

#[test]
fn probabilities_stay_inside_unit_interval() {
    let (x, labels) = classification_data(1);
    let y = labels_as_targets(labels.view());

    let fit = GradientDescent::logistic().fit(x.view(), y.view()).unwrap();
    let probabilities = fit.predict(x.view());

    assert!(probabilities.iter().all(|&p| p > 0. && p < 1.));
    assert_eq!(sigmoid(10_000.), 1.);
    assert!(sigmoid(-10_000.) > 0.);
}

#[rstest]
#[case(Link::Identity)]
#[case(Link::Logistic)]
fn prediction_is_bit_identical_across_calls(#[case] link: Link) {
    let (x, y) = data_for(link, 11);

    let fit = GradientDescent::new(link)
        .with_max_iterations(50)
        .fit(x.view(), y.view())
        .unwrap();

    let first = fit.predict(x.view());
    let second = fit.predict(x.view());

    assert!(first
        .iter()
        .zip(second.iter())
        .all(|(a, b)| a.to_bits() == b.to_bits()));
}

#[test]
fn least_squares_residuals_are_orthogonal_to_columns() {
    let (x, y) = regression_data(42);

    let beta = normal_equation(x.view(), y.view()).unwrap();
    let residuals = &y - &x.dot(&beta);

    for component in orthogonality(x.view(), residuals.view()).iter() {
        assert_abs_diff_eq!(*component, 0., epsilon = 1e-8);
    }
}

#[test]
fn same_seed_same_fit() {
    let (x, y) = regression_data(5);

    let first = GradientDescent::linear().fit(x.view(), y.view()).unwrap();
    let second = GradientDescent::linear().fit(x.view(), y.view()).unwrap();

    assert_eq!(first, second);
}
