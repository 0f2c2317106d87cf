use std::fmt;

use itertools::Itertools;
use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::link::mean_squared_error;

/// Fraction of rows where `p >= threshold` agrees with `y == 1`.
pub fn accuracy_at(y: ArrayView1<f64>, probabilities: ArrayView1<f64>, threshold: f64) -> f64 {
    if y.is_empty() {
        return 0.;
    }

    let correct = y
        .iter()
        .zip(probabilities.iter())
        .filter(|(&y, &p)| (p >= threshold) == (y >= 0.5))
        .count();

    correct as f64 / y.len() as f64
}

pub fn predict_labels(probabilities: ArrayView1<f64>, threshold: f64) -> Array1<usize> {
    probabilities.mapv(|p| (p >= threshold) as usize)
}

pub fn accuracy(expected: ArrayView1<usize>, predicted: ArrayView1<usize>) -> f64 {
    if expected.is_empty() {
        return 0.;
    }

    let correct = expected
        .iter()
        .zip(predicted.iter())
        .filter(|(e, p)| e == p)
        .count();

    correct as f64 / expected.len() as f64
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionReport {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl RegressionReport {
    pub fn new(y: ArrayView1<f64>, prediction: ArrayView1<f64>) -> Self {
        let mse = mean_squared_error(y, prediction);

        let mae = (&y - &prediction).mapv(f64::abs).mean().unwrap_or(0.);

        Self {
            mse,
            rmse: mse.sqrt(),
            mae,
            r2: r_squared(y, prediction),
        }
    }
}

/// `1 - SS_res / SS_tot`. A constant target scores 1 when matched exactly
/// and 0 otherwise.
pub fn r_squared(y: ArrayView1<f64>, prediction: ArrayView1<f64>) -> f64 {
    let mean = y.mean().unwrap_or(0.);

    let ss_res: f64 = (&y - &prediction).mapv(|r| r * r).sum();
    let ss_tot: f64 = y.mapv(|v| (v - mean).powi(2)).sum();

    if ss_tot == 0. {
        return if ss_res == 0. { 1. } else { 0. };
    }

    1. - ss_res / ss_tot
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualSummary {
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub max_abs: f64,
}

impl ResidualSummary {
    pub fn new(residuals: ArrayView1<f64>) -> Self {
        Self {
            mean: residuals.mean().unwrap_or(0.),
            std: residuals.std(0.),
            max_abs: residuals.iter().map(|r| r.abs()).fold(0., f64::max),
        }
    }
}

/// `Xᵀe`; zero for the least-squares residuals.
pub fn orthogonality(x: ArrayView2<f64>, residuals: ArrayView1<f64>) -> Array1<f64> {
    x.t().dot(&residuals)
}

/// Binary confusion matrix with class `1` as the positive class.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_negative: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.
    } else {
        numerator as f64 / denominator as f64
    }
}

fn harmonic_mean(a: f64, b: f64) -> f64 {
    if a + b > 0. {
        2. * a * b / (a + b)
    } else {
        0.
    }
}

impl ConfusionMatrix {
    pub fn new(expected: ArrayView1<usize>, predicted: ArrayView1<usize>) -> Self {
        expected
            .iter()
            .zip(predicted.iter())
            .fold(Self::default(), |mut cm, (&e, &p)| {
                match (e == 1, p == 1) {
                    (true, true) => cm.true_positive += 1,
                    (false, true) => cm.false_positive += 1,
                    (true, false) => cm.false_negative += 1,
                    (false, false) => cm.true_negative += 1,
                }
                cm
            })
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.false_negative + self.true_negative
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    pub fn f1(&self) -> f64 {
        harmonic_mean(self.precision(), self.recall())
    }
}

/// Area under the ROC curve via the rank statistic, ties get their average
/// rank. `None` unless both classes are present.
pub fn roc_auc(expected: ArrayView1<usize>, scores: ArrayView1<f64>) -> Option<f64> {
    let positives = expected.iter().filter(|&&e| e == 1).count();
    let negatives = expected.len() - positives;

    if positives == 0 || negatives == 0 {
        return None;
    }

    let order: Vec<usize> = (0..scores.len())
        .sorted_by(|&a, &b| scores[a].total_cmp(&scores[b]))
        .collect();

    let mut positive_rank_sum = 0.;
    let mut start = 0;

    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }

        // ranks are 1-based, the tied block [start, end) shares their mean
        let rank = (start + end + 1) as f64 / 2.;

        positive_rank_sum += rank
            * order[start..end]
                .iter()
                .filter(|&&i| expected[i] == 1)
                .count() as f64;

        start = end;
    }

    let positives = positives as f64;
    let negatives = negatives as f64;

    Some((positive_rank_sum - positives * (positives + 1.) / 2.) / (positives * negatives))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassScores {
    pub name: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub classes: Vec<ClassScores>,
    pub accuracy: f64,
    pub macro_avg: ClassScores,
    pub weighted_avg: ClassScores,
}

impl ClassificationReport {
    /// Labels are `0..names.len()`.
    pub fn new(expected: ArrayView1<usize>, predicted: ArrayView1<usize>, names: &[&str]) -> Self {
        let total = expected.len();

        let classes: Vec<ClassScores> = names
            .iter()
            .enumerate()
            .map(|(label, &name)| {
                let hits = expected
                    .iter()
                    .zip(predicted.iter())
                    .filter(|(&e, &p)| e == label && p == label)
                    .count();
                let predicted_count = predicted.iter().filter(|&&p| p == label).count();
                let support = expected.iter().filter(|&&e| e == label).count();

                let precision = ratio(hits, predicted_count);
                let recall = ratio(hits, support);

                ClassScores {
                    name: name.to_string(),
                    precision,
                    recall,
                    f1: harmonic_mean(precision, recall),
                    support,
                }
            })
            .collect();

        let n_classes = classes.len().max(1) as f64;
        let weight = |c: &ClassScores| ratio(c.support, total);

        let macro_avg = ClassScores {
            name: "macro avg".to_string(),
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / n_classes,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / n_classes,
            f1: classes.iter().map(|c| c.f1).sum::<f64>() / n_classes,
            support: total,
        };

        let weighted_avg = ClassScores {
            name: "weighted avg".to_string(),
            precision: classes.iter().map(|c| c.precision * weight(c)).sum(),
            recall: classes.iter().map(|c| c.recall * weight(c)).sum(),
            f1: classes.iter().map(|c| c.f1 * weight(c)).sum(),
            support: total,
        };

        Self {
            classes,
            accuracy: accuracy(expected, predicted),
            macro_avg,
            weighted_avg,
        }
    }
}

fn write_scores(f: &mut fmt::Formatter<'_>, s: &ClassScores) -> fmt::Result {
    writeln!(
        f,
        "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
        s.name, s.precision, s.recall, s.f1, s.support
    )
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;

        for class in &self.classes {
            write_scores(f, class)?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        write_scores(f, &self.macro_avg)?;
        write_scores(f, &self.weighted_avg)
    }
}

/// Line `b0 + b1·x₁ + b2·x₂ = 0` where the logistic score is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionBoundary {
    pub intercept: f64,
    pub w1: f64,
    pub w2: f64,
}

impl DecisionBoundary {
    pub fn new(intercept: f64, w1: f64, w2: f64) -> Self {
        Self { intercept, w1, w2 }
    }

    /// From `[b0, b1, b2]`; `None` for any other length.
    pub fn from_coefficients(beta: ArrayView1<f64>) -> Option<Self> {
        match beta.as_slice()? {
            &[b0, b1, b2] => Some(Self::new(b0, b1, b2)),
            _ => None,
        }
    }

    /// `(intercept, slope)` of `x₂` as a function of `x₁`, unless `w2` is
    /// (numerically) zero.
    pub fn solved(&self) -> Option<(f64, f64)> {
        if self.w2.abs() > 1e-10 {
            Some((-self.intercept / self.w2, -self.w1 / self.w2))
        } else {
            None
        }
    }
}

impl fmt::Display for DecisionBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Equation: {:.3} + {:.3}*x₁ + {:.3}*x₂ = 0",
            self.intercept, self.w1, self.w2
        )?;

        if let Some((intercept, slope)) = self.solved() {
            write!(f, "\nSolved:   x₂ = {:.3} + {:.3}*x₁", intercept, slope)?;
        }

        Ok(())
    }
}

/// Sign that turns a model's scores into scores for label `1`.
///
/// Some libraries report probabilities for whichever label they picked as
/// positive. Comparing their hard predictions with `p >= 0.5` tells which one
/// it was: `1.` when the probabilities already belong to label `1`, `-1.`
/// when they belong to the other label. Coefficients and logits are
/// multiplied by the sign, probabilities become `1 - p` on `-1.`.
pub fn class_orientation(predicted: ArrayView1<usize>, probabilities: ArrayView1<f64>) -> f64 {
    let agreeing = predicted
        .iter()
        .zip(probabilities.iter())
        .filter(|(&label, &p)| (label == 1) == (p >= 0.5))
        .count();

    if 2 * agreeing >= predicted.len() {
        1.
    } else {
        -1.
    }
}

/// Probabilities of label `1` given the sign from [`class_orientation`].
pub fn oriented_probabilities(probabilities: ArrayView1<f64>, sign: f64) -> Array1<f64> {
    if sign > 0. {
        probabilities.to_owned()
    } else {
        probabilities.mapv(|p| 1. - p)
    }
}

/// Multiplicative change in odds per unit increase of a feature.
pub fn odds_ratio(coefficient: f64) -> f64 {
    coefficient.exp()
}
