use std::collections::BTreeMap;

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal, Uniform};

use crate::error::{FitError, FitResult};

/// `y = intercept + slope·x + noise·ε` with `x ~ U[0, x_max)` and
/// `ε ~ N(0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearDataConfig {
    pub n_samples: usize,
    pub intercept: f64,
    pub slope: f64,
    pub noise: f64,
    pub x_max: f64,
}

impl Default for LinearDataConfig {
    fn default() -> Self {
        Self {
            n_samples: 100,
            intercept: 3.,
            slope: 2.,
            noise: 0.5,
            x_max: 2.,
        }
    }
}

/// Two gaussian blobs with unit variance per coordinate (scaled by
/// `spread`), labelled `0` and `1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterDataConfig {
    pub n_per_class: usize,
    pub centers: [[f64; 2]; 2],
    pub spread: f64,
}

impl Default for ClusterDataConfig {
    fn default() -> Self {
        Self {
            n_per_class: 100,
            centers: [[-1., -1.], [1., 1.]],
            spread: 1.,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Split<L> {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<L>,
    pub y_test: Array1<L>,
}

/// Raw single-feature matrix (no intercept column) and targets.
pub fn linear_dataset<R>(config: &LinearDataConfig, rng: &mut R) -> (Array2<f64>, Array1<f64>)
where
    R: Rng + ?Sized,
{
    let uniform = Uniform::new(0., 1.);

    let x: Array1<f64> = (0..config.n_samples)
        .map(|_| config.x_max * uniform.sample(rng))
        .collect();

    let noise: Array1<f64> = (0..config.n_samples)
        .map(|_| {
            let e: f64 = StandardNormal.sample(rng);
            config.noise * e
        })
        .collect();

    let y = x.mapv(|x| config.intercept + config.slope * x) + noise;

    (x.insert_axis(Axis(1)), y)
}

/// Shuffled two-class dataset, `n_per_class` rows of each label.
pub fn two_clusters<R>(config: &ClusterDataConfig, rng: &mut R) -> (Array2<f64>, Array1<usize>)
where
    R: Rng + ?Sized,
{
    let n = config.n_per_class;

    let mut x = Array2::<f64>::zeros((2 * n, 2));
    let mut labels = Array1::<usize>::zeros(2 * n);

    for (label, center) in config.centers.iter().enumerate() {
        for i in 0..n {
            let row = label * n + i;

            for (j, &c) in center.iter().enumerate() {
                let e: f64 = StandardNormal.sample(rng);
                x[[row, j]] = c + config.spread * e;
            }

            labels[row] = label;
        }
    }

    let mut order: Vec<usize> = (0..2 * n).collect();
    order.shuffle(rng);

    (x.select(Axis(0), &order), labels.select(Axis(0), &order))
}

/// Prepends a column of ones so `Xβ` carries the intercept in `β[0]`.
pub fn with_intercept(x: ArrayView2<f64>) -> Array2<f64> {
    let mut design = Array2::<f64>::ones((x.nrows(), x.ncols() + 1));

    design.slice_mut(s![.., 1..]).assign(&x);

    design
}

pub fn labels_as_targets(labels: ArrayView1<usize>) -> Array1<f64> {
    labels.mapv(|l| l as f64)
}

/// `ceil(test_size·n)`, leaving at least one row on each side when `n > 1`.
fn test_count(n: usize, test_size: f64) -> usize {
    ((test_size * n as f64).ceil() as usize)
        .max(1)
        .min(n.saturating_sub(1))
}

fn check_split(rows: usize, targets: usize, test_size: f64) -> FitResult<()> {
    if rows != targets {
        return Err(FitError::ShapeMismatch { rows, targets });
    }

    if !(test_size > 0. && test_size < 1.) {
        return Err(FitError::InvalidTestSize(test_size));
    }

    Ok(())
}

fn take_rows<L: Clone>(
    x: ArrayView2<f64>,
    y: ArrayView1<L>,
    train: &[usize],
    test: &[usize],
) -> Split<L> {
    Split {
        x_train: x.select(Axis(0), train),
        x_test: x.select(Axis(0), test),
        y_train: y.select(Axis(0), train),
        y_test: y.select(Axis(0), test),
    }
}

/// Random split with `ceil(test_size·n)` test rows.
pub fn train_test_split<L, R>(
    x: ArrayView2<f64>,
    y: ArrayView1<L>,
    test_size: f64,
    rng: &mut R,
) -> FitResult<Split<L>>
where
    L: Clone,
    R: Rng + ?Sized,
{
    check_split(x.nrows(), y.len(), test_size)?;

    let mut order: Vec<usize> = (0..x.nrows()).collect();
    order.shuffle(rng);

    let (test, train) = order.split_at(test_count(order.len(), test_size));

    Ok(take_rows(x, y, train, test))
}

/// Like [`train_test_split`], but every label keeps its share in both halves.
pub fn stratified_train_test_split<R>(
    x: ArrayView2<f64>,
    y: ArrayView1<usize>,
    test_size: f64,
    rng: &mut R,
) -> FitResult<Split<usize>>
where
    R: Rng + ?Sized,
{
    check_split(x.nrows(), y.len(), test_size)?;

    let mut by_label: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &label) in y.iter().enumerate() {
        by_label.entry(label).or_default().push(i);
    }

    let mut train = Vec::with_capacity(y.len());
    let mut test = Vec::with_capacity(y.len());

    for rows in by_label.values_mut() {
        rows.shuffle(rng);

        let (label_test, label_train) = rows.split_at(test_count(rows.len(), test_size));

        test.extend_from_slice(label_test);
        train.extend_from_slice(label_train);
    }

    train.shuffle(rng);
    test.shuffle(rng);

    Ok(take_rows(x, y, &train, &test))
}
