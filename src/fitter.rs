use itertools::Itertools;
use log::debug;
use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::error::{FitError, FitResult};
use crate::link::Link;
use crate::metrics::accuracy_at;

/// Batch gradient descent over a design matrix whose first column is the
/// intercept. The same loop drives both links; only the forward pass, the
/// loss and the gradient differ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientDescent {
    pub link: Link,
    pub learning_rate: f64,
    pub max_iterations: usize,
    /// Stop once the euclidean norm of the gradient drops below this.
    pub tolerance: Option<f64>,
    /// Emit a [`Progress`] every n-th iteration.
    pub report_every: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub iteration: usize,
    pub loss: f64,
    /// Training accuracy at a 0.5 threshold, logistic link only.
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fit {
    pub link: Link,
    pub coefficients: Array1<f64>,
    /// Loss at the start of every iteration that ran.
    pub losses: Vec<f64>,
    pub converged_at: Option<usize>,
}

impl GradientDescent {
    pub fn new(link: Link) -> Self {
        match link {
            Link::Identity => Self::linear(),
            Link::Logistic => Self::logistic(),
        }
    }

    pub fn linear() -> Self {
        Self {
            link: Link::Identity,
            learning_rate: 0.1,
            max_iterations: 1000,
            tolerance: Some(1e-8),
            report_every: None,
        }
    }

    pub fn logistic() -> Self {
        Self {
            link: Link::Logistic,
            learning_rate: 0.1,
            max_iterations: 1000,
            tolerance: None,
            report_every: None,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Option<f64>) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_report_every(mut self, report_every: Option<usize>) -> Self {
        self.report_every = report_every;
        self
    }

    pub fn validate(&self, rows: usize, targets: usize) -> FitResult<()> {
        if rows == 0 {
            return Err(FitError::EmptyDataset);
        }

        if rows != targets {
            return Err(FitError::ShapeMismatch { rows, targets });
        }

        if !self.learning_rate.is_finite() || self.learning_rate <= 0. {
            return Err(FitError::InvalidLearningRate(self.learning_rate));
        }

        if self.max_iterations == 0 {
            return Err(FitError::InvalidMaxIterations);
        }

        match self.tolerance {
            Some(tolerance) if !tolerance.is_finite() || tolerance <= 0. => {
                return Err(FitError::InvalidTolerance(tolerance))
            }
            _ => {}
        }

        if self.report_every == Some(0) {
            return Err(FitError::InvalidReportInterval);
        }

        Ok(())
    }

    pub fn fit(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> FitResult<Fit> {
        self.fit_observed(x, y, |_| {})
    }

    /// Like [`GradientDescent::fit`], handing every reported [`Progress`] to
    /// `observe`. Observing never changes the coefficients.
    pub fn fit_observed<F>(
        &self,
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        mut observe: F,
    ) -> FitResult<Fit>
    where
        F: FnMut(&Progress),
    {
        self.validate(x.nrows(), y.len())?;

        debug!(
            "gradient descent: link={}, n={}, p={}, lr={}, max_iter={}, tol={:?}",
            self.link.name(),
            x.nrows(),
            x.ncols(),
            self.learning_rate,
            self.max_iterations,
            self.tolerance
        );

        let mut beta = Array1::<f64>::zeros(x.ncols());
        let mut losses = Vec::with_capacity(self.max_iterations);
        let mut converged_at = None;

        for i in 0..self.max_iterations {
            let prediction = self.link.forward(x, beta.view());

            let loss = self.link.loss(y, prediction.view());
            losses.push(loss);

            if let Some(every) = self.report_every {
                if i % every == 0 {
                    let progress = Progress {
                        iteration: i,
                        loss,
                        accuracy: match self.link {
                            Link::Identity => None,
                            Link::Logistic => Some(accuracy_at(y, prediction.view(), 0.5)),
                        },
                    };

                    debug!(
                        "iteration {:4} loss {:.6} accuracy {:?}",
                        progress.iteration, progress.loss, progress.accuracy
                    );

                    observe(&progress);
                }
            }

            let gradient = self.link.gradient(x, y, prediction.view());

            beta.scaled_add(-self.learning_rate, &gradient);

            if let Some(tolerance) = self.tolerance {
                let norm = gradient.dot(&gradient).sqrt();

                if norm < tolerance {
                    debug!("converged at iteration {i}, |grad| = {norm:e}");
                    converged_at = Some(i);
                    break;
                }
            }
        }

        Ok(Fit {
            link: self.link,
            coefficients: beta,
            losses,
            converged_at,
        })
    }
}

impl Fit {
    pub fn predict(&self, x: ArrayView2<f64>) -> Array1<f64> {
        self.link.forward(x, self.coefficients.view())
    }

    pub fn final_loss(&self) -> Option<f64> {
        self.losses.last().copied()
    }

    /// `loss[i] >= loss[i + 1] - slack` for every consecutive pair.
    pub fn loss_is_non_increasing(&self, slack: f64) -> bool {
        self.losses
            .iter()
            .tuple_windows()
            .all(|(&current, &next)| current >= next - slack)
    }
}
