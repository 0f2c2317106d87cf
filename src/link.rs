use ndarray::{Array1, ArrayView1, ArrayView2};

/// Logits beyond this magnitude are clamped before `exp`.
pub const LOGIT_CLAMP: f64 = 500.0;

/// Probabilities are kept in `[EPS, 1 - EPS]` before taking logarithms.
pub const PROBABILITY_EPS: f64 = 1e-15;

/// Transform from the linear score `Xβ` to a prediction, together with the
/// loss it is paired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// `ŷ = Xβ`, mean squared error.
    Identity,
    /// `p = σ(Xβ)`, mean binary cross-entropy.
    Logistic,
}

pub fn sigmoid(z: f64) -> f64 {
    let z = z.clamp(-LOGIT_CLAMP, LOGIT_CLAMP);

    1. / (1. + (-z).exp())
}

pub fn mean_squared_error(y: ArrayView1<f64>, prediction: ArrayView1<f64>) -> f64 {
    (&prediction - &y).mapv(|r| r * r).mean().unwrap_or(0.)
}

pub fn binary_cross_entropy(y: ArrayView1<f64>, probabilities: ArrayView1<f64>) -> f64 {
    let n = y.len();
    if n == 0 {
        return 0.;
    }

    let sum: f64 = y
        .iter()
        .zip(probabilities.iter())
        .map(|(&y, &p)| {
            let p = p.clamp(PROBABILITY_EPS, 1. - PROBABILITY_EPS);
            y * p.ln() + (1. - y) * (1. - p).ln()
        })
        .sum();

    -sum / n as f64
}

impl Link {
    pub fn name(&self) -> &'static str {
        match self {
            Link::Identity => "identity",
            Link::Logistic => "logistic",
        }
    }

    pub fn forward(&self, x: ArrayView2<f64>, beta: ArrayView1<f64>) -> Array1<f64> {
        let z = x.dot(&beta);

        match self {
            Link::Identity => z,
            Link::Logistic => z.mapv_into(sigmoid),
        }
    }

    pub fn loss(&self, y: ArrayView1<f64>, prediction: ArrayView1<f64>) -> f64 {
        match self {
            Link::Identity => mean_squared_error(y, prediction),
            Link::Logistic => binary_cross_entropy(y, prediction),
        }
    }

    /// Gradient of [`Link::loss`] with respect to β, given the forward
    /// prediction at β.
    pub fn gradient(
        &self,
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        prediction: ArrayView1<f64>,
    ) -> Array1<f64> {
        let n = y.len() as f64;

        let scale = match self {
            Link::Identity => 2. / n,
            Link::Logistic => 1. / n,
        };

        let residuals = &prediction - &y;

        x.t().dot(&residuals) * scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};
    use rstest::rstest;

    fn design() -> (Array2<f64>, Array1<f64>) {
        let x = array![[1., -1.5], [1., 0.2], [1., 0.7], [1., 2.1], [1., -0.4]];
        let y = array![0., 0., 1., 1., 1.];
        (x, y)
    }

    #[test]
    fn sigmoid_known_values() {
        assert_abs_diff_eq!(sigmoid(0.), 0.5);
        assert_abs_diff_eq!(sigmoid(2.), 0.8807970779778823, epsilon = 1e-12);
        assert_abs_diff_eq!(sigmoid(-2.), 0.11920292202211755, epsilon = 1e-12);
    }

    #[rstest]
    #[case(10_000.)]
    #[case(-10_000.)]
    #[case(f64::MAX)]
    #[case(f64::MIN)]
    #[case(501.)]
    fn sigmoid_extremes_stay_in_range(#[case] z: f64) {
        let s = sigmoid(z);
        assert!(!s.is_nan());
        assert!(s > 0.);
        assert!(s <= 1.);
    }

    #[test]
    fn cross_entropy_is_finite_for_hard_mistakes() {
        let y = array![1., 0.];
        let p = array![0., 1.];

        let loss = binary_cross_entropy(y.view(), p.view());

        assert!(loss.is_finite());
        assert_abs_diff_eq!(loss, -(PROBABILITY_EPS.ln()), epsilon = 1e-2);
    }

    #[test]
    fn squared_error_of_perfect_fit_is_zero() {
        let y = array![1., 2., 3.];
        assert_eq!(mean_squared_error(y.view(), y.view()), 0.);
    }

    #[rstest]
    #[case(Link::Identity)]
    #[case(Link::Logistic)]
    fn gradient_matches_finite_differences(#[case] link: Link) {
        let (x, y) = design();
        let beta = array![0.3, -0.8];

        let prediction = link.forward(x.view(), beta.view());
        let gradient = link.gradient(x.view(), y.view(), prediction.view());

        let h = 1e-6;
        for j in 0..beta.len() {
            let mut plus = beta.clone();
            let mut minus = beta.clone();
            plus[j] += h;
            minus[j] -= h;

            let loss_plus = link.loss(y.view(), link.forward(x.view(), plus.view()).view());
            let loss_minus = link.loss(y.view(), link.forward(x.view(), minus.view()).view());

            let numeric = (loss_plus - loss_minus) / (2. * h);
            assert_abs_diff_eq!(gradient[j], numeric, epsilon = 1e-6);
        }
    }

    #[rstest]
    #[case(Link::Identity)]
    #[case(Link::Logistic)]
    fn forward_is_repeatable(#[case] link: Link) {
        let (x, _) = design();
        let beta = array![-0.25, 1.75];

        let first = link.forward(x.view(), beta.view());
        let second = link.forward(x.view(), beta.view());

        assert_eq!(first, second);
    }
}
