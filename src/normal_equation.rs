use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::error::{FitError, FitResult};

fn to_matrix(x: ArrayView2<f64>) -> DMatrix<f64> {
    DMatrix::from_row_iterator(x.nrows(), x.ncols(), x.iter().cloned())
}

fn to_vector(y: ArrayView1<f64>) -> DVector<f64> {
    DVector::from_iterator(y.len(), y.iter().cloned())
}

/// β = (XᵀX)⁻¹Xᵀy
pub fn normal_equation(x: ArrayView2<f64>, y: ArrayView1<f64>) -> FitResult<Array1<f64>> {
    if x.nrows() == 0 {
        return Err(FitError::EmptyDataset);
    }

    if x.nrows() != y.len() {
        return Err(FitError::ShapeMismatch {
            rows: x.nrows(),
            targets: y.len(),
        });
    }

    let x = to_matrix(x);
    let y = to_vector(y);

    let xt = x.transpose();

    let xtx = &xt * &x;
    let xty = &xt * &y;

    let beta = xtx.try_inverse().ok_or(FitError::SingularMatrix)? * xty;

    Ok(beta.iter().cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn exact_line() {
        let x = array![[1., 0.], [1., 1.], [1., 2.], [1., 3.]];
        let y = array![1., 3., 5., 7.];

        let beta = normal_equation(x.view(), y.view()).unwrap();

        assert_abs_diff_eq!(beta[0], 1., epsilon = 1e-10);
        assert_abs_diff_eq!(beta[1], 2., epsilon = 1e-10);
    }

    #[test]
    fn ohms_law() {
        let x = array![[1., 0.], [1., 1.], [1., 2.], [1., 3.]];
        let voltage = array![0.1, 2.1, 4.3, 6.4];

        let beta = normal_equation(x.view(), voltage.view()).unwrap();

        // slope = Sxy / Sxx = 10.55 / 5, intercept = ȳ - slope·x̄
        assert_abs_diff_eq!(beta[1], 2.11, epsilon = 1e-10);
        assert_abs_diff_eq!(beta[0], 0.06, epsilon = 1e-10);
    }

    #[test]
    fn duplicate_columns_are_singular() {
        let x = array![[1., 1.], [1., 1.], [1., 1.]];
        let y = array![1., 2., 3.];

        assert_eq!(
            normal_equation(x.view(), y.view()),
            Err(FitError::SingularMatrix)
        );
    }

    #[test]
    fn mismatched_rows() {
        let x = array![[1., 0.], [1., 1.]];
        let y = array![1., 2., 3.];

        assert_eq!(
            normal_equation(x.view(), y.view()),
            Err(FitError::ShapeMismatch {
                rows: 2,
                targets: 3
            })
        );
    }
}
