use thiserror::Error;

pub type FitResult<T> = Result<T, FitError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("dataset has no rows")]
    EmptyDataset,

    #[error("design matrix has {rows} rows but target vector has {targets} entries")]
    ShapeMismatch { rows: usize, targets: usize },

    #[error("learning rate must be positive and finite, got {0}")]
    InvalidLearningRate(f64),

    #[error("max iterations must be at least 1")]
    InvalidMaxIterations,

    #[error("tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),

    #[error("report interval must be at least 1")]
    InvalidReportInterval,

    #[error("test size must lie in (0, 1), got {0}")]
    InvalidTestSize(f64),

    /// XᵀX has no inverse, e.g. two identical feature columns.
    #[error("XᵀX is singular, normal equation has no unique solution")]
    SingularMatrix,
}
