pub mod config;
pub mod data;
pub mod error;
pub mod fitter;
pub mod link;
pub mod metrics;
pub mod normal_equation;
pub mod plots;
pub mod trace;

pub use error::{FitError, FitResult};
pub use fitter::{Fit, GradientDescent, Progress};
pub use link::{sigmoid, Link};
pub use normal_equation::normal_equation;
