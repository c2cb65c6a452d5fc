use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: mean((predicted - expected)²)
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        let diff = MseLoss::error(predicted, expected)?;
        let n = (diff.rows() * diff.cols()) as f64;
        Ok(diff.values().iter().map(|d| d * d).sum::<f64>() / n)
    }

    /// Output error signal fed into backpropagation: expected - predicted
    pub fn error(predicted: &Matrix, expected: &Matrix) -> Result<Matrix> {
        if predicted.shape() != expected.shape() {
            return Err(Error::mismatch("loss", predicted.shape(), expected.shape()));
        }
        expected.subtract(predicted)
    }
}
