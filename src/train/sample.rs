use crate::math::matrix::Matrix;

/// One labelled training example.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub input: Matrix,
    pub target: Matrix,
}

impl Sample {
    pub fn new(input: Matrix, target: Matrix) -> Sample {
        Sample { input, target }
    }

    /// Builds a sample from plain slices, both turned into column vectors.
    pub fn from_slices(input: &[f64], target: &[f64]) -> Sample {
        Sample {
            input: Matrix::from_values(input.len(), 1, input),
            target: Matrix::from_values(target.len(), 1, target),
        }
    }
}
