use std::f64::consts::E;

use crate::math::matrix::Matrix;

/// The logistic activation used by every layer of the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sigmoid;

impl Sigmoid {
    /// `1 / (1 + e^-x)`
    pub fn function(x: f64) -> f64 {
        1.0 / (1.0 + E.powf(-x))
    }

    /// Slope of the sigmoid expressed through its own output `a = sigmoid(z)`.
    pub fn derivative(a: f64) -> f64 {
        a * (1.0 - a)
    }

    pub fn activate(z: &Matrix) -> Matrix {
        z.map(Sigmoid::function)
    }

    /// Element-wise `a * (1 - a)` over a matrix of activations.
    pub fn gradient(activations: &Matrix) -> Matrix {
        activations.map(Sigmoid::derivative)
    }
}

/// Free-function form of [`Sigmoid::function`].
pub fn sigmoid(x: f64) -> f64 {
    Sigmoid::function(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sigmoid_of_zero_is_half() {
        assert_eq!(sigmoid(0.0), 0.5);
    }

    #[test]
    fn sigmoid_is_increasing_and_bounded() {
        let xs: Vec<f64> = (-300..=300).map(|i| i as f64 * 0.05).collect();
        for pair in xs.windows(2) {
            let (a, b) = (sigmoid(pair[0]), sigmoid(pair[1]));
            assert!(a < b, "sigmoid({}) = {a} >= sigmoid({}) = {b}", pair[0], pair[1]);
            assert!(a > 0.0 && a < 1.0);
        }
    }

    #[test]
    fn derivative_peaks_at_half() {
        assert_abs_diff_eq!(Sigmoid::derivative(0.5), 0.25);
        assert_abs_diff_eq!(Sigmoid::derivative(sigmoid(2.0)), 0.104993585, epsilon = 1e-8);
        assert_eq!(Sigmoid::derivative(1.0), 0.0);
    }

    #[test]
    fn activate_maps_every_cell() {
        let z = Matrix::from_values(2, 1, &[0.0, 0.0]);
        assert_eq!(Sigmoid::activate(&z).values(), vec![0.5, 0.5]);
        assert_eq!(Sigmoid::gradient(&Sigmoid::activate(&z)).values(), vec![0.25, 0.25]);
    }
}
