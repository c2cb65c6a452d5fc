use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use tracing::warn;
use std::fmt;
use std::io::{self, Write};
use std::ops::{Add, Sub, Mul};

use crate::error::{Error, Result};

/// A dense, row-major matrix of `f64` values.
///
/// Every operation except [`Matrix::set`] leaves `self` untouched and returns
/// a fresh matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) data: Vec<Vec<f64>>,
}

impl Matrix {
    /// Zero-filled `rows x cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Fills a `rows x cols` matrix row by row from `values`.
    ///
    /// Missing trailing values stay zero; values beyond `rows * cols` are ignored.
    pub fn from_values(rows: usize, cols: usize, values: &[f64]) -> Matrix {
        let mut res = Matrix::new(rows, cols);
        if cols == 0 {
            return res;
        }

        for (index, &value) in values.iter().take(rows * cols).enumerate() {
            res.data[index / cols][index % cols] = value;
        }

        res
    }

    /// Builds a matrix from its rows. Fails on empty or ragged input.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(Error::mismatch("from_data", (rows, cols), (1, 1)));
        }
        if let Some(bad) = data.iter().find(|row| row.len() != cols) {
            return Err(Error::mismatch("from_data", (rows, cols), (rows, bad.len())));
        }

        Ok(Matrix { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_column(&self) -> bool {
        self.cols == 1
    }

    pub fn is_row(&self) -> bool {
        self.rows == 1
    }

    /// Row-major copy of every value.
    pub fn values(&self) -> Vec<f64> {
        self.data.iter().flatten().copied().collect()
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::Index { row, col, rows: self.rows, cols: self.cols });
        }
        Ok(())
    }

    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.check_bounds(row, col)?;
        Ok(self.data[row][col])
    }

    /// Overwrites a single cell in place.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        self.check_bounds(row, col)?;
        self.data[row][col] = value;
        Ok(())
    }

    /// Copy of `self` with one cell replaced.
    pub fn with_value(&self, row: usize, col: usize, value: f64) -> Result<Matrix> {
        let mut res = self.clone();
        res.set(row, col, value)?;
        Ok(res)
    }

    /// Combines two equally shaped matrices cell by cell.
    pub fn elementwise<F>(&self, other: &Matrix, functor: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.shape() != other.shape() {
            return Err(Error::mismatch("elementwise", self.shape(), other.shape()));
        }

        let data = self.data.iter().zip(other.data.iter())
            .map(|(row_a, row_b)| {
                row_a.iter().zip(row_b.iter()).map(|(&a, &b)| functor(a, b)).collect()
            })
            .collect();

        Ok(Matrix { rows: self.rows, cols: self.cols, data })
    }

    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        self.elementwise(other, |a, b| a + b)
    }

    pub fn subtract(&self, other: &Matrix) -> Result<Matrix> {
        self.elementwise(other, |a, b| a - b)
    }

    /// Element-wise (Hadamard) product.
    pub fn hadamard(&self, other: &Matrix) -> Result<Matrix> {
        self.elementwise(other, |a, b| a * b)
    }

    pub fn scale(&self, scalar: f64) -> Matrix {
        self.map(|x| x * scalar)
    }

    /// Matrix product; `self.cols` must equal `other.rows`.
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(Error::mismatch("multiply", self.shape(), other.shape()));
        }

        let mut res = Matrix::new(self.rows, other.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self.data[i][k] * other.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        Ok(res)
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::new(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        let data = self.data.iter()
            .map(|row| row.iter().map(|&x| functor(x)).collect())
            .collect();

        Matrix { rows: self.rows, cols: self.cols, data }
    }

    /// Same shape, every value drawn uniformly from `[min, max)` using the thread RNG.
    pub fn randomize(&self, min: f64, max: f64) -> Matrix {
        self.randomize_with(min, max, &mut rand::thread_rng())
    }

    /// Same shape, every value drawn uniformly from `[min, max)` using `rng`.
    ///
    /// An empty range (`min >= max`) fills every cell with `min`.
    pub fn randomize_with<R: Rng + ?Sized>(&self, min: f64, max: f64, rng: &mut R) -> Matrix {
        if min >= max {
            return self.map(|_| min);
        }
        let between = Uniform::new(min, max);
        let data = (0..self.rows)
            .map(|_| (0..self.cols).map(|_| between.sample(rng)).collect())
            .collect();

        Matrix { rows: self.rows, cols: self.cols, data }
    }

    /// Prints the grid to stdout and hands back an identical matrix for chaining.
    pub fn render(&self) -> Matrix {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        if let Err(e) = self.render_to(&mut handle) {
            warn!(error = %e, "failed to render matrix to stdout");
        }
        self.clone()
    }

    /// Writes one line per row, each value as `{:6.2}` followed by a space.
    pub fn render_to<W: Write>(&self, out: &mut W) -> io::Result<Matrix> {
        write!(out, "{self}")?;
        out.flush()?;
        Ok(self.clone())
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.data {
            for value in row {
                write!(f, "{value:6.2} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// Operator sugar over the checked methods. Shape mismatches panic here, use
// the named methods to get a `Result` instead.

impl Add for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        match Matrix::add(self, rhs) {
            Ok(res) => res,
            Err(e) => panic!("{e}"),
        }
    }
}

impl Sub for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        match self.subtract(rhs) {
            Ok(res) => res,
            Err(e) => panic!("{e}"),
        }
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        match self.multiply(rhs) {
            Ok(res) => res,
            Err(e) => panic!("{e}"),
        }
    }
}

impl Mul<f64> for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_matrix_eq(a: &Matrix, b: &Matrix) {
        assert_eq!(a.shape(), b.shape());
        for (x, y) in a.values().iter().zip(b.values().iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-9);
        }
    }

    fn random(rows: usize, cols: usize, seed: u64) -> Matrix {
        Matrix::new(rows, cols).randomize_with(-5.0, 5.0, &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn new_is_zero_filled() {
        let m = Matrix::new(4, 3);
        assert_eq!(m.shape(), (4, 3));
        assert!(m.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn from_values_fills_row_major() {
        let m = Matrix::from_values(2, 2, &[1.0, 1.5, 0.4, 2.0]);
        assert_eq!(m.get(0, 1).unwrap(), 1.5);
        assert_eq!(m.get(1, 0).unwrap(), 0.4);
    }

    #[test]
    fn from_values_short_and_long_input() {
        let short = Matrix::from_values(2, 2, &[7.0]);
        assert_eq!(short.values(), vec![7.0, 0.0, 0.0, 0.0]);

        let long = Matrix::from_values(1, 2, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(long.values(), vec![1.0, 2.0]);
    }

    #[test]
    fn from_data_rejects_ragged_rows() {
        let err = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
        assert!(Matrix::from_data(vec![]).is_err());
    }

    #[test]
    fn set_then_get() {
        let mut m = Matrix::from_values(2, 2, &[1.0, 1.5, 0.4, 2.0]);
        m.set(0, 1, 9.9).unwrap();
        assert_eq!(m.get(0, 1).unwrap(), 9.9);
    }

    #[test]
    fn with_value_leaves_original() {
        let m = Matrix::new(2, 2);
        let changed = m.with_value(1, 1, 3.0).unwrap();
        assert_eq!(m.get(1, 1).unwrap(), 0.0);
        assert_eq!(changed.get(1, 1).unwrap(), 3.0);
    }

    #[test]
    fn out_of_range_access_fails() {
        let mut m = Matrix::new(2, 3);
        assert!(matches!(m.get(2, 0), Err(Error::Index { row: 2, col: 0, rows: 2, cols: 3 })));
        assert!(matches!(m.get(0, 3), Err(Error::Index { .. })));
        assert!(matches!(m.set(5, 5, 1.0), Err(Error::Index { .. })));
    }

    #[test]
    fn arithmetic_examples() {
        let a = Matrix::from_values(2, 2, &[1.0, 1.5, 0.4, 2.0]);
        let b = Matrix::from_values(2, 2, &[3.0, 6.2, 1.8, 4.1]);

        assert_matrix_eq(&a.add(&b).unwrap(), &Matrix::from_values(2, 2, &[4.0, 7.7, 2.2, 6.1]));
        assert_matrix_eq(&a.subtract(&b).unwrap(), &Matrix::from_values(2, 2, &[-2.0, -4.7, -1.4, -2.1]));
        assert_matrix_eq(&a.hadamard(&b).unwrap(), &Matrix::from_values(2, 2, &[3.0, 9.3, 0.72, 8.2]));
        assert_matrix_eq(&a.scale(2.0), &Matrix::from_values(2, 2, &[2.0, 3.0, 0.8, 4.0]));
        assert_matrix_eq(
            &a.multiply(&b).unwrap(),
            &Matrix::from_values(2, 2, &[5.7, 12.35, 4.8, 10.68]),
        );
    }

    #[test]
    fn operators_match_methods() {
        let a = random(3, 3, 1);
        let b = random(3, 3, 2);
        assert_eq!(&a + &b, a.add(&b).unwrap());
        assert_eq!(&a - &b, a.subtract(&b).unwrap());
        assert_eq!(&a * &b, a.multiply(&b).unwrap());
        assert_eq!(&a * 0.5, a.scale(0.5));
    }

    #[test]
    #[should_panic]
    fn operator_panics_on_mismatch() {
        let _ = &Matrix::new(2, 3) * &Matrix::new(2, 2);
    }

    #[test]
    fn elementwise_mismatch_fails() {
        let err = Matrix::new(2, 2).add(&Matrix::new(2, 3)).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { op: "elementwise", .. }));
    }

    #[test]
    fn multiply_mismatch_fails() {
        let a = Matrix::new(2, 3);
        let b = Matrix::new(2, 2);
        assert!(matches!(
            a.multiply(&b),
            Err(Error::DimensionMismatch { op: "multiply", left: (2, 3), right: (2, 2) })
        ));
    }

    #[test]
    fn addition_is_associative_and_commutative() {
        let a = random(3, 4, 10);
        let b = random(3, 4, 11);
        let c = random(3, 4, 12);

        let left = a.add(&b).unwrap().add(&c).unwrap();
        let right = a.add(&b.add(&c).unwrap()).unwrap();
        assert_matrix_eq(&left, &right);
        assert_matrix_eq(&a.add(&b).unwrap(), &b.add(&a).unwrap());
    }

    #[test]
    fn double_transpose_is_identity() {
        let a = random(3, 5, 20);
        let t = a.transpose();
        assert_eq!(t.shape(), (5, 3));
        assert_eq!(t.get(4, 2).unwrap(), a.get(2, 4).unwrap());
        assert_eq!(t.transpose(), a);
    }

    #[test]
    fn transpose_of_product() {
        let a = random(2, 3, 30);
        let b = random(3, 4, 31);
        let left = a.multiply(&b).unwrap().transpose();
        let right = b.transpose().multiply(&a.transpose()).unwrap();
        assert_matrix_eq(&left, &right);
    }

    #[test]
    fn map_applies_function() {
        let a = Matrix::from_values(1, 3, &[1.0, -2.0, 3.0]);
        assert_eq!(a.map(|x| x * 2.0).values(), vec![2.0, -4.0, 6.0]);
    }

    #[test]
    fn randomize_stays_in_range_and_is_seedable() {
        let m = Matrix::new(10, 10);
        let r1 = m.randomize_with(-1.0, 1.0, &mut StdRng::seed_from_u64(7));
        let r2 = m.randomize_with(-1.0, 1.0, &mut StdRng::seed_from_u64(7));
        assert_eq!(r1, r2);
        assert!(r1.values().iter().all(|&v| (-1.0..1.0).contains(&v)));

        let r3 = m.randomize(-5.0, 5.0);
        assert!(r3.values().iter().all(|&v| (-5.0..5.0).contains(&v)));
    }

    struct ClosedSink;

    impl Write for ClosedSink {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn render_to_reports_write_failures() {
        let m = Matrix::from_values(1, 2, &[1.0, 2.0]);
        let err = m.render_to(&mut ClosedSink).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(m.render(), m);
    }

    #[test]
    fn render_format() {
        let m = Matrix::from_values(2, 2, &[1.0, -1.5, 10.256, 0.0]);
        let mut out = Vec::new();
        let same = m.render_to(&mut out).unwrap();
        assert_eq!(same, m);
        assert_eq!(String::from_utf8(out).unwrap(), "  1.00  -1.50 \n 10.26   0.00 \n");
    }
}
