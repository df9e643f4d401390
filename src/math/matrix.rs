use rand::Rng;
use std::f64::consts::PI;
use std::ops::{AddAssign, Index, IndexMut};

/// Dense row-major matrix backed by a single flat buffer.
///
/// Within this crate a row is one neuron and a column is one of its incoming
/// connections, so `rows` is the layer width and `cols` is the fan-in.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Builds a matrix from row vectors.
    ///
    /// Returns `None` when the rows do not all have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Matrix> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != n_cols) {
            return None;
        }
        let data = rows.into_iter().flatten().collect();
        Some(Matrix { rows: n_rows, cols: n_cols, data })
    }

    /// Uniform initialization in `[-1, 1)`.
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let data = (0..rows * cols)
            .map(|_| rng.gen::<f64>() * 2.0 - 1.0)
            .collect();
        Matrix { rows, cols, data }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    pub fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Both uniforms drawn from (0, 1] to avoid ln(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// He initialization: every entry is `N(0, 1) * sqrt(2 / cols)`.
    ///
    /// `cols` is the fan-in. Recommended before ReLU layers, since ReLU zeroes
    /// half of its inputs on average.
    pub fn he<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let data = (0..rows * cols)
            .map(|_| he_sample(cols, rng))
            .collect();
        Matrix { rows, cols, data }
    }

    pub fn row(&self, r: usize) -> &[f64] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    pub fn row_mut(&mut self, r: usize) -> &mut [f64] {
        let cols = self.cols;
        &mut self.data[r * cols..(r + 1) * cols]
    }

    pub fn rows_iter(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows).map(move |r| self.row(r))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn same_shape(&self, other: &Matrix) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    /// Multiplies every entry by `factor` in place.
    pub fn scale(&mut self, factor: f64) {
        self.data.iter_mut().for_each(|x| *x *= factor);
    }

    /// `self -= factor * other`, element-wise.
    pub fn sub_scaled(&mut self, other: &Matrix, factor: f64) {
        assert!(self.same_shape(other), "Matrices are of incorrect sizes");
        for (x, y) in self.data.iter_mut().zip(other.data.iter()) {
            *x -= factor * y;
        }
    }
}

/// A single He-initialized weight for a neuron with `fan_in` inputs.
pub fn he_sample<R: Rng + ?Sized>(fan_in: usize, rng: &mut R) -> f64 {
    Matrix::sample_standard_normal(rng) * (2.0 / fan_in as f64).sqrt()
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (r, c): (usize, usize)) -> &f64 {
        assert!(r < self.rows && c < self.cols, "Matrix index out of bounds");
        &self.data[r * self.cols + c]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut f64 {
        assert!(r < self.rows && c < self.cols, "Matrix index out of bounds");
        &mut self.data[r * self.cols + c]
    }
}

impl AddAssign<&Matrix> for Matrix {
    fn add_assign(&mut self, rhs: &Matrix) {
        if !self.same_shape(rhs) {
            panic!("Matrices are of incorrect sizes")
        }
        for (x, y) in self.data.iter_mut().zip(rhs.data.iter()) {
            *x += y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn from_rows_rejects_ragged_input() {
        assert!(Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_none());
    }

    #[test]
    fn rows_are_contiguous_slices() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(m[(0, 2)], 3.0);
        assert_eq!(m.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.rows_iter().count(), 2);
    }

    #[test]
    fn add_assign_and_sub_scaled() {
        let mut a = Matrix::from_rows(vec![vec![1.0, 1.0]]).unwrap();
        let b = Matrix::from_rows(vec![vec![2.0, 4.0]]).unwrap();
        a += &b;
        assert_eq!(a.as_slice(), &[3.0, 5.0]);
        a.sub_scaled(&b, 0.5);
        assert_eq!(a.as_slice(), &[2.0, 3.0]);
    }

    #[test]
    fn random_init_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = Matrix::random(16, 16, &mut rng);
        assert!(m.as_slice().iter().all(|&w| (-1.0..1.0).contains(&w)));
    }

    #[test]
    fn he_init_has_expected_spread() {
        let mut rng = StdRng::seed_from_u64(42);
        let fan_in = 50;
        let m = Matrix::he(200, fan_in, &mut rng);
        let n = m.as_slice().len() as f64;
        let mean = m.as_slice().iter().sum::<f64>() / n;
        let var = m.as_slice().iter().map(|w| (w - mean).powi(2)).sum::<f64>() / n;
        let expected = 2.0 / fan_in as f64;
        assert!(mean.abs() < 0.02, "mean = {mean}");
        assert!((var - expected).abs() < expected * 0.15, "var = {var}");
    }
}
