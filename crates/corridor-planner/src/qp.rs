//! Sparse quadratic-form assembly
//!
//! Triplet-style accumulation for the QP objective and constraint matrices.
//! Entries are keyed by `(row, col)` and summed on collision, then
//! materialized into the compressed sparse column form the solver expects.

use std::collections::BTreeMap;

use clarabel::algebra::CscMatrix;

/// Flat decision-vector index of `(waypoint, axis)`
///
/// The decision vector interleaves coordinates as `[x0, y0, x1, y1, ...]`.
/// This mapping is the single source of truth shared by the objective, the
/// constraints, and the solution decoding.
pub fn flat_index(waypoint: usize, axis: usize) -> usize {
    debug_assert!(axis < 2);
    2 * waypoint + axis
}

/// Symmetric quadratic-form accumulator
///
/// Stores the full symmetric matrix entry-by-entry; duplicate `(row, col)`
/// contributions sum. Symmetry is an invariant of construction: callers add
/// off-diagonal terms through [`QuadraticForm::add_symmetric_pair`].
#[derive(Debug, Clone)]
pub struct QuadraticForm {
    dim: usize,
    entries: BTreeMap<(usize, usize), f64>,
}

impl QuadraticForm {
    /// Create an empty `dim × dim` quadratic form
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            entries: BTreeMap::new(),
        }
    }

    /// Matrix dimension
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored (structurally nonzero) entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries have been accumulated
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Accumulate `weight` at `(row, col)`, summing on collision
    pub fn add(&mut self, row: usize, col: usize, weight: f64) {
        debug_assert!(row < self.dim && col < self.dim);
        *self.entries.entry((row, col)).or_insert(0.0) += weight;
    }

    /// Accumulate `weight` at `(row, col)` and `(col, row)`
    pub fn add_symmetric_pair(&mut self, row: usize, col: usize, weight: f64) {
        self.add(row, col, weight);
        self.add(col, row, weight);
    }

    /// Accumulated value at `(row, col)`, zero if never touched
    pub fn entry(&self, row: usize, col: usize) -> f64 {
        self.entries.get(&(row, col)).copied().unwrap_or(0.0)
    }

    /// Materialize the upper triangle in compressed sparse column form
    ///
    /// The QP solver takes the upper triangle of the symmetric Hessian.
    pub fn to_upper_csc(&self) -> CscMatrix<f64> {
        let mut columns: Vec<Vec<(usize, f64)>> = vec![Vec::new(); self.dim];
        // BTreeMap iterates in (row, col) order, so each column vector
        // receives its rows already sorted.
        for (&(row, col), &value) in &self.entries {
            if row <= col {
                columns[col].push((row, value));
            }
        }

        let mut colptr = Vec::with_capacity(self.dim + 1);
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();
        colptr.push(0);
        for column in columns {
            for (row, value) in column {
                rowval.push(row);
                nzval.push(value);
            }
            colptr.push(rowval.len());
        }

        CscMatrix::new(self.dim, self.dim, colptr, rowval, nzval)
    }
}

/// Build a CSC matrix from `(row, col, value)` triplets, summing duplicates
pub fn csc_from_triplets(
    nrows: usize,
    ncols: usize,
    triplets: &[(usize, usize, f64)],
) -> CscMatrix<f64> {
    let mut entries: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for &(row, col, value) in triplets {
        debug_assert!(row < nrows && col < ncols);
        // Keyed (col, row) so iteration is column-major
        *entries.entry((col, row)).or_insert(0.0) += value;
    }

    let mut colptr = vec![0usize; ncols + 1];
    let mut rowval = Vec::with_capacity(entries.len());
    let mut nzval = Vec::with_capacity(entries.len());
    for (&(col, row), &value) in &entries {
        rowval.push(row);
        nzval.push(value);
        colptr[col + 1] += 1;
    }
    for col in 0..ncols {
        colptr[col + 1] += colptr[col];
    }

    CscMatrix::new(nrows, ncols, colptr, rowval, nzval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_index_interleaves_axes() {
        assert_eq!(flat_index(0, 0), 0);
        assert_eq!(flat_index(0, 1), 1);
        assert_eq!(flat_index(3, 0), 6);
        assert_eq!(flat_index(3, 1), 7);
    }

    #[test]
    fn test_collision_sums() {
        let mut form = QuadraticForm::new(4);
        form.add(1, 1, 2.0);
        form.add(1, 1, 3.0);
        form.add_symmetric_pair(0, 2, -1.0);
        form.add_symmetric_pair(0, 2, -1.0);

        assert_relative_eq!(form.entry(1, 1), 5.0);
        assert_relative_eq!(form.entry(0, 2), -2.0);
        assert_relative_eq!(form.entry(2, 0), -2.0);
        assert_relative_eq!(form.entry(3, 3), 0.0);
    }

    #[test]
    fn test_upper_csc_shape() {
        let mut form = QuadraticForm::new(3);
        form.add(0, 0, 1.0);
        form.add(2, 2, 4.0);
        form.add_symmetric_pair(0, 2, -2.0);

        let csc = form.to_upper_csc();
        assert_eq!(csc.m, 3);
        assert_eq!(csc.n, 3);
        // Upper triangle only: (0,0), (0,2), (2,2)
        assert_eq!(csc.nzval.len(), 3);
        assert_eq!(csc.colptr, vec![0, 1, 1, 3]);
        assert_eq!(csc.rowval, vec![0, 0, 2]);
        assert_relative_eq!(csc.nzval[1], -2.0);
    }

    #[test]
    fn test_empty_form_materializes() {
        let form = QuadraticForm::new(4);
        assert!(form.is_empty());
        let csc = form.to_upper_csc();
        assert_eq!(csc.m, 4);
        assert_eq!(csc.colptr, vec![0, 0, 0, 0, 0]);
        assert!(csc.nzval.is_empty());
    }

    #[test]
    fn test_csc_from_triplets_column_major() {
        let a = csc_from_triplets(2, 3, &[(1, 0, 1.0), (0, 0, 2.0), (1, 2, 3.0), (1, 2, 1.0)]);
        assert_eq!(a.m, 2);
        assert_eq!(a.n, 3);
        assert_eq!(a.colptr, vec![0, 2, 2, 3]);
        assert_eq!(a.rowval, vec![0, 1, 1]);
        assert_relative_eq!(a.nzval[0], 2.0);
        assert_relative_eq!(a.nzval[2], 4.0); // duplicates summed
    }
}
