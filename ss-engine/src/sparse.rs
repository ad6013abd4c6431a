//! A minimal compressed-sparse-row matrix, just enough for the generator and its uniformised
//! counterpart.

/// Row-major sparse matrix of `f64`.
#[derive(Clone, Debug, PartialEq)]
pub struct CsrMatrix {
    /// Column count.
    ncols: usize,
    /// Row `r` spans `row_ptr[r]..row_ptr[r + 1]` of the two arrays below.
    row_ptr: Vec<usize>,
    /// Column of every stored entry.
    col_idx: Vec<usize>,
    /// Value of every stored entry.
    values: Vec<f64>,
}

/// Row-by-row constructor for [`CsrMatrix`].
#[derive(Debug)]
pub struct CsrBuilder {
    /// Rows pushed so far.
    matrix: CsrMatrix,
}

impl CsrBuilder {
    /// Builder for a matrix with `ncols` columns and no rows yet.
    pub fn new(ncols: usize) -> Self {
        Self {
            matrix: CsrMatrix { ncols, row_ptr: vec![0], col_idx: Vec::new(), values: Vec::new() },
        }
    }

    /// Append the next row.  Entries may come in any column order but each column at most once.
    pub fn push_row(&mut self, entries: impl IntoIterator<Item = (usize, f64)>) {
        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_unstable_by_key(|&(col, _)| col);
        debug_assert!(entries.windows(2).all(|w| w[0].0 < w[1].0), "duplicate column in row");
        debug_assert!(entries.iter().all(|&(col, _)| col < self.matrix.ncols), "column out of range");

        for (col, value) in entries {
            self.matrix.col_idx.push(col);
            self.matrix.values.push(value);
        }
        self.matrix.row_ptr.push(self.matrix.col_idx.len());
    }

    /// The matrix of all pushed rows.
    pub fn finish(self) -> CsrMatrix {
        self.matrix
    }
}

impl CsrMatrix {
    /// Row count.
    pub fn nrows(&self) -> usize {
        self.row_ptr.len() - 1
    }

    /// Column count.
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Stored `(column, value)` pairs of row `r`, in ascending column order.
    pub fn row(&self, r: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let span = self.row_ptr[r]..self.row_ptr[r + 1];
        self.col_idx[span.clone()].iter().copied().zip(self.values[span].iter().copied())
    }

    /// Entry `(r, c)`, zero when not stored.
    pub fn get(&self, r: usize, c: usize) -> f64 {
        let span = self.row_ptr[r]..self.row_ptr[r + 1];
        match self.col_idx[span.clone()].binary_search(&c) {
            Ok(pos) => self.values[span.start + pos],
            Err(_) => 0.0,
        }
    }

    /// Sum of the stored entries of row `r`.
    pub fn row_sum(&self, r: usize) -> f64 {
        self.row(r).map(|(_, v)| v).sum()
    }

    /// Smallest stored value, `None` for a matrix without entries.
    pub fn min_value(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::min)
    }

    /// Rows without any stored entry.
    pub fn empty_rows(&self) -> Vec<usize> {
        (0..self.nrows()).filter(|&r| self.row_ptr[r] == self.row_ptr[r + 1]).collect()
    }

    /// Row-vector product `v . M`.
    pub fn left_mul(&self, v: &[f64]) -> Vec<f64> {
        assert_eq!(v.len(), self.nrows(), "vector length must match the number of rows");
        let mut out = vec![0.0; self.ncols];
        for (r, &weight) in v.iter().enumerate() {
            if weight == 0.0 {
                continue;
            }
            for (c, value) in self.row(r) {
                out[c] += weight * value;
            }
        }
        out
    }

    /// Build a new matrix from `f(row, col, value)` applied to every stored entry, plus an
    /// explicit diagonal entry `f(r, r, 0.0)` for rows that don't store one.
    pub fn map_with_diagonal(&self, f: impl Fn(usize, usize, f64) -> f64) -> CsrMatrix {
        let mut builder = CsrBuilder::new(self.ncols);
        for r in 0..self.nrows() {
            let mut entries: Vec<_> = self.row(r).map(|(c, v)| (c, f(r, c, v))).collect();
            if r < self.ncols && !entries.iter().any(|&(c, _)| c == r) {
                entries.push((r, f(r, r, 0.0)));
            }
            builder.push_row(entries);
        }
        builder.finish()
    }

    /// Dense copy, one `Vec` per row.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        (0..self.nrows())
            .map(|r| {
                let mut row = vec![0.0; self.ncols];
                for (c, v) in self.row(r) {
                    row[c] = v;
                }
                row
            })
            .collect()
    }
}
