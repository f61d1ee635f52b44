/// Dense row-major feature matrix in schema column order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl FeatureMatrix {
    pub fn with_capacity(cols: usize, rows: usize) -> Self {
        Self {
            rows: 0,
            cols,
            values: Vec::with_capacity(rows * cols),
        }
    }

    /// Build from row vectors; `None` if the rows are ragged
    pub fn from_rows(cols: usize, rows: Vec<Vec<f64>>) -> Option<Self> {
        let mut matrix = Self::with_capacity(cols, rows.len());

        for row in &rows {
            if row.len() != cols {
                return None;
            }
            matrix.push_row(row);
        }

        Some(matrix)
    }

    /// Append a row; the caller guarantees `row.len() == cols`
    pub(crate) fn push_row(&mut self, row: &[f64]) {
        debug_assert_eq!(row.len(), self.cols);
        self.values.extend_from_slice(row);
        self.rows += 1;
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn row(&self, index: usize) -> &[f64] {
        let start = index * self.cols;
        &self.values[start..start + self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows).map(move |i| self.row(i))
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}
