//! Confusion matrix over the canonical label set
//!
//! Rows are the emotion shown, columns the emotion picked.

use crate::labels::{CanonicalLabel, LabelNormalizer};
use tracing::debug;

/// N×N count matrix, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    size: usize,
    cells: Vec<u64>,
}

impl ConfusionMatrix {
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            cells: vec![0; size * size],
        }
    }

    /// Dimension N
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> u64 {
        self.cells[row * self.size + col]
    }

    pub fn increment(&mut self, expected: CanonicalLabel, chosen: CanonicalLabel) {
        self.cells[expected.index() * self.size + chosen.index()] += 1;
    }

    pub fn row(&self, row: usize) -> &[u64] {
        &self.cells[row * self.size..(row + 1) * self.size]
    }

    /// Sum of all cells
    pub fn total(&self) -> u64 {
        self.cells.iter().sum()
    }

    /// Sum of the diagonal
    pub fn trace(&self) -> u64 {
        (0..self.size).map(|i| self.get(i, i)).sum()
    }

    pub fn to_rows(&self) -> Vec<Vec<u64>> {
        (0..self.size).map(|i| self.row(i).to_vec()).collect()
    }
}

/// Folds raw (expected, chosen) pairs into a confusion matrix
pub struct MatrixBuilder<'a> {
    normalizer: &'a LabelNormalizer,
}

impl<'a> MatrixBuilder<'a> {
    pub fn new(normalizer: &'a LabelNormalizer) -> Self {
        Self { normalizer }
    }

    /// Count every pair whose two labels both normalize; drop the rest
    pub fn build<I, S>(&self, pairs: I) -> ConfusionMatrix
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut matrix = ConfusionMatrix::zeros(self.normalizer.len());
        let mut discarded = 0usize;

        for (expected, chosen) in pairs {
            match (
                self.normalizer.normalize(expected.as_ref()),
                self.normalizer.normalize(chosen.as_ref()),
            ) {
                (Some(expected), Some(chosen)) => matrix.increment(expected, chosen),
                _ => discarded += 1,
            }
        }

        if discarded > 0 {
            debug!(discarded, "Dropped pairs with unrecognized labels");
        }

        matrix
    }
}
