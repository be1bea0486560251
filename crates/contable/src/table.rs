//! General rectangular contingency table.

use std::ops::AddAssign;

use serde::Serialize;

use crate::error::ContableError;
use crate::two_by_two::TwoByTwoTable;

/// Dense row-major count matrix cross-tabulating forecast category (rows)
/// against observed category (columns).
///
/// Always at least 2x2. Resizing re-zeros every entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContingencyTable {
    name: String,
    rows: usize,
    cols: usize,
    counts: Vec<u64>,
}

impl ContingencyTable {
    /// Creates a zeroed `rows` x `cols` table.
    pub fn new(rows: usize, cols: usize) -> Result<Self, ContableError> {
        check_size(rows, cols)?;
        Ok(Self {
            name: String::new(),
            rows,
            cols,
            counts: vec![0; rows * cols],
        })
    }

    /// Builds a table from counts already known to be valid.
    pub(crate) fn from_parts(rows: usize, cols: usize, counts: Vec<u64>) -> Self {
        debug_assert!(rows >= 2 && cols >= 2 && counts.len() == rows * cols);
        Self {
            name: String::new(),
            rows,
            cols,
            counts,
        }
    }

    /// Creates a zeroed `n` x `n` table.
    pub fn square(n: usize) -> Result<Self, ContableError> {
        Self::new(n, n)
    }

    /// Sets the table name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the table name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Resizes the table and zeros every entry.
    pub fn set_size(&mut self, rows: usize, cols: usize) -> Result<(), ContableError> {
        check_size(rows, cols)?;
        self.rows = rows;
        self.cols = cols;
        self.counts = vec![0; rows * cols];
        Ok(())
    }

    /// Number of rows (forecast categories).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (observed categories).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// True when rows == cols.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// True when every entry is zero.
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Zeros every entry, keeping size and name.
    pub fn zero_out(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
    }

    /// Zeros every entry and clears the name.
    pub fn clear(&mut self) {
        self.zero_out();
        self.name.clear();
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, ContableError> {
        if row >= self.rows || col >= self.cols {
            return Err(ContableError::OutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    // Unchecked access for internal loops over known-valid indices.
    pub(crate) fn at(&self, row: usize, col: usize) -> u64 {
        self.counts[row * self.cols + col]
    }

    pub(crate) fn at_mut(&mut self, row: usize, col: usize) -> &mut u64 {
        &mut self.counts[row * self.cols + col]
    }

    /// Returns the count at (`row`, `col`).
    pub fn entry(&self, row: usize, col: usize) -> Result<u64, ContableError> {
        Ok(self.counts[self.index(row, col)?])
    }

    /// Sets the count at (`row`, `col`).
    pub fn set_entry(&mut self, row: usize, col: usize, value: u64) -> Result<(), ContableError> {
        let i = self.index(row, col)?;
        self.counts[i] = value;
        Ok(())
    }

    /// Adds one to the count at (`row`, `col`).
    pub fn inc_entry(&mut self, row: usize, col: usize) -> Result<(), ContableError> {
        let i = self.index(row, col)?;
        self.counts[i] += 1;
        Ok(())
    }

    pub(crate) fn row_sum(&self, row: usize) -> u64 {
        self.counts[row * self.cols..(row + 1) * self.cols].iter().sum()
    }

    pub(crate) fn col_sum(&self, col: usize) -> u64 {
        (0..self.rows).map(|r| self.at(r, col)).sum()
    }

    /// Sum of row `row`.
    pub fn row_total(&self, row: usize) -> Result<u64, ContableError> {
        self.index(row, 0)?;
        Ok(self.row_sum(row))
    }

    /// Sum of column `col`.
    pub fn col_total(&self, col: usize) -> Result<u64, ContableError> {
        self.index(0, col)?;
        Ok(self.col_sum(col))
    }

    /// Sum of every entry.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Largest single count.
    pub fn largest_entry(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Smallest single count.
    pub fn smallest_entry(&self) -> u64 {
        self.counts.iter().copied().min().unwrap_or(0)
    }

    /// Entry as a proportion of its row total. `None` for an empty row.
    pub fn row_proportion(&self, row: usize, col: usize) -> Result<Option<f64>, ContableError> {
        let v = self.entry(row, col)?;
        Ok(ratio(v, self.row_sum(row)))
    }

    /// Entry as a proportion of its column total. `None` for an empty column.
    pub fn col_proportion(&self, row: usize, col: usize) -> Result<Option<f64>, ContableError> {
        let v = self.entry(row, col)?;
        Ok(ratio(v, self.col_sum(col)))
    }

    /// Adds `other` entry-wise into this table.
    pub fn try_add(&mut self, other: &ContingencyTable) -> Result<(), ContableError> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(ContableError::SizeMismatch {
                rows: self.rows,
                cols: self.cols,
                other_rows: other.rows,
                other_cols: other.cols,
            });
        }
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
        Ok(())
    }

    /// Collapses a square table to 2x2 by treating category `k` as the event.
    pub fn condition_on(&self, k: usize) -> Result<TwoByTwoTable, ContableError> {
        self.require_square("condition_on")?;
        let hits = self.entry(k, k)?;
        let fy = self.row_sum(k);
        let oy = self.col_sum(k);
        let n = self.total();
        Ok(TwoByTwoTable::from_counts(
            hits,
            fy - hits,
            oy - hits,
            n - fy - oy + hits,
        ))
    }

    pub(crate) fn require_square(&self, op: &'static str) -> Result<(), ContableError> {
        if !self.is_square() {
            return Err(ContableError::NotSquare {
                op,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }
}

impl AddAssign<&ContingencyTable> for ContingencyTable {
    /// Entry-wise merge.
    ///
    /// # Panics
    ///
    /// Panics if the tables differ in shape; use [`ContingencyTable::try_add`]
    /// to handle that case.
    fn add_assign(&mut self, other: &ContingencyTable) {
        if let Err(e) = self.try_add(other) {
            panic!("{e}");
        }
    }
}

fn check_size(rows: usize, cols: usize) -> Result<(), ContableError> {
    if rows < 2 || cols < 2 {
        return Err(ContableError::InvalidSize { rows, cols });
    }
    Ok(())
}

pub(crate) fn ratio(num: u64, den: u64) -> Option<f64> {
    if den == 0 {
        None
    } else {
        Some(num as f64 / den as f64)
    }
}
