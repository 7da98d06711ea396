//! Square labelled dissimilarity matrices
//!
//! The CSV layout has a header row of labels and an index column carrying
//! the same labels in the same order:
//!
//! ```text
//! ,A,B,C
//! A,0,0.4,0.7
//! B,0.4,0,0.2
//! C,0.7,0.2,0
//! ```

use crate::error::{Result, ValidationError};
use indexmap::IndexMap;
use ndarray::{Array2, ArrayView2};
use std::ops::Index;
use std::path::Path;
use tracing::debug;

/// Relative tolerance of the symmetry check
pub const RTOL: f64 = 1e-5;
/// Absolute tolerance of the symmetry check
pub const ATOL: f64 = 1e-8;

/// `|a - b| <= ATOL + RTOL * |b|`
///
/// Equal infinities are close, an infinity is never close to anything else,
/// and NaN is never close.
#[inline]
#[must_use]
#[allow(clippy::float_cmp)]
pub fn allclose(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    if a.is_infinite() || b.is_infinite() {
        return false;
    }
    (a - b).abs() <= ATOL + RTOL * b.abs()
}

/// Validated symmetric matrix with labelled rows and columns
#[derive(Debug, Clone, PartialEq)]
pub struct Rdm {
    labels: IndexMap<String, usize>,
    values: Array2<f64>,
}

impl Rdm {
    /// Number of conditions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if the matrix has no conditions
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in file order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    /// Position of `label`
    #[must_use]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.get(label).copied()
    }

    /// Value at `(i, j)`
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get((i, j)).copied()
    }

    /// Value for a pair of labels
    #[must_use]
    pub fn by_label(&self, row: &str, col: &str) -> Option<f64> {
        self.get(self.index_of(row)?, self.index_of(col)?)
    }

    /// Borrow the matrix
    #[inline]
    #[must_use]
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Upper triangle without the diagonal, row by row
    #[must_use]
    pub fn upper_triangle(&self) -> Vec<f64> {
        let n = self.len();
        let mut out = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in i + 1..n {
                out.push(self.values[[i, j]]);
            }
        }
        out
    }
}

impl Index<(usize, usize)> for Rdm {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.values[[i, j]]
    }
}

/// Read and validate an RDM file
///
/// # Errors
/// - [`ValidationError::MissingFile`] if `path` does not exist
/// - any error of [`parse_rdm`]
pub fn load_path(path: &Path) -> Result<Rdm> {
    let text = std::fs::read_to_string(path).map_err(|e| ValidationError::io_error(path, e))?;
    let rdm = parse_rdm(&text)?;
    debug!(path = %path.display(), conditions = rdm.len(), "rdm loaded");
    Ok(rdm)
}

/// Parse and validate RDM text
///
/// # Errors
/// Returns a [`ValidationError`] if the table is empty, ragged, non-numeric,
/// not square, labelled inconsistently, or not symmetric within [`allclose`].
pub fn parse_rdm(text: &str) -> Result<Rdm> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = lines.next().ok_or(ValidationError::Empty)?;
    let columns: Vec<String> = split_row(header).skip(1).map(str::to_string).collect();

    let mut labels = IndexMap::with_capacity(columns.len());
    for (i, column) in columns.iter().enumerate() {
        if labels.insert(column.clone(), i).is_some() {
            return Err(ValidationError::DuplicateLabel(column.clone()));
        }
    }

    let mut rows = Vec::new();
    let mut values = Vec::with_capacity(columns.len() * columns.len());
    for (line_no, line) in lines {
        let mut cells = split_row(line);
        let label = cells.next().unwrap_or_default().to_string();
        let start = values.len();
        for cell in cells {
            let value = cell.parse::<f64>().map_err(|_| ValidationError::Parse {
                line: line_no,
                value: cell.to_string(),
            })?;
            values.push(value);
        }
        let found = values.len() - start;
        if found != columns.len() {
            return Err(ValidationError::RaggedRow {
                line: line_no,
                expected: columns.len(),
                found,
            });
        }
        rows.push(label);
    }

    if rows.is_empty() || columns.is_empty() {
        return Err(ValidationError::Empty);
    }
    if rows.len() != columns.len() {
        return Err(ValidationError::NotSquare {
            rows: rows.len(),
            cols: columns.len(),
        });
    }
    if let Some((index, (row, column))) = rows
        .iter()
        .zip(&columns)
        .enumerate()
        .find(|(_, (row, column))| row != column)
    {
        return Err(ValidationError::LabelMismatch {
            index,
            row: row.clone(),
            column: column.clone(),
        });
    }

    let n = rows.len();
    let values = Array2::from_shape_vec((n, n), values).map_err(|_| ValidationError::NotSquare {
        rows: n,
        cols: columns.len(),
    })?;
    check_symmetric(&values, &columns)?;

    Ok(Rdm { labels, values })
}

fn check_symmetric(values: &Array2<f64>, labels: &[String]) -> Result<()> {
    let n = values.nrows();
    for i in 0..n {
        for j in 0..n {
            let (upper, lower) = (values[[i, j]], values[[j, i]]);
            if !allclose(upper, lower) {
                return Err(ValidationError::Asymmetric {
                    row: labels[i].clone(),
                    col: labels[j].clone(),
                    upper,
                    lower,
                });
            }
        }
    }
    Ok(())
}

fn split_row(line: &str) -> impl Iterator<Item = &str> {
    line.split(',').map(|cell| {
        let cell = cell.trim();
        cell.strip_prefix('"')
            .and_then(|c| c.strip_suffix('"'))
            .unwrap_or(cell)
    })
}
