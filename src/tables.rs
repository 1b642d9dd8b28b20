// tables.rs

// --- External Crate Imports ---
use log::debug;
use ndarray::{Array2, ArrayView1, Axis};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or slicing one of the PCA tables.
#[derive(Error, Debug)]
pub(crate) enum TableError {
    #[error("Failed to read table {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(
        "Non-numeric value '{value}' in {} at data row {row}, column {column}",
        .path.display()
    )]
    NonNumeric {
        path: PathBuf,
        row: usize,
        column: usize,
        value: String,
    },

    #[error("Table {} contains no data rows", .path.display())]
    Empty { path: PathBuf },

    #[error(
        "Requested {requested} components but {} only has {available} component column(s)",
        .path.display()
    )]
    NotEnoughComponents {
        path: PathBuf,
        requested: usize,
        available: usize,
    },
}

type Result<T> = std::result::Result<T, TableError>;

fn parse_cell(path: &Path, row: usize, column: usize, raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    trimmed.parse::<f64>().map_err(|_| TableError::NonNumeric {
        path: path.to_path_buf(),
        row,
        column,
        value: trimmed.to_string(),
    })
}

// --- Variance table ---

/// Cumulative/explained variance percentages, one entry per component.
///
/// Index 0 is a synthetic zero row so that entry `n` belongs to `PC n`.
#[derive(Debug, Clone)]
pub(crate) struct VarianceTable {
    percentages: Vec<f64>,
}

impl VarianceTable {
    /// Loads a headerless single-column table (one value per line) and
    /// prepends the zero row.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(|source| TableError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut percentages = vec![0.0];
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|source| TableError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            match record.get(0) {
                Some(field) if !field.trim().is_empty() => {
                    percentages.push(parse_cell(path, row, 0, field)?)
                }
                _ => continue,
            }
        }

        if percentages.len() == 1 {
            return Err(TableError::Empty {
                path: path.to_path_buf(),
            });
        }
        debug!(
            "Loaded {} variance rows from {}",
            percentages.len() - 1,
            path.display()
        );
        Ok(Self { percentages })
    }

    #[cfg(test)]
    pub(crate) fn from_percentages(values: &[f64]) -> Self {
        let mut percentages = Vec::with_capacity(values.len() + 1);
        percentages.push(0.0);
        percentages.extend_from_slice(values);
        Self { percentages }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.percentages.len()
    }

    /// `(component index, % variance)` for indices in `first..=last`,
    /// truncated to the rows actually present.
    pub(crate) fn points(&self, first: usize, last: usize) -> Vec<(f64, f64)> {
        self.percentages
            .iter()
            .enumerate()
            .skip(first)
            .take_while(|(index, _)| *index <= last)
            .map(|(index, value)| (index as f64, *value))
            .collect()
    }
}

// --- Component tables (scores, eigenspectra) ---

/// A tab-separated table whose first column is an axis (time index or
/// wavenumber) and whose remaining columns hold one series per component.
#[derive(Debug, Clone)]
pub(crate) struct ComponentTable {
    source: PathBuf,
    headers: Vec<String>,
    values: Array2<f64>,
}

/// One component column picked out of a [`ComponentTable`].
#[derive(Debug, Clone)]
pub(crate) struct ComponentSeries<'a> {
    /// 1-based component number, as shown in legends (`PC n`).
    pub(crate) number: usize,
    /// Column header from the source file.
    pub(crate) header: &'a str,
    pub(crate) values: ArrayView1<'a, f64>,
}

impl ComponentTable {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let read_err = |source: csv::Error| TableError::Read {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_path(path)
            .map_err(read_err)?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(read_err)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut flat = Vec::new();
        let mut n_rows = 0usize;
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(read_err)?;
            for (column, field) in record.iter().enumerate() {
                flat.push(parse_cell(path, row, column, field)?);
            }
            n_rows += 1;
        }

        if n_rows == 0 {
            return Err(TableError::Empty {
                path: path.to_path_buf(),
            });
        }

        let values = Array2::from_shape_vec((n_rows, headers.len()), flat).map_err(|_| {
            TableError::Empty {
                path: path.to_path_buf(),
            }
        })?;
        debug!(
            "Loaded {} rows x {} columns from {}",
            values.nrows(),
            values.ncols(),
            path.display()
        );

        Ok(Self {
            source: path.to_path_buf(),
            headers,
            values,
        })
    }

    /// Builds a table directly from headers and row-major values.
    #[cfg(test)]
    pub(crate) fn from_parts(headers: &[&str], values: Array2<f64>) -> Self {
        Self {
            source: PathBuf::from("<memory>"),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            values,
        }
    }

    #[cfg(test)]
    pub(crate) fn nrows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns after the leading axis column.
    pub(crate) fn component_count(&self) -> usize {
        self.values.ncols().saturating_sub(1)
    }

    /// The leading axis column (time index or wavenumbers).
    pub(crate) fn axis(&self) -> ArrayView1<'_, f64> {
        self.values.column(0)
    }

    /// Columns `1..=k` labelled `PC 1 .. PC k`.
    pub(crate) fn components(&self, k: usize) -> Result<Vec<ComponentSeries<'_>>> {
        let available = self.component_count();
        if k > available {
            return Err(TableError::NotEnoughComponents {
                path: self.source.clone(),
                requested: k,
                available,
            });
        }
        Ok(self
            .values
            .axis_iter(Axis(1))
            .zip(self.headers.iter())
            .skip(1)
            .take(k)
            .enumerate()
            .map(|(i, (values, header))| ComponentSeries {
                number: i + 1,
                header: header.as_str(),
                values,
            })
            .collect())
    }
}
