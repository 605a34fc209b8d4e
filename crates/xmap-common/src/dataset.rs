//! Coordinate-tagged input data.
//!
//! A dataset is a row-major table whose first two columns are latitude and
//! longitude in degrees. Every further column is a value series that gets
//! rendered as its own plot.

use crate::{BoundingBox, XMapError, XMapResult};

/// Number of leading coordinate columns (latitude, longitude).
pub const COORDINATE_COLUMNS: usize = 2;

/// A validated table of `(lat, lon, v1, ..., vk)` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: usize,
    data: Vec<f64>,
}

/// A borrowed view of one dataset row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row<'a> {
    pub lat: f64,
    pub lon: f64,
    pub values: &'a [f64],
}

impl Dataset {
    /// Build a dataset from owned rows.
    ///
    /// All rows must have the same width (at least two columns) and carry a
    /// finite latitude in [-90, 90] and longitude in [-180, 180]. Value
    /// columns may contain NaN to mark missing samples.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> XMapResult<Self> {
        let columns = rows
            .first()
            .map(|r| r.as_ref().len())
            .unwrap_or(COORDINATE_COLUMNS);

        let mut data = Vec::with_capacity(rows.len() * columns);
        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() < COORDINATE_COLUMNS {
                return Err(XMapError::TooFewColumns {
                    row: index,
                    found: row.len(),
                });
            }
            if row.len() != columns {
                return Err(XMapError::RowWidthMismatch {
                    row: index,
                    expected: columns,
                    found: row.len(),
                });
            }
            validate_coordinate(index, row[0], row[1])?;
            data.extend_from_slice(row);
        }

        Ok(Self { columns, data })
    }

    /// Build a dataset from a flat row-major buffer with `columns` per row.
    pub fn from_flat(columns: usize, data: Vec<f64>) -> XMapResult<Self> {
        if columns < COORDINATE_COLUMNS {
            return Err(XMapError::TooFewColumns {
                row: 0,
                found: columns,
            });
        }
        if data.len() % columns != 0 {
            return Err(XMapError::RowWidthMismatch {
                row: data.len() / columns,
                expected: columns,
                found: data.len() % columns,
            });
        }
        for (index, row) in data.chunks_exact(columns).enumerate() {
            validate_coordinate(index, row[0], row[1])?;
        }

        Ok(Self { columns, data })
    }

    /// Parse delimited text: one row per line, numbers separated by commas,
    /// semicolons, tabs or spaces. Blank lines and lines starting with `#` are
    /// skipped, and a single non-numeric header line before the first data row
    /// is ignored.
    pub fn from_delimited_str(text: &str) -> XMapResult<Self> {
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut header_allowed = true;

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let tokens: Vec<&str> = line
                .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .collect();

            let parsed: Result<Vec<f64>, &str> = tokens
                .iter()
                .map(|t| parse_number(t).ok_or(*t))
                .collect();

            match parsed {
                Ok(row) => {
                    header_allowed = false;
                    rows.push(row);
                }
                Err(_) if header_allowed => {
                    tracing::debug!(line = line_no + 1, "Skipping header line");
                    header_allowed = false;
                }
                Err(token) => {
                    return Err(XMapError::ParseError {
                        row: line_no + 1,
                        token: token.to_string(),
                    });
                }
            }
        }

        Self::from_rows(&rows)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.len() / self.columns
    }

    /// True if the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Total number of columns, coordinates included.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of value columns (k).
    pub fn value_columns(&self) -> usize {
        self.columns - COORDINATE_COLUMNS
    }

    /// Row at `index`, if present.
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        let start = index.checked_mul(self.columns)?;
        let row = self.data.get(start..start + self.columns)?;
        Some(Row {
            lat: row[0],
            lon: row[1],
            values: &row[COORDINATE_COLUMNS..],
        })
    }

    /// Iterate over all rows in order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.data.chunks_exact(self.columns).map(|row| Row {
            lat: row[0],
            lon: row[1],
            values: &row[COORDINATE_COLUMNS..],
        })
    }

    /// Iterate over `(lat, lon)` pairs.
    pub fn coordinates(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.rows().map(|r| (r.lat, r.lon))
    }

    /// Values of value column `series` (0-based, coordinates excluded).
    pub fn series(&self, series: usize) -> Option<Vec<f64>> {
        if series >= self.value_columns() {
            return None;
        }
        Some(self.rows().map(|r| r.values[series]).collect())
    }

    /// Finite minimum and maximum of a value column.
    pub fn series_range(&self, series: usize) -> Option<(f64, f64)> {
        if series >= self.value_columns() {
            return None;
        }
        self.rows()
            .map(|r| r.values[series])
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Coordinate extrema over all rows.
    pub fn bounding_box(&self) -> XMapResult<BoundingBox> {
        BoundingBox::from_points(self.coordinates()).ok_or(XMapError::EmptyInput)
    }
}

fn validate_coordinate(row: usize, lat: f64, lon: f64) -> XMapResult<()> {
    let valid = lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon);

    if valid {
        Ok(())
    } else {
        Err(XMapError::InvalidCoordinate { row, lat, lon })
    }
}

fn parse_number(token: &str) -> Option<f64> {
    match token.to_ascii_lowercase().as_str() {
        "nan" | "na" | "null" | "-" => Some(f64::NAN),
        other => other.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let ds = Dataset::from_rows(&[[40.0, -73.0, 1.0], [41.0, -74.0, 2.0]]).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.value_columns(), 1);
        assert_eq!(ds.row(1).unwrap().values, &[2.0]);
        assert!(ds.row(2).is_none());
    }

    #[test]
    fn test_empty_rows_give_empty_dataset() {
        let rows: [[f64; 3]; 0] = [];
        let ds = Dataset::from_rows(&rows).unwrap();
        assert!(ds.is_empty());
        assert!(matches!(ds.bounding_box(), Err(XMapError::EmptyInput)));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![40.0, -73.0, 1.0], vec![41.0, -74.0]];
        let err = Dataset::from_rows(&rows).unwrap_err();
        assert!(matches!(
            err,
            XMapError::RowWidthMismatch {
                row: 1,
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let err = Dataset::from_rows(&[[91.0, 0.0]]).unwrap_err();
        assert!(matches!(err, XMapError::InvalidCoordinate { row: 0, .. }));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_nan_coordinate_rejected() {
        let err = Dataset::from_rows(&[[10.0, 0.0], [f64::NAN, 0.0]]).unwrap_err();
        assert!(matches!(err, XMapError::InvalidCoordinate { row: 1, .. }));
    }

    #[test]
    fn test_nan_value_allowed() {
        let ds = Dataset::from_rows(&[[10.0, 0.0, f64::NAN], [11.0, 1.0, 5.0]]).unwrap();
        assert_eq!(ds.series_range(0), Some((5.0, 5.0)));
    }

    #[test]
    fn test_from_flat() {
        let ds = Dataset::from_flat(3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.series(0), Some(vec![3.0, 6.0]));
        assert!(Dataset::from_flat(3, vec![1.0, 2.0]).is_err());
        assert!(Dataset::from_flat(1, vec![1.0]).is_err());
    }

    #[test]
    fn test_parse_delimited_with_header_and_comments() {
        let text = "# signal survey\nlat,lon,rssi\n48.10, 11.50, -67\n48.11;11.52;-80\n\n48.12\t11.53\tnan\n";
        let ds = Dataset::from_delimited_str(text).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.columns(), 3);
        assert!(ds.row(2).unwrap().values[0].is_nan());
        assert_eq!(ds.series_range(0), Some((-80.0, -67.0)));
    }

    #[test]
    fn test_parse_delimited_bad_token() {
        let text = "48.1 11.5 1\n48.2 eleven 2\n";
        let err = Dataset::from_delimited_str(text).unwrap_err();
        assert!(matches!(err, XMapError::ParseError { row: 2, .. }));
    }
}
