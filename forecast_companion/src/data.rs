//! Tabular input handling: loading raw tables and normalizing them into a
//! canonical `(date, value)` series

use crate::error::{NormalizeError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::{CsvReader, DataFrame, DataType, SerReader, TimeUnit};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;

/// Days between 0001-01-01 and 1970-01-01, the polars `Date` epoch
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// A single observation of the canonical series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Canonical time series: strictly increasing dates, at least two points
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    points: Vec<SeriesPoint>,
}

impl Series {
    /// Build a series from points that are already sorted.
    ///
    /// Fails when fewer than two points are given, when dates repeat, or
    /// when dates are out of order.
    pub fn new(points: Vec<SeriesPoint>) -> Result<Self> {
        if points.len() < 2 {
            return Err(NormalizeError::Validation(format!(
                "A series needs at least 2 observations, got {}",
                points.len()
            )));
        }

        for pair in points.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(NormalizeError::Validation(format!(
                    "Duplicate timestamp {}",
                    pair[0].date
                )));
            }
            if pair[0].date > pair[1].date {
                return Err(NormalizeError::Validation(format!(
                    "Timestamps out of order: {} before {}",
                    pair[0].date, pair[1].date
                )));
            }
        }

        Ok(Self { points })
    }

    /// Build a series from parallel date and value vectors (for testing)
    pub fn from_pairs(pairs: &[(NaiveDate, f64)]) -> Result<Self> {
        Self::new(
            pairs
                .iter()
                .map(|&(date, value)| SeriesPoint { date, value })
                .collect(),
        )
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Date of the most recent observation
    pub fn last_date(&self) -> NaiveDate {
        self.points[self.points.len() - 1].date
    }
}

/// Number of future periods to predict, bounded at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Horizon(usize);

impl Horizon {
    /// Validate `periods` against `1..=max`
    pub fn new(periods: usize, max: usize) -> Result<Self> {
        if periods == 0 || periods > max {
            return Err(NormalizeError::Validation(format!(
                "Horizon must be between 1 and {}, got {}",
                max, periods
            )));
        }
        Ok(Self(periods))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Loader for raw tabular input
#[derive(Debug)]
pub struct TableLoader;

impl TableLoader {
    /// Load a table from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;
        Ok(df)
    }

    /// Load a table from in-memory CSV bytes
    pub fn from_csv_bytes(bytes: Vec<u8>) -> Result<DataFrame> {
        let df = CsvReader::new(Cursor::new(bytes))
            .infer_schema(None)
            .has_header(true)
            .finish()?;
        Ok(df)
    }

    /// Default (date, value) column pick: the first two columns
    pub fn default_columns(df: &DataFrame) -> Result<(String, String)> {
        let names = df.get_column_names();
        match names.as_slice() {
            [date, value, ..] => Ok((date.to_string(), value.to_string())),
            _ => Err(NormalizeError::Validation(format!(
                "Input needs at least two columns, found {}",
                names.len()
            ))),
        }
    }
}

/// Validates and reshapes a raw table into a [`Series`]
#[derive(Debug, Default, Clone, Copy)]
pub struct TableNormalizer;

impl TableNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Extract, parse, sort and validate the `(date_column, value_column)`
    /// pair of `table`.
    pub fn normalize(
        &self,
        table: &DataFrame,
        date_column: &str,
        value_column: &str,
    ) -> Result<Series> {
        let names = table.get_column_names();
        for wanted in [date_column, value_column] {
            if !names.iter().any(|name| *name == wanted) {
                return Err(NormalizeError::MissingColumn(wanted.to_string()));
            }
        }

        let dates = Self::parse_dates(table, date_column)?;
        let values = Self::coerce_values(table, value_column)?;

        let mut points: Vec<SeriesPoint> = dates
            .into_iter()
            .zip(values)
            .map(|(date, value)| SeriesPoint { date, value })
            .collect();
        points.sort_by_key(|p| p.date);

        Series::new(points)
    }

    fn parse_dates(table: &DataFrame, column_name: &str) -> Result<Vec<NaiveDate>> {
        let column = table.column(column_name)?;

        match column.dtype() {
            DataType::Date => {
                let days = column.cast(&DataType::Int32)?;
                days.i32()?
                    .into_iter()
                    .enumerate()
                    .map(|(row, day)| {
                        day.and_then(|d| {
                            NaiveDate::from_num_days_from_ce_opt(d + UNIX_EPOCH_DAYS_FROM_CE)
                        })
                        .ok_or_else(|| NormalizeError::Parse {
                            row,
                            value: format!("{:?}", day),
                        })
                    })
                    .collect()
            }
            DataType::Datetime(unit, _) => {
                let per_second: i64 = match unit {
                    TimeUnit::Nanoseconds => 1_000_000_000,
                    TimeUnit::Microseconds => 1_000_000,
                    TimeUnit::Milliseconds => 1_000,
                };
                let ticks = column.cast(&DataType::Int64)?;
                ticks
                    .i64()?
                    .into_iter()
                    .enumerate()
                    .map(|(row, tick)| {
                        tick.and_then(|t| {
                            let secs = t.div_euclid(per_second);
                            let nanos = (t.rem_euclid(per_second) * (1_000_000_000 / per_second))
                                as u32;
                            DateTime::from_timestamp(secs, nanos)
                        })
                        .map(|dt| dt.date_naive())
                        .ok_or_else(|| NormalizeError::Parse {
                            row,
                            value: format!("{:?}", tick),
                        })
                    })
                    .collect()
            }
            _ => {
                let text = column.cast(&DataType::Utf8)?;
                text.utf8()?
                    .into_iter()
                    .enumerate()
                    .map(|(row, cell)| match cell {
                        Some(raw) => parse_date(raw).ok_or_else(|| NormalizeError::Parse {
                            row,
                            value: raw.to_string(),
                        }),
                        None => Err(NormalizeError::Parse {
                            row,
                            value: String::new(),
                        }),
                    })
                    .collect()
            }
        }
    }

    fn coerce_values(table: &DataFrame, column_name: &str) -> Result<Vec<f64>> {
        let column = table.column(column_name)?;
        let dtype = column.dtype().clone();

        let values: Vec<Option<f64>> = if dtype.is_numeric() {
            let cast = column.cast(&DataType::Float64)?;
            cast.f64()?.into_iter().collect()
        } else if dtype == DataType::Utf8 {
            let mut parsed = Vec::with_capacity(column.len());
            for (row, cell) in column.utf8()?.into_iter().enumerate() {
                match cell {
                    Some(raw) => {
                        let value = raw.trim().parse::<f64>().map_err(|_| NormalizeError::Type {
                            row,
                            detail: format!("'{}' is not a number", raw),
                        })?;
                        parsed.push(Some(value));
                    }
                    None => parsed.push(None),
                }
            }
            parsed
        } else {
            return Err(NormalizeError::Type {
                row: 0,
                detail: format!("column '{}' has non-numeric type {}", column_name, dtype),
            });
        };

        values
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                Some(v) if v.is_finite() => Ok(v),
                Some(v) => Err(NormalizeError::Type {
                    row,
                    detail: format!("{} is not a finite number", v),
                }),
                None => Err(NormalizeError::Type {
                    row,
                    detail: "missing value".to_string(),
                }),
            })
            .collect()
    }
}

/// Parse the date spellings commonly found in exported spreadsheets
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(datetime.date());
        }
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }

    // A bare year ("2024") reads as the first of January
    if raw.len() == 4 && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse().ok().and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1));
    }

    // Year-month ("2024-01") reads as the first of the month
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        let separator = if format.contains('/') { '/' } else { '-' };
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{}{}01", raw, separator), format) {
            return Some(date);
        }
    }

    None
}
