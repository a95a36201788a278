//! CSV reading operations.

use std::{collections::HashSet, fs::File, io::Cursor, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReadOptions, CsvReader, DataType}};

use crate::error::Error;
use crate::labels::normalize_id;
use crate::types::{Agent, AgentSet, Candidate, CandidateColumns, CandidateSet, Label, Location};

/// Every column is read as text so identifiers keep their leading zeros;
/// numeric columns are parsed afterwards.
fn text_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
}

/// Reads a CSV file from `path` into a Polars DataFrame of string columns.
pub(crate) fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    CsvReader::new(file)
        .with_options(text_options())
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Reads CSV text into a Polars DataFrame of string columns.
pub(crate) fn read_csv_string(csv: &str) -> Result<DataFrame> {
    CsvReader::new(Cursor::new(csv.as_bytes()))
        .with_options(text_options())
        .finish()
        .context("[io::csv::read] Failed to read CSV from string")
}

fn missing_column(name: &str) -> Error {
    Error::input(format!("missing required column `{name}`"))
}

fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df.column(name).map_err(|_| missing_column(name))?;
    let series = column.as_materialized_series().cast(&DataType::String)?;
    Ok(series.str()?.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Parse a column as floats; unparseable cells become null.
fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df.column(name).map_err(|_| missing_column(name))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)
        .with_context(|| format!("[io::csv::read] Column `{name}` is not numeric"))?;
    Ok(series.f64()?.into_iter().collect())
}

/// A column counts as a feature when every non-empty cell parses as a number.
fn is_numeric_column(df: &DataFrame, name: &str) -> Result<bool> {
    let text = text_column(df, name)?;
    let numbers = numeric_column(df, name)?;
    Ok(text.iter().zip(&numbers).all(|(t, n)| t.as_deref().is_none_or(|t| t.trim().is_empty()) || n.is_some()))
}

fn required(values: &[Option<f64>], row: usize, column: &str, id: &str) -> Result<f64> {
    values[row].ok_or_else(|| {
        Error::validation(format!("candidate {id} has no value in column `{column}`")).into()
    })
}

/// Read candidates from a DataFrame.
///
/// Identifier, label, potential value and coordinate columns are reserved, as
/// are the `ignore` columns; every other numeric column becomes a feature.
pub(crate) fn read_candidates(df: &DataFrame, columns: &CandidateColumns) -> Result<CandidateSet> {
    let ids = text_column(df, &columns.id)?;
    let potential = numeric_column(df, &columns.potential_value)?;
    let lat = numeric_column(df, &columns.lat)?;
    let lon = numeric_column(df, &columns.lon)?;
    let labels = match df.column(&columns.label) {
        Ok(_) => Some(numeric_column(df, &columns.label)?),
        Err(_) => None,
    };

    let reserved = columns.reserved().collect::<HashSet<_>>();
    let mut feature_names = Vec::new();
    let mut features = Vec::new();
    for name in df.get_column_names() {
        let name = name.as_str();
        if reserved.contains(name) { continue }
        if !is_numeric_column(df, name)? {
            tracing::debug!(column = name, "[io::csv::read] skipping non-numeric column");
            continue;
        }
        feature_names.push(name.to_string());
        features.push(numeric_column(df, name)?);
    }

    let mut candidates = Vec::with_capacity(df.height());
    for (row, raw_id) in ids.iter().enumerate() {
        let id = raw_id.as_deref().and_then(normalize_id)
            .ok_or_else(|| Error::input(format!("row {} has an empty `{}`", row + 1, columns.id)))?;

        let label = match labels.as_ref().and_then(|l| l[row]) {
            None => Label::Unknown,
            Some(code) if code.fract() == 0.0 => Label::from_code(code as i64)?,
            Some(code) => return Err(Error::validation(format!("candidate {id} has label {code}")).into()),
        };

        // Excluded rows are never placed, so their placement cells may be blank.
        let placement = |values: &[Option<f64>], column: &str| match label {
            Label::Excluded => Ok(values[row].unwrap_or(f64::NAN)),
            _ => required(values, row, column, id.as_str()),
        };

        candidates.push(Candidate {
            features: features.iter().map(|f| f[row].unwrap_or(f64::NAN)).collect(),
            label,
            potential_value: placement(&potential, &columns.potential_value)?,
            location: Location {
                lat: placement(&lat, &columns.lat)?,
                lon: placement(&lon, &columns.lon)?,
            },
            id,
        });
    }

    tracing::debug!(rows = candidates.len(), features = feature_names.len(), "[io::csv::read] read candidates");
    Ok(CandidateSet::new(feature_names, candidates)?)
}

/// Read agents from a DataFrame with `id`, `lat` and `lon` columns.
pub(crate) fn read_agents(df: &DataFrame) -> Result<AgentSet> {
    let ids = text_column(df, "id")?;
    let lat = numeric_column(df, "lat")?;
    let lon = numeric_column(df, "lon")?;

    let agents = ids.iter().enumerate()
        .map(|(row, id)| -> Result<Agent> {
            let id = id.as_deref().map(str::trim).filter(|id| !id.is_empty())
                .ok_or_else(|| Error::input(format!("agent row {} has an empty `id`", row + 1)))?;
            let (Some(lat), Some(lon)) = (lat[row], lon[row]) else {
                return Err(Error::validation(format!("agent {id} is missing a coordinate")).into());
            };
            Ok(Agent { id: id.into(), location: Location { lat, lon } })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(AgentSet::new(agents)?)
}

/// Every non-empty cell of the given identifier columns (all columns when `columns` is empty).
pub(crate) fn read_id_columns(df: &DataFrame, columns: &[String]) -> Result<Vec<String>> {
    let names = if columns.is_empty() {
        df.get_column_names().into_iter().map(|n| n.to_string()).collect()
    } else {
        columns.to_vec()
    };

    let mut ids = Vec::new();
    for name in &names {
        ids.extend(text_column(df, name)?.into_iter().flatten().filter(|id| !id.trim().is_empty()));
    }
    Ok(ids)
}
