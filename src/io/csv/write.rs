//! CSV writing operations.

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerWriter, prelude::{CsvWriter, NamedFrom}, series::Series};

use crate::plan::{AgentSummary, AssignmentRow};

/// Write a DataFrame to a CSV file.
pub(crate) fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::csv::write] Failed to create CSV file: {}", path.display()))?;
    CsvWriter::new(file)
        .finish(df)
        .with_context(|| format!("[io::csv::write] Failed to write CSV to {:?}", path))
}

/// Write a DataFrame to a CSV string.
pub(crate) fn write_csv_string(df: &mut DataFrame) -> Result<String> {
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .finish(df)
        .context("[io::csv::write] Failed to write CSV to string")?;
    String::from_utf8(buffer)
        .context("[io::csv::write] CSV output is not valid UTF-8")
}

fn floats<T>(items: &[T], f: impl Fn(&T) -> f64) -> Vec<f64> { items.iter().map(f).collect() }

fn strings<T>(items: &[T], f: impl Fn(&T) -> &str) -> Vec<String> {
    items.iter().map(|item| f(item).to_string()).collect()
}

/// One row per assigned candidate.
pub(crate) fn assignment_frame(rows: &[AssignmentRow]) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![
        Series::new("agent_id".into(), strings(rows, |r| r.agent_id.as_str())).into(),
        Series::new("candidate_id".into(), strings(rows, |r| r.candidate_id.as_str())).into(),
        Series::new("potential_value".into(), floats(rows, |r| r.potential_value)).into(),
        Series::new("affinity".into(), floats(rows, |r| r.affinity)).into(),
        Series::new("motivation".into(), floats(rows, |r| r.motivation)).into(),
        Series::new("distance_km".into(), floats(rows, |r| r.distance_km)).into(),
        Series::new("lat".into(), floats(rows, |r| r.lat)).into(),
        Series::new("lon".into(), floats(rows, |r| r.lon)).into(),
    ])?)
}

/// One row per agent.
pub(crate) fn summary_frame(agents: &[AgentSummary]) -> Result<DataFrame> {
    let counts = agents.iter().map(|a| a.candidates as u64).collect::<Vec<_>>();
    Ok(DataFrame::new(vec![
        Series::new("agent_id".into(), strings(agents, |a| a.agent_id.as_str())).into(),
        Series::new("candidates".into(), counts).into(),
        Series::new("motivation".into(), floats(agents, |a| a.motivation)).into(),
        Series::new("quota".into(), floats(agents, |a| a.quota)).into(),
        Series::new("distance_km".into(), floats(agents, |a| a.distance_km)).into(),
    ])?)
}

/// One row per scored candidate: id, label code, affinity.
pub(crate) fn scores_frame(ids: Vec<String>, labels: Vec<i64>, scores: Vec<f64>) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![
        Series::new("candidate_id".into(), ids).into(),
        Series::new("label".into(), labels).into(),
        Series::new("affinity".into(), scores).into(),
    ])?)
}
