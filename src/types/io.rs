use std::path::Path;

use anyhow::Result;

use super::{AgentSet, CandidateSet};

/// Column layout of a candidate table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateColumns {
    pub id: String,
    /// Optional; candidates default to unknown when the column is absent.
    pub label: String,
    pub potential_value: String,
    pub lat: String,
    pub lon: String,
    /// Extra numeric columns that are not features (codes, secondary identifiers).
    pub ignore: Vec<String>,
}

impl Default for CandidateColumns {
    fn default() -> Self {
        Self {
            id: "id".into(),
            label: "label".into(),
            potential_value: "potential_value".into(),
            lat: "lat".into(),
            lon: "lon".into(),
            ignore: Vec::new(),
        }
    }
}

impl CandidateColumns {
    /// Every column that never becomes a feature.
    pub(crate) fn reserved(&self) -> impl Iterator<Item = &str> {
        [&self.id, &self.label, &self.potential_value, &self.lat, &self.lon]
            .into_iter()
            .chain(self.ignore.iter())
            .map(String::as_str)
    }
}

impl CandidateSet {
    /// Load candidates from a CSV file.
    pub fn read_from_csv(path: &Path, columns: &CandidateColumns) -> Result<Self> {
        let df = crate::io::csv::read_csv(path)?;
        crate::io::csv::read_candidates(&df, columns)
    }

    /// Load candidates from CSV text.
    pub fn load_csv(csv: &str, columns: &CandidateColumns) -> Result<Self> {
        let df = crate::io::csv::read_csv_string(csv)?;
        crate::io::csv::read_candidates(&df, columns)
    }
}

impl AgentSet {
    /// Load agents from a CSV file with `id`, `lat` and `lon` columns.
    pub fn read_from_csv(path: &Path) -> Result<Self> {
        let df = crate::io::csv::read_csv(path)?;
        crate::io::csv::read_agents(&df)
    }

    /// Load agents from CSV text.
    pub fn load_csv(csv: &str) -> Result<Self> {
        let df = crate::io::csv::read_csv_string(csv)?;
        crate::io::csv::read_agents(&df)
    }
}
