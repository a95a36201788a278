use std::path::Path;

use anyhow::Result;

use crate::{affinity::AffinityScores, plan::PlanReport, types::CandidateSet};

impl PlanReport {
    /// Write the assignment table (one row per assigned candidate).
    pub fn write_to_csv(&self, path: &Path) -> Result<()> {
        let mut df = crate::io::csv::assignment_frame(self.rows())?;
        crate::io::csv::write_csv(&mut df, path)
    }

    /// Write the per-agent summary table.
    pub fn write_summary_to_csv(&self, path: &Path) -> Result<()> {
        let mut df = crate::io::csv::summary_frame(self.agents())?;
        crate::io::csv::write_csv(&mut df, path)
    }

    /// The assignment table as CSV text.
    pub fn to_csv(&self) -> Result<String> {
        let mut df = crate::io::csv::assignment_frame(self.rows())?;
        crate::io::csv::write_csv_string(&mut df)
    }
}

impl AffinityScores {
    /// Write one `candidate_id,label,affinity` row per scored candidate.
    pub fn write_to_csv(&self, candidates: &CandidateSet, path: &Path) -> Result<()> {
        let (ids, labels, scores) = self.iter()
            .map(|(index, score)| {
                let candidate = candidates.candidate(index);
                (candidate.id.to_string(), candidate.label.code(), score)
            })
            .fold((Vec::new(), Vec::new(), Vec::new()), |(mut ids, mut labels, mut scores), (id, label, score)| {
                ids.push(id);
                labels.push(label);
                scores.push(score);
                (ids, labels, scores)
            });

        let mut df = crate::io::csv::scores_frame(ids, labels, scores)?;
        crate::io::csv::write_csv(&mut df, path)
    }
}
