pub mod assign;
pub mod score;

use anyhow::{Context, Result};
use fairshare::{CandidateColumns, CandidateSet, LabelSet, RunConfig};

use crate::cli::InputArgs;

/// Config file (or defaults) with the shared flag overrides applied.
pub fn load_config(input: &InputArgs) -> Result<RunConfig> {
    let mut config = match &input.config {
        Some(path) => RunConfig::from_json_file(path)?,
        None => RunConfig::default(),
    };
    if let Some(seed) = input.seed { config.seed = seed }
    Ok(config)
}

/// Candidate table, relabelled from the customer/exclusion tables when given.
pub fn load_candidates(input: &InputArgs) -> Result<CandidateSet> {
    let columns = CandidateColumns { ignore: input.ignore_columns.clone(), ..Default::default() };

    tracing::info!(path = %input.candidates.display(), "[commands] loading candidates");
    let mut candidates = CandidateSet::read_from_csv(&input.candidates, &columns)
        .with_context(|| format!("[commands] Failed to load candidates from {}", input.candidates.display()))?;

    if let Some(customers) = &input.customers {
        let labels = LabelSet::read_from_csv(customers, &input.customer_columns, input.excluded.as_deref())?;
        candidates.apply_labels(&labels)
            .with_context(|| format!("[commands] Failed to apply labels from {}", customers.display()))?;
    }
    Ok(candidates)
}
