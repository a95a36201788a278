//! Motivation: affinity-weighted sales potential, the currency of the fairness floor.

use crate::affinity::AffinityScores;
use crate::error::{Result, input_bail};
use crate::types::CandidateSet;

/// Motivation of each assignment-eligible candidate, in candidate-set index order.
#[derive(Debug, Clone, PartialEq)]
pub struct Motivation {
    rows: Vec<usize>,
    values: Vec<f64>,
}

impl Motivation {
    /// `round(affinity × potential_value)` for every eligible candidate, ties to even.
    pub fn compute(candidates: &CandidateSet, affinity: &AffinityScores) -> Result<Self> {
        let rows = candidates.eligible_indices();
        let mut values = Vec::with_capacity(rows.len());

        for &row in &rows {
            let candidate = candidates.candidate(row);
            let Some(score) = affinity.at(row) else {
                input_bail!("eligible candidate {} has no affinity score", candidate.id);
            };
            values.push((score * candidate.potential_value).round_ties_even());
        }

        Ok(Self { rows, values })
    }

    /// Build from explicit (candidate-set index, value) columns.
    pub fn from_parts(rows: Vec<usize>, values: Vec<f64>) -> Self {
        debug_assert_eq!(rows.len(), values.len(), "rows and values must align");
        Self { rows, values }
    }

    /// Candidate-set indices of the eligible candidates, aligned with `values()`.
    #[inline] pub fn rows(&self) -> &[usize] { &self.rows }

    #[inline] pub fn values(&self) -> &[f64] { &self.values }

    #[inline] pub fn len(&self) -> usize { self.rows.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Sum of motivation over all eligible candidates.
    #[inline] pub fn total(&self) -> f64 { self.values.iter().sum() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affinity::AffinityScorer;
    use crate::types::{Candidate, Label, Location};

    fn candidate(id: &str, label: Label, value: f64, feature: f64) -> Candidate {
        Candidate {
            id: id.into(),
            features: vec![feature],
            label,
            potential_value: value,
            location: Location { lat: 0.0, lon: 0.0 },
        }
    }

    #[test]
    fn uniform_affinity_keeps_potential_value() {
        let set = CandidateSet::new(vec!["f".into()], vec![
            candidate("a", Label::Customer, 50.0, 1.0),
            candidate("b", Label::Unknown, 12.4, 1.0),
            candidate("c", Label::Excluded, 99.0, 1.0),
            candidate("d", Label::Unknown, 7.5, 1.0),
        ]).unwrap();

        let motivation = Motivation::compute(&set, &AffinityScorer::uniform(&set)).unwrap();
        assert_eq!(motivation.rows(), &[1, 3]);
        assert_eq!(motivation.values(), &[12.0, 8.0]);
        assert_eq!(motivation.total(), 20.0);
    }

    #[test]
    fn halves_round_to_even() {
        let set = CandidateSet::new(vec!["f".into()], vec![
            candidate("a", Label::Unknown, 2.5, 1.0),
            candidate("b", Label::Unknown, 3.5, 1.0),
        ]).unwrap();
        let motivation = Motivation::compute(&set, &AffinityScorer::uniform(&set)).unwrap();
        assert_eq!(motivation.values(), &[2.0, 4.0]);
    }

    #[test]
    fn learned_affinity_scales_value() {
        let set = CandidateSet::new(vec!["f".into()], vec![
            candidate("k1", Label::Customer, 0.0, 1.0),
            candidate("k2", Label::Customer, 0.0, 1.2),
            candidate("near", Label::Unknown, 1000.0, 1.1),
            candidate("far", Label::Unknown, 1000.0, 40.0),
        ]).unwrap();
        let affinity = AffinityScorer::default().score(&set).unwrap();
        let motivation = Motivation::compute(&set, &affinity).unwrap();

        assert_eq!(motivation.len(), 2);
        assert!(motivation.values()[0] > motivation.values()[1]);
        assert!(motivation.values().iter().all(|v| v.fract() == 0.0 && *v <= 1000.0));
    }
}
