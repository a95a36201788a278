use std::collections::HashMap;

use ndarray::Array2;

use crate::error::{Error, Result, input_bail, validate};
use crate::labels::LabelSet;
use super::{CandidateId, Label, Location};

/// A candidate organization, as seen by a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: CandidateId,
    pub features: Vec<f64>, // Numeric features, NaN marks a missing value
    pub label: Label,
    pub potential_value: f64,
    pub location: Location,
}

impl Candidate {
    /// Potential value and location, needed by every row that can be scored or assigned.
    fn validate_placement(&self) -> Result<()> {
        validate!(self.potential_value.is_finite() && self.potential_value >= 0.0,
            "candidate {} has invalid potential_value {}", self.id, self.potential_value);
        self.location.validate()
            .map_err(|e| Error::validation(format!("candidate {}: {e}", self.id)))
    }
}

/// Immutable snapshot of every candidate in a run, with the names of its feature columns.
#[derive(Debug, Clone)]
pub struct CandidateSet {
    feature_names: Vec<String>,
    candidates: Vec<Candidate>,
    index: HashMap<CandidateId, usize>,
}

impl CandidateSet {
    /// Build a validated candidate set.
    ///
    /// Fails with `Error::Input` on an empty set, duplicate ids or ragged feature rows,
    /// and with `Error::Validation` on negative/non-finite potential values or bad coordinates.
    /// Excluded rows never reach motivation or distances, so only their features are checked.
    pub fn new(feature_names: Vec<String>, candidates: Vec<Candidate>) -> Result<Self> {
        if candidates.is_empty() { input_bail!("candidate set is empty") }

        let mut index = HashMap::with_capacity(candidates.len());
        for (i, candidate) in candidates.iter().enumerate() {
            if candidate.features.len() != feature_names.len() {
                input_bail!("candidate {} has {} features, expected {}",
                    candidate.id, candidate.features.len(), feature_names.len());
            }
            validate!(candidate.features.iter().all(|v| !v.is_infinite()),
                "candidate {} has an infinite feature value", candidate.id);
            if candidate.label != Label::Excluded { candidate.validate_placement()? }

            if index.insert(candidate.id.clone(), i).is_some() {
                input_bail!("duplicate candidate id {}", candidate.id);
            }
        }

        Ok(Self { feature_names, candidates, index })
    }

    #[inline] pub fn len(&self) -> usize { self.candidates.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.candidates.is_empty() }

    #[inline] pub fn feature_names(&self) -> &[String] { &self.feature_names }

    #[inline] pub fn candidates(&self) -> &[Candidate] { &self.candidates }

    #[inline] pub fn candidate(&self, i: usize) -> &Candidate { &self.candidates[i] }

    /// Look up a candidate by id.
    #[inline]
    pub fn get(&self, id: &CandidateId) -> Option<&Candidate> {
        self.index.get(id).map(|&i| &self.candidates[i])
    }

    /// Indices of the candidates that take part in affinity scoring (customers and unknowns).
    pub fn scoring_indices(&self) -> Vec<usize> {
        self.indices_where(|label| label != Label::Excluded)
    }

    /// Indices of the candidates eligible for assignment (label unknown).
    pub fn eligible_indices(&self) -> Vec<usize> {
        self.indices_where(|label| label.is_assignable())
    }

    /// Number of known-customer rows.
    pub fn customer_count(&self) -> usize {
        self.candidates.iter().filter(|c| c.label == Label::Customer).count()
    }

    /// Gather the feature rows at `indices` into a dense (rows, features) matrix.
    pub fn feature_matrix(&self, indices: &[usize]) -> Array2<f64> {
        Array2::from_shape_fn((indices.len(), self.feature_names.len()), |(r, c)| {
            self.candidates[indices[r]].features[c]
        })
    }

    /// Overwrite every candidate's label from a resolved label set.
    ///
    /// Fails, leaving the set untouched, when a row loses its exclusion without
    /// carrying a valid potential value and location.
    pub fn apply_labels(&mut self, labels: &LabelSet) -> Result<()> {
        let relabelled = self.candidates.iter()
            .map(|candidate| {
                let label = labels.label_of(&candidate.id);
                if label != Label::Excluded && candidate.label == Label::Excluded {
                    candidate.validate_placement()?;
                }
                Ok(label)
            })
            .collect::<Result<Vec<_>>>()?;

        for (candidate, label) in self.candidates.iter_mut().zip(relabelled) {
            candidate.label = label;
        }
        Ok(())
    }

    fn indices_where(&self, pred: impl Fn(Label) -> bool) -> Vec<usize> {
        self.candidates.iter().enumerate()
            .filter_map(|(i, c)| pred(c.label).then_some(i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, label: Label, value: f64) -> Candidate {
        Candidate {
            id: id.into(),
            features: vec![1.0, f64::NAN],
            label,
            potential_value: value,
            location: Location { lat: -23.5, lon: -46.6 },
        }
    }

    fn names() -> Vec<String> { vec!["a".into(), "b".into()] }

    #[test]
    fn partitions_by_label() {
        let set = CandidateSet::new(names(), vec![
            candidate("1", Label::Customer, 10.0),
            candidate("2", Label::Unknown, 10.0),
            candidate("3", Label::Excluded, 10.0),
            candidate("4", Label::Unknown, 10.0),
        ]).unwrap();

        assert_eq!(set.scoring_indices(), vec![0, 1, 3]);
        assert_eq!(set.eligible_indices(), vec![1, 3]);
        assert_eq!(set.customer_count(), 1);
        assert_eq!(set.get(&"4".into()).unwrap().label, Label::Unknown);
    }

    #[test]
    fn feature_matrix_keeps_missing_values() {
        let set = CandidateSet::new(names(), vec![candidate("1", Label::Customer, 1.0)]).unwrap();
        let x = set.feature_matrix(&[0]);
        assert_eq!(x.dim(), (1, 2));
        assert_eq!(x[[0, 0]], 1.0);
        assert!(x[[0, 1]].is_nan());
    }

    #[test]
    fn rejects_empty_duplicates_and_bad_values() {
        assert!(matches!(CandidateSet::new(names(), vec![]), Err(Error::Input(_))));
        assert!(matches!(
            CandidateSet::new(names(), vec![candidate("1", Label::Unknown, 1.0), candidate("1", Label::Unknown, 1.0)]),
            Err(Error::Input(_))
        ));
        assert!(matches!(
            CandidateSet::new(names(), vec![candidate("1", Label::Unknown, -1.0)]),
            Err(Error::Validation(_))
        ));

        let mut far = candidate("1", Label::Unknown, 1.0);
        far.location.lat = 91.0;
        assert!(matches!(CandidateSet::new(names(), vec![far]), Err(Error::Validation(_))));

        let mut nowhere = candidate("1", Label::Unknown, 1.0);
        nowhere.location.lon = f64::NAN;
        assert!(matches!(CandidateSet::new(names(), vec![nowhere]), Err(Error::Validation(_))));

        let mut ragged = candidate("1", Label::Unknown, 1.0);
        ragged.features.pop();
        assert!(matches!(CandidateSet::new(names(), vec![ragged]), Err(Error::Input(_))));
    }

    #[test]
    fn excluded_rows_need_no_placement() {
        let mut excluded = candidate("x", Label::Excluded, f64::NAN);
        excluded.location = Location { lat: f64::NAN, lon: f64::NAN };
        let mut set = CandidateSet::new(names(), vec![candidate("1", Label::Unknown, 1.0), excluded]).unwrap();
        assert_eq!(set.eligible_indices(), vec![0]);

        // Lifting the exclusion requires a usable row.
        let err = set.apply_labels(&LabelSet::from_lists(["1"], Vec::<&str>::new())).unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "{err:?}");
        assert_eq!(set.candidate(0).label, Label::Unknown);

        set.apply_labels(&LabelSet::from_lists(["1"], ["x"])).unwrap();
        assert_eq!(set.candidate(0).label, Label::Customer);
        assert_eq!(set.candidate(1).label, Label::Excluded);
    }
}
