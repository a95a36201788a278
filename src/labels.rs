//! Customer labels: the deduplicated `id -> label` map a run scores against.
//!
//! Customer lists usually arrive as several identifier columns per customer
//! (one per site), with blanks and repeats, and identifiers exported from
//! spreadsheets as floats ("12345678.0"). This module flattens all of that into
//! a single map; candidates absent from both lists are unknown.

use std::{collections::HashMap, path::Path};

use crate::types::{CandidateId, Label};

/// Resolved labels for every id named by the customer or exclusion lists.
#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    labels: HashMap<CandidateId, Label>,
}

impl LabelSet {
    /// Resolve labels from raw customer and exclusion identifiers.
    /// A customer listed as excluded stays a customer.
    pub fn from_lists<C, E, S, T>(customers: C, excluded: E) -> Self
    where
        C: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut labels = HashMap::new();

        for id in excluded.into_iter().filter_map(|id| normalize_id(id.as_ref())) {
            labels.insert(id, Label::Excluded);
        }
        for id in customers.into_iter().filter_map(|id| normalize_id(id.as_ref())) {
            labels.insert(id, Label::Customer);
        }

        Self { labels }
    }

    /// Label of `id`, `Label::Unknown` when it appears in neither list.
    #[inline]
    pub fn label_of(&self, id: &CandidateId) -> Label {
        self.labels.get(id).copied().unwrap_or_default()
    }

    #[inline] pub fn len(&self) -> usize { self.labels.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.labels.is_empty() }

    /// Number of ids resolved to `label`.
    pub fn count(&self, label: Label) -> usize {
        self.labels.values().filter(|&&l| l == label).count()
    }

    /// Load labels from a customer table and an optional exclusion table.
    ///
    /// `id_columns` names the identifier columns of the customer table; every
    /// column is used when it is empty. The exclusion table contributes all its columns.
    pub fn read_from_csv(customers: &Path, id_columns: &[String], excluded: Option<&Path>) -> anyhow::Result<Self> {
        let customer_ids = crate::io::csv::read_id_columns(&crate::io::csv::read_csv(customers)?, id_columns)?;
        let excluded_ids = match excluded {
            Some(path) => crate::io::csv::read_id_columns(&crate::io::csv::read_csv(path)?, &[])?,
            None => Vec::new(),
        };

        let labels = Self::from_lists(customer_ids, excluded_ids);
        tracing::info!(
            customers = labels.count(Label::Customer), excluded = labels.count(Label::Excluded),
            "[labels] resolved label lists"
        );
        Ok(labels)
    }
}

/// Trim an identifier, drop blanks, and strip a float-export ".0" suffix.
pub(crate) fn normalize_id(raw: &str) -> Option<CandidateId> {
    let trimmed = raw.trim();
    let trimmed = match trimmed.strip_suffix(".0") {
        Some(head) if !head.is_empty() && head.bytes().all(|b| b.is_ascii_digit()) => head,
        _ => trimmed,
    };
    (!trimmed.is_empty()).then(|| CandidateId::new(trimmed))
}
