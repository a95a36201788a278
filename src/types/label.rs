use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Relationship of a candidate organization to the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Label {
    /// Not yet a customer: eligible for assignment.
    #[default]
    Unknown,
    /// Already a customer: defines the affinity profile, never assigned.
    Customer,
    /// Must be ignored entirely (no scoring, no distances, no assignment).
    Excluded,
}

impl Label {
    /// Parse the integer encoding used by candidate tables (-1, 0, 1).
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Label::Unknown),
            1 => Ok(Label::Customer),
            -1 => Ok(Label::Excluded),
            other => Err(Error::validation(format!("label must be one of -1, 0, 1 (got {other})"))),
        }
    }

    #[inline]
    pub fn code(&self) -> i64 {
        match self {
            Label::Unknown => 0,
            Label::Customer => 1,
            Label::Excluded => -1,
        }
    }

    /// Only unknown candidates can be handed to an agent.
    #[inline] pub fn is_assignable(&self) -> bool { matches!(self, Label::Unknown) }
}
