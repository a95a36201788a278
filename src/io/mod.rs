//! File formats, organized by format rather than by domain type.
//!
//! Domain types expose the public entry points (`CandidateSet::read_from_csv`,
//! `PlanReport::write_to_csv`, ...) and delegate here.

pub(crate) mod csv;
