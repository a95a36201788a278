//! A complete assignment run and its report.

mod io;
mod planner;
mod report;

pub use planner::Planner;
pub use report::{AgentSummary, AssignmentRow, PlanReport};
