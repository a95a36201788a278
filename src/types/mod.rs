mod entity_id;
mod label;
mod location;
mod candidate;
mod agent;
mod io;

pub use entity_id::{AgentId, CandidateId};
pub use label::Label;
pub use location::Location;
pub use candidate::{Candidate, CandidateSet};
pub use agent::{Agent, AgentSet};
pub use io::CandidateColumns;
