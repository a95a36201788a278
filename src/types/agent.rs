use crate::error::{Error, Result, input_bail};
use super::{AgentId, Location};

/// A field agent (consultant) and the point they travel from.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    pub location: Location,
}

/// Immutable snapshot of the agents in a run, in input order.
#[derive(Debug, Clone)]
pub struct AgentSet {
    agents: Vec<Agent>,
}

impl AgentSet {
    /// Build a validated agent set (non-empty, unique ids, valid coordinates).
    pub fn new(agents: Vec<Agent>) -> Result<Self> {
        if agents.is_empty() { input_bail!("agent set is empty") }

        let mut seen = std::collections::HashSet::with_capacity(agents.len());
        for agent in &agents {
            agent.location.validate()
                .map_err(|e| Error::validation(format!("agent {}: {e}", agent.id)))?;
            if !seen.insert(&agent.id) { input_bail!("duplicate agent id {}", agent.id) }
        }

        Ok(Self { agents })
    }

    #[inline] pub fn len(&self) -> usize { self.agents.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.agents.is_empty() }

    #[inline] pub fn agents(&self) -> &[Agent] { &self.agents }

    #[inline] pub fn agent(&self, i: usize) -> &Agent { &self.agents[i] }
}
