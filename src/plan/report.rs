use serde::Serialize;

use crate::affinity::{AffinityDiagnostics, AffinityScores};
use crate::geom::DistanceMatrix;
use crate::motivation::Motivation;
use crate::solver::{AssignmentSolution, SolveDiagnostics};
use crate::types::{AgentId, AgentSet, CandidateId, CandidateSet};

/// One assigned candidate, joined back onto its metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentRow {
    pub agent_id: AgentId,
    pub candidate_id: CandidateId,
    pub potential_value: f64,
    pub affinity: f64,
    pub motivation: f64,
    pub distance_km: f64,
    pub lat: f64,
    pub lon: f64,
}

/// Workload of one agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSummary {
    pub agent_id: AgentId,
    pub candidates: usize,
    pub motivation: f64,
    pub quota: f64,
    pub distance_km: f64,
}

/// Everything a run produces, ready for export.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    label: String,
    rows: Vec<AssignmentRow>,
    agents: Vec<AgentSummary>,
    eligible: usize,
    solve: SolveDiagnostics,
    affinity: Option<AffinityDiagnostics>,
}

impl PlanReport {
    /// Join a solved assignment onto candidate and agent metadata.
    ///
    /// Rows are sorted by agent id, then candidate id. Every agent gets a
    /// summary line, in agent-set order, including agents left without candidates.
    pub fn assemble(
        label: String,
        candidates: &CandidateSet,
        agents: &AgentSet,
        affinity: &AffinityScores,
        motivation: &Motivation,
        distances: &DistanceMatrix,
        solution: &AssignmentSolution,
    ) -> Self {
        let quota = solution.diagnostics.quota;
        let mut summaries = agents.agents().iter()
            .map(|agent| AgentSummary {
                agent_id: agent.id.clone(),
                candidates: 0,
                motivation: 0.0,
                quota,
                distance_km: 0.0,
            })
            .collect::<Vec<_>>();

        let mut rows = Vec::with_capacity(solution.pairs.len());
        for &(row, agent) in &solution.pairs {
            let index = motivation.rows()[row];
            let candidate = candidates.candidate(index);
            let distance_km = distances.get(row, agent);
            let value = motivation.values()[row];

            let summary = &mut summaries[agent];
            summary.candidates += 1;
            summary.motivation += value;
            summary.distance_km += distance_km;

            rows.push(AssignmentRow {
                agent_id: agents.agent(agent).id.clone(),
                candidate_id: candidate.id.clone(),
                potential_value: candidate.potential_value,
                affinity: affinity.at(index).unwrap_or(f64::NAN),
                motivation: value,
                distance_km,
                lat: candidate.location.lat,
                lon: candidate.location.lon,
            });
        }
        rows.sort_by(|a, b| (&a.agent_id, &a.candidate_id).cmp(&(&b.agent_id, &b.candidate_id)));

        Self {
            label,
            rows,
            agents: summaries,
            eligible: motivation.len(),
            solve: solution.diagnostics.clone(),
            affinity: affinity.diagnostics().cloned(),
        }
    }

    /// Run label, e.g. `0.35_with_affinity`.
    #[inline] pub fn label(&self) -> &str { &self.label }

    #[inline] pub fn rows(&self) -> &[AssignmentRow] { &self.rows }

    #[inline] pub fn agents(&self) -> &[AgentSummary] { &self.agents }

    #[inline] pub fn solve_diagnostics(&self) -> &SolveDiagnostics { &self.solve }

    #[inline] pub fn affinity_diagnostics(&self) -> Option<&AffinityDiagnostics> { self.affinity.as_ref() }

    /// Eligible candidates left without an agent.
    #[inline] pub fn unassigned(&self) -> usize { self.eligible - self.rows.len() }

    /// Agent a candidate was assigned to, if any.
    pub fn agent_of(&self, candidate: &CandidateId) -> Option<&AgentId> {
        self.rows.iter().find(|r| &r.candidate_id == candidate).map(|r| &r.agent_id)
    }
}
