// Integration tests for run-to-run determinism:
//   hyperparameter selection, final scores, and full assignment runs with a fixed seed

use fairshare::{Agent, AgentSet, AffinityScorer, CancelToken, Candidate, CandidateSet, Label, Location, Planner, RunConfig};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn candidates() -> CandidateSet {
    let mut rng = StdRng::seed_from_u64(11);
    let rows = (0..40)
        .map(|i| {
            let label = match i % 5 { 0 | 1 => Label::Customer, 2 => Label::Excluded, _ => Label::Unknown };
            let shift = if label == Label::Customer { 0.0 } else { 2.0 };
            Candidate {
                id: format!("{i:04}").into(),
                features: (0..4).map(|_| rng.random_range(0.0..1.0) + shift).collect(),
                label,
                potential_value: rng.random_range(10.0..100.0),
                location: Location { lat: -23.0 - rng.random_range(0.0..0.5), lon: -46.0 - rng.random_range(0.0..0.5) },
            }
        })
        .collect();
    CandidateSet::new((0..4).map(|i| format!("f{i}")).collect(), rows).unwrap()
}

#[test]
fn scores_are_bit_identical_across_runs() {
    let set = candidates();
    let first = AffinityScorer::new(2025).score(&set).unwrap();
    let second = AffinityScorer::new(2025).score(&set).unwrap();

    let bits = |s: &fairshare::AffinityScores| s.iter().map(|(i, v)| (i, v.to_bits())).collect::<Vec<_>>();
    assert_eq!(bits(&first), bits(&second));

    let (a, b) = (first.diagnostics().unwrap(), second.diagnostics().unwrap());
    assert_eq!(a.selected, b.selected);
    assert_eq!(
        a.grid.iter().map(|g| g.fitness.to_bits()).collect::<Vec<_>>(),
        b.grid.iter().map(|g| g.fitness.to_bits()).collect::<Vec<_>>(),
    );
}

#[test]
fn assignment_runs_are_identical() {
    let set = candidates();
    let agents = AgentSet::new(vec![
        Agent { id: "a".into(), location: Location { lat: -23.1, lon: -46.1 } },
        Agent { id: "b".into(), location: Location { lat: -23.4, lon: -46.4 } },
    ]).unwrap();
    let config = RunConfig { use_affinity_scoring: true, coverage_fraction: 0.4, optimality_gap: 0.0, ..Default::default() };

    let planner = Planner::new(config).unwrap();
    let first = planner.run(&set, &agents, &CancelToken::new()).unwrap();
    let second = planner.run(&set, &agents, &CancelToken::new()).unwrap();

    assert_eq!(first.rows(), second.rows());
    assert_eq!(first.agents(), second.agents());
    assert_eq!(first.label(), "0.4_with_affinity");
}
