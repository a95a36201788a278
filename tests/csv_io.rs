// Integration tests for CSV loading and export:
//   candidate/agent tables, label lists, assignment/summary/score outputs

use std::fs;

use fairshare::{AgentSet, AffinityScorer, CancelToken, CandidateColumns, CandidateSet, Label, LabelSet, Planner, RunConfig};

const CANDIDATES: &str = "\
id,label,potential_value,lat,lon,students,grade
0101,0,120,-23.55,-46.63,300,6.5
0102,0,80,-23.56,-46.64,,7.1
0103,0,50,-23.57,-46.65,410,5.9
0104,0,95,-23.58,-46.66,120,5.0
0105,0,40,-23.59,-46.67,200,
";

const AGENTS: &str = "id,lat,lon\nana,-23.55,-46.63\nbia,-23.59,-46.67\n";

#[test]
fn label_tables_override_candidate_labels() {
    let dir = tempfile::tempdir().unwrap();
    let customers = dir.path().join("customers.csv");
    let excluded = dir.path().join("excluded.csv");
    fs::write(&customers, "site_a,site_b\n0101,0102.0\n0101,\n").unwrap();
    fs::write(&excluded, "id\n0103\n0101\n").unwrap();

    let labels = LabelSet::read_from_csv(&customers, &[], Some(&excluded)).unwrap();
    let mut set = CandidateSet::load_csv(CANDIDATES, &CandidateColumns::default()).unwrap();
    set.apply_labels(&labels).unwrap();

    let label_of = |id: &str| set.get(&id.into()).unwrap().label;
    assert_eq!(label_of("0101"), Label::Customer);
    assert_eq!(label_of("0102"), Label::Customer);
    assert_eq!(label_of("0103"), Label::Excluded);
    assert_eq!(label_of("0104"), Label::Unknown);
}

#[test]
fn assignment_and_summary_tables_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let candidates_path = dir.path().join("candidates.csv");
    let agents_path = dir.path().join("agents.csv");
    fs::write(&candidates_path, CANDIDATES).unwrap();
    fs::write(&agents_path, AGENTS).unwrap();

    let candidates = CandidateSet::read_from_csv(&candidates_path, &CandidateColumns::default()).unwrap();
    let agents = AgentSet::read_from_csv(&agents_path).unwrap();
    assert_eq!(candidates.feature_names(), &["students".to_string(), "grade".to_string()]);

    let config = RunConfig { coverage_fraction: 0.5, optimality_gap: 0.0, ..Default::default() };
    let report = Planner::new(config).unwrap().run(&candidates, &agents, &CancelToken::new()).unwrap();

    let assignments = dir.path().join("assignments.csv");
    let summary = dir.path().join("summary.csv");
    report.write_to_csv(&assignments).unwrap();
    report.write_summary_to_csv(&summary).unwrap();

    let text = fs::read_to_string(&assignments).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("agent_id,candidate_id,potential_value,affinity,motivation,distance_km,lat,lon"));
    assert_eq!(lines.count(), report.rows().len());
    assert!(text.contains("0101"), "leading zeros must survive: {text}");
    assert_eq!(report.to_csv().unwrap(), text);

    let summary = fs::read_to_string(&summary).unwrap();
    assert!(summary.starts_with("agent_id,candidates,motivation,quota,distance_km"));
    assert_eq!(summary.lines().count(), 3);
}

#[test]
fn score_table_has_one_row_per_scored_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let mut set = CandidateSet::load_csv(CANDIDATES, &CandidateColumns::default()).unwrap();
    set.apply_labels(&LabelSet::from_lists(["0101", "0103"], ["0105"])).unwrap();

    let scores = AffinityScorer::default().score(&set).unwrap();
    let path = dir.path().join("scores.csv");
    scores.write_to_csv(&set, &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("candidate_id,label,affinity"));
    assert_eq!(text.lines().count(), 1 + 4);
    assert!(!text.contains("0105"));
}
