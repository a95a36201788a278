use std::fs;

use anyhow::{Context, Result};
use fairshare::{AgentSet, CancelToken, Error, OptimizationError, Planner};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::AssignArgs) -> Result<()> {
    let mut config = super::load_config(&args.input)?;
    if args.affinity { config.use_affinity_scoring = true }
    if let Some(coverage) = args.coverage { config.coverage_fraction = coverage }
    if let Some(gap) = args.gap { config.optimality_gap = gap }
    if let Some(timeout) = args.timeout { config.solver_timeout_seconds = timeout }
    if args.exact_distances { config.round_distances = false }

    let out_dir = args.output.clone().unwrap_or(".".into());
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("[assign] Failed to create output directory {}", out_dir.display()))?;

    let candidates = super::load_candidates(&args.input)?;
    let agents = AgentSet::read_from_csv(&args.agents)
        .with_context(|| format!("[assign] Failed to load agents from {}", args.agents.display()))?;

    let planner = Planner::new(config)?;
    let report = match planner.run(&candidates, &agents, &CancelToken::new()) {
        Ok(report) => report,
        Err(Error::Optimization(err @ OptimizationError::Infeasible { .. })) => {
            return Err(anyhow::Error::new(err).context("[assign] Lower --coverage and try again"));
        }
        Err(err) => return Err(anyhow::Error::new(err).context("[assign] Assignment run failed")),
    };

    let label = report.label().to_string();
    let assignments = out_dir.join(format!("{label}.csv"));
    let summary = out_dir.join(format!("{label}_agents.csv"));
    let diagnostics = out_dir.join(format!("{label}.json"));

    report.write_to_csv(&assignments)?;
    report.write_summary_to_csv(&summary)?;
    fs::write(&diagnostics, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("[assign] Failed to write diagnostics to {}", diagnostics.display()))?;

    let solve = report.solve_diagnostics();
    println!(
        "[assign] {} assigned, {} unassigned, {:.0} km total, gap {:.2}%{}",
        report.rows().len(), report.unassigned(), solve.total_cost, solve.achieved_gap * 100.0,
        if solve.is_within_gap { "" } else { " (above requested gap)" },
    );
    println!("[assign] wrote {}, {} and {}", assignments.display(), summary.display(), diagnostics.display());
    Ok(())
}
