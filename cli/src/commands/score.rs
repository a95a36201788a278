use anyhow::{Context, Result};
use fairshare::AffinityScorer;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ScoreArgs) -> Result<()> {
    let config = super::load_config(&args.input)?;
    let out_path = args.output.clone().unwrap_or("./scores.csv".into());

    let candidates = super::load_candidates(&args.input)?;
    let scores = AffinityScorer::new(config.seed).score(&candidates)
        .context("[score] Affinity scoring failed")?;
    scores.write_to_csv(&candidates, &out_path)?;

    if let Some(diagnostics) = scores.diagnostics() {
        let path = out_path.with_extension("json");
        let json = serde_json::to_string_pretty(diagnostics)?;
        std::fs::write(&path, json)
            .with_context(|| format!("[score] Failed to write diagnostics to {}", path.display()))?;
        println!("[score] selected {} ({} components, {} support vectors)",
            diagnostics.selected, diagnostics.components, diagnostics.support_vectors);
    }

    println!("[score] wrote {} scores to {}", scores.len(), out_path.display());
    Ok(())
}
