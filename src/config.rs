use std::{fs::File, io::BufReader, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::affinity::DEFAULT_SEED;
use crate::error::validate;
use crate::solver::SolveOptions;

/// Longest accepted solver budget: one year.
pub const MAX_TIMEOUT_SECONDS: f64 = 365.0 * 24.0 * 3600.0;

/// Settings of a single assignment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Learn affinity from known customers; when off every eligible candidate scores 1.0.
    pub use_affinity_scoring: bool,
    /// Share of the average per-agent motivation every agent must reach, in (0, 1).
    pub coverage_fraction: f64,
    /// Relative optimality gap the solver may stop at, in [0, 1).
    pub optimality_gap: f64,
    pub solver_timeout_seconds: f64,
    /// Seed of the known-customer split used for hyperparameter selection.
    pub seed: u64,
    /// Round travel costs to whole kilometres.
    pub round_distances: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            use_affinity_scoring: false,
            coverage_fraction: 0.35,
            optimality_gap: 0.02,
            solver_timeout_seconds: 60.0,
            seed: DEFAULT_SEED,
            round_distances: true,
        }
    }
}

impl RunConfig {
    /// Load a config from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("[config] Failed to open config file: {}", path.display()))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("[config] Failed to parse config JSON from {:?}", path))?;
        config.validate()
            .with_context(|| format!("[config] Invalid config in {:?}", path))?;
        Ok(config)
    }

    /// Check every field lies in its allowed range.
    pub fn validate(&self) -> crate::Result<()> {
        validate!(self.coverage_fraction > 0.0 && self.coverage_fraction < 1.0,
            "coverage_fraction must lie in (0, 1) (got {})", self.coverage_fraction);
        validate!(self.optimality_gap >= 0.0 && self.optimality_gap < 1.0,
            "optimality_gap must lie in [0, 1) (got {})", self.optimality_gap);
        validate!(self.solver_timeout_seconds > 0.0 && self.solver_timeout_seconds.is_finite(),
            "solver_timeout_seconds must be positive (got {})", self.solver_timeout_seconds);
        validate!(self.solver_timeout_seconds <= MAX_TIMEOUT_SECONDS,
            "solver_timeout_seconds must not exceed {MAX_TIMEOUT_SECONDS} (got {})", self.solver_timeout_seconds);
        Ok(())
    }

    #[inline]
    pub fn solve_options(&self) -> SolveOptions {
        SolveOptions {
            relative_gap: self.optimality_gap,
            timeout: Duration::try_from_secs_f64(self.solver_timeout_seconds.min(MAX_TIMEOUT_SECONDS))
                .unwrap_or(Duration::from_secs_f64(MAX_TIMEOUT_SECONDS)),
        }
    }

    /// Label of a run, e.g. `0.35_with_affinity`.
    pub fn run_label(&self) -> String {
        let mode = if self.use_affinity_scoring { "with" } else { "without" };
        format!("{}_{mode}_affinity", self.coverage_fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use crate::Error;

    #[test]
    fn defaults_are_valid() {
        let config = RunConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.solve_options(), SolveOptions { relative_gap: 0.02, timeout: Duration::from_secs(60) });
        assert_eq!(config.run_label(), "0.35_without_affinity");
    }

    #[test]
    fn out_of_range_values_are_validation_errors() {
        for config in [
            RunConfig { coverage_fraction: 0.0, ..Default::default() },
            RunConfig { coverage_fraction: 1.0, ..Default::default() },
            RunConfig { optimality_gap: 1.0, ..Default::default() },
            RunConfig { optimality_gap: -0.1, ..Default::default() },
            RunConfig { solver_timeout_seconds: 0.0, ..Default::default() },
            RunConfig { solver_timeout_seconds: 1e20, ..Default::default() },
            RunConfig { solver_timeout_seconds: f64::NAN, ..Default::default() },
        ] {
            assert!(matches!(config.validate(), Err(Error::Validation(_))), "{config:?}");
        }
    }

    #[test]
    fn oversized_timeout_never_panics() {
        let config = RunConfig { solver_timeout_seconds: 1e20, ..Default::default() };
        assert_eq!(config.solve_options().timeout, Duration::from_secs_f64(MAX_TIMEOUT_SECONDS));
        assert!(crate::Planner::new(config).is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "use_affinity_scoring": true, "coverage_fraction": 0.5 }}"#).unwrap();

        let config = RunConfig::from_json_file(file.path()).unwrap();
        assert!(config.use_affinity_scoring);
        assert_eq!(config.coverage_fraction, 0.5);
        assert_eq!(config.seed, 2025);
        assert_eq!(config.run_label(), "0.5_with_affinity");
    }

    #[test]
    fn unknown_fields_and_bad_ranges_are_rejected() {
        let mut unknown = tempfile::NamedTempFile::new().unwrap();
        write!(unknown, r#"{{ "coverage": 0.5 }}"#).unwrap();
        assert!(RunConfig::from_json_file(unknown.path()).is_err());

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, r#"{{ "coverage_fraction": 1.5 }}"#).unwrap();
        let err = RunConfig::from_json_file(bad.path()).unwrap_err();
        assert!(format!("{err:#}").contains("coverage_fraction"));
    }
}
