//! Batch scenario comparison
//!
//! Each scenario is an independent run, so a batch projects them in parallel.
//! Within one run the recurrence stays strictly sequential.

use crate::error::ValidationError;
use crate::params::{ParameterSet, RawParameters};
use crate::projection::{ProjectionEngine, ProjectionResult};
use crate::summary::SummaryRecord;
use log::info;
use rayon::prelude::*;

/// Output of one named scenario
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub name: String,
    pub params: ParameterSet,
    pub result: ProjectionResult,
    pub summary: SummaryRecord,
}

/// Named, normalized parameter sets to compare side by side
///
/// # Example
/// ```ignore
/// let mut batch = ScenarioBatch::new();
/// batch.add_raw("base", &RawParameters::default())?;
/// batch.add_raw("lean", &RawParameters { team_costs: vec![2000.0], ..Default::default() })?;
/// for outcome in batch.run() {
///     println!("{}: {:?}", outcome.name, outcome.summary.break_even);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioBatch {
    scenarios: Vec<(String, ParameterSet)>,
}

impl ScenarioBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, params: ParameterSet) {
        self.scenarios.push((name.into(), params));
    }

    /// Validate raw input and add it; nothing is added on error
    pub fn add_raw(&mut self, name: impl Into<String>, raw: &RawParameters) -> Result<(), ValidationError> {
        let params = raw.normalize()?;
        self.add(name, params);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Project every scenario, in parallel, keeping the insertion order
    pub fn run(&self) -> Vec<ScenarioOutcome> {
        info!("Running {} scenarios", self.scenarios.len());
        self.scenarios
            .par_iter()
            .map(|(name, params)| {
                let (result, summary) = ProjectionEngine::new(params.clone()).run();
                ScenarioOutcome {
                    name: name.clone(),
                    params: params.clone(),
                    result,
                    summary,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_matches_individual_runs() {
        let mut batch = ScenarioBatch::new();
        for growth in [4.0, 8.0, 16.0] {
            let raw = RawParameters { growth_rates_pct: vec![growth.into()], ..Default::default() };
            batch.add_raw(format!("growth {}%", growth), &raw).unwrap();
        }
        assert_eq!(batch.len(), 3);

        let outcomes = batch.run();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].name, "growth 4%");

        for outcome in &outcomes {
            let single = ProjectionEngine::new(outcome.params.clone()).project();
            assert_eq!(single, outcome.result);
        }

        // Faster growth ends with more users
        assert!(outcomes[2].summary.final_users > outcomes[0].summary.final_users);
    }

    #[test]
    fn test_invalid_scenario_rejected() {
        let mut batch = ScenarioBatch::new();
        let raw = RawParameters { horizon_months: 0, ..Default::default() };
        assert!(batch.add_raw("broken", &raw).is_err());
        assert!(batch.is_empty());
    }
}
