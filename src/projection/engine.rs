//! Projection engine driving the monthly step across the full horizon

use super::records::ProjectionResult;
use super::state::{CohortState, Period};
use super::step::step_month;
use crate::params::ParameterSet;
use crate::summary::SummaryRecord;
use log::{debug, info};

/// Main projection engine
///
/// Holds only the immutable parameter set; every call to [`project`](Self::project)
/// starts from a fresh [`CohortState`], so repeated runs give identical output.
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    params: ParameterSet,
}

impl ProjectionEngine {
    /// Create a new projection engine for a normalized parameter set
    pub fn new(params: ParameterSet) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// All simulated periods in order: beta months, then months 1..horizon
    pub fn periods(&self) -> impl Iterator<Item = Period> {
        let beta = (1..=self.params.beta.months()).map(Period::beta);
        let main = (1..=self.params.horizon_months).map(Period::main);
        beta.chain(main)
    }

    /// Run the recurrence. Negative cash is recorded, never a reason to stop early.
    pub fn project(&self) -> ProjectionResult {
        let mut result = ProjectionResult::with_capacity(self.params.total_months() as usize);
        let mut state = CohortState::initial(&self.params);

        info!(
            "Projecting {} beta + {} main months from {:.0} users",
            self.params.beta.months(),
            self.params.horizon_months,
            self.params.starting_users
        );

        for period in self.periods() {
            let (next, record) = step_month(&self.params, &state, period);
            if period.main_month() == Some(1) && self.params.beta.months() > 0 {
                debug!(
                    "Beta phase closed with {:.0} users and cash {:.2}",
                    state.total_users, state.cash_balance
                );
            }
            state = next;
            result.add_record(record);
        }

        info!(
            "Projection complete: {} months, {:.0} users ({:.0} acquired), cash {:.2}, {:.0} payers acquired for {:.2} marketing",
            result.len(),
            state.total_users,
            state.users_acquired,
            state.cash_balance,
            state.paying_acquired,
            state.marketing_spend
        );

        result
    }

    /// Run the projection and reduce it to its summary
    pub fn run(&self) -> (ProjectionResult, SummaryRecord) {
        let result = self.project();
        let summary = result.summary(&self.params);
        (result, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{RawParameters, RawTiers};
    use approx::assert_relative_eq;

    fn engine_for(raw: RawParameters) -> ProjectionEngine {
        ProjectionEngine::new(raw.normalize().unwrap())
    }

    #[test]
    fn test_projection_runs() {
        let engine = engine_for(RawParameters::default());
        let result = engine.project();

        assert_eq!(result.len(), 36);
        assert_eq!(result.records[0].label, "M1");
        assert_eq!(result.final_record().unwrap().label, "M36");
        assert!(result.records.iter().all(|r| !r.is_beta));
    }

    #[test]
    fn test_projection_is_idempotent() {
        let engine = engine_for(RawParameters { beta_months: 3, ..Default::default() });
        assert_eq!(engine.project(), engine.project());
    }

    #[test]
    fn test_cash_accounting() {
        let params = RawParameters { beta_months: 2, ..Default::default() }.normalize().unwrap();
        let seed = params.funding.seed_investment;
        let result = ProjectionEngine::new(params).project();

        let mut previous = seed;
        for record in &result.records {
            assert_relative_eq!(record.cash_balance, previous + record.net_income, epsilon = 1e-6);
            previous = record.cash_balance;
        }
    }

    #[test]
    fn test_beta_months_precede_main() {
        let engine = engine_for(RawParameters { beta_months: 4, horizon_months: 12, ..Default::default() });
        let result = engine.project();

        assert_eq!(result.len(), 16);
        assert_eq!(result.beta_records().count(), 4);
        assert_eq!(result.main_records().count(), 12);
        assert!(result.records[..4].iter().all(|r| r.is_beta));
        assert_eq!(result.records[3].label, "B4");
        assert_eq!(result.records[4].label, "M1");

        // Beta growth carries into month 1
        let without_beta = engine_for(RawParameters { horizon_months: 12, ..Default::default() }).project();
        assert!(result.records[4].total_users > without_beta.records[0].total_users);
    }

    #[test]
    fn test_constant_users_without_growth_or_churn() {
        let engine = engine_for(RawParameters {
            growth_rates_pct: vec![0.0.into()],
            free_churn_pct: 0.0.into(),
            paid_churn_pct: 0.0.into(),
            ..Default::default()
        });
        for record in engine.project().records {
            assert_eq!(record.total_users, 1000.0);
            assert_eq!(record.realized_growth, 0.0);
        }
    }

    #[test]
    fn test_users_never_negative() {
        let engine = engine_for(RawParameters {
            growth_rates_pct: vec![0.0.into()],
            free_churn_pct: 100.0.into(),
            paid_churn_pct: 100.0.into(),
            ..Default::default()
        });
        let result = engine.project();
        assert!(result.records.iter().all(|r| r.total_users >= 0.0 && r.paying_users >= 0.0));
        assert!(result.records[1..].iter().all(|r| r.total_users == 0.0));
    }

    #[test]
    fn test_negative_cash_does_not_stop_projection() {
        let engine = engine_for(RawParameters {
            seed_investment: 0.0,
            app_price: 0.0,
            ..Default::default()
        });
        let result = engine.project();
        assert_eq!(result.len(), 36);
        assert!(result.final_record().unwrap().cash_balance < 0.0);
    }

    #[test]
    fn test_tiered_exclusivity() {
        let tiered = engine_for(RawParameters {
            tiers: Some(RawTiers {
                basic_price: 4.99,
                pro_price: 12.99,
                enterprise_price: 0.0,
                basic_conversion_pct: 3.0.into(),
                pro_conversion_pct: 1.0.into(),
                enterprise_conversion_pct: 0.0.into(),
                enterprise_enabled: false,
            }),
            ..Default::default()
        })
        .project();
        for r in &tiered.records {
            assert_eq!(r.premium_users, 0.0);
            assert_eq!(r.tier_users.enterprise, 0.0);
            assert_relative_eq!(r.tier_users.total(), r.paying_users);
        }

        let single = engine_for(RawParameters::default()).project();
        for r in &single.records {
            assert_eq!(r.tier_users.total(), 0.0);
            assert_relative_eq!(r.premium_users, r.paying_users);
        }
    }

    #[test]
    fn test_conversion_interpolates_across_horizon() {
        let result = engine_for(RawParameters::default()).project();
        assert_relative_eq!(result.records[0].conversion_rate, 0.02);
        assert_relative_eq!(result.records[35].conversion_rate, 0.05, epsilon = 1e-12);
        assert!(result.records.windows(2).all(|w| w[1].conversion_rate >= w[0].conversion_rate));
    }
}
