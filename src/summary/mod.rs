//! Summary aggregator: reduces monthly records to investor-facing metrics
//!
//! Every division is guarded. Degenerate inputs give `None`,
//! [`BreakEven::NotReached`] or [`Runway::Sustainable`], never an error.

mod breakdown;

pub use breakdown::{
    Breakdowns, ConversionTrend, CostTrend, MarketingEfficiency, UserGrowthTrend,
    VariableCostBreakdown,
};

use crate::params::{BreakEvenScope, ParameterSet};
use crate::projection::{investor_irr, MonthlyRecord};
use serde::{Deserialize, Serialize};

/// Longest customer lifetime used for LTV when paid churn approaches zero
pub const MAX_CUSTOMER_LIFETIME_MONTHS: f64 = 60.0;

/// First month with non-negative net income
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BreakEven {
    Reached {
        /// Position in the full record sequence (beta months included)
        index: usize,
        label: String,
        month: u32,
        is_beta: bool,
    },
    NotReached,
}

impl BreakEven {
    pub fn index(&self) -> Option<usize> {
        match self {
            BreakEven::Reached { index, .. } => Some(*index),
            BreakEven::NotReached => None,
        }
    }

    pub fn is_reached(&self) -> bool {
        matches!(self, BreakEven::Reached { .. })
    }
}

/// Months of cash left at the current burn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "months", rename_all = "snake_case")]
pub enum Runway {
    Months(f64),
    /// Not burning cash in the latest month
    Sustainable,
}

impl Runway {
    pub fn months(&self) -> Option<f64> {
        match self {
            Runway::Months(m) => Some(*m),
            Runway::Sustainable => None,
        }
    }
}

/// Canonical break-even rule shared by the summary and every export view
pub fn find_break_even(records: &[MonthlyRecord], scope: BreakEvenScope) -> BreakEven {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| scope == BreakEvenScope::IncludeBeta || !r.is_beta)
        .find(|(_, r)| r.net_income >= 0.0)
        .map(|(index, r)| BreakEven::Reached {
            index,
            label: r.label.clone(),
            month: r.month,
            is_beta: r.is_beta,
        })
        .unwrap_or(BreakEven::NotReached)
}

/// Customer acquisition cost and lifetime value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitEconomics {
    /// Marketing spend per newly acquired paying user
    pub cac: Option<f64>,
    /// Average monthly subscription revenue per paying user
    pub arppu: f64,
    /// Expected paying lifetime in months
    pub customer_lifetime_months: f64,
    pub ltv: f64,
    pub ltv_to_cac: Option<f64>,
}

impl UnitEconomics {
    fn from_records(params: &ParameterSet, records: &[MonthlyRecord]) -> Self {
        let marketing: f64 = records.iter().map(|r| r.marketing_cost).sum();
        let new_paying: f64 = records.iter().map(|r| r.new_paying_users).sum();
        let cac = if marketing > 0.0 && new_paying > 0.0 {
            Some(marketing / new_paying)
        } else {
            None
        };

        let subscription: f64 = records.iter().map(|r| r.subscription_revenue).sum();
        let paying_months: f64 = records.iter().map(|r| r.paying_users).sum();
        let arppu = if paying_months > 0.0 { subscription / paying_months } else { 0.0 };

        let paid_churn = params.churn.paid;
        let customer_lifetime_months = if paid_churn > 1.0 / MAX_CUSTOMER_LIFETIME_MONTHS {
            1.0 / paid_churn
        } else {
            MAX_CUSTOMER_LIFETIME_MONTHS
        };
        let ltv = arppu * customer_lifetime_months;

        Self {
            cac,
            arppu,
            customer_lifetime_months,
            ltv,
            ltv_to_cac: cac.filter(|c| *c > 0.0).map(|c| ltv / c),
        }
    }
}

/// Investor-facing summary of one projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub total_months: u32,
    pub final_users: f64,
    pub final_paying_users: f64,
    pub final_arr: f64,
    pub final_cash: f64,
    pub break_even: BreakEven,

    // Exit
    pub exit_valuation: f64,
    pub investor_return: f64,
    pub return_multiple: Option<f64>,
    pub investor_irr: Option<f64>,

    // Totals
    pub total_revenue: f64,
    pub total_costs: f64,
    pub total_profit: f64,

    pub unit_economics: UnitEconomics,
    /// Revenue per active user in the final month
    pub monthly_arpu: Option<f64>,
    pub burn_rate: f64,
    pub runway: Runway,

    pub breakdown: Breakdowns,
}

/// Reduce a record sequence (plus its parameters) to a [`SummaryRecord`]
pub fn summarize(params: &ParameterSet, records: &[MonthlyRecord]) -> SummaryRecord {
    let last = records.last();
    let final_users = last.map(|r| r.total_users).unwrap_or(params.starting_users);
    let final_arr = last.map(|r| r.arr).unwrap_or(0.0);
    let final_cash = last.map(|r| r.cash_balance).unwrap_or(params.funding.seed_investment);
    let last_net_income = last.map(|r| r.net_income).unwrap_or(0.0);

    let funding = &params.funding;
    let exit_valuation = final_arr * funding.valuation_multiple;
    let investor_return = exit_valuation * funding.equity_offered;
    let return_multiple = if funding.seed_investment > 0.0 {
        Some(investor_return / funding.seed_investment)
    } else {
        None
    };

    let total_revenue: f64 = records.iter().map(|r| r.total_revenue).sum();
    let total_costs: f64 = records.iter().map(|r| r.total_costs).sum();

    let burn_rate = (-last_net_income).max(0.0);
    let runway = if burn_rate > 0.0 {
        Runway::Months(final_cash.max(0.0) / burn_rate)
    } else {
        Runway::Sustainable
    };

    let monthly_arpu = last
        .filter(|r| r.total_users > 0.0)
        .map(|r| r.total_revenue / r.total_users);

    SummaryRecord {
        total_months: records.len() as u32,
        final_users,
        final_paying_users: last.map(|r| r.paying_users).unwrap_or(0.0),
        final_arr,
        final_cash,
        break_even: find_break_even(records, params.break_even_scope),
        exit_valuation,
        investor_return,
        return_multiple,
        investor_irr: investor_irr(funding.seed_investment, investor_return, records.len() as u32),
        total_revenue,
        total_costs,
        total_profit: total_revenue - total_costs,
        unit_economics: UnitEconomics::from_records(params, records),
        monthly_arpu,
        burn_rate,
        runway,
        breakdown: Breakdowns::from_records(params, records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RawParameters;
    use crate::projection::{Period, ProjectionEngine};
    use approx::assert_relative_eq;

    fn scenario_a() -> RawParameters {
        RawParameters {
            horizon_months: 36,
            starting_mau: 1000.0,
            app_price: 9.99,
            initial_conversion_pct: 2.0.into(),
            final_conversion_pct: 5.0.into(),
            growth_rates_pct: vec![16.0.into()],
            seed_investment: 250_000.0,
            team_costs: vec![4500.0],
            marketing_costs: vec![1200.0],
            ..Default::default()
        }
    }

    fn net_income_record(month: u32, is_beta: bool, net_income: f64) -> MonthlyRecord {
        let period = if is_beta { Period::beta(month) } else { Period::main(month) };
        let mut r = MonthlyRecord::new(period, None);
        r.net_income = net_income;
        r
    }

    #[test]
    fn test_scenario_a() {
        let params = scenario_a().normalize().unwrap();
        let (result, summary) = ProjectionEngine::new(params).run();

        assert!(result.records[0].net_income < 0.0);
        assert!(summary.final_arr > 0.0);
        match &summary.break_even {
            BreakEven::Reached { month, label, is_beta, index } => {
                assert_eq!(*month, 28);
                assert_eq!(label, "M28");
                assert!(!is_beta);
                assert_eq!(*index, 27);
            }
            BreakEven::NotReached => panic!("scenario A should break even"),
        }
        assert_relative_eq!(summary.exit_valuation, summary.final_arr * 5.0);
        assert_relative_eq!(summary.investor_return, summary.exit_valuation * 0.15, epsilon = 1e-6);
        assert!(summary.return_multiple.unwrap() > 0.0);
        assert!(summary.investor_irr.is_some());
        assert_relative_eq!(summary.total_profit, summary.total_revenue - summary.total_costs);
    }

    #[test]
    fn test_break_even_is_first_non_negative_month() {
        let records = vec![
            net_income_record(1, true, 10.0),
            net_income_record(1, false, -5.0),
            net_income_record(2, false, 0.0),
            net_income_record(3, false, 50.0),
        ];

        let main_only = find_break_even(&records, BreakEvenScope::MainOnly);
        assert_eq!(main_only.index(), Some(2));
        assert!(matches!(main_only, BreakEven::Reached { month: 2, is_beta: false, .. }));

        let with_beta = find_break_even(&records, BreakEvenScope::IncludeBeta);
        assert_eq!(with_beta.index(), Some(0));

        let losses = vec![net_income_record(1, false, -1.0), net_income_record(2, false, -0.5)];
        assert_eq!(find_break_even(&losses, BreakEvenScope::MainOnly), BreakEven::NotReached);
    }

    #[test]
    fn test_break_even_matches_record_scan() {
        let params = RawParameters::default().normalize().unwrap();
        let (result, summary) = ProjectionEngine::new(params).run();

        let expected = result.records.iter().position(|r| r.net_income >= 0.0);
        assert_eq!(summary.break_even.index(), expected);
    }

    #[test]
    fn test_zero_marketing_has_no_cac() {
        let raw = RawParameters { marketing_costs: vec![0.0], ..Default::default() };
        let params = raw.normalize().unwrap();
        let (_, summary) = ProjectionEngine::new(params).run();

        assert_eq!(summary.unit_economics.cac, None);
        assert_eq!(summary.unit_economics.ltv_to_cac, None);
        assert_eq!(summary.breakdown.marketing.roi, None);
        assert!(summary.unit_economics.ltv > 0.0);
    }

    #[test]
    fn test_ltv_lifetime_capped_without_paid_churn() {
        let raw = RawParameters { paid_churn_pct: 0.0.into(), ..Default::default() };
        let params = raw.normalize().unwrap();
        let (_, summary) = ProjectionEngine::new(params).run();
        assert_eq!(summary.unit_economics.customer_lifetime_months, MAX_CUSTOMER_LIFETIME_MONTHS);

        let churning = RawParameters { paid_churn_pct: 4.0.into(), ..Default::default() };
        let (_, summary) = ProjectionEngine::new(churning.normalize().unwrap()).run();
        assert_relative_eq!(summary.unit_economics.customer_lifetime_months, 25.0, epsilon = 1e-9);
        assert_relative_eq!(
            summary.unit_economics.ltv,
            summary.unit_economics.arppu * 25.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_runway_while_burning() {
        let raw = RawParameters { app_price: 0.0, horizon_months: 6, ..Default::default() };
        let params = raw.normalize().unwrap();
        let (result, summary) = ProjectionEngine::new(params).run();
        let last = result.final_record().unwrap();

        assert_relative_eq!(summary.burn_rate, -last.net_income);
        assert_relative_eq!(summary.runway.months().unwrap(), last.cash_balance / summary.burn_rate);
        assert_eq!(summary.break_even, BreakEven::NotReached);
    }

    #[test]
    fn test_runway_sustainable_when_profitable() {
        let raw = RawParameters {
            team_costs: vec![0.0],
            tech_costs: vec![0.0],
            marketing_costs: vec![0.0],
            ..Default::default()
        };
        let params = raw.normalize().unwrap();
        let (_, summary) = ProjectionEngine::new(params).run();

        assert_eq!(summary.runway, Runway::Sustainable);
        assert_eq!(summary.burn_rate, 0.0);
        assert_eq!(summary.break_even.index(), Some(0));
    }

    #[test]
    fn test_zero_seed_has_no_return_multiple() {
        let raw = RawParameters { seed_investment: 0.0, ..Default::default() };
        let (_, summary) = ProjectionEngine::new(raw.normalize().unwrap()).run();
        assert_eq!(summary.return_multiple, None);
        assert_eq!(summary.investor_irr, None);
    }

    #[test]
    fn test_arpu_guard_for_empty_user_base() {
        let raw = RawParameters {
            growth_rates_pct: vec![0.0.into()],
            free_churn_pct: 100.0.into(),
            ..Default::default()
        };
        let (_, summary) = ProjectionEngine::new(raw.normalize().unwrap()).run();
        assert_eq!(summary.final_users, 0.0);
        assert_eq!(summary.monthly_arpu, None);
    }
}
