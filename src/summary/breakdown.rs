//! Breakdown sub-aggregates of a projection, each a fold over the records

use crate::params::ParameterSet;
use crate::projection::MonthlyRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdowns {
    pub variable_costs: VariableCostBreakdown,
    pub conversion: ConversionTrend,
    pub user_growth: UserGrowthTrend,
    pub team_costs: CostTrend,
    pub tech_costs: CostTrend,
    pub marketing: MarketingEfficiency,
}

impl Breakdowns {
    pub fn from_records(params: &ParameterSet, records: &[MonthlyRecord]) -> Self {
        Self {
            variable_costs: VariableCostBreakdown::from_records(records),
            conversion: ConversionTrend::from_records(records),
            user_growth: UserGrowthTrend::from_records(params.starting_users, records),
            team_costs: CostTrend::from_series(records.iter().map(|r| r.team_cost)),
            tech_costs: CostTrend::from_series(records.iter().map(|r| r.tech_cost)),
            marketing: MarketingEfficiency::from_records(params.marketing_attribution, records),
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator != 0.0 && denominator.is_finite() {
        Some(numerator / denominator)
    } else {
        None
    }
}

fn mean(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableCostBreakdown {
    pub infrastructure: f64,
    pub support: f64,
    pub transaction_fees: f64,
    pub total: f64,
    pub monthly_average: f64,
    /// Variable costs as a fraction of all costs
    pub share_of_total_costs: Option<f64>,
}

impl VariableCostBreakdown {
    fn from_records(records: &[MonthlyRecord]) -> Self {
        let infrastructure: f64 = records.iter().map(|r| r.infra_cost).sum();
        let support: f64 = records.iter().map(|r| r.support_cost).sum();
        let transaction_fees: f64 = records.iter().map(|r| r.transaction_fees).sum();
        let total = infrastructure + support + transaction_fees;
        let all_costs: f64 = records.iter().map(|r| r.total_costs).sum();

        Self {
            infrastructure,
            support,
            transaction_fees,
            total,
            monthly_average: mean(total, records.len()),
            share_of_total_costs: ratio(total, all_costs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionTrend {
    pub first: f64,
    pub last: f64,
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

impl ConversionTrend {
    fn from_records(records: &[MonthlyRecord]) -> Self {
        let rates = || records.iter().map(|r| r.conversion_rate);
        Self {
            first: rates().next().unwrap_or(0.0),
            last: rates().last().unwrap_or(0.0),
            min: rates().reduce(f64::min).unwrap_or(0.0),
            max: rates().reduce(f64::max).unwrap_or(0.0),
            average: mean(rates().sum(), records.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserGrowthTrend {
    pub starting_users: f64,
    pub final_users: f64,
    pub peak_users: f64,
    pub total_acquired: f64,
    pub total_churned: f64,
    pub average_realized_growth: f64,
    /// Final users as a multiple of the starting audience
    pub growth_multiple: Option<f64>,
}

impl UserGrowthTrend {
    fn from_records(starting_users: f64, records: &[MonthlyRecord]) -> Self {
        let final_users = records.last().map(|r| r.total_users).unwrap_or(starting_users);
        let peak_users = records
            .iter()
            .map(|r| r.total_users)
            .fold(starting_users, f64::max);

        Self {
            starting_users,
            final_users,
            peak_users,
            total_acquired: records.iter().map(|r| r.users_acquired).sum(),
            total_churned: records.iter().map(|r| r.churned_users).sum(),
            average_realized_growth: mean(
                records.iter().map(|r| r.realized_growth).sum(),
                records.len(),
            ),
            growth_multiple: ratio(final_users, starting_users),
        }
    }
}

/// Trend of a fixed monthly cost line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostTrend {
    pub first_month: f64,
    pub last_month: f64,
    pub total: f64,
    pub monthly_average: f64,
    /// Relative change from the first to the last month
    pub change: Option<f64>,
}

impl CostTrend {
    fn from_series(series: impl Iterator<Item = f64>) -> Self {
        let values: Vec<f64> = series.collect();
        let first_month = values.first().copied().unwrap_or(0.0);
        let last_month = values.last().copied().unwrap_or(0.0);
        let total: f64 = values.iter().sum();

        Self {
            first_month,
            last_month,
            total,
            monthly_average: mean(total, values.len()),
            change: ratio(last_month - first_month, first_month),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingEfficiency {
    pub total_spend: f64,
    pub attributable_revenue: f64,
    /// (attributable revenue - spend) / spend; `None` without marketing spend
    pub roi: Option<f64>,
    pub spend_share_of_revenue: Option<f64>,
}

impl MarketingEfficiency {
    fn from_records(attribution: f64, records: &[MonthlyRecord]) -> Self {
        let total_spend: f64 = records.iter().map(|r| r.marketing_cost).sum();
        let total_revenue: f64 = records.iter().map(|r| r.total_revenue).sum();
        let attributable_revenue = total_revenue * attribution;

        Self {
            total_spend,
            attributable_revenue,
            roi: ratio(attributable_revenue - total_spend, total_spend),
            spend_share_of_revenue: ratio(total_spend, total_revenue),
        }
    }
}
