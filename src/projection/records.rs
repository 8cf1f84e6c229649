//! Monthly output records of a projection run

use super::state::{Period, TierCounts};
use crate::params::{AdRevenue, ParameterSet};
use crate::summary::{summarize, SummaryRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One simulated month, immutable once the step function produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    // Timing
    pub label: String,
    pub month: u32,
    pub is_beta: bool,
    pub date: Option<NaiveDate>,

    // Users
    pub total_users: f64,
    /// Paying users in single-price mode (zero when tiered)
    pub premium_users: f64,
    /// Paying users per tier (all zero in single-price mode)
    pub tier_users: TierCounts,
    pub paying_users: f64,
    pub new_paying_users: f64,
    pub churned_paying_users: f64,
    pub users_acquired: f64,
    pub churned_users: f64,

    // Rates
    pub target_growth: f64,
    pub realized_growth: f64,
    pub conversion_rate: f64,
    pub free_churn_rate: f64,
    pub paid_churn_rate: f64,

    // Revenue
    pub subscription_revenue: f64,
    pub advertising: AdRevenue,
    pub advertising_revenue: f64,
    pub b2b_revenue: f64,
    pub total_revenue: f64,
    pub arr: f64,

    // Costs
    pub team_cost: f64,
    pub tech_cost: f64,
    pub marketing_cost: f64,
    pub infra_cost: f64,
    pub support_cost: f64,
    pub transaction_fees: f64,
    pub variable_cost: f64,
    pub total_costs: f64,

    // Result
    pub net_income: f64,
    pub cash_balance: f64,
    pub cac_to_date: Option<f64>,
}

impl MonthlyRecord {
    /// Create an empty record for a period
    pub fn new(period: Period, date: Option<NaiveDate>) -> Self {
        Self {
            label: period.label(),
            month: period.month,
            is_beta: period.is_beta(),
            date,
            total_users: 0.0,
            premium_users: 0.0,
            tier_users: TierCounts::default(),
            paying_users: 0.0,
            new_paying_users: 0.0,
            churned_paying_users: 0.0,
            users_acquired: 0.0,
            churned_users: 0.0,
            target_growth: 0.0,
            realized_growth: 0.0,
            conversion_rate: 0.0,
            free_churn_rate: 0.0,
            paid_churn_rate: 0.0,
            subscription_revenue: 0.0,
            advertising: AdRevenue::default(),
            advertising_revenue: 0.0,
            b2b_revenue: 0.0,
            total_revenue: 0.0,
            arr: 0.0,
            team_cost: 0.0,
            tech_cost: 0.0,
            marketing_cost: 0.0,
            infra_cost: 0.0,
            support_cost: 0.0,
            transaction_fees: 0.0,
            variable_cost: 0.0,
            total_costs: 0.0,
            net_income: 0.0,
            cash_balance: 0.0,
            cac_to_date: None,
        }
    }

    pub fn period(&self) -> Period {
        if self.is_beta {
            Period::beta(self.month)
        } else {
            Period::main(self.month)
        }
    }
}

/// Ordered output of a projection run: beta months first, then months 1..horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub records: Vec<MonthlyRecord>,
}

impl ProjectionResult {
    pub fn new() -> Self {
        Self { records: Vec::new() }
    }

    pub fn with_capacity(months: usize) -> Self {
        Self { records: Vec::with_capacity(months) }
    }

    /// Append the next month's record
    pub fn add_record(&mut self, record: MonthlyRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn main_records(&self) -> impl Iterator<Item = &MonthlyRecord> {
        self.records.iter().filter(|r| !r.is_beta)
    }

    pub fn beta_records(&self) -> impl Iterator<Item = &MonthlyRecord> {
        self.records.iter().filter(|r| r.is_beta)
    }

    pub fn final_record(&self) -> Option<&MonthlyRecord> {
        self.records.last()
    }

    /// Reduce the records to investor-facing summary metrics
    pub fn summary(&self, params: &ParameterSet) -> SummaryRecord {
        summarize(params, &self.records)
    }
}

impl Default for ProjectionResult {
    fn default() -> Self {
        Self::new()
    }
}
