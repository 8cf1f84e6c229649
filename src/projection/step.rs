//! Monthly step function: (state, period, parameters) -> (next state, record)
//!
//! Order within a month: user growth net of free churn, paid churn then
//! conversion, revenue, costs, and finally net income and cash.

use super::records::MonthlyRecord;
use super::state::{CohortState, PayingUsers, Period, TierCounts};
use crate::params::{BetaPhase, CostCategory, ParameterSet, PricingModel};
use chrono::{Months, NaiveDate};
use log::trace;

/// Advance one month. Never fails; degenerate inputs give degenerate but finite output.
pub fn step_month(
    params: &ParameterSet,
    state: &CohortState,
    period: Period,
) -> (CohortState, MonthlyRecord) {
    let mut record = MonthlyRecord::new(period, calendar_date(params, period));
    let mut next = state.clone();

    apply_growth(params, state, period, &mut next, &mut record);
    apply_conversion(params, state, period, &mut next, &mut record);
    calculate_revenue(params, period, &mut record);
    calculate_costs(params, period, &mut record);

    // Net income and cash
    record.net_income = record.total_revenue - record.total_costs;
    next.cash_balance = state.cash_balance + record.net_income;
    record.cash_balance = next.cash_balance;

    next.users_acquired += record.users_acquired;
    next.paying_acquired += record.new_paying_users;
    next.marketing_spend += record.marketing_cost;
    record.cac_to_date = next.cac_to_date();

    trace!(
        "{}: users={:.1} paying={:.1} revenue={:.2} costs={:.2} cash={:.2}",
        record.label,
        record.total_users,
        record.paying_users,
        record.total_revenue,
        record.total_costs,
        record.cash_balance
    );

    (next, record)
}

/// Calendar date of a month relative to the launch date (beta months precede it)
fn calendar_date(params: &ParameterSet, period: Period) -> Option<NaiveDate> {
    let launch = params.launch_date?;
    match (period.main_month(), params.beta) {
        (Some(month), _) => launch.checked_add_months(Months::new(month - 1)),
        (None, BetaPhase::Enabled { months }) => {
            let before_launch = months.saturating_sub(period.month) + 1;
            launch.checked_sub_months(Months::new(before_launch))
        }
        (None, BetaPhase::Disabled) => None,
    }
}

/// Grow the user base multiplicatively, net of free-tier churn
fn apply_growth(
    params: &ParameterSet,
    state: &CohortState,
    period: Period,
    next: &mut CohortState,
    row: &mut MonthlyRecord,
) {
    let year = period.calendar_year();
    let users = state.total_users.max(0.0);

    row.target_growth = params.growth.target_rate(period.main_month(), year);
    let effective_growth = row.target_growth * params.growth.saturation_factor(users);
    row.free_churn_rate = params.churn.free_rate(year);
    row.paid_churn_rate = params.churn.paid_rate(year);

    row.users_acquired = users * effective_growth;
    row.churned_users = users * row.free_churn_rate;

    let grown = (users * (1.0 + effective_growth - row.free_churn_rate)).max(0.0);
    row.realized_growth = if users > 0.0 { grown / users - 1.0 } else { 0.0 };
    row.total_users = grown;
    next.total_users = grown;
}

/// Paid-user movement for one segment of the user base
struct Conversion {
    paying: f64,
    new: f64,
    churned: f64,
}

impl Conversion {
    /// Shrink the paying count by `factor`, booking the difference as churn
    fn scaled(self, existing: f64, factor: f64) -> Self {
        let paying = self.paying * factor;
        Self {
            paying,
            new: self.new,
            churned: existing.max(0.0) + self.new - paying,
        }
    }
}

/// Churn existing payers first, then convert up to the target share of `users`
fn convert(existing: f64, users: f64, conversion: f64, paid_churn: f64) -> Conversion {
    let existing = existing.max(0.0);
    let retained = existing * (1.0 - paid_churn);
    let new = (users * conversion - retained).max(0.0);
    let paying = (retained + new).min(users).max(0.0);
    Conversion {
        paying,
        new,
        churned: existing + new - paying,
    }
}

fn apply_conversion(
    params: &ParameterSet,
    state: &CohortState,
    period: Period,
    next: &mut CohortState,
    row: &mut MonthlyRecord,
) {
    let users = row.total_users;
    let paid_churn = row.paid_churn_rate;

    match (&params.pricing, state.paying) {
        (PricingModel::Single { conversion, .. }, PayingUsers::Single(existing)) => {
            row.conversion_rate = conversion.rate_at(horizon_progress(params, period));
            let moved = convert(existing, users, row.conversion_rate, paid_churn);

            row.premium_users = moved.paying;
            row.new_paying_users = moved.new;
            row.churned_paying_users = moved.churned;
            next.paying = PayingUsers::Single(moved.paying);
        }
        (PricingModel::Tiered(tiers), PayingUsers::Tiered(existing)) => {
            let basic = convert(existing.basic, users, tiers.basic.conversion, paid_churn);
            let pro = convert(existing.pro, users, tiers.pro.conversion, paid_churn);
            let enterprise = match tiers.enterprise {
                Some(tier) => convert(existing.enterprise, users, tier.conversion, paid_churn),
                None => Conversion { paying: 0.0, new: 0.0, churned: 0.0 },
            };

            // Tiers share one user base; retained payers can outnumber a shrinking one
            let combined = basic.paying + pro.paying + enterprise.paying;
            let factor = if combined > users && combined > 0.0 { users / combined } else { 1.0 };
            let basic = basic.scaled(existing.basic, factor);
            let pro = pro.scaled(existing.pro, factor);
            let enterprise = enterprise.scaled(existing.enterprise, factor);

            let counts = TierCounts {
                basic: basic.paying,
                pro: pro.paying,
                enterprise: enterprise.paying,
            };
            row.tier_users = counts;
            row.conversion_rate = if users > 0.0 { counts.total() / users } else { 0.0 };
            row.new_paying_users = basic.new + pro.new + enterprise.new;
            row.churned_paying_users = basic.churned + pro.churned + enterprise.churned;
            next.paying = PayingUsers::Tiered(counts);
        }
        // CohortState::initial always matches the pricing mode
        (_, paying) => {
            next.paying = paying;
        }
    }

    row.paying_users = next.paying.total();
}

/// Position of a month along the main horizon in [0, 1]; beta months sit at 0
fn horizon_progress(params: &ParameterSet, period: Period) -> f64 {
    match period.main_month() {
        Some(month) if params.horizon_months > 1 => {
            (month - 1) as f64 / (params.horizon_months - 1) as f64
        }
        _ => 0.0,
    }
}

fn calculate_revenue(params: &ParameterSet, period: Period, row: &mut MonthlyRecord) {
    let billing = &params.billing;

    row.subscription_revenue = match &params.pricing {
        PricingModel::Single { price, .. } => row.premium_users * billing.effective_price(*price),
        PricingModel::Tiered(tiers) => {
            let enterprise_price = tiers.enterprise.map(|t| t.price).unwrap_or(0.0);
            row.tier_users.basic * billing.effective_price(tiers.basic.price)
                + row.tier_users.pro * billing.effective_price(tiers.pro.price)
                + row.tier_users.enterprise * billing.effective_price(enterprise_price)
        }
    };

    if let Some(month) = period.main_month() {
        row.b2b_revenue = row.subscription_revenue * params.b2b.uplift_for(month);
        if let Some(ads) = params.advertising.get(&month) {
            row.advertising = *ads;
            row.advertising_revenue = ads.total();
        }
    }

    row.total_revenue = row.subscription_revenue + row.advertising_revenue + row.b2b_revenue;
    row.arr = row.total_revenue * 12.0;
}

fn calculate_costs(params: &ParameterSet, period: Period, row: &mut MonthlyRecord) {
    let costs = &params.costs;
    let year = period.calendar_year();
    let month = period.main_month();

    row.team_cost = costs.fixed_cost(CostCategory::Team, month, year);
    row.tech_cost = costs.fixed_cost(CostCategory::Tech, month, year);
    row.marketing_cost = costs.fixed_cost(CostCategory::Marketing, month, year);

    row.infra_cost = costs.variable.infra_per_user * row.total_users;
    row.support_cost = costs.variable.support_per_user * row.total_users;
    row.transaction_fees = costs.variable.transaction_fee * row.total_revenue;
    row.variable_cost = row.infra_cost + row.support_cost + row.transaction_fees;

    row.total_costs = row.team_cost + row.tech_cost + row.marketing_cost + row.variable_cost;
}
