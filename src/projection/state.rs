//! Cohort state threaded through the monthly recurrence

use crate::params::{ParameterSet, PricingModel};
use serde::{Deserialize, Serialize};

/// Which part of the timeline a month belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Beta,
    Main,
}

/// A simulated month: beta month n or main month n (both 1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub phase: Phase,
    pub month: u32,
}

impl Period {
    pub fn beta(month: u32) -> Self {
        Self { phase: Phase::Beta, month }
    }

    pub fn main(month: u32) -> Self {
        Self { phase: Phase::Main, month }
    }

    pub fn is_beta(&self) -> bool {
        self.phase == Phase::Beta
    }

    /// Month number on the main horizon, `None` during beta
    pub fn main_month(&self) -> Option<u32> {
        match self.phase {
            Phase::Main => Some(self.month),
            Phase::Beta => None,
        }
    }

    /// Calendar year used for schedule lookups; beta months are treated as year 1
    pub fn calendar_year(&self) -> u32 {
        match self.phase {
            Phase::Beta => 1,
            Phase::Main => (self.month.max(1) - 1) / 12 + 1,
        }
    }

    pub fn label(&self) -> String {
        match self.phase {
            Phase::Beta => format!("B{}", self.month),
            Phase::Main => format!("M{}", self.month),
        }
    }
}

/// Paying users per price tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TierCounts {
    pub basic: f64,
    pub pro: f64,
    pub enterprise: f64,
}

impl TierCounts {
    pub fn total(&self) -> f64 {
        self.basic + self.pro + self.enterprise
    }
}

/// Paying users, tracked as one premium count or per tier depending on pricing mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PayingUsers {
    Single(f64),
    Tiered(TierCounts),
}

impl PayingUsers {
    pub fn total(&self) -> f64 {
        match self {
            PayingUsers::Single(count) => *count,
            PayingUsers::Tiered(tiers) => tiers.total(),
        }
    }
}

/// State of the business between two simulated months
#[derive(Debug, Clone, PartialEq)]
pub struct CohortState {
    /// Active users (free and paying)
    pub total_users: f64,

    pub paying: PayingUsers,

    /// Cash on hand after the last simulated month
    pub cash_balance: f64,

    /// Running total of users gained through growth
    pub users_acquired: f64,

    /// Running total of newly converted paying users
    pub paying_acquired: f64,

    /// Running total of marketing spend
    pub marketing_spend: f64,
}

impl CohortState {
    /// State before the first simulated month: starting audience, no payers, seed cash
    pub fn initial(params: &ParameterSet) -> Self {
        let paying = match params.pricing {
            PricingModel::Single { .. } => PayingUsers::Single(0.0),
            PricingModel::Tiered(_) => PayingUsers::Tiered(TierCounts::default()),
        };
        Self {
            total_users: params.starting_users,
            paying,
            cash_balance: params.funding.seed_investment,
            users_acquired: 0.0,
            paying_acquired: 0.0,
            marketing_spend: 0.0,
        }
    }

    /// Marketing spend per acquired paying user so far
    pub fn cac_to_date(&self) -> Option<f64> {
        if self.marketing_spend > 0.0 && self.paying_acquired > 0.0 {
            Some(self.marketing_spend / self.paying_acquired)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RawParameters;

    #[test]
    fn test_period_years_and_labels() {
        assert_eq!(Period::main(1).calendar_year(), 1);
        assert_eq!(Period::main(12).calendar_year(), 1);
        assert_eq!(Period::main(13).calendar_year(), 2);
        assert_eq!(Period::main(36).calendar_year(), 3);
        assert_eq!(Period::beta(6).calendar_year(), 1);

        assert_eq!(Period::beta(2).label(), "B2");
        assert_eq!(Period::main(14).label(), "M14");
        assert_eq!(Period::beta(2).main_month(), None);
        assert_eq!(Period::main(14).main_month(), Some(14));
    }

    #[test]
    fn test_initial_state() {
        let params = RawParameters::default().normalize().unwrap();
        let state = CohortState::initial(&params);

        assert_eq!(state.total_users, 1000.0);
        assert_eq!(state.cash_balance, 250_000.0);
        assert_eq!(state.paying, PayingUsers::Single(0.0));
        assert_eq!(state.cac_to_date(), None);
    }
}
