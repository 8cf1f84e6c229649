//! Projection parameters: raw user input and the normalized, validated set
//!
//! Every optional behaviour (tiered pricing, beta phase, B2B revenue) is resolved
//! into a tagged variant once, during normalization, so the monthly recurrence
//! never re-checks raw input fields.

mod raw;
mod schedule;

pub use raw::{RawB2b, RawParameters, RawRate, RawTiers, MAX_HORIZON_MONTHS};
pub use schedule::{CostCategory, CostOverrides, YearlySchedule};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalized, immutable input to one projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Main horizon length in months (excludes beta months)
    pub horizon_months: u32,

    /// Optional pre-launch phase simulated before month 1
    pub beta: BetaPhase,

    /// Active users before the first simulated month
    pub starting_users: f64,

    pub pricing: PricingModel,
    pub billing: BillingMix,
    pub growth: GrowthModel,
    pub churn: ChurnModel,
    pub costs: CostModel,
    pub b2b: B2bStream,

    /// Externally supplied advertising revenue keyed by main month
    pub advertising: BTreeMap<u32, AdRevenue>,

    pub funding: Funding,

    /// Calendar date of month 1, used only for record labels
    pub launch_date: Option<NaiveDate>,

    /// Whether beta months may count as the break-even month
    pub break_even_scope: BreakEvenScope,

    /// Share of total revenue credited to marketing when computing marketing ROI
    pub marketing_attribution: f64,
}

impl ParameterSet {
    /// Number of calendar years touched by the main horizon
    pub fn horizon_years(&self) -> u32 {
        self.horizon_months.div_ceil(12)
    }

    /// Total number of records a run produces
    pub fn total_months(&self) -> u32 {
        self.beta.months().saturating_add(self.horizon_months)
    }

    pub fn is_tiered(&self) -> bool {
        matches!(self.pricing, PricingModel::Tiered(_))
    }

    pub fn has_enterprise_tier(&self) -> bool {
        match &self.pricing {
            PricingModel::Tiered(tiers) => tiers.enterprise.is_some(),
            PricingModel::Single { .. } => false,
        }
    }
}

/// Optional pre-launch phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BetaPhase {
    Disabled,
    Enabled { months: u32 },
}

impl BetaPhase {
    pub fn months(&self) -> u32 {
        match self {
            BetaPhase::Disabled => 0,
            BetaPhase::Enabled { months } => *months,
        }
    }
}

/// Single-price or tiered pricing; the two modes are mutually exclusive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PricingModel {
    Single { price: f64, conversion: ConversionCurve },
    Tiered(TierPricing),
}

/// How the conversion rate moves from its initial to its final value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionLaw {
    #[default]
    Linear,
    /// Constant month-over-month multiplicative change
    Geometric,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionCurve {
    pub initial: f64,
    pub terminal: f64,
    pub law: ConversionLaw,
}

impl ConversionCurve {
    /// Conversion rate at `progress` in [0, 1] along the horizon
    pub fn rate_at(&self, progress: f64) -> f64 {
        let t = progress.clamp(0.0, 1.0);
        let rate = match self.law {
            ConversionLaw::Linear => self.initial + (self.terminal - self.initial) * t,
            ConversionLaw::Geometric if self.initial > 0.0 && self.terminal > 0.0 => {
                self.initial * (self.terminal / self.initial).powf(t)
            }
            // Geometric interpolation is undefined through zero
            ConversionLaw::Geometric => self.initial + (self.terminal - self.initial) * t,
        };
        rate.clamp(0.0, 1.0)
    }
}

/// One price tier with its fixed share of the user base
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub price: f64,
    pub conversion: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierPricing {
    pub basic: Tier,
    pub pro: Tier,
    /// `None` when the enterprise tier is switched off
    pub enterprise: Option<Tier>,
}

impl TierPricing {
    /// Combined share of the user base converted across all enabled tiers
    pub fn conversion_total(&self) -> f64 {
        self.basic.conversion + self.pro.conversion + self.enterprise.map(|t| t.conversion).unwrap_or(0.0)
    }

    /// Multiply every tier's conversion rate by `factor`
    pub fn scale_conversions(self, factor: f64) -> Self {
        let scale = |tier: Tier| Tier { conversion: tier.conversion * factor, ..tier };
        Self {
            basic: scale(self.basic),
            pro: scale(self.pro),
            enterprise: self.enterprise.map(scale),
        }
    }
}

/// Monthly vs annual billing blend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BillingMix {
    /// Discount granted on annual plans, as a fraction
    pub annual_discount: f64,
    /// Fraction of paying users on annual plans
    pub annual_uptake: f64,
}

impl BillingMix {
    /// Average monthly revenue per paying user at a list price
    pub fn effective_price(&self, list_price: f64) -> f64 {
        let blend = (1.0 - self.annual_uptake) + self.annual_uptake * (1.0 - self.annual_discount);
        (list_price * blend).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthModel {
    /// Target monthly growth rate by calendar year
    pub yearly: YearlySchedule,
    /// Addressable market; growth slows logistically as users approach it
    pub market_size: Option<f64>,
    /// Per-month growth rate overrides for main months
    pub overrides: BTreeMap<u32, f64>,
}

impl GrowthModel {
    /// Target growth for a month: the override if present, else the yearly schedule
    pub fn target_rate(&self, main_month: Option<u32>, year: u32) -> f64 {
        main_month
            .and_then(|m| self.overrides.get(&m).copied())
            .unwrap_or_else(|| self.yearly.for_year(year))
            .max(0.0)
    }

    /// Scale target growth by the remaining headroom in the market
    pub fn saturation_factor(&self, users: f64) -> f64 {
        match self.market_size {
            Some(size) if size > 0.0 => (1.0 - users / size).max(0.0),
            _ => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChurnModel {
    /// Monthly churn of the whole (free) user base
    pub free: f64,
    /// Monthly churn of paying users
    pub paid: f64,
    /// Relative yearly reduction of both churn rates, compounded
    pub annual_improvement: f64,
}

impl ChurnModel {
    fn improved(&self, base: f64, year: u32) -> f64 {
        let years_elapsed = year.saturating_sub(1) as i32;
        (base * (1.0 - self.annual_improvement).powi(years_elapsed)).max(0.0)
    }

    pub fn free_rate(&self, year: u32) -> f64 {
        self.improved(self.free, year)
    }

    pub fn paid_rate(&self, year: u32) -> f64 {
        self.improved(self.paid, year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    pub team: YearlySchedule,
    pub tech: YearlySchedule,
    pub marketing: YearlySchedule,
    pub overrides: CostOverrides,
    pub variable: VariableCosts,
}

impl CostModel {
    /// Fixed monthly cost of a category; overrides only apply to main months
    pub fn fixed_cost(&self, category: CostCategory, main_month: Option<u32>, year: u32) -> f64 {
        if let Some(amount) = main_month.and_then(|m| self.overrides.get(category, m)) {
            return amount;
        }
        let schedule = match category {
            CostCategory::Team => &self.team,
            CostCategory::Tech => &self.tech,
            CostCategory::Marketing => &self.marketing,
        };
        schedule.for_year(year).max(0.0)
    }
}

/// Costs that scale with users and revenue
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableCosts {
    pub infra_per_user: f64,
    pub support_per_user: f64,
    /// Payment processing fee as a fraction of revenue
    pub transaction_fee: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum B2bStream {
    Disabled,
    Enabled { start_month: u32, uplift: f64 },
}

impl B2bStream {
    /// Uplift fraction applying to a main month (zero before the start month)
    pub fn uplift_for(&self, main_month: u32) -> f64 {
        match self {
            B2bStream::Enabled { start_month, uplift } if main_month >= *start_month => *uplift,
            _ => 0.0,
        }
    }
}

/// Advertising revenue for one month, supplied by an external ad model
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AdRevenue {
    #[serde(default)]
    pub banner: f64,
    #[serde(default)]
    pub interstitial: f64,
    #[serde(default)]
    pub rewarded: f64,
}

impl AdRevenue {
    pub fn total(&self) -> f64 {
        self.banner + self.interstitial + self.rewarded
    }

    pub(crate) fn floored(self) -> Self {
        Self {
            banner: self.banner.max(0.0),
            interstitial: self.interstitial.max(0.0),
            rewarded: self.rewarded.max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Funding {
    pub seed_investment: f64,
    /// Equity offered to the seed investor, as a fraction
    pub equity_offered: f64,
    /// Exit valuation as a multiple of final ARR
    pub valuation_multiple: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakEvenScope {
    #[default]
    MainOnly,
    IncludeBeta,
}
