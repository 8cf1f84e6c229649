//! Raw parameter input as collected by a form, file or HTTP request
//!
//! Percentages are accepted as numbers or numeric strings ("12.5", "12.5%").
//! `normalize` converts them to fractions and resolves optional features.

use super::{
    AdRevenue, B2bStream, BetaPhase, BillingMix, BreakEvenScope, ChurnModel, ConversionCurve,
    ConversionLaw, CostCategory, CostModel, CostOverrides, Funding, GrowthModel, ParameterSet,
    PricingModel, Tier, TierPricing, VariableCosts, YearlySchedule,
};
use crate::error::ValidationError;
use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Longest run (beta plus main months) a projection will simulate; longer requests are capped
pub const MAX_HORIZON_MONTHS: u32 = 600;

/// A rate as supplied by the caller, before numeric validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRate {
    Number(f64),
    Text(String),
}

impl RawRate {
    /// Parse to a finite number, failing on anything else
    fn value(&self, field: &str) -> Result<f64, ValidationError> {
        let parsed = match self {
            RawRate::Number(v) => Some(*v),
            RawRate::Text(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        };
        match parsed {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(ValidationError::NonNumeric {
                field: field.to_string(),
                value: self.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for RawRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawRate::Number(v) => write!(f, "{}", v),
            RawRate::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for RawRate {
    fn from(v: f64) -> Self {
        RawRate::Number(v)
    }
}

impl From<&str> for RawRate {
    fn from(s: &str) -> Self {
        RawRate::Text(s.to_string())
    }
}

/// Tiered pricing input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTiers {
    pub basic_price: f64,
    pub pro_price: f64,
    #[serde(default)]
    pub enterprise_price: f64,
    pub basic_conversion_pct: RawRate,
    pub pro_conversion_pct: RawRate,
    #[serde(default = "default_zero_rate")]
    pub enterprise_conversion_pct: RawRate,
    #[serde(default)]
    pub enterprise_enabled: bool,
}

/// B2B revenue stream input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawB2b {
    pub start_month: u32,
    pub uplift_pct: RawRate,
}

/// Unvalidated projection input; missing fields take the default scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawParameters {
    pub horizon_months: i64,
    pub beta_months: u32,
    pub starting_mau: f64,

    // Pricing
    pub app_price: f64,
    pub tiers: Option<RawTiers>,
    pub annual_discount_pct: RawRate,
    pub annual_uptake_pct: RawRate,

    // Growth and conversion
    /// Target monthly growth by year (index 0 = year 1)
    pub growth_rates_pct: Vec<RawRate>,
    pub growth_overrides_pct: BTreeMap<u32, RawRate>,
    pub market_size: Option<f64>,
    pub initial_conversion_pct: RawRate,
    pub final_conversion_pct: RawRate,
    pub conversion_law: ConversionLaw,

    // Churn
    pub free_churn_pct: RawRate,
    pub paid_churn_pct: RawRate,
    pub churn_improvement_pct: RawRate,

    // Monthly costs by year
    pub team_costs: Vec<f64>,
    pub tech_costs: Vec<f64>,
    pub marketing_costs: Vec<f64>,
    pub cost_overrides: BTreeMap<CostCategory, BTreeMap<u32, f64>>,
    pub infra_cost_per_user: f64,
    pub support_cost_per_user: f64,
    pub transaction_fee_pct: RawRate,

    // Additional revenue
    pub b2b: Option<RawB2b>,
    pub advertising: BTreeMap<u32, AdRevenue>,

    // Funding
    pub seed_investment: f64,
    pub equity_offered_pct: RawRate,
    pub valuation_multiple: f64,

    pub launch_date: Option<NaiveDate>,
    pub break_even_scope: BreakEvenScope,
    pub marketing_attribution_pct: RawRate,
}

fn default_zero_rate() -> RawRate { RawRate::Number(0.0) }
fn default_horizon_months() -> i64 { 36 }
fn default_starting_mau() -> f64 { 1000.0 }
fn default_app_price() -> f64 { 9.99 }
fn default_growth_rates() -> Vec<RawRate> { vec![16.0.into(), 8.0.into(), 4.0.into()] }
fn default_team_costs() -> Vec<f64> { vec![4500.0, 9000.0, 15000.0] }
fn default_tech_costs() -> Vec<f64> { vec![300.0, 600.0, 1000.0] }
fn default_marketing_costs() -> Vec<f64> { vec![1200.0, 2500.0, 4000.0] }
fn default_seed_investment() -> f64 { 250_000.0 }
fn default_valuation_multiple() -> f64 { 5.0 }

impl Default for RawParameters {
    fn default() -> Self {
        Self {
            horizon_months: default_horizon_months(),
            beta_months: 0,
            starting_mau: default_starting_mau(),
            app_price: default_app_price(),
            tiers: None,
            annual_discount_pct: 20.0.into(),
            annual_uptake_pct: 25.0.into(),
            growth_rates_pct: default_growth_rates(),
            growth_overrides_pct: BTreeMap::new(),
            market_size: None,
            initial_conversion_pct: 2.0.into(),
            final_conversion_pct: 5.0.into(),
            conversion_law: ConversionLaw::Linear,
            free_churn_pct: 5.0.into(),
            paid_churn_pct: 3.0.into(),
            churn_improvement_pct: 10.0.into(),
            team_costs: default_team_costs(),
            tech_costs: default_tech_costs(),
            marketing_costs: default_marketing_costs(),
            cost_overrides: BTreeMap::new(),
            infra_cost_per_user: 0.02,
            support_cost_per_user: 0.01,
            transaction_fee_pct: 3.0.into(),
            b2b: None,
            advertising: BTreeMap::new(),
            seed_investment: default_seed_investment(),
            equity_offered_pct: 15.0.into(),
            valuation_multiple: default_valuation_multiple(),
            launch_date: None,
            break_even_scope: BreakEvenScope::MainOnly,
            marketing_attribution_pct: 30.0.into(),
        }
    }
}

/// Percentage input -> fraction clamped to [0, 1]
fn percent(field: &str, raw: &RawRate) -> Result<f64, ValidationError> {
    let fraction = raw.value(field)? / 100.0;
    let clamped = fraction.clamp(0.0, 1.0);
    if clamped != fraction {
        warn!("{} = {}% is outside 0-100%, clamped to {}%", field, raw, clamped * 100.0);
    }
    Ok(clamped)
}

/// Absolute amount -> finite and non-negative
fn amount(field: &str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonNumeric {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    if value < 0.0 {
        warn!("{} = {} is negative, floored at 0", field, value);
        return Ok(0.0);
    }
    Ok(value)
}

fn amounts(field: &str, values: &[f64]) -> Result<Vec<f64>, ValidationError> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| amount(&format!("{}[{}]", field, i), v))
        .collect()
}

impl RawParameters {
    /// Validate and normalize into a [`ParameterSet`]
    pub fn normalize(&self) -> Result<ParameterSet, ValidationError> {
        if self.horizon_months <= 0 {
            return Err(ValidationError::NonPositiveHorizon(self.horizon_months));
        }
        let horizon_months = if self.horizon_months > MAX_HORIZON_MONTHS as i64 {
            warn!(
                "horizon of {} months capped at {}",
                self.horizon_months, MAX_HORIZON_MONTHS
            );
            MAX_HORIZON_MONTHS
        } else {
            self.horizon_months as u32
        };
        let years = horizon_months.div_ceil(12);

        let beta_limit = MAX_HORIZON_MONTHS - horizon_months;
        let beta_months = if self.beta_months > beta_limit {
            warn!(
                "beta phase of {} months capped at {} (beta + horizon <= {})",
                self.beta_months, beta_limit, MAX_HORIZON_MONTHS
            );
            beta_limit
        } else {
            self.beta_months
        };
        let beta = match beta_months {
            0 => BetaPhase::Disabled,
            months => BetaPhase::Enabled { months },
        };

        let pricing = match &self.tiers {
            Some(tiers) => {
                let mut pricing = TierPricing {
                    basic: Tier {
                        price: amount("tiers.basic_price", tiers.basic_price)?,
                        conversion: percent("tiers.basic_conversion_pct", &tiers.basic_conversion_pct)?,
                    },
                    pro: Tier {
                        price: amount("tiers.pro_price", tiers.pro_price)?,
                        conversion: percent("tiers.pro_conversion_pct", &tiers.pro_conversion_pct)?,
                    },
                    enterprise: if tiers.enterprise_enabled {
                        Some(Tier {
                            price: amount("tiers.enterprise_price", tiers.enterprise_price)?,
                            conversion: percent(
                                "tiers.enterprise_conversion_pct",
                                &tiers.enterprise_conversion_pct,
                            )?,
                        })
                    } else {
                        None
                    },
                };
                let total = pricing.conversion_total();
                if total > 1.0 {
                    warn!(
                        "tier conversions sum to {:.1}%, scaled down to 100%",
                        total * 100.0
                    );
                    pricing = pricing.scale_conversions(1.0 / total);
                }
                PricingModel::Tiered(pricing)
            }
            None => PricingModel::Single {
                price: amount("app_price", self.app_price)?,
                conversion: ConversionCurve {
                    initial: percent("initial_conversion_pct", &self.initial_conversion_pct)?,
                    terminal: percent("final_conversion_pct", &self.final_conversion_pct)?,
                    law: self.conversion_law,
                },
            },
        };

        let billing = BillingMix {
            annual_discount: percent("annual_discount_pct", &self.annual_discount_pct)?,
            annual_uptake: percent("annual_uptake_pct", &self.annual_uptake_pct)?,
        };

        let yearly_growth = self
            .growth_rates_pct
            .iter()
            .enumerate()
            .map(|(i, r)| percent(&format!("growth_rates_pct[{}]", i), r))
            .collect::<Result<Vec<_>, _>>()?;
        let growth_overrides = self
            .growth_overrides_pct
            .iter()
            .map(|(&month, r)| {
                percent(&format!("growth_overrides_pct[{}]", month), r).map(|v| (month, v))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        let market_size = match self.market_size {
            Some(size) => Some(amount("market_size", size)?).filter(|s| *s > 0.0),
            None => None,
        };
        let growth = GrowthModel {
            yearly: YearlySchedule::covering(&yearly_growth, years),
            market_size,
            overrides: growth_overrides,
        };

        let churn = ChurnModel {
            free: percent("free_churn_pct", &self.free_churn_pct)?,
            paid: percent("paid_churn_pct", &self.paid_churn_pct)?,
            annual_improvement: percent("churn_improvement_pct", &self.churn_improvement_pct)?,
        };

        let mut overrides = CostOverrides::new();
        for (&category, months) in &self.cost_overrides {
            for (&month, &value) in months {
                let field = format!("cost_overrides.{:?}[{}]", category, month);
                overrides.insert(category, month, amount(&field, value)?);
            }
        }
        if !overrides.is_empty() {
            debug!("{} monthly cost overrides", overrides.len());
        }
        let costs = CostModel {
            team: YearlySchedule::covering(&amounts("team_costs", &self.team_costs)?, years),
            tech: YearlySchedule::covering(&amounts("tech_costs", &self.tech_costs)?, years),
            marketing: YearlySchedule::covering(
                &amounts("marketing_costs", &self.marketing_costs)?,
                years,
            ),
            overrides,
            variable: VariableCosts {
                infra_per_user: amount("infra_cost_per_user", self.infra_cost_per_user)?,
                support_per_user: amount("support_cost_per_user", self.support_cost_per_user)?,
                transaction_fee: percent("transaction_fee_pct", &self.transaction_fee_pct)?,
            },
        };

        let b2b = match &self.b2b {
            Some(raw) => B2bStream::Enabled {
                start_month: raw.start_month.max(1),
                uplift: percent("b2b.uplift_pct", &raw.uplift_pct)?,
            },
            None => B2bStream::Disabled,
        };

        let mut advertising = BTreeMap::new();
        for (&month, ads) in &self.advertising {
            let field = format!("advertising[{}]", month);
            amount(&field, ads.total())?;
            advertising.insert(month, ads.floored());
        }

        let funding = Funding {
            seed_investment: amount("seed_investment", self.seed_investment)?,
            equity_offered: percent("equity_offered_pct", &self.equity_offered_pct)?,
            valuation_multiple: amount("valuation_multiple", self.valuation_multiple)?,
        };

        Ok(ParameterSet {
            horizon_months,
            beta,
            starting_users: amount("starting_mau", self.starting_mau)?,
            pricing,
            billing,
            growth,
            churn,
            costs,
            b2b,
            advertising,
            funding,
            launch_date: self.launch_date,
            break_even_scope: self.break_even_scope,
            marketing_attribution: percent(
                "marketing_attribution_pct",
                &self.marketing_attribution_pct,
            )?,
        })
    }
}
