//! Year-indexed schedules and sparse per-month overrides

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A value per calendar year of the projection (year 1 = months 1-12)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlySchedule {
    /// Values by year (1-indexed via `for_year`)
    values: Vec<f64>,
}

impl YearlySchedule {
    /// Build a schedule covering `years` years.
    /// Missing trailing years carry the last defined value forward; an empty input is all zeros.
    pub fn covering(values: &[f64], years: u32) -> Self {
        let years = years.max(1) as usize;
        let last = values.last().copied().unwrap_or(0.0);
        let mut filled: Vec<f64> = values.iter().copied().take(years).collect();
        filled.resize(years, last);
        Self { values: filled }
    }

    /// Value for a given calendar year, reusing the final year beyond the end
    pub fn for_year(&self, year: u32) -> f64 {
        if year == 0 {
            return self.values.first().copied().unwrap_or(0.0);
        }
        let idx = (year as usize).saturating_sub(1);
        self.values
            .get(idx)
            .or_else(|| self.values.last())
            .copied()
            .unwrap_or(0.0)
    }

    /// Number of years explicitly covered
    pub fn years(&self) -> u32 {
        self.values.len() as u32
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Fixed-cost categories that can be overridden month by month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostCategory {
    Team,
    Tech,
    Marketing,
}

/// Sparse (category, month) -> amount overrides of the yearly cost schedules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostOverrides {
    entries: BTreeMap<CostCategory, BTreeMap<u32, f64>>,
}

impl CostOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an override, flooring negative amounts at zero
    pub fn insert(&mut self, category: CostCategory, month: u32, amount: f64) {
        self.entries
            .entry(category)
            .or_default()
            .insert(month, amount.max(0.0));
    }

    /// Override for a main-horizon month, if one was supplied
    pub fn get(&self, category: CostCategory, month: u32) -> Option<f64> {
        self.entries.get(&category).and_then(|m| m.get(&month)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|m| m.is_empty())
    }

    /// Total number of (category, month) overrides
    pub fn len(&self) -> usize {
        self.entries.values().map(|m| m.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_carries_last_year_forward() {
        let schedule = YearlySchedule::covering(&[0.16, 0.10], 5);
        assert_eq!(schedule.years(), 5);
        assert_eq!(schedule.for_year(1), 0.16);
        assert_eq!(schedule.for_year(2), 0.10);
        assert_eq!(schedule.for_year(5), 0.10);
        // Beyond the covered range the final year is reused
        assert_eq!(schedule.for_year(40), 0.10);
    }

    #[test]
    fn test_empty_schedule_is_zero() {
        let schedule = YearlySchedule::covering(&[], 3);
        assert_eq!(schedule.values(), &[0.0, 0.0, 0.0]);
        assert_eq!(schedule.for_year(0), 0.0);
    }

    #[test]
    fn test_schedule_truncates_to_horizon() {
        let schedule = YearlySchedule::covering(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(schedule.values(), &[1.0, 2.0]);
    }

    #[test]
    fn test_cost_overrides_lookup() {
        let mut overrides = CostOverrides::new();
        assert!(overrides.is_empty());

        overrides.insert(CostCategory::Marketing, 3, 5000.0);
        overrides.insert(CostCategory::Team, 3, -10.0);

        assert_eq!(overrides.get(CostCategory::Marketing, 3), Some(5000.0));
        assert_eq!(overrides.get(CostCategory::Team, 3), Some(0.0));
        assert_eq!(overrides.get(CostCategory::Tech, 3), None);
        assert_eq!(overrides.get(CostCategory::Marketing, 4), None);
        assert_eq!(overrides.len(), 2);
    }
}
