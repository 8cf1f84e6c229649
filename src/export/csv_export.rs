//! CSV export of monthly records
//!
//! One row per record. Tier columns appear only for tiered pricing and the
//! enterprise column only when that tier is enabled. The break-even marker
//! comes from [`find_break_even`], never from a local scan.

use crate::error::ExportError;
use crate::params::ParameterSet;
use crate::projection::MonthlyRecord;
use crate::summary::find_break_even;
use serde::Deserialize;
use std::io::{Read, Write};

/// Column set for a parameter set's pricing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvLayout {
    pub tiered: bool,
    pub enterprise: bool,
}

impl CsvLayout {
    pub fn for_params(params: &ParameterSet) -> Self {
        Self {
            tiered: params.is_tiered(),
            enterprise: params.has_enterprise_tier(),
        }
    }

    pub fn header(&self) -> Vec<&'static str> {
        let mut columns = vec!["Month", "Phase", "Date", "TotalUsers"];
        if self.tiered {
            columns.extend(["BasicUsers", "ProUsers"]);
            if self.enterprise {
                columns.push("EnterpriseUsers");
            }
        } else {
            columns.push("PremiumUsers");
        }
        columns.extend([
            "PayingUsers",
            "TargetGrowth",
            "RealizedGrowth",
            "ConversionRate",
            "SubscriptionRevenue",
            "AdRevenue",
            "B2BRevenue",
            "Revenue",
            "ARR",
            "TeamCost",
            "TechCost",
            "MarketingCost",
            "VariableCost",
            "TotalCosts",
            "NetIncome",
            "CashBalance",
            "BreakEven",
        ]);
        columns
    }

    fn row(&self, r: &MonthlyRecord, break_even: bool) -> Vec<String> {
        let money = |v: f64| format!("{:.2}", v);
        let rate = |v: f64| format!("{:.4}", v);
        let users = |v: f64| format!("{:.0}", v);

        let mut fields = vec![
            r.label.clone(),
            if r.is_beta { "Beta" } else { "Main" }.to_string(),
            r.date.map(|d| d.format("%Y-%m").to_string()).unwrap_or_default(),
            users(r.total_users),
        ];
        if self.tiered {
            fields.push(users(r.tier_users.basic));
            fields.push(users(r.tier_users.pro));
            if self.enterprise {
                fields.push(users(r.tier_users.enterprise));
            }
        } else {
            fields.push(users(r.premium_users));
        }
        fields.extend([
            users(r.paying_users),
            rate(r.target_growth),
            rate(r.realized_growth),
            rate(r.conversion_rate),
            money(r.subscription_revenue),
            money(r.advertising_revenue),
            money(r.b2b_revenue),
            money(r.total_revenue),
            money(r.arr),
            money(r.team_cost),
            money(r.tech_cost),
            money(r.marketing_cost),
            money(r.variable_cost),
            money(r.total_costs),
            money(r.net_income),
            money(r.cash_balance),
            if break_even { "yes" } else { "" }.to_string(),
        ]);
        fields
    }
}

/// Write all records as CSV to any writer
pub fn write_records<W: Write>(
    writer: W,
    params: &ParameterSet,
    records: &[MonthlyRecord],
) -> Result<(), ExportError> {
    let layout = CsvLayout::for_params(params);
    let break_even = find_break_even(records, params.break_even_scope).index();

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(layout.header())?;
    for (index, record) in records.iter().enumerate() {
        csv_writer.write_record(layout.row(record, break_even == Some(index)))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Render all records as a CSV string
pub fn records_to_csv(params: &ParameterSet, records: &[MonthlyRecord]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_records(&mut buffer, params, records)?;
    Ok(String::from_utf8(buffer)?)
}

/// Financial columns re-read from an exported CSV
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FinancialRow {
    #[serde(rename = "Month")]
    pub label: String,
    #[serde(rename = "Revenue")]
    pub revenue: f64,
    #[serde(rename = "TotalCosts")]
    pub total_costs: f64,
    #[serde(rename = "NetIncome")]
    pub net_income: f64,
    #[serde(rename = "CashBalance")]
    pub cash_balance: f64,
}

/// Parse the financial columns back out of an export
pub fn read_financials<R: Read>(reader: R) -> Result<Vec<FinancialRow>, ExportError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in csv_reader.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{RawParameters, RawTiers};
    use crate::projection::ProjectionEngine;

    fn tiered(enterprise_enabled: bool) -> RawParameters {
        RawParameters {
            tiers: Some(RawTiers {
                basic_price: 4.99,
                pro_price: 14.99,
                enterprise_price: 79.0,
                basic_conversion_pct: 3.0.into(),
                pro_conversion_pct: 1.0.into(),
                enterprise_conversion_pct: 0.2.into(),
                enterprise_enabled,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_columns_follow_pricing_mode() {
        let single = CsvLayout::for_params(&RawParameters::default().normalize().unwrap());
        let header = single.header();
        assert!(header.contains(&"PremiumUsers"));
        assert!(!header.contains(&"BasicUsers"));

        let without_enterprise = CsvLayout::for_params(&tiered(false).normalize().unwrap());
        let header = without_enterprise.header();
        assert!(header.contains(&"BasicUsers"));
        assert!(!header.contains(&"EnterpriseUsers"));
        assert!(!header.contains(&"PremiumUsers"));

        let with_enterprise = CsvLayout::for_params(&tiered(true).normalize().unwrap());
        assert!(with_enterprise.header().contains(&"EnterpriseUsers"));
    }

    #[test]
    fn test_csv_round_trip_financials() {
        let params = RawParameters { beta_months: 2, ..Default::default() }.normalize().unwrap();
        let result = ProjectionEngine::new(params.clone()).project();

        let csv_text = records_to_csv(&params, &result.records).unwrap();
        let rows = read_financials(csv_text.as_bytes()).unwrap();

        assert_eq!(rows.len(), result.len());
        for (row, record) in rows.iter().zip(&result.records) {
            assert_eq!(row.label, record.label);
            assert!((row.revenue - record.total_revenue).abs() <= 0.005 + 1e-9);
            assert!((row.total_costs - record.total_costs).abs() <= 0.005 + 1e-9);
            assert!((row.net_income - record.net_income).abs() <= 0.005 + 1e-9);
            assert!((row.cash_balance - record.cash_balance).abs() <= 0.005 + 1e-9);
        }
    }

    #[test]
    fn test_break_even_marker_matches_summary() {
        let params = RawParameters::default().normalize().unwrap();
        let (result, summary) = ProjectionEngine::new(params.clone()).run();
        let csv_text = records_to_csv(&params, &result.records).unwrap();

        let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
        let marker_col = reader
            .headers()
            .unwrap()
            .iter()
            .position(|h| h == "BreakEven")
            .unwrap();
        let marked: Vec<usize> = reader
            .records()
            .enumerate()
            .filter(|(_, r)| &r.as_ref().unwrap()[marker_col] == "yes")
            .map(|(i, _)| i)
            .collect();

        assert_eq!(marked, summary.break_even.index().into_iter().collect::<Vec<_>>());
    }
}
