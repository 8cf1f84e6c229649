//! Paginated document summary: row selection and the single display format

use crate::projection::MonthlyRecord;
use crate::summary::{BreakEven, Runway, SummaryRecord};

/// Placeholder for values that are absent, undefined or not finite
pub const NOT_APPLICABLE: &str = "n/a";

/// Record indices shown in the document table.
///
/// The first 12 main months, every 6th main month after that, the final month,
/// and the break-even row from the summary.
pub fn document_rows(records: &[MonthlyRecord], break_even: &BreakEven) -> Vec<usize> {
    let last_index = records.len().checked_sub(1);
    let mut rows: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(i, r)| {
            (!r.is_beta && (r.month <= 12 || r.month % 6 == 0)) || Some(*i) == last_index
        })
        .map(|(i, _)| i)
        .collect();

    if let Some(index) = break_even.index() {
        rows.push(index);
    }
    rows.sort_unstable();
    rows.dedup();
    rows
}

/// "$1,234,567" / "-$1,234"; whole dollars
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return NOT_APPLICABLE.to_string();
    }
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}${}", sign, group_thousands(rounded.abs() as u64))
}

pub fn format_optional_currency(value: Option<f64>) -> String {
    value.map(format_currency).unwrap_or_else(|| NOT_APPLICABLE.to_string())
}

/// Fraction -> "12.5%"
pub fn format_percent(fraction: f64, decimals: usize) -> String {
    if !fraction.is_finite() {
        return NOT_APPLICABLE.to_string();
    }
    format!("{:.*}%", decimals, fraction * 100.0)
}

pub fn format_count(value: f64) -> String {
    if !value.is_finite() {
        return NOT_APPLICABLE.to_string();
    }
    group_thousands(value.max(0.0).round() as u64)
}

pub fn format_multiple(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.1}x", v),
        _ => NOT_APPLICABLE.to_string(),
    }
}

pub fn format_runway(runway: &Runway) -> String {
    match runway {
        Runway::Months(m) if m.is_finite() => format!("{:.1} months", m),
        Runway::Months(_) => NOT_APPLICABLE.to_string(),
        Runway::Sustainable => "profitable".to_string(),
    }
}

pub fn format_break_even(break_even: &BreakEven) -> String {
    match break_even {
        BreakEven::Reached { label, .. } => label.clone(),
        BreakEven::NotReached => "not reached".to_string(),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Key figures of a run as (label, formatted value) pairs
pub fn summary_lines(summary: &SummaryRecord) -> Vec<(&'static str, String)> {
    let unit = &summary.unit_economics;
    vec![
        ("Final users", format_count(summary.final_users)),
        ("Final paying users", format_count(summary.final_paying_users)),
        ("Final ARR", format_currency(summary.final_arr)),
        ("Break-even", format_break_even(&summary.break_even)),
        ("Total revenue", format_currency(summary.total_revenue)),
        ("Total costs", format_currency(summary.total_costs)),
        ("Total profit", format_currency(summary.total_profit)),
        ("Final cash", format_currency(summary.final_cash)),
        ("Burn rate", format_currency(summary.burn_rate)),
        ("Runway", format_runway(&summary.runway)),
        ("Exit valuation", format_currency(summary.exit_valuation)),
        ("Investor return", format_currency(summary.investor_return)),
        ("Return multiple", format_multiple(summary.return_multiple)),
        (
            "Investor IRR",
            summary
                .investor_irr
                .map(|r| format_percent(r, 1))
                .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
        ),
        ("CAC", format_optional_currency(unit.cac)),
        ("LTV", format_currency(unit.ltv)),
        ("LTV / CAC", format_multiple(unit.ltv_to_cac)),
        ("Monthly ARPU", format_optional_currency(summary.monthly_arpu)),
        (
            "Marketing ROI",
            summary
                .breakdown
                .marketing
                .roi
                .map(|roi| format_percent(roi, 1))
                .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Period;

    fn records(beta: u32, main: u32) -> Vec<MonthlyRecord> {
        (1..=beta)
            .map(Period::beta)
            .chain((1..=main).map(Period::main))
            .map(|p| MonthlyRecord::new(p, None))
            .collect()
    }

    #[test]
    fn test_document_rows_selection() {
        let recs = records(0, 40);
        let rows = document_rows(&recs, &BreakEven::NotReached);

        let months: Vec<u32> = rows.iter().map(|&i| recs[i].month).collect();
        assert_eq!(
            months,
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 18, 24, 30, 36, 40]
        );
    }

    #[test]
    fn test_document_rows_include_break_even() {
        let recs = records(2, 30);
        let break_even = BreakEven::Reached {
            index: 2 + 16,
            label: "M17".to_string(),
            month: 17,
            is_beta: false,
        };
        let rows = document_rows(&recs, &break_even);

        assert!(rows.contains(&18));
        // Beta rows are left out of the table
        assert!(!rows.contains(&0) && !rows.contains(&1));
        assert!(rows.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_currency_format() {
        assert_eq!(format_currency(1_234_567.4), "$1,234,567");
        assert_eq!(format_currency(-1234.6), "-$1,235");
        assert_eq!(format_currency(999.0), "$999");
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(f64::NAN), NOT_APPLICABLE);
        assert_eq!(format_optional_currency(None), NOT_APPLICABLE);
    }

    #[test]
    fn test_marketing_roi_shown_as_percent() {
        let params = crate::params::RawParameters::default().normalize().unwrap();
        let (_, mut summary) = crate::projection::ProjectionEngine::new(params).run();
        let roi_line = |summary: &SummaryRecord| {
            summary_lines(summary)
                .into_iter()
                .find(|(label, _)| *label == "Marketing ROI")
                .map(|(_, value)| value)
                .unwrap()
        };

        summary.breakdown.marketing.roi = Some(-0.7);
        assert_eq!(roi_line(&summary), "-70.0%");

        summary.breakdown.marketing.roi = None;
        assert_eq!(roi_line(&summary), NOT_APPLICABLE);
    }

    #[test]
    fn test_other_formats() {
        assert_eq!(format_percent(0.125, 1), "12.5%");
        assert_eq!(format_percent(f64::INFINITY, 1), NOT_APPLICABLE);
        assert_eq!(format_count(12_345.6), "12,346");
        assert_eq!(format_multiple(Some(3.04)), "3.0x");
        assert_eq!(format_runway(&Runway::Months(14.26)), "14.3 months");
        assert_eq!(format_runway(&Runway::Sustainable), "profitable");
        assert_eq!(format_break_even(&BreakEven::NotReached), "not reached");
    }
}
