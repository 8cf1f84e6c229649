//! Startup Projection - monthly financial projection engine for subscription apps
//!
//! This library provides:
//! - Parameter validation and normalization (percentages, schedules, optional streams)
//! - The monthly user/revenue/cost/cash recurrence, with an optional beta phase
//! - Summary metrics: break-even, valuation, investor return, CAC/LTV, runway
//! - CSV export, document row selection and display formatting
//! - A named-scenario store and parallel batch comparison

pub mod error;
pub mod export;
pub mod params;
pub mod projection;
pub mod scenario;
pub mod store;
pub mod summary;

// Re-export commonly used types
pub use error::{ExportError, StoreError, ValidationError};
pub use params::{ParameterSet, RawParameters};
pub use projection::{MonthlyRecord, ProjectionEngine, ProjectionResult};
pub use scenario::ScenarioBatch;
pub use store::ScenarioStore;
pub use summary::{find_break_even, summarize, BreakEven, Runway, SummaryRecord};

/// Validate raw input, project it and summarize, in one call
pub fn project(raw: &RawParameters) -> Result<(ProjectionResult, SummaryRecord), ValidationError> {
    let params = raw.normalize()?;
    Ok(ProjectionEngine::new(params).run())
}
