//! Monthly projection engine: cohort state, step function and driver loop

mod engine;
mod irr;
mod records;
mod state;
mod step;

pub use engine::ProjectionEngine;
pub use irr::{annualized_irr, investor_irr};
pub use records::{MonthlyRecord, ProjectionResult};
pub use state::{CohortState, PayingUsers, Period, Phase, TierCounts};
pub use step::step_month;
