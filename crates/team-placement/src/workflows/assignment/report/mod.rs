mod log;
mod summary;
pub mod views;

pub use log::render_log;
pub use summary::{AssignmentReport, AssignmentSummary};
