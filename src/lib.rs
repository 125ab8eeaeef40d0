//! Classifies enrollments into outcome categories and rolls them up into a
//! per-period series for one subject, ready for tables and charts.
//!
//! The pipeline is `classify` -> `aggregate` -> `build_series` -> `project`.

pub mod aggregate;
pub mod chart;
pub mod classify;
pub mod load;
pub mod models;
pub mod report;
pub mod series;

pub use aggregate::aggregate;
pub use chart::project;
pub use classify::classify;
pub use models::{
    AnalyticsEntry, CategoryStatistics, ChartRecord, ClassOffering, Enrollment, OutcomeCategory,
    SubjectSummary,
};
pub use series::{build_series, summarize};
