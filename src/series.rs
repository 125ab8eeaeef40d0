use tracing::{debug, info};

use crate::aggregate::aggregate;
use crate::models::{AnalyticsEntry, CategoryStatistics, ClassOffering, SubjectSummary};

pub fn matches_subject(offering: &ClassOffering, subject: &str) -> bool {
    offering.subject.to_lowercase() == subject.to_lowercase()
}

/// Builds the chronological analytics series for one subject. The input slice
/// is left untouched; offerings sharing a period keep their input order.
pub fn build_series(subject: &str, offerings: &[ClassOffering]) -> Vec<AnalyticsEntry> {
    let mut selected: Vec<&ClassOffering> = offerings
        .iter()
        .filter(|offering| matches_subject(offering, subject))
        .collect();
    selected.sort_by_key(|offering| (offering.year, offering.semester));

    let series: Vec<AnalyticsEntry> = selected
        .into_iter()
        .map(|offering| {
            let statistics = aggregate(&offering.enrollments);
            debug!(
                subject = %offering.subject,
                period = %offering.period_label(),
                total = statistics.total_students,
                "aggregated class offering"
            );
            AnalyticsEntry {
                subject: offering.subject.clone(),
                period_label: offering.period_label(),
                year: offering.year,
                semester: offering.semester,
                statistics,
            }
        })
        .collect();

    info!(
        subject = %subject,
        offerings = offerings.len(),
        periods = series.len(),
        "built analytics series"
    );
    series
}

pub fn summarize(subject: &str, series: &[AnalyticsEntry]) -> SubjectSummary {
    SubjectSummary {
        subject: series
            .first()
            .map(|entry| entry.subject.clone())
            .unwrap_or_else(|| subject.to_string()),
        periods: series.len(),
        first_period: series.first().map(|entry| entry.period_label.clone()),
        last_period: series.last().map(|entry| entry.period_label.clone()),
        totals: series
            .iter()
            .map(|entry| &entry.statistics)
            .sum::<CategoryStatistics>(),
    }
}
