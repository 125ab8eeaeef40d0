use crate::models::{AnalyticsEntry, ChartRecord};

pub fn project(series: &[AnalyticsEntry]) -> Vec<ChartRecord> {
    series.iter().map(chart_record).collect()
}

fn chart_record(entry: &AnalyticsEntry) -> ChartRecord {
    let stats = &entry.statistics;
    ChartRecord {
        period: entry.period_label.clone(),
        approved_by_average: stats.approved_by_average,
        approved_by_grade: stats.approved_by_grade,
        failed_by_grade: stats.failed_by_grade,
        failed_by_average: stats.failed_by_average,
        failed_by_attendance: stats.failed_by_attendance,
    }
}
