use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{AnalyticsEntry, CategoryStatistics, OutcomeCategory};
use crate::series;

fn format_rate(stats: &CategoryStatistics) -> String {
    match stats.approval_rate() {
        Some(rate) => format!("{:.1}%", rate * 100.0),
        None => "n/a".to_string(),
    }
}

pub fn build_report(subject: &str, generated_on: NaiveDate, entries: &[AnalyticsEntry]) -> String {
    let summary = series::summarize(subject, entries);

    let mut output = String::new();
    let _ = writeln!(output, "# Class Outcome Report: {}", summary.subject);
    let _ = writeln!(output, "Generated on {generated_on}");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Outcomes by Period");

    if entries.is_empty() {
        let _ = writeln!(output, "No class offerings found for this subject.");
        return output;
    }

    let mut header = String::from("| period |");
    let mut divider = String::from("| --- |");
    for category in OutcomeCategory::ALL {
        let _ = write!(header, " {} |", category.key());
        divider.push_str(" ---: |");
    }
    header.push_str(" total | approval |");
    divider.push_str(" ---: | ---: |");
    let _ = writeln!(output, "{header}");
    let _ = writeln!(output, "{divider}");

    for entry in entries {
        let stats = &entry.statistics;
        let mut row = format!("| {} |", entry.period_label);
        for category in OutcomeCategory::ALL {
            let _ = write!(row, " {} |", stats.count(category));
        }
        let _ = write!(row, " {} | {} |", stats.total_students, format_rate(stats));
        let _ = writeln!(output, "{row}");
    }

    let totals = &summary.totals;
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(
        output,
        "- {} periods from {} to {}",
        summary.periods,
        summary.first_period.as_deref().unwrap_or("-"),
        summary.last_period.as_deref().unwrap_or("-")
    );
    let _ = writeln!(
        output,
        "- {} students: {} approved, {} failed ({} approval)",
        totals.total_students,
        totals.approved(),
        totals.failed(),
        format_rate(totals)
    );

    let unclassified = totals.total_students.saturating_sub(totals.classified());
    if unclassified > 0 {
        let _ = writeln!(output, "- {unclassified} enrollments without a classification");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassOffering, Enrollment};
    use crate::series::build_series;

    fn report_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()
    }

    #[test]
    fn renders_period_table_in_series_order() {
        let offerings = vec![
            ClassOffering::new("Math", 2023, 2).with_enrollments(vec![
                Enrollment::with_pre_final(8.0),
                Enrollment::with_final(5.0, 6.0),
                Enrollment::absent(),
                Enrollment::with_pre_final(1.0),
            ]),
            ClassOffering::new("Math", 2023, 1),
        ];
        let report = build_report("math", report_date(), &build_series("math", &offerings));

        assert!(report.starts_with("# Class Outcome Report: Math\nGenerated on 2026-02-02\n"));
        assert!(report.contains("| period | approved-by-average | approved-by-grade |"));
        let first = report.find("| 2023.1 | 0 | 0 | 0 | 0 | 0 | 0 | n/a |").unwrap();
        let second = report.find("| 2023.2 | 1 | 1 | 0 | 1 | 1 | 4 | 50.0% |").unwrap();
        assert!(first < second);
        assert!(report.contains("- 2 periods from 2023.1 to 2023.2"));
        assert!(report.contains("- 4 students: 2 approved, 2 failed (50.0% approval)"));
        assert!(!report.contains("without a classification"));
    }

    #[test]
    fn empty_series_has_placeholder() {
        let report = build_report("biology", report_date(), &[]);
        assert!(report.contains("# Class Outcome Report: biology"));
        assert!(report.contains("No class offerings found for this subject."));
        assert!(!report.contains("## Summary"));
    }
}
