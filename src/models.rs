use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One student's grade fields inside a class offering. Every field is optional
/// on input and falls back to zero / `false`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Enrollment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub pre_final_average: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub post_final_average: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub failed_by_attendance: bool,
}

impl Enrollment {
    pub fn with_pre_final(pre_final_average: f64) -> Self {
        Self {
            pre_final_average,
            ..Self::default()
        }
    }

    pub fn with_final(pre_final_average: f64, post_final_average: f64) -> Self {
        Self {
            pre_final_average,
            post_final_average,
            ..Self::default()
        }
    }

    pub fn absent() -> Self {
        Self {
            failed_by_attendance: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassOffering {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub subject: String,
    pub year: i32,
    pub semester: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub enrollments: Vec<Enrollment>,
}

impl ClassOffering {
    pub fn new(subject: impl Into<String>, year: i32, semester: i32) -> Self {
        Self {
            code: None,
            subject: subject.into(),
            year,
            semester,
            enrollments: Vec::new(),
        }
    }

    pub fn with_enrollments(mut self, enrollments: Vec<Enrollment>) -> Self {
        self.enrollments = enrollments;
        self
    }

    pub fn period_label(&self) -> String {
        period_label(self.year, self.semester)
    }
}

pub fn period_label(year: i32, semester: i32) -> String {
    format!("{year}.{semester}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeCategory {
    ApprovedByAverage,
    ApprovedByGrade,
    FailedByGrade,
    FailedByAverage,
    FailedByAttendance,
}

impl OutcomeCategory {
    pub const ALL: [OutcomeCategory; 5] = [
        OutcomeCategory::ApprovedByAverage,
        OutcomeCategory::ApprovedByGrade,
        OutcomeCategory::FailedByGrade,
        OutcomeCategory::FailedByAverage,
        OutcomeCategory::FailedByAttendance,
    ];

    /// Display key shared with chart consumers. These strings must not change.
    pub fn key(self) -> &'static str {
        match self {
            OutcomeCategory::ApprovedByAverage => "approved-by-average",
            OutcomeCategory::ApprovedByGrade => "approved-by-grade",
            OutcomeCategory::FailedByGrade => "failed-by-grade",
            OutcomeCategory::FailedByAverage => "failed-by-average",
            OutcomeCategory::FailedByAttendance => "failed-by-attendance",
        }
    }

    pub fn is_approved(self) -> bool {
        matches!(
            self,
            OutcomeCategory::ApprovedByAverage | OutcomeCategory::ApprovedByGrade
        )
    }
}

impl fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStatistics {
    pub approved_by_average: usize,
    pub failed_by_average: usize,
    pub approved_by_grade: usize,
    pub failed_by_grade: usize,
    pub failed_by_attendance: usize,
    pub total_students: usize,
}

impl CategoryStatistics {
    pub fn count(&self, category: OutcomeCategory) -> usize {
        match category {
            OutcomeCategory::ApprovedByAverage => self.approved_by_average,
            OutcomeCategory::ApprovedByGrade => self.approved_by_grade,
            OutcomeCategory::FailedByGrade => self.failed_by_grade,
            OutcomeCategory::FailedByAverage => self.failed_by_average,
            OutcomeCategory::FailedByAttendance => self.failed_by_attendance,
        }
    }

    /// Bumps the counter for `category`. Does not touch `total_students`.
    pub fn record(&mut self, category: OutcomeCategory) {
        let slot = match category {
            OutcomeCategory::ApprovedByAverage => &mut self.approved_by_average,
            OutcomeCategory::ApprovedByGrade => &mut self.approved_by_grade,
            OutcomeCategory::FailedByGrade => &mut self.failed_by_grade,
            OutcomeCategory::FailedByAverage => &mut self.failed_by_average,
            OutcomeCategory::FailedByAttendance => &mut self.failed_by_attendance,
        };
        *slot += 1;
    }

    pub fn classified(&self) -> usize {
        OutcomeCategory::ALL.iter().map(|c| self.count(*c)).sum()
    }

    pub fn approved(&self) -> usize {
        OutcomeCategory::ALL
            .iter()
            .filter(|c| c.is_approved())
            .map(|c| self.count(*c))
            .sum()
    }

    pub fn failed(&self) -> usize {
        OutcomeCategory::ALL
            .iter()
            .filter(|c| !c.is_approved())
            .map(|c| self.count(*c))
            .sum()
    }

    pub fn approval_rate(&self) -> Option<f64> {
        if self.total_students == 0 {
            None
        } else {
            Some(self.approved() as f64 / self.total_students as f64)
        }
    }

    pub fn merge(&self, other: &CategoryStatistics) -> CategoryStatistics {
        CategoryStatistics {
            approved_by_average: self.approved_by_average + other.approved_by_average,
            failed_by_average: self.failed_by_average + other.failed_by_average,
            approved_by_grade: self.approved_by_grade + other.approved_by_grade,
            failed_by_grade: self.failed_by_grade + other.failed_by_grade,
            failed_by_attendance: self.failed_by_attendance + other.failed_by_attendance,
            total_students: self.total_students + other.total_students,
        }
    }
}

impl std::iter::Sum for CategoryStatistics {
    fn sum<I: Iterator<Item = CategoryStatistics>>(iter: I) -> Self {
        iter.fold(CategoryStatistics::default(), |acc, next| acc.merge(&next))
    }
}

impl<'a> std::iter::Sum<&'a CategoryStatistics> for CategoryStatistics {
    fn sum<I: Iterator<Item = &'a CategoryStatistics>>(iter: I) -> Self {
        iter.fold(CategoryStatistics::default(), |acc, next| acc.merge(next))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEntry {
    pub subject: String,
    pub period_label: String,
    pub year: i32,
    pub semester: i32,
    pub statistics: CategoryStatistics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRecord {
    pub period: String,
    #[serde(rename = "approved-by-average")]
    pub approved_by_average: usize,
    #[serde(rename = "approved-by-grade")]
    pub approved_by_grade: usize,
    #[serde(rename = "failed-by-grade")]
    pub failed_by_grade: usize,
    #[serde(rename = "failed-by-average")]
    pub failed_by_average: usize,
    #[serde(rename = "failed-by-attendance")]
    pub failed_by_attendance: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSummary {
    pub subject: String,
    pub periods: usize,
    pub first_period: Option<String>,
    pub last_period: Option<String>,
    pub totals: CategoryStatistics,
}
