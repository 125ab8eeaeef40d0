use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::models::{ClassOffering, Enrollment};

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("could not read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid class offering JSON")]
    Json(#[from] serde_json::Error),
    #[error("invalid enrollment CSV")]
    Csv(#[from] csv::Error),
    #[error(
        "row {row} reuses class code `{code}` with a different subject or period \
         (expected {expected}, found {found})"
    )]
    InconsistentOffering {
        row: usize,
        code: String,
        expected: String,
        found: String,
    },
}

pub fn offerings_from_path(path: &Path) -> Result<Vec<ClassOffering>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let offerings = if is_csv {
        offerings_from_csv(file)?
    } else {
        offerings_from_json(file)?
    };

    info!(
        path = %path.display(),
        offerings = offerings.len(),
        "loaded class offerings"
    );
    Ok(offerings)
}

/// Reads a JSON array of class offerings. Grade fields may be omitted.
pub fn offerings_from_json<R: Read>(reader: R) -> Result<Vec<ClassOffering>, LoadError> {
    Ok(serde_json::from_reader(reader)?)
}

#[derive(Deserialize)]
struct CsvRow {
    code: Option<String>,
    subject: String,
    year: i32,
    semester: i32,
    student: Option<String>,
    pre_final_average: Option<f64>,
    post_final_average: Option<f64>,
    failed_by_attendance: Option<bool>,
}

impl CsvRow {
    fn declares_offering_only(&self) -> bool {
        self.student.is_none()
            && self.pre_final_average.is_none()
            && self.post_final_average.is_none()
            && self.failed_by_attendance.is_none()
    }

    fn has_missing_average(&self) -> bool {
        self.pre_final_average.is_none() && self.failed_by_attendance != Some(true)
    }
}

#[derive(Hash, PartialEq, Eq)]
enum GroupKey {
    Code(String),
    Period(String, i32, i32),
}

/// Reads one enrollment per row and groups rows into class offerings, keeping
/// the order in which offerings first appear.
pub fn offerings_from_csv<R: Read>(reader: R) -> Result<Vec<ClassOffering>, LoadError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Fields).from_reader(reader);
    let mut offerings: Vec<ClassOffering> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut defaulted = 0usize;

    for (position, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let row_number = position + 2;
        let code = row.code.clone().filter(|code| !code.is_empty());
        let key = match &code {
            Some(code) => GroupKey::Code(code.clone()),
            None => GroupKey::Period(row.subject.clone(), row.year, row.semester),
        };

        let slot = match index.get(&key) {
            Some(&slot) => {
                let existing = &offerings[slot];
                if existing.subject != row.subject
                    || existing.year != row.year
                    || existing.semester != row.semester
                {
                    return Err(LoadError::InconsistentOffering {
                        row: row_number,
                        code: code.unwrap_or_default(),
                        expected: format!("{} {}", existing.subject, existing.period_label()),
                        found: format!("{} {}.{}", row.subject, row.year, row.semester),
                    });
                }
                slot
            }
            None => {
                let mut offering = ClassOffering::new(row.subject.clone(), row.year, row.semester);
                offering.code = code;
                offerings.push(offering);
                index.insert(key, offerings.len() - 1);
                offerings.len() - 1
            }
        };

        if row.declares_offering_only() {
            debug!(row = row_number, "row declares an offering without enrollment");
            continue;
        }

        if row.has_missing_average() {
            defaulted += 1;
        }

        offerings[slot].enrollments.push(Enrollment {
            pre_final_average: row.pre_final_average.unwrap_or_default(),
            post_final_average: row.post_final_average.unwrap_or_default(),
            failed_by_attendance: row.failed_by_attendance.unwrap_or_default(),
            student: row.student,
        });
    }

    if defaulted > 0 {
        warn!(
            rows = defaulted,
            "enrollments without a pre-final average were counted as 0.0"
        );
    }

    Ok(offerings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "code,subject,year,semester,student,pre_final_average,post_final_average,failed_by_attendance\n";

    #[test]
    fn json_offerings_default_missing_fields() {
        let json = r#"[
            {"subject": "Math", "year": 2023, "semester": 2, "enrollments": [
                {"preFinalAverage": 8.0},
                {"preFinalAverage": 5.0, "postFinalAverage": 6.0},
                {"failedByAttendance": true}
            ]},
            {"subject": "Math", "year": 2023, "semester": 1}
        ]"#;

        let offerings = offerings_from_json(json.as_bytes()).unwrap();
        assert_eq!(offerings.len(), 2);
        assert_eq!(offerings[0].enrollments.len(), 3);
        assert_eq!(offerings[0].enrollments[1], Enrollment::with_final(5.0, 6.0));
        assert_eq!(offerings[0].enrollments[2], Enrollment::absent());
        assert!(offerings[1].enrollments.is_empty());
    }

    #[test]
    fn json_null_fields_default() {
        let json = r#"[
            {"subject": "Math", "year": 2023, "semester": 2, "enrollments": [
                {"preFinalAverage": 8.0, "postFinalAverage": null, "failedByAttendance": null}
            ]},
            {"subject": "Math", "year": 2023, "semester": 1, "enrollments": null}
        ]"#;

        let offerings = offerings_from_json(json.as_bytes()).unwrap();
        assert_eq!(offerings[0].enrollments, vec![Enrollment::with_pre_final(8.0)]);
        assert!(offerings[1].enrollments.is_empty());
    }

    fn row(pre: Option<f64>, post: Option<f64>, absent: Option<bool>) -> CsvRow {
        CsvRow {
            code: None,
            subject: "Math".to_string(),
            year: 2023,
            semester: 1,
            student: Some("Avery Lee".to_string()),
            pre_final_average: pre,
            post_final_average: post,
            failed_by_attendance: absent,
        }
    }

    #[test]
    fn only_blank_pre_final_average_counts_as_defaulted() {
        assert!(!row(Some(9.0), None, None).has_missing_average());
        assert!(!row(Some(4.0), Some(6.0), Some(false)).has_missing_average());
        assert!(!row(None, None, Some(true)).has_missing_average());
        assert!(row(None, Some(6.0), Some(false)).has_missing_average());
        assert!(row(None, None, None).has_missing_average());
    }

    #[test]
    fn json_rejects_missing_subject() {
        let err = offerings_from_json(r#"[{"year": 2023, "semester": 1}]"#.as_bytes())
            .unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
    }

    #[test]
    fn csv_groups_rows_by_code() {
        let csv = format!(
            "{HEADER}\
             M1,Math,2023,2,Avery Lee,8.0,,false\n\
             M1,Math,2023,2,Jules Moreno,5.0,6.0,false\n\
             P1,Physics,2023,1,Kiara Patel,9.0,,\n\
             M1,Math,2023,2,Sam Ortiz,,,true\n"
        );

        let offerings = offerings_from_csv(csv.as_bytes()).unwrap();
        assert_eq!(offerings.len(), 2);
        assert_eq!(offerings[0].code.as_deref(), Some("M1"));
        assert_eq!(offerings[0].enrollments.len(), 3);
        assert_eq!(offerings[0].enrollments[1].post_final_average, 6.0);
        assert!(offerings[0].enrollments[2].failed_by_attendance);
        assert_eq!(offerings[0].enrollments[2].pre_final_average, 0.0);
        assert_eq!(offerings[1].subject, "Physics");
        assert_eq!(
            offerings[1].enrollments[0].student.as_deref(),
            Some("Kiara Patel")
        );
    }

    #[test]
    fn csv_without_code_groups_by_period() {
        let csv = format!(
            "{HEADER}\
             ,Math,2023,1,Avery Lee,7.5,,false\n\
             ,Math,2023,2,Jules Moreno,2.0,,false\n\
             ,Math,2023,1,Kiara Patel,4.0,5.0,false\n"
        );

        let offerings = offerings_from_csv(csv.as_bytes()).unwrap();
        assert_eq!(offerings.len(), 2);
        assert_eq!(offerings[0].code, None);
        assert_eq!(offerings[0].enrollments.len(), 2);
        assert_eq!(offerings[1].enrollments.len(), 1);
    }

    #[test]
    fn csv_blank_row_declares_empty_offering() {
        let csv = format!("{HEADER}E1,Math,2024,1,,,,\n");
        let offerings = offerings_from_csv(csv.as_bytes()).unwrap();
        assert_eq!(offerings.len(), 1);
        assert!(offerings[0].enrollments.is_empty());
    }

    #[test]
    fn csv_rejects_code_reused_for_other_period() {
        let csv = format!(
            "{HEADER}\
             M1,Math,2023,2,Avery Lee,8.0,,false\n\
             M1,Math,2024,1,Jules Moreno,5.0,6.0,false\n"
        );

        match offerings_from_csv(csv.as_bytes()) {
            Err(LoadError::InconsistentOffering { row, code, .. }) => {
                assert_eq!(row, 3);
                assert_eq!(code, "M1");
            }
            other => panic!("expected inconsistent offering, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_reports_path() {
        let err = offerings_from_path(Path::new("/nonexistent/offerings.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/offerings.json"));
    }
}
