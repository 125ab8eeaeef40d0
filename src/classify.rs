use crate::models::{Enrollment, OutcomeCategory};

pub const APPROVAL_AVERAGE: f64 = 7.0;
pub const REMEDIAL_FLOOR: f64 = 3.0;
pub const FINAL_EXAM_PASS: f64 = 5.0;

/// Maps one enrollment to its outcome. Branch order matters: attendance failure
/// wins over any grade, then the direct pass, then the remedial band.
pub fn classify(enrollment: &Enrollment) -> Option<OutcomeCategory> {
    let pre = enrollment.pre_final_average;
    let post = enrollment.post_final_average;

    let category = match enrollment.failed_by_attendance {
        true => OutcomeCategory::FailedByAttendance,
        false if pre >= APPROVAL_AVERAGE => OutcomeCategory::ApprovedByAverage,
        false if (REMEDIAL_FLOOR..APPROVAL_AVERAGE).contains(&pre) => {
            if post >= FINAL_EXAM_PASS {
                OutcomeCategory::ApprovedByGrade
            } else {
                OutcomeCategory::FailedByGrade
            }
        }
        false => OutcomeCategory::FailedByAverage,
    };

    Some(category)
}
