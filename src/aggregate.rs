use crate::classify::classify;
use crate::models::{CategoryStatistics, Enrollment};

/// Folds enrollments into outcome counts. `total_students` is the input length,
/// so an enrollment without a category is still tallied there.
pub fn aggregate(enrollments: &[Enrollment]) -> CategoryStatistics {
    let mut stats = CategoryStatistics {
        total_students: enrollments.len(),
        ..CategoryStatistics::default()
    };

    for enrollment in enrollments {
        if let Some(category) = classify(enrollment) {
            stats.record(category);
        }
    }

    stats
}
