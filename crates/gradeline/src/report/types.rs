//! Report rows and options.
//!
//! Row field order is the exported column order; `serde` renames fix the
//! column names.

use chrono_tz::Tz;
use serde::Serialize;

use crate::dates::{DEFAULT_TIME_ZONE, DateOverrideMatch};

/// Knobs shared by every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Courses processed at once. `1` is sequential.
    pub concurrency: usize,
    pub date_overrides: DateOverrideMatch,
    /// Zone report timestamps are rendered in.
    pub time_zone: Tz,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            date_overrides: DateOverrideMatch::default(),
            time_zone: DEFAULT_TIME_ZONE,
        }
    }
}

/// One assignment in one section that still needs grading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentReportRow {
    #[serde(skip)]
    pub assignment_id: u64,
    #[serde(skip)]
    pub course_id: u64,
    #[serde(rename = "Qualification")]
    pub account: String,
    #[serde(rename = "Course Name")]
    pub course_name: String,
    #[serde(rename = "Assignment")]
    pub assignment: String,
    #[serde(rename = "Due")]
    pub due_at: String,
    #[serde(rename = "Available From")]
    pub unlock_at: String,
    #[serde(rename = "Until")]
    pub lock_at: String,
    #[serde(rename = "Section")]
    pub section: String,
    #[serde(rename = "Needs Grading")]
    pub needs_grading: u64,
    #[serde(rename = "Teachers")]
    pub teachers: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Published")]
    pub published: bool,
    #[serde(rename = "Gradebook URL")]
    pub gradebook_url: String,
}

/// One assignment analytics entry for one student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentResultRow {
    #[serde(skip)]
    pub assignment_id: u64,
    #[serde(rename = "Student ID")]
    pub student_id: String,
    #[serde(rename = "Student Name")]
    pub student_name: String,
    #[serde(rename = "Qualification")]
    pub account: String,
    #[serde(rename = "Course Name")]
    pub course_name: String,
    #[serde(rename = "Assignment")]
    pub assignment: String,
    #[serde(rename = "Max Score")]
    pub max_score: Option<f64>,
    #[serde(rename = "Min Score")]
    pub min_score: Option<f64>,
    #[serde(rename = "Score")]
    pub score: Option<f64>,
    #[serde(rename = "Submitted At")]
    pub submitted_at: String,
    #[serde(rename = "Due At")]
    pub due_at: String,
    #[serde(rename = "Submission Status")]
    pub status: String,
}

/// One course enrollment of one student with its current grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentResultRow {
    #[serde(rename = "Student ID")]
    pub student_id: String,
    #[serde(rename = "Student Name")]
    pub student_name: String,
    #[serde(rename = "Qualification")]
    pub account: String,
    #[serde(rename = "Course Name")]
    pub course_name: String,
    #[serde(rename = "Course Status")]
    pub course_status: String,
    #[serde(rename = "Current Grade")]
    pub current_grade: String,
    #[serde(rename = "Current Score")]
    pub current_score: Option<f64>,
    #[serde(rename = "Grades URL")]
    pub grades_url: String,
}

/// A submission without a grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UngradedSubmissionRow {
    #[serde(skip)]
    pub submission_id: u64,
    #[serde(rename = "Qualification")]
    pub account: String,
    #[serde(rename = "Course")]
    pub course_name: String,
    #[serde(rename = "Student ID")]
    pub student_id: String,
    #[serde(rename = "Student Name")]
    pub student_name: String,
    #[serde(rename = "Assignment Name")]
    pub assignment: String,
    #[serde(rename = "Due At")]
    pub due_at: String,
    #[serde(rename = "Grade")]
    pub grade: String,
    #[serde(rename = "Submitted At")]
    pub submitted_at: String,
    #[serde(rename = "Graded At")]
    pub graded_at: String,
    #[serde(rename = "Attempt")]
    pub attempt: Option<u32>,
    #[serde(rename = "Late")]
    pub late: bool,
    #[serde(rename = "Excused")]
    pub excused: bool,
    #[serde(rename = "Preview URL")]
    pub preview_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_row_serializes_with_column_names() {
        let row = AssignmentReportRow {
            assignment_id: 1,
            course_id: 2,
            account: "Science".to_string(),
            course_name: "Biology".to_string(),
            assignment: "Essay".to_string(),
            due_at: String::new(),
            unlock_at: String::new(),
            lock_at: String::new(),
            section: "PER-01".to_string(),
            needs_grading: 3,
            teachers: "Ada;Grace".to_string(),
            status: "ungraded".to_string(),
            published: true,
            gradebook_url: "https://lms.test/courses/2/gradebook".to_string(),
        };

        let value = serde_json::to_value(&row).expect("serializes");
        assert_eq!(value["Qualification"], "Science");
        assert_eq!(value["Needs Grading"], 3);
        assert_eq!(value["Teachers"], "Ada;Grace");
        assert!(value.get("assignment_id").is_none());
    }

    #[test]
    fn default_options_are_sequential_perth_course_section() {
        let options = ReportOptions::default();
        assert_eq!(options.concurrency, 1);
        assert_eq!(options.date_overrides, DateOverrideMatch::CourseSection);
        assert_eq!(options.time_zone, chrono_tz::Australia::Perth);
    }
}
