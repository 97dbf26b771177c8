//! Wire models for the LMS REST API.
//!
//! Nullable remote strings are `Option<String>`. Numeric ids are `u64`.

use serde::{Deserialize, Serialize};

/// Assignment listing filter accepted by the assignments endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentBucket {
    Past,
    Overdue,
    Undated,
    #[default]
    Ungraded,
    Unsubmitted,
    Upcoming,
    Future,
}

impl AssignmentBucket {
    pub const ALL: [AssignmentBucket; 7] = [
        Self::Past,
        Self::Overdue,
        Self::Undated,
        Self::Ungraded,
        Self::Unsubmitted,
        Self::Upcoming,
        Self::Future,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Past => "past",
            Self::Overdue => "overdue",
            Self::Undated => "undated",
            Self::Ungraded => "ungraded",
            Self::Unsubmitted => "unsubmitted",
            Self::Upcoming => "upcoming",
            Self::Future => "future",
        }
    }
}

impl std::fmt::Display for AssignmentBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role filter for listing an account's courses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseEnrollmentType {
    Teacher,
    #[default]
    Student,
    Ta,
    Observer,
    Designer,
}

impl CourseEnrollmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Student => "student",
            Self::Ta => "ta",
            Self::Observer => "observer",
            Self::Designer => "designer",
        }
    }
}

impl std::fmt::Display for CourseEnrollmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enrollment role as reported in an enrollment's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnrollmentType {
    #[serde(rename = "StudentEnrollment")]
    Student,
    #[serde(rename = "TeacherEnrollment")]
    Teacher,
    #[serde(rename = "TaEnrollment")]
    Ta,
    #[serde(rename = "DesignerEnrollment")]
    Designer,
    #[serde(rename = "ObserverEnrollment")]
    Observer,
}

impl EnrollmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "StudentEnrollment",
            Self::Teacher => "TeacherEnrollment",
            Self::Ta => "TaEnrollment",
            Self::Designer => "DesignerEnrollment",
            Self::Observer => "ObserverEnrollment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentState {
    Active,
    Invited,
    CreationPending,
    Deleted,
    Rejected,
    Completed,
    Inactive,
}

impl EnrollmentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Invited => "invited",
            Self::CreationPending => "creation_pending",
            Self::Deleted => "deleted",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Inactive => "inactive",
        }
    }
}

/// Where grading standards are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradingContext {
    Account(u64),
    Course(u64),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Account {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub parent_account_id: Option<u64>,
    #[serde(default)]
    pub root_account_id: Option<u64>,
}

/// Account summary embedded in a course with `include[]=account`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct CourseAccount {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub workflow_state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Course {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub course_code: Option<String>,
    #[serde(default)]
    pub workflow_state: Option<String>,
    #[serde(default)]
    pub account_id: Option<u64>,
    #[serde(default)]
    pub account: Option<CourseAccount>,
    #[serde(default)]
    pub sections: Option<Vec<Section>>,
    #[serde(default)]
    pub start_at: Option<String>,
    #[serde(default)]
    pub end_at: Option<String>,
}

impl Course {
    /// Name of the embedded account, or `""` when it was not requested.
    pub fn account_name(&self) -> &str {
        self.account.as_ref().map(|a| a.name.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Section {
    pub id: u64,
    #[serde(default)]
    pub sis_section_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub course_id: Option<u64>,
    #[serde(default)]
    pub total_students: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Grades {
    #[serde(default)]
    pub current_score: Option<f64>,
    #[serde(default)]
    pub current_grade: Option<String>,
    #[serde(default)]
    pub final_score: Option<f64>,
    #[serde(default)]
    pub final_grade: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// User summary embedded in enrollments and submissions.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct UserSummary {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sis_user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Enrollment {
    pub id: u64,
    pub user_id: u64,
    pub course_id: u64,
    #[serde(default)]
    pub course_section_id: Option<u64>,
    #[serde(default)]
    pub sis_section_id: Option<String>,
    #[serde(default)]
    pub grades: Grades,
    #[serde(default)]
    pub user: UserSummary,
    #[serde(default)]
    pub enrollment_state: Option<String>,
    #[serde(rename = "type", default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SectionNeedsGrading {
    pub section_id: u64,
    pub needs_grading_count: u64,
}

/// One audience-specific date variant of an assignment.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct AssignmentDate {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub set_id: Option<u64>,
    #[serde(default)]
    pub set_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub due_at: Option<String>,
    #[serde(default)]
    pub unlock_at: Option<String>,
    #[serde(default)]
    pub lock_at: Option<String>,
    #[serde(default)]
    pub base: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Assignment {
    pub id: u64,
    pub course_id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub needs_grading_count: u64,
    #[serde(default)]
    pub needs_grading_count_by_section: Vec<SectionNeedsGrading>,
    #[serde(default)]
    pub all_dates: Vec<AssignmentDate>,
    #[serde(default)]
    pub due_at: Option<String>,
    #[serde(default)]
    pub grading_type: Option<String>,
    #[serde(default)]
    pub grading_standard_id: Option<u64>,
}

/// A section's resolved code and teacher names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionWithEnrollments {
    pub id: u64,
    pub code: String,
    pub teachers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sis_user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Submission {
    pub id: u64,
    pub user_id: u64,
    pub assignment_id: u64,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub graded_at: Option<String>,
    #[serde(default)]
    pub attempt: Option<u32>,
    #[serde(default)]
    pub late: bool,
    #[serde(default)]
    pub excused: Option<bool>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub user: Option<UserSummary>,
}

impl Submission {
    /// A submission with no grade yet, absent and empty alike.
    pub fn is_ungraded(&self) -> bool {
        self.grade.as_deref().is_none_or(str::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct AnalyticsSubmission {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub submitted_at: Option<String>,
}

/// Per-user assignment analytics entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AssignmentAnalytics {
    pub assignment_id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub min_score: Option<f64>,
    #[serde(default)]
    pub due_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub submission: Option<AnalyticsSubmission>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GradingSchemeEntry {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GradingStandard {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub context_type: Option<String>,
    #[serde(default)]
    pub context_id: Option<u64>,
    #[serde(default)]
    pub grading_scheme: Vec<GradingSchemeEntry>,
}
