//! Assignment date overrides and time zone conversion.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::api::types::AssignmentDate;
use crate::error::{CanvasError, Result};

/// Output format for converted timestamps, e.g.
/// `2024-03-01 12:00:00 +0800 AWST`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z %Z";

/// Zone used when none is configured.
pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::Australia::Perth;

const COURSE_SECTION_SET_TYPE: &str = "CourseSection";

/// How an assignment's date variants are matched to a section.
///
/// Overrides are keyed by set id and looked up by section id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateOverrideMatch {
    /// Only section-level overrides (`set_type == "CourseSection"`) are
    /// indexed, so ad-hoc and group sets never match a section.
    #[default]
    CourseSection,
    /// Every override with a non-zero set id is indexed regardless of its
    /// set type.
    AnySetId,
}

impl DateOverrideMatch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CourseSection => "course-section",
            Self::AnySetId => "any-set-id",
        }
    }
}

impl FromStr for DateOverrideMatch {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "course-section" | "course_section" => Ok(Self::CourseSection),
            "any-set-id" | "any_set_id" => Ok(Self::AnySetId),
            other => Err(CanvasError::Config(format!(
                "unknown date override match {other:?} (expected course-section or any-set-id)"
            ))),
        }
    }
}

/// Index an assignment's date variants by set id.
///
/// Variants without a set id, or with a zero set id, are the assignment's
/// base dates and are never indexed. Later duplicates replace earlier ones.
pub fn override_index(
    dates: &[AssignmentDate],
    mode: DateOverrideMatch,
) -> HashMap<u64, &AssignmentDate> {
    dates
        .iter()
        .filter_map(|date| {
            let set_id = date.set_id.filter(|id| *id != 0)?;
            let eligible = match mode {
                DateOverrideMatch::AnySetId => true,
                DateOverrideMatch::CourseSection => {
                    date.set_type.as_deref() == Some(COURSE_SECTION_SET_TYPE)
                }
            };
            eligible.then_some((set_id, date))
        })
        .collect()
}

/// The override that applies to `section_id`, if any.
pub fn find_override<'a>(
    index: &HashMap<u64, &'a AssignmentDate>,
    section_id: u64,
) -> Option<&'a AssignmentDate> {
    index.get(&section_id).copied()
}

/// Convert an RFC 3339 timestamp into `tz`, formatted with
/// [`TIMESTAMP_FORMAT`]. Absent and empty input yield `""`.
pub fn convert_timestamp(value: Option<&str>, tz: Tz) -> Result<String> {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return Ok(String::new());
    };

    let parsed = DateTime::parse_from_rfc3339(value).map_err(|source| CanvasError::Timestamp {
        value: value.to_string(),
        source,
    })?;

    let local = parsed.with_timezone(&tz);
    Ok(local.format(TIMESTAMP_FORMAT).to_string())
}

/// Parse an IANA zone name such as `Australia/Adelaide`.
pub fn parse_time_zone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| CanvasError::Config(format!("unknown time zone {name:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(set_id: Option<u64>, set_type: Option<&str>, due_at: &str) -> AssignmentDate {
        AssignmentDate {
            set_id,
            set_type: set_type.map(str::to_string),
            due_at: Some(due_at.to_string()),
            ..AssignmentDate::default()
        }
    }

    #[test]
    fn converts_utc_to_perth() {
        let converted = convert_timestamp(Some("2024-03-01T04:00:00Z"), DEFAULT_TIME_ZONE)
            .expect("valid timestamp");
        assert!(
            converted.starts_with("2024-03-01 12:00:00 +0800"),
            "got {converted}"
        );
        assert_eq!(converted, "2024-03-01 12:00:00 +0800 AWST");
    }

    #[test]
    fn converts_offset_input_and_other_zones() {
        let adelaide = parse_time_zone("Australia/Adelaide").expect("zone");
        let converted =
            convert_timestamp(Some("2024-07-01T10:00:00+08:00"), adelaide).expect("valid");
        assert!(
            converted.starts_with("2024-07-01 11:30:00 +0930"),
            "got {converted}"
        );
    }

    #[test]
    fn empty_and_absent_stay_empty() {
        for value in [None, Some("")] {
            let converted = convert_timestamp(value, DEFAULT_TIME_ZONE).expect("empty input");
            assert_eq!(converted, "");
        }
    }

    #[test]
    fn invalid_timestamp_is_an_error() {
        let err = convert_timestamp(Some("yesterday"), DEFAULT_TIME_ZONE).expect_err("invalid");
        assert!(matches!(err, CanvasError::Timestamp { ref value, .. } if value == "yesterday"));
    }

    #[test]
    fn unknown_zone_is_config_error() {
        assert!(matches!(parse_time_zone("Mars/Olympus"), Err(CanvasError::Config(_))));
    }

    #[test]
    fn base_dates_are_never_indexed() {
        let dates = vec![
            date(None, None, "2024-01-01T00:00:00Z"),
            date(Some(0), Some("CourseSection"), "2024-01-02T00:00:00Z"),
        ];
        assert!(override_index(&dates, DateOverrideMatch::AnySetId).is_empty());
        assert!(override_index(&dates, DateOverrideMatch::CourseSection).is_empty());
    }

    #[test]
    fn course_section_mode_ignores_adhoc_set_with_colliding_id() {
        // An ad-hoc set whose id happens to equal section 11.
        let dates = vec![date(Some(11), Some("ADHOC"), "2024-05-01T00:00:00Z")];

        let index = override_index(&dates, DateOverrideMatch::CourseSection);
        assert!(find_override(&index, 11).is_none());
    }

    #[test]
    fn any_set_id_mode_applies_adhoc_set_with_colliding_id() {
        let dates = vec![date(Some(11), Some("ADHOC"), "2024-05-01T00:00:00Z")];

        let index = override_index(&dates, DateOverrideMatch::AnySetId);
        let found = find_override(&index, 11).expect("matched by set id");
        assert_eq!(found.due_at.as_deref(), Some("2024-05-01T00:00:00Z"));
    }

    #[test]
    fn both_modes_match_section_overrides() {
        let dates = vec![
            date(None, None, "2024-01-01T00:00:00Z"),
            date(Some(11), Some("CourseSection"), "2024-05-01T00:00:00Z"),
            date(Some(12), Some("CourseSection"), "2024-06-01T00:00:00Z"),
        ];
        for mode in [
            DateOverrideMatch::CourseSection,
            DateOverrideMatch::AnySetId,
        ] {
            let index = override_index(&dates, mode);
            assert_eq!(index.len(), 2);
            assert_eq!(
                find_override(&index, 12).and_then(|d| d.due_at.as_deref()),
                Some("2024-06-01T00:00:00Z")
            );
            assert!(find_override(&index, 13).is_none());
        }
    }

    #[test]
    fn date_override_match_parses_config_spellings() {
        assert_eq!(
            "course-section".parse::<DateOverrideMatch>().expect("parse"),
            DateOverrideMatch::CourseSection
        );
        assert_eq!(
            " Any-Set-Id ".parse::<DateOverrideMatch>().expect("parse"),
            DateOverrideMatch::AnySetId
        );
        assert!("sections".parse::<DateOverrideMatch>().is_err());
        assert_eq!(DateOverrideMatch::default().as_str(), "course-section");
    }
}
