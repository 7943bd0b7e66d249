//! The fixed set of experience dimensions shared by students and colleges.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Number of experience dimensions. Vectors are fixed arrays of this length.
pub const DIMENSION_COUNT: usize = 8;

/// One axis of the student experience, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceDimension {
    AcademicIntensity,
    SocialLife,
    Inclusivity,
    CareerSupport,
    CollaborationVsCompetition,
    MentalHealthCulture,
    CampusSafety,
    OverallSatisfaction,
}

impl ExperienceDimension {
    pub const ALL: [ExperienceDimension; DIMENSION_COUNT] = [
        ExperienceDimension::AcademicIntensity,
        ExperienceDimension::SocialLife,
        ExperienceDimension::Inclusivity,
        ExperienceDimension::CareerSupport,
        ExperienceDimension::CollaborationVsCompetition,
        ExperienceDimension::MentalHealthCulture,
        ExperienceDimension::CampusSafety,
        ExperienceDimension::OverallSatisfaction,
    ];

    /// Position in [`ExperienceDimension::ALL`], used to index vectors.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceDimension::AcademicIntensity => "academic_intensity",
            ExperienceDimension::SocialLife => "social_life",
            ExperienceDimension::Inclusivity => "inclusivity",
            ExperienceDimension::CareerSupport => "career_support",
            ExperienceDimension::CollaborationVsCompetition => "collaboration_vs_competition",
            ExperienceDimension::MentalHealthCulture => "mental_health_culture",
            ExperienceDimension::CampusSafety => "campus_safety",
            ExperienceDimension::OverallSatisfaction => "overall_satisfaction",
        }
    }

    /// Human-readable label, e.g. "career support".
    pub fn label(self) -> String {
        self.as_str().replace('_', " ")
    }

    /// Accepts the labels a language model tends to produce ("Career Support",
    /// "mental-health culture") in addition to the canonical keys.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        normalized.parse().ok()
    }
}

impl FromStr for ExperienceDimension {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExperienceDimension::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownDimension(s.to_string()))
    }
}

impl fmt::Display for ExperienceDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
