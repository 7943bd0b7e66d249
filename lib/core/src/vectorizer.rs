//! Preference vectorizer
//!
//! Turns raw slider values, optionally combined with a [`StudentProfile`],
//! into a complete [`PreferenceVector`]. Slider suggestions are a
//! deterministic, rule-based mapping driven by a [`SuggestionPolicy`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::dimension::ExperienceDimension;
use crate::error::{Error, Result, ValidationError};
use crate::preference::{PreferenceVector, MIDPOINT_WEIGHT};
use crate::student::StudentProfile;

use ExperienceDimension::*;

/// Overrides applied when the student's major contains `keyword`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MajorProfile {
    pub keyword: String,
    pub sliders: BTreeMap<ExperienceDimension, f32>,
}

/// Minimum slider values applied when any keyword appears in the extracurriculars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRule {
    pub keywords: Vec<String>,
    pub floors: BTreeMap<ExperienceDimension, f32>,
}

/// Sets `dimension` to `value` when `keyword` appears in the free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordBoost {
    pub keyword: String,
    pub dimension: ExperienceDimension,
    pub value: f32,
}

/// GPA thresholds nudging academic intensity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpaRule {
    pub high_threshold: f64,
    pub high_floor: f32,
    pub low_threshold: f64,
    pub low_ceiling: f32,
}

impl Default for GpaRule {
    fn default() -> Self {
        Self {
            high_threshold: 3.7,
            high_floor: 7.0,
            low_threshold: 2.8,
            low_ceiling: 5.0,
        }
    }
}

/// Tunable tables behind slider suggestions.
///
/// Rules apply in order: baseline, first matching major, activity floors,
/// free-text keywords (later keywords win), GPA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionPolicy {
    pub baseline: f32,
    pub majors: Vec<MajorProfile>,
    pub activities: Vec<ActivityRule>,
    pub keywords: Vec<KeywordBoost>,
    pub gpa: GpaRule,
}

impl SuggestionPolicy {
    /// Load a policy from a JSON file. Omitted sections keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let policy: SuggestionPolicy = serde_json::from_str(&data)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1.0..=10.0).contains(&self.baseline) {
            return Err(Error::InvalidConfig(format!(
                "baseline must be within [1, 10], got {}",
                self.baseline
            )));
        }
        if self.gpa.low_threshold > self.gpa.high_threshold {
            return Err(Error::InvalidConfig(
                "gpa.low_threshold must not exceed gpa.high_threshold".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SuggestionPolicy {
    fn default() -> Self {
        Self {
            baseline: MIDPOINT_WEIGHT,
            majors: vec![
                major("computer science", &[(AcademicIntensity, 8.0), (CareerSupport, 9.0), (CollaborationVsCompetition, 7.0), (SocialLife, 5.0)]),
                major("engineering", &[(AcademicIntensity, 9.0), (CareerSupport, 8.0), (CollaborationVsCompetition, 6.0), (MentalHealthCulture, 6.0)]),
                major("business", &[(AcademicIntensity, 6.0), (CareerSupport, 9.0), (SocialLife, 7.0), (CollaborationVsCompetition, 5.0)]),
                major("pre-med", &[(AcademicIntensity, 10.0), (CareerSupport, 7.0), (CollaborationVsCompetition, 4.0), (MentalHealthCulture, 8.0)]),
                major("arts", &[(AcademicIntensity, 5.0), (SocialLife, 8.0), (Inclusivity, 8.0), (MentalHealthCulture, 7.0)]),
                major("humanities", &[(AcademicIntensity, 6.0), (SocialLife, 7.0), (Inclusivity, 8.0), (CollaborationVsCompetition, 7.0)]),
                major("nursing", &[(AcademicIntensity, 8.0), (CareerSupport, 9.0), (CampusSafety, 8.0), (MentalHealthCulture, 7.0)]),
                major("education", &[(AcademicIntensity, 5.0), (CareerSupport, 7.0), (Inclusivity, 8.0), (CollaborationVsCompetition, 8.0)]),
                major("biology", &[(AcademicIntensity, 8.0), (CareerSupport, 7.0), (CollaborationVsCompetition, 5.0)]),
                major("psychology", &[(AcademicIntensity, 6.0), (Inclusivity, 8.0), (MentalHealthCulture, 9.0), (SocialLife, 7.0)]),
            ],
            activities: vec![
                activity(&["sport", "tennis", "soccer", "basketball", "athlete", "swim", "track"], &[(SocialLife, 8.0), (CampusSafety, 7.0)]),
                activity(&["hackathon", "coding", "robotics", "tech"], &[(CareerSupport, 8.0), (AcademicIntensity, 7.0)]),
                activity(&["volunteer", "community", "service"], &[(Inclusivity, 8.0)]),
                activity(&["theater", "music", "art", "dance"], &[(SocialLife, 8.0), (Inclusivity, 7.0)]),
            ],
            keywords: vec![
                boost("collaborat", CollaborationVsCompetition, 9.0),
                boost("competiti", CollaborationVsCompetition, 3.0),
                boost("safe", CampusSafety, 9.0),
                boost("divers", Inclusivity, 9.0),
                boost("inclusi", Inclusivity, 9.0),
                boost("social", SocialLife, 9.0),
                boost("party", SocialLife, 9.0),
                boost("mental health", MentalHealthCulture, 9.0),
                boost("wellness", MentalHealthCulture, 8.0),
                boost("career", CareerSupport, 9.0),
                boost("intern", CareerSupport, 9.0),
                boost("job", CareerSupport, 8.0),
                boost("research", AcademicIntensity, 9.0),
                boost("rigorous", AcademicIntensity, 9.0),
                boost("prestige", OverallSatisfaction, 8.0),
                boost("chill", AcademicIntensity, 4.0),
                boost("relax", MentalHealthCulture, 8.0),
            ],
            gpa: GpaRule::default(),
        }
    }
}

fn major(keyword: &str, sliders: &[(ExperienceDimension, f32)]) -> MajorProfile {
    MajorProfile {
        keyword: keyword.to_string(),
        sliders: sliders.iter().copied().collect(),
    }
}

fn activity(keywords: &[&str], floors: &[(ExperienceDimension, f32)]) -> ActivityRule {
    ActivityRule {
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        floors: floors.iter().copied().collect(),
    }
}

fn boost(keyword: &str, dimension: ExperienceDimension, value: f32) -> KeywordBoost {
    KeywordBoost {
        keyword: keyword.to_string(),
        dimension,
        value,
    }
}

/// Builds complete preference vectors from partial input
#[derive(Debug, Clone, Default)]
pub struct Vectorizer {
    policy: SuggestionPolicy,
}

impl Vectorizer {
    pub fn new(policy: SuggestionPolicy) -> Self {
        Self { policy }
    }

    /// Strict validation used at the request boundary.
    pub fn validate(&self, raw: &BTreeMap<String, f64>) -> std::result::Result<PreferenceVector, ValidationError> {
        PreferenceVector::from_map(raw)
    }

    /// Complete a partial slider map.
    ///
    /// Missing dimensions come from [`Vectorizer::suggest`] when a profile is
    /// given and from the baseline otherwise. Supplied values are clamped to
    /// `[1, 10]`; unknown keys and non-finite values are rejected.
    pub fn vectorize(
        &self,
        partial: &BTreeMap<String, f64>,
        profile: Option<&StudentProfile>,
    ) -> std::result::Result<PreferenceVector, ValidationError> {
        let mut prefs = match profile {
            Some(p) => self.suggest(p),
            None => PreferenceVector::uniform(self.policy.baseline),
        };

        for (key, &value) in partial {
            let dim: ExperienceDimension = key.parse()?;
            if !value.is_finite() {
                return Err(ValidationError::NotFinite(dim));
            }
            prefs.set(dim, value as f32);
        }

        Ok(prefs)
    }

    /// Suggested slider values for a student profile
    pub fn suggest(&self, profile: &StudentProfile) -> PreferenceVector {
        let policy = &self.policy;
        let mut prefs = PreferenceVector::uniform(policy.baseline);

        let major = lowercase(&profile.major);
        if !major.is_empty() {
            if let Some(m) = policy.majors.iter().find(|m| major.contains(m.keyword.as_str())) {
                for (&dim, &value) in &m.sliders {
                    prefs.set(dim, value);
                }
            }
        }

        let extras = lowercase(&profile.extracurriculars);
        for rule in &policy.activities {
            if rule.keywords.iter().any(|k| extras.contains(k.as_str())) {
                for (&dim, &floor) in &rule.floors {
                    prefs.set(dim, prefs.get(dim).max(floor));
                }
            }
        }

        let free_text = lowercase(&profile.free_text);
        for kw in &policy.keywords {
            if free_text.contains(kw.keyword.as_str()) {
                prefs.set(kw.dimension, kw.value);
            }
        }

        if let Some(gpa) = profile.gpa.filter(|g| g.is_finite() && *g > 0.0) {
            let current = prefs.get(AcademicIntensity);
            if gpa >= policy.gpa.high_threshold {
                prefs.set(AcademicIntensity, current.max(policy.gpa.high_floor));
            } else if gpa < policy.gpa.low_threshold {
                prefs.set(AcademicIntensity, current.min(policy.gpa.low_ceiling));
            }
        }

        prefs
    }
}

fn lowercase(value: &Option<String>) -> String {
    value.as_deref().unwrap_or("").trim().to_lowercase()
}
