//! Admission, earnings and graduation estimates from catalog statistics.
//!
//! Everything here is arithmetic over published numbers. Narrative text on
//! top of these estimates is produced elsewhere; [`fallback_narrative`] is the
//! templated version used when no generated text is available.

use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::college::College;
use crate::student::StudentProfile;

/// SAT equivalents for GPA floors, highest first
const GPA_TO_SAT: [(f64, u32); 10] = [
    (4.0, 1550),
    (3.9, 1500),
    (3.8, 1450),
    (3.7, 1400),
    (3.5, 1300),
    (3.3, 1200),
    (3.0, 1100),
    (2.7, 1000),
    (2.5, 950),
    (2.0, 880),
];
const SAT_FLOOR: u32 = 850;

pub const MIN_ADMISSION_CHANCE: f64 = 0.02;
pub const MAX_ADMISSION_CHANCE: f64 = 0.99;
pub const SAFETY_THRESHOLD: f64 = 0.60;
pub const MATCH_THRESHOLD: f64 = 0.30;

/// Approximate SAT score for a GPA on a 4.0 scale
pub fn gpa_to_sat(gpa: f64) -> u32 {
    GPA_TO_SAT
        .iter()
        .find(|(floor, _)| gpa >= *floor)
        .map_or(SAT_FLOOR, |&(_, sat)| sat)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

/// Whole dollars with thousands separators, e.g. `$52,300`
pub fn format_dollars(amount: f64) -> String {
    let whole = amount.abs().round() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && whole > 0 { "-" } else { "" };
    format!("{sign}${grouped}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdmissionCategory {
    Safety,
    Match,
    Reach,
    Unknown,
}

impl AdmissionCategory {
    pub fn from_chance(chance: f64) -> Self {
        if chance >= SAFETY_THRESHOLD {
            AdmissionCategory::Safety
        } else if chance >= MATCH_THRESHOLD {
            AdmissionCategory::Match
        } else {
            AdmissionCategory::Reach
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AdmissionCategory::Safety => "Safety",
            AdmissionCategory::Match => "Match",
            AdmissionCategory::Reach => "Reach",
            AdmissionCategory::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdmissionPrediction {
    pub chance: Option<f64>,
    pub category: AdmissionCategory,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningsPrediction {
    pub median_10yr: Option<f64>,
    /// Share of catalog colleges with lower median earnings, 0-100
    pub percentile: Option<u32>,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraduationPrediction {
    pub probability: Option<f64>,
    pub note: String,
}

/// All three estimates for one college
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollegePrediction {
    pub institution_id: u32,
    pub institution_name: String,
    pub admission: AdmissionPrediction,
    pub earnings: EarningsPrediction,
    pub graduation: GraduationPrediction,
}

/// Scales the admission rate by how far the student's SAT sits from the
/// school average. Above-average scores help less than below-average ones hurt.
fn sat_multiplier(diff: f64) -> f64 {
    if diff >= 100.0 {
        (1.0 + diff / 500.0).min(1.4)
    } else if diff >= 0.0 {
        1.0 + diff / 800.0
    } else if diff >= -150.0 {
        (1.0 + diff / 400.0).max(0.5)
    } else {
        (1.0 + diff / 300.0).max(0.25)
    }
}

pub fn predict_admission(profile: &StudentProfile, college: &College) -> AdmissionPrediction {
    let Some(rate) = college.outcomes.admission_rate else {
        return AdmissionPrediction {
            chance: None,
            category: AdmissionCategory::Unknown,
            note: "Admission rate data not available".to_string(),
        };
    };

    let student_sat = profile
        .sat
        .map(f64::from)
        .or_else(|| profile.gpa.map(|gpa| f64::from(gpa_to_sat(gpa))));

    let mut note = format!("Admission rate: {}", percent(rate));
    let chance = match (student_sat, college.outcomes.sat_average) {
        (Some(sat), Some(average)) => {
            let diff = sat - average;
            let direction = if diff > 0.0 { "above" } else { "below" };
            note.push_str(&format!(
                ". Your SAT is ~{:.0} points {direction} the school average ({average:.0})",
                diff.abs()
            ));
            (rate * sat_multiplier(diff)).clamp(MIN_ADMISSION_CHANCE, MAX_ADMISSION_CHANCE)
        }
        _ => rate,
    };

    AdmissionPrediction {
        chance: Some(round3(chance)),
        category: AdmissionCategory::from_chance(chance),
        note,
    }
}

/// Sorted median earnings across the catalog
#[derive(Debug, Clone, Default)]
pub struct EarningsDistribution {
    sorted: Vec<f64>,
}

impl EarningsDistribution {
    pub fn from_colleges<'a>(colleges: impl IntoIterator<Item = &'a College>) -> Self {
        let mut sorted: Vec<f64> = colleges
            .into_iter()
            .filter_map(|c| c.outcomes.median_earnings_10yr)
            .filter(|e| e.is_finite())
            .collect();
        sorted.sort_by_key(|&e| OrderedFloat(e));
        Self { sorted }
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Percent of colleges earning strictly less than `earnings`; 50 without data
    pub fn percentile(&self, earnings: f64) -> u32 {
        if self.sorted.is_empty() {
            return 50;
        }
        let below = self.sorted.partition_point(|&e| e < earnings);
        (below as f64 / self.sorted.len() as f64 * 100.0).round() as u32
    }
}

pub fn predict_earnings(
    profile: &StudentProfile,
    college: &College,
    distribution: &EarningsDistribution,
) -> EarningsPrediction {
    let Some(earnings) = college.outcomes.median_earnings_10yr else {
        return EarningsPrediction {
            median_10yr: None,
            percentile: None,
            note: "Earnings data not available".to_string(),
        };
    };

    let percentile = distribution.percentile(earnings);
    let mut note = format!(
        "{} median earnings 10 years after enrollment (top {}% nationally)",
        format_dollars(earnings),
        100 - percentile.min(100)
    );
    if let Some(major) = profile.major.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        note.push_str(&format!(
            ". Note: this is the school-wide median; {major} graduates may differ."
        ));
    }

    EarningsPrediction {
        median_10yr: Some(earnings),
        percentile: Some(percentile),
        note,
    }
}

pub fn predict_graduation(profile: &StudentProfile, college: &College) -> GraduationPrediction {
    let completion = college.outcomes.completion_rate;
    let retention = college.outcomes.retention_rate;

    let mut base = match (completion, retention) {
        (Some(c), Some(r)) => c * 0.7 + r * 0.3,
        (Some(c), None) => c,
        (None, Some(r)) => r * 0.85,
        (None, None) => {
            return GraduationPrediction {
                probability: None,
                note: "Graduation data not available".to_string(),
            }
        }
    };

    if let Some(gpa) = profile.gpa {
        base = (base + (gpa - 3.0) * 0.05).clamp(0.05, 0.99);
    }

    let mut parts = Vec::new();
    if let Some(c) = completion {
        parts.push(format!("{} 4-year completion rate", percent(c)));
    }
    if let Some(r) = retention {
        parts.push(format!("{} first-year retention", percent(r)));
    }
    if profile.gpa.is_some_and(|gpa| gpa >= 3.5) {
        parts.push("your strong GPA improves your odds".to_string());
    }

    GraduationPrediction {
        probability: Some(round3(base)),
        note: parts.join(". "),
    }
}

pub fn predict(
    profile: &StudentProfile,
    college: &College,
    distribution: &EarningsDistribution,
) -> CollegePrediction {
    CollegePrediction {
        institution_id: college.id,
        institution_name: college.name.clone(),
        admission: predict_admission(profile, college),
        earnings: predict_earnings(profile, college, distribution),
        graduation: predict_graduation(profile, college),
    }
}

/// Templated advice built only from the estimates
pub fn fallback_narrative(prediction: &CollegePrediction) -> String {
    let mut sentences = Vec::new();

    let admission = &prediction.admission;
    if admission.category != AdmissionCategory::Unknown {
        let mut sentence = format!(
            "{} is a {} school for you",
            prediction.institution_name,
            admission.category.as_str().to_lowercase()
        );
        if let Some(chance) = admission.chance {
            sentence.push_str(&format!(" with an estimated {} admission chance", percent(chance)));
        }
        sentences.push(sentence);
    }
    if let Some(earnings) = prediction.earnings.median_10yr {
        sentences.push(format!(
            "Graduates earn a median of {} after 10 years",
            format_dollars(earnings)
        ));
    }
    if let Some(probability) = prediction.graduation.probability {
        sentences.push(format!(
            "The estimated on-time graduation probability is {}",
            percent(probability)
        ));
    }

    if sentences.is_empty() {
        "Insufficient data for a prediction.".to_string()
    } else {
        format!("{}.", sentences.join(". "))
    }
}
