//! Explainability for similarity-ranked matches
//!
//! Derives strengths and trade-offs from the per-dimension gap between a
//! college's score and the student's weight (both on a 0-1 scale), and renders
//! a templated explanation. No external content is involved.

use edualign_core::{ExperienceDimension, MatchResult, PreferenceVector, ProfileVector};
use ordered_float::OrderedFloat;

use crate::rank::ScoredCollege;

pub const MAX_STRENGTHS: usize = 3;
pub const MAX_TRADEOFFS: usize = 2;

/// Per-dimension `college - student / 10`
fn gaps(prefs: &PreferenceVector, profile: &ProfileVector) -> Vec<f32> {
    (&profile.to_vector() - &prefs.to_unit_vector()).as_slice().to_vec()
}

/// Up to two dimensions where the college falls short of the student by more
/// than `threshold`, largest shortfall first
pub fn tradeoffs(
    prefs: &PreferenceVector,
    profile: &ProfileVector,
    threshold: f32,
) -> Vec<ExperienceDimension> {
    let gaps = gaps(prefs, profile);
    let mut short: Vec<ExperienceDimension> = ExperienceDimension::ALL
        .into_iter()
        .filter(|d| gaps[d.index()] < -threshold)
        .collect();
    // stable sort keeps dimension order among equal gaps
    short.sort_by_key(|d| OrderedFloat(gaps[d.index()]));
    short.truncate(MAX_TRADEOFFS);
    short
}

/// Up to three non-trade-off dimensions where the college scores high and sits
/// close to what the student asked for. A dimension with zero fit is never a
/// strength.
pub fn strengths(
    prefs: &PreferenceVector,
    profile: &ProfileVector,
    threshold: f32,
) -> Vec<ExperienceDimension> {
    let gaps = gaps(prefs, profile);
    let fit = |d: ExperienceDimension| profile.get(d) * (1.0 - gaps[d.index()].abs());

    let mut good: Vec<ExperienceDimension> = ExperienceDimension::ALL
        .into_iter()
        .filter(|&d| gaps[d.index()] >= -threshold && fit(d) > 0.0)
        .collect();
    good.sort_by_key(|&d| std::cmp::Reverse(OrderedFloat(fit(d))));
    good.truncate(MAX_STRENGTHS);
    good
}

fn join_labels(dims: &[ExperienceDimension]) -> String {
    dims.iter().map(|d| d.label()).collect::<Vec<_>>().join(", ")
}

pub fn templated_explanation(
    name: &str,
    score: f32,
    strengths: &[ExperienceDimension],
    tradeoffs: &[ExperienceDimension],
) -> String {
    let mut text = format!(
        "{name} has a {:.0}% alignment with your preferences.",
        score.clamp(0.0, 1.0) * 100.0
    );

    match strengths.split_first() {
        Some((top, [])) => {
            text.push_str(&format!(" Its strongest area for you is {}.", top.label()));
        }
        Some((top, rest)) => {
            text.push_str(&format!(
                " Its strongest area for you is {}, followed by {}.",
                top.label(),
                join_labels(rest)
            ));
        }
        None => text.push_str(" No single area stands out against your priorities."),
    }

    if !tradeoffs.is_empty() {
        text.push_str(&format!(" Potential gaps: {}.", join_labels(tradeoffs)));
    }

    text
}

/// Build a fully templated match result for a similarity-ranked college
pub fn explain(prefs: &PreferenceVector, scored: &ScoredCollege<'_>, threshold: f32) -> MatchResult {
    let strengths = strengths(prefs, scored.profile, threshold);
    let tradeoffs = tradeoffs(prefs, scored.profile, threshold);
    let score = scored.score.clamp(0.0, 1.0);

    MatchResult {
        institution_id: scored.college.id,
        institution_name: scored.college.name.clone(),
        similarity_score: score,
        explanation: templated_explanation(&scored.college.name, score, &strengths, &tradeoffs),
        strengths,
        tradeoffs,
        scores: *scored.profile,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edualign_core::DIMENSION_COUNT;
    use ExperienceDimension::*;

    fn prefs(values: [f32; DIMENSION_COUNT]) -> PreferenceVector {
        let mut p = PreferenceVector::default();
        for (dim, v) in ExperienceDimension::ALL.into_iter().zip(values) {
            p.set(dim, v);
        }
        p
    }

    #[test]
    fn test_tradeoffs_largest_shortfall_first() {
        let student = prefs([9.0, 9.0, 5.0, 8.0, 5.0, 5.0, 5.0, 5.0]);
        let college = ProfileVector::new([0.4, 0.8, 0.5, 0.2, 0.5, 0.5, 0.5, 0.5]);
        // gaps: academic -0.5, social -0.1, career -0.6
        assert_eq!(tradeoffs(&student, &college, 0.2), vec![CareerSupport, AcademicIntensity]);
    }

    #[test]
    fn test_tradeoffs_capped_at_two() {
        let student = prefs([10.0; DIMENSION_COUNT]);
        let college = ProfileVector::new([0.1; DIMENSION_COUNT]);
        let t = tradeoffs(&student, &college, 0.2);
        assert_eq!(t, vec![AcademicIntensity, SocialLife]);
    }

    #[test]
    fn test_strengths_prefer_high_and_close() {
        let student = prefs([9.0, 2.0, 8.0, 5.0, 5.0, 5.0, 5.0, 5.0]);
        let college = ProfileVector::new([0.9, 0.9, 0.8, 0.5, 0.5, 0.3, 0.5, 0.5]);
        let s = strengths(&student, &college, 0.2);
        // academic: 0.9 * 1.0, inclusivity: 0.8 * 1.0, social: 0.9 * 0.3
        assert_eq!(s, vec![AcademicIntensity, Inclusivity, CareerSupport]);
        assert!(!s.contains(&MentalHealthCulture));
    }

    #[test]
    fn test_zero_scores_are_not_strengths() {
        // weight 1 against a score of 0 is within the threshold but has no fit
        let student = prefs([1.0; DIMENSION_COUNT]);
        let college = ProfileVector::new([0.0; DIMENSION_COUNT]);
        assert!(tradeoffs(&student, &college, 0.2).is_empty());
        assert!(strengths(&student, &college, 0.2).is_empty());

        let mut scores = [0.0; DIMENSION_COUNT];
        scores[CampusSafety.index()] = 0.2;
        let college = ProfileVector::new(scores);
        assert_eq!(strengths(&student, &college, 0.2), vec![CampusSafety]);
    }

    #[test]
    fn test_strengths_and_tradeoffs_disjoint() {
        let student = prefs([10.0, 1.0, 10.0, 1.0, 10.0, 1.0, 10.0, 1.0]);
        let college = ProfileVector::new([0.2, 0.9, 0.1, 0.9, 0.3, 0.9, 0.95, 0.9]);
        let s = strengths(&student, &college, 0.2);
        let t = tradeoffs(&student, &college, 0.2);
        assert!(s.len() <= MAX_STRENGTHS && t.len() <= MAX_TRADEOFFS);
        assert!(s.iter().all(|d| !t.contains(d)));
    }

    #[test]
    fn test_templated_explanation_mentions_top_strength() {
        let text = templated_explanation(
            "Example University",
            0.934,
            &[CareerSupport, CampusSafety],
            &[SocialLife],
        );
        assert_eq!(
            text,
            "Example University has a 93% alignment with your preferences. \
             Its strongest area for you is career support, followed by campus safety. \
             Potential gaps: social life."
        );
    }

    #[test]
    fn test_templated_explanation_without_strengths() {
        let text = templated_explanation("Plain College", 0.5, &[], &[]);
        assert_eq!(
            text,
            "Plain College has a 50% alignment with your preferences. \
             No single area stands out against your priorities."
        );
    }
}
