//! Cosine similarity ranking of candidate colleges.

use edualign_core::{cosine_similarity, College, PreferenceVector, ProfileVector};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::sync::Arc;

/// A candidate college with its cosine similarity to the student
#[derive(Debug, Clone, Copy)]
pub struct ScoredCollege<'a> {
    pub college: &'a College,
    pub profile: &'a ProfileVector,
    pub score: f32,
}

impl ScoredCollege<'_> {
    pub fn id(&self) -> u32 {
        self.college.id
    }
}

/// Descending score, then ascending institution id
fn by_rank(a: &ScoredCollege<'_>, b: &ScoredCollege<'_>) -> Ordering {
    OrderedFloat(b.score)
        .cmp(&OrderedFloat(a.score))
        .then(a.college.id.cmp(&b.college.id))
}

/// Score every candidate that has a complete profile and keep the best `limit`.
///
/// Colleges without a profile are skipped. The order is a total order, so the
/// result is identical across calls for the same inputs.
pub fn rank_candidates<'a>(
    prefs: &PreferenceVector,
    candidates: &'a [Arc<College>],
    limit: usize,
) -> Vec<ScoredCollege<'a>> {
    let student = prefs.as_slice();

    let mut scored: Vec<ScoredCollege<'a>> = candidates
        .par_iter()
        .filter_map(|college| {
            let profile = college.profile.as_ref()?;
            Some(ScoredCollege {
                college: college.as_ref(),
                profile,
                score: cosine_similarity(student, profile.as_slice()),
            })
        })
        .collect();

    scored.sort_by(by_rank);
    scored.truncate(limit);
    scored
}
