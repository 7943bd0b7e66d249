//! Prompt rendering and reply parsing for generated matches.
//!
//! The reply is trusted only after every entry resolves to a shortlisted
//! college with valid scores and dimension keys. Anything else is reported as
//! [`GenerationError::Malformed`] so the whole reply is discarded.

use edualign_core::{ExperienceDimension, MatchResult, PreferenceVector, StudentProfile};
use serde::Deserialize;
use std::collections::HashSet;

use crate::generation::{GenerationError, Prompt};
use crate::rank::ScoredCollege;

fn system_prompt() -> String {
    let keys: Vec<&str> = ExperienceDimension::ALL.iter().map(|d| d.as_str()).collect();
    format!(
        r#"You are the EduAlign college matching engine. You receive an optional student profile, the student's experience preferences rated 1-10 on eight dimensions, and candidate colleges with alumni-reported experience scores normalized to 0-1.

Rank the candidates that best fit this student. Weigh their academic background, interests and location alongside the experience dimensions, and be honest about trade-offs (a college may excel at career support but lack social life).

Respond with JSON only, no markdown and no commentary, using this schema:
{{"matches": [{{"institution_id": 0, "college_name": "...", "similarity_score": 0.0, "explanation": "2-3 sentences on why this college fits and what the trade-offs are", "strengths": ["dimension_key"], "tradeoffs": ["dimension_key"]}}]}}

Rules:
- Use only institution ids and names from the candidate list.
- Use only these dimension keys: {}.
- similarity_score is between 0.0 and 1.0, where 1.0 is a perfect fit.
- Order matches from best fit to worst."#,
        keys.join(", ")
    )
}

/// Render the request for the generation service
pub fn build_prompt(
    prefs: &PreferenceVector,
    profile: Option<&StudentProfile>,
    shortlist: &[ScoredCollege<'_>],
    top_n: usize,
) -> Prompt {
    let mut sections = Vec::new();

    if let Some(profile) = profile {
        let lines = profile.describe();
        if !lines.is_empty() {
            let body: Vec<String> = lines
                .iter()
                .map(|(label, value)| format!("  {label}: {value}"))
                .collect();
            sections.push(format!("Student profile:\n{}", body.join("\n")));
        }
    }

    let pref_lines: Vec<String> = prefs
        .iter()
        .map(|(dim, weight)| format!("  {dim}: {weight}/10"))
        .collect();
    sections.push(format!(
        "Experience preferences (1-10 scale):\n{}",
        pref_lines.join("\n")
    ));

    let college_lines: Vec<String> = shortlist
        .iter()
        .map(|s| {
            let scores: Vec<String> = s
                .profile
                .iter()
                .map(|(dim, score)| format!("{dim}: {score:.2}"))
                .collect();
            let location = s
                .college
                .location()
                .map(|l| format!(" ({l})"))
                .unwrap_or_default();
            format!(
                "- [{}] {}{}: {}",
                s.college.id,
                s.college.name,
                location,
                scores.join(", ")
            )
        })
        .collect();
    sections.push(format!(
        "Candidate colleges with alumni experience profiles (0-1 scale):\n{}",
        college_lines.join("\n")
    ));

    sections.push(format!("Return the top {top_n} best matches as JSON."));

    Prompt {
        system: system_prompt(),
        user: sections.join("\n\n"),
    }
}

#[derive(Debug, Deserialize)]
struct Reply {
    matches: Vec<ReplyMatch>,
}

#[derive(Debug, Deserialize)]
struct ReplyMatch {
    #[serde(default)]
    institution_id: Option<u32>,
    #[serde(default)]
    college_name: Option<String>,
    similarity_score: f64,
    explanation: String,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default, alias = "weaknesses")]
    tradeoffs: Vec<String>,
}

/// Models occasionally wrap JSON in a markdown fence despite instructions
pub(crate) fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}

fn parse_dimensions(raw: &[String]) -> Result<Vec<ExperienceDimension>, GenerationError> {
    let mut dims = Vec::with_capacity(raw.len());
    for key in raw {
        let dim = ExperienceDimension::parse_lenient(key)
            .ok_or_else(|| GenerationError::malformed(format!("unknown dimension {key:?}")))?;
        if !dims.contains(&dim) {
            dims.push(dim);
        }
    }
    Ok(dims)
}

fn resolve<'s, 'a>(
    entry: &ReplyMatch,
    shortlist: &'s [ScoredCollege<'a>],
) -> Result<&'s ScoredCollege<'a>, GenerationError> {
    if let Some(id) = entry.institution_id {
        return shortlist
            .iter()
            .find(|s| s.college.id == id)
            .ok_or_else(|| GenerationError::malformed(format!("institution {id} was not a candidate")));
    }

    let name = entry
        .college_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| GenerationError::malformed("match without institution_id or college_name"))?;

    shortlist
        .iter()
        .find(|s| s.college.name.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| GenerationError::malformed(format!("college {name:?} was not a candidate")))
}

/// Parse and validate a generation reply.
///
/// Returns at most `top_n` results and fails unless at least
/// `min(top_n, shortlist.len())` valid entries are present.
pub fn parse_reply(
    text: &str,
    shortlist: &[ScoredCollege<'_>],
    top_n: usize,
) -> Result<Vec<MatchResult>, GenerationError> {
    let body = strip_fence(text);
    if body.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let reply: Reply = serde_json::from_str(body)
        .map_err(|e| GenerationError::malformed(format!("invalid JSON: {e}")))?;

    let mut seen = HashSet::new();
    let mut results = Vec::with_capacity(top_n);

    for entry in reply.matches.iter().take(top_n) {
        let scored = resolve(entry, shortlist)?;
        if !seen.insert(scored.college.id) {
            return Err(GenerationError::malformed(format!(
                "institution {} listed twice",
                scored.college.id
            )));
        }

        if !entry.similarity_score.is_finite() || !(0.0..=1.0).contains(&entry.similarity_score) {
            return Err(GenerationError::malformed(format!(
                "similarity_score {} outside [0, 1]",
                entry.similarity_score
            )));
        }

        let explanation = entry.explanation.trim();
        if explanation.is_empty() {
            return Err(GenerationError::malformed("empty explanation"));
        }

        results.push(MatchResult {
            institution_id: scored.college.id,
            institution_name: scored.college.name.clone(),
            similarity_score: entry.similarity_score as f32,
            explanation: explanation.to_string(),
            strengths: parse_dimensions(&entry.strengths)?,
            tradeoffs: parse_dimensions(&entry.tradeoffs)?,
            scores: *scored.profile,
        });
    }

    let expected = top_n.min(shortlist.len());
    if results.len() < expected {
        return Err(GenerationError::malformed(format!(
            "expected {expected} matches, got {}",
            results.len()
        )));
    }

    Ok(results)
}
