//! Generated advice on top of per-college predictions.
//!
//! Replies are matched to colleges by name. A college the reply leaves out
//! gets the templated narrative instead, so a partial reply still helps.

use edualign_core::predictions::{fallback_narrative, format_dollars};
use edualign_core::{CollegePrediction, StudentProfile};
use serde::Deserialize;

use crate::generation::{GenerationError, Prompt};
use crate::prompt::strip_fence;

const SYSTEM_PROMPT: &str = r#"You are EduAlign's prediction advisor. You receive a student profile and data-driven predictions for several colleges. Write a concise 2-3 sentence narrative for EACH college that combines the admission chance, expected earnings and graduation probability into personalized advice. Be honest about risks and opportunities.

Respond with JSON only, no markdown and no commentary, using this schema:
{"narratives": [{"college_name": "...", "narrative": "2-3 sentences of personalized advice"}]}

Use the college names exactly as given."#;

/// One narrative per prediction, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct Narratives {
    pub texts: Vec<String>,
    /// At least one narrative is templated
    pub used_fallback: bool,
}

impl Narratives {
    /// Templated narratives for every prediction
    pub fn fallback(predictions: &[CollegePrediction]) -> Self {
        Self {
            texts: predictions.iter().map(fallback_narrative).collect(),
            used_fallback: !predictions.is_empty(),
        }
    }

    /// Generated text where available, templated text elsewhere
    pub(crate) fn merge(generated: Vec<Option<String>>, predictions: &[CollegePrediction]) -> Self {
        let mut used_fallback = false;
        let texts = generated
            .into_iter()
            .zip(predictions)
            .map(|(text, prediction)| {
                text.unwrap_or_else(|| {
                    used_fallback = true;
                    fallback_narrative(prediction)
                })
            })
            .collect();
        Self {
            texts,
            used_fallback,
        }
    }
}

fn or_na<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

pub fn build_narrative_prompt(profile: &StudentProfile, predictions: &[CollegePrediction]) -> Prompt {
    let described: Vec<String> = profile
        .describe()
        .into_iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect();
    let student = if described.is_empty() {
        "no details shared".to_string()
    } else {
        described.join(", ")
    };

    let summaries: Vec<String> = predictions
        .iter()
        .map(|p| {
            format!(
                "- {}: admission {} ({}), earnings {}/yr, graduation {}",
                p.institution_name,
                p.admission.category.as_str(),
                or_na(p.admission.chance),
                p.earnings
                    .median_10yr
                    .map_or_else(|| "N/A".to_string(), format_dollars),
                or_na(p.graduation.probability),
            )
        })
        .collect();

    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user: format!(
            "Student: {student}\n\nPredictions:\n{}\n\nWrite a narrative for each college.",
            summaries.join("\n")
        ),
    }
}

#[derive(Deserialize)]
struct NarrativeReply {
    #[serde(default)]
    narratives: Vec<NarrativeEntry>,
}

#[derive(Deserialize)]
struct NarrativeEntry {
    college_name: String,
    narrative: String,
}

/// Generated narrative per prediction, `None` where the reply has none.
///
/// Fails only when the reply is not the expected JSON object.
pub fn parse_narratives(
    text: &str,
    predictions: &[CollegePrediction],
) -> Result<Vec<Option<String>>, GenerationError> {
    let reply: NarrativeReply = serde_json::from_str(strip_fence(text))
        .map_err(|e| GenerationError::malformed(format!("reply is not the expected JSON: {e}")))?;

    Ok(predictions
        .iter()
        .map(|p| {
            reply
                .narratives
                .iter()
                .find(|n| n.college_name.trim().eq_ignore_ascii_case(p.institution_name.trim()))
                .map(|n| n.narrative.trim())
                .filter(|n| !n.is_empty())
                .map(str::to_string)
        })
        .collect())
}
